//! Descriptive statistics over the observation series.

use chrono::Datelike;
use serde::Serialize;

use crate::domain::ObservationSeries;
use crate::math::{mean, median, min_max};

/// Window (days) of the centered trend line.
pub const ROLLING_WINDOW: usize = 30;

/// Summary of the daily maxima.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindStats {
    /// Days in the series (missing ones included).
    pub days: usize,
    /// Days with a usable value.
    pub valid: usize,
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
}

/// Summary statistics over the cleaned values; `None` when nothing is usable.
pub fn wind_stats(series: &ObservationSeries) -> Option<WindStats> {
    let values = series.cleaned_values();
    let (min, max) = min_max(&values)?;
    Some(WindStats {
        days: series.len(),
        valid: values.len(),
        mean: mean(&values)?,
        median: median(&values)?,
        min,
        max,
    })
}

/// Days whose maximum was strictly above `threshold`.
pub fn count_exceedances(series: &ObservationSeries, threshold: f64) -> usize {
    series
        .iter()
        .filter_map(|o| o.valid_value())
        .filter(|v| *v > threshold)
        .count()
}

/// Mean daily maximum per calendar month (index 0 = January).
///
/// Months without a usable value are `None`.
pub fn monthly_means(series: &ObservationSeries) -> [Option<f64>; 12] {
    let mut sums = [0.0f64; 12];
    let mut counts = [0usize; 12];
    for o in series.iter() {
        if let Some(v) = o.valid_value() {
            let m = o.date.month0() as usize;
            sums[m] += v;
            counts[m] += 1;
        }
    }
    let mut out = [None; 12];
    for m in 0..12 {
        if counts[m] > 0 {
            out[m] = Some(sums[m] / counts[m] as f64);
        }
    }
    out
}

/// Centered rolling mean over `window` days.
///
/// A position gets a value only when the full window fits inside the series
/// and every day in it has a usable value.
pub fn rolling_mean(series: &ObservationSeries, window: usize) -> Vec<Option<f64>> {
    let n = series.len();
    let mut out = vec![None; n];
    if window == 0 || window > n {
        return out;
    }
    let values: Vec<Option<f64>> = series.iter().map(|o| o.valid_value()).collect();
    // For even windows the extra day falls before the center.
    let before = window / 2;
    for (i, slot) in out.iter_mut().enumerate() {
        let Some(start) = i.checked_sub(before) else {
            continue;
        };
        let end = start + window;
        if end > n {
            break;
        }
        let chunk = &values[start..end];
        if chunk.iter().all(Option::is_some) {
            let sum: f64 = chunk.iter().flatten().sum();
            *slot = Some(sum / window as f64);
        }
    }
    out
}
