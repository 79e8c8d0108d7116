//! Chart data for model validation: histogram, fitted density, Q-Q points.
//!
//! Everything here is plain `(x, y)` data; the ASCII plot and the TUI widgets
//! decide how to draw it.

use crate::error::PricingResult;
use crate::math::{linspace, min_max, sort_floats};
use crate::models::WeibullModel;

pub const DEFAULT_BINS: usize = 20;

/// Q-Q probabilities run over `[QQ_P_MIN, QQ_P_MAX]`.
const QQ_P_MIN: f64 = 0.01;
const QQ_P_MAX: f64 = 0.99;

/// One histogram bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramBin {
    pub lo: f64,
    pub hi: f64,
    pub count: usize,
    /// `count / (n * width)`, comparable with a probability density.
    pub density: f64,
}

impl HistogramBin {
    pub fn mid(&self) -> f64 {
        0.5 * (self.lo + self.hi)
    }
}

/// Equal-width histogram over `[min, max]` of `values`.
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    let Some((min, max)) = min_max(values) else {
        return Vec::new();
    };
    let bins = bins.max(1);
    let (lo, hi) = if max > min { (min, max) } else { (min - 0.5, max + 0.5) };
    let width = (hi - lo) / bins as f64;

    let mut counts = vec![0usize; bins];
    for &v in values {
        // The top edge belongs to the last bin.
        let idx = (((v - lo) / width).floor() as usize).min(bins - 1);
        counts[idx] += 1;
    }

    let n = values.len() as f64;
    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            lo: lo + width * i as f64,
            hi: lo + width * (i + 1) as f64,
            count,
            density: count as f64 / (n * width),
        })
        .collect()
}

/// Fitted density sampled on `[0, x_max]`.
pub fn density_curve(model: &WeibullModel, x_max: f64, points: usize) -> Vec<(f64, f64)> {
    linspace(0.0, x_max.max(0.0), points.max(2))
        .into_iter()
        .map(|x| (x, model.pdf(x)))
        .filter(|(_, y)| y.is_finite())
        .collect()
}

/// `(theoretical quantile, empirical quantile)` pairs.
///
/// Theoretical quantiles are taken at evenly spaced probabilities in
/// `[0.01, 0.99]`, one per observation; empirical ones are the sorted values.
pub fn qq_points(model: &WeibullModel, values: &[f64]) -> PricingResult<Vec<(f64, f64)>> {
    let mut empirical = values.to_vec();
    sort_floats(&mut empirical);
    let probs = linspace(QQ_P_MIN, QQ_P_MAX, empirical.len());

    probs
        .into_iter()
        .zip(empirical)
        .map(|(p, e)| model.quantile(p).map(|q| (q, e)))
        .collect()
}
