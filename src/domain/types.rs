//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - passed through the fetch -> fit -> price pipeline by value
//! - exported to JSON/CSV
//! - rendered by the report and TUI layers without further conversion

use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, PricingError, PricingResult};

/// A point on the WGS84 globe.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, AppError> {
        if !(latitude.is_finite() && (-90.0..=90.0).contains(&latitude)) {
            return Err(AppError::new(
                2,
                format!("Invalid latitude {latitude} (must be within [-90, 90])."),
            ));
        }
        if !(longitude.is_finite() && (-180.0..=180.0).contains(&longitude)) {
            return Err(AppError::new(
                2,
                format!("Invalid longitude {longitude} (must be within [-180, 180])."),
            ));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }
}

/// Inclusive calendar date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, AppError> {
        if end < start {
            return Err(AppError::new(
                2,
                format!("Invalid date range: start {start} is after end {end}."),
            ));
        }
        Ok(Self { start, end })
    }

    /// Number of calendar days in the range (both ends included).
    pub fn days(&self) -> usize {
        ((self.end - self.start).num_days() + 1) as usize
    }
}

/// One day of the archive: the daily maximum wind speed (km/h), if reported.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindObservation {
    pub date: NaiveDate,
    /// `None` (or NaN) marks a missing value.
    pub wind_speed_max: Option<f64>,
}

impl WindObservation {
    /// The observation value when it is usable for fitting (finite and `>= 0`).
    pub fn valid_value(&self) -> Option<f64> {
        self.wind_speed_max
            .filter(|v| v.is_finite() && *v >= 0.0)
    }
}

/// Ordered daily observations, as returned by the data collaborator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObservationSeries {
    pub observations: Vec<WindObservation>,
}

impl ObservationSeries {
    pub fn new(observations: Vec<WindObservation>) -> Self {
        Self { observations }
    }

    /// Build a series with consecutive days starting at `start`.
    pub fn from_daily_values(start: NaiveDate, values: &[Option<f64>]) -> Self {
        let observations = values
            .iter()
            .zip(start.iter_days())
            .map(|(&wind_speed_max, date)| WindObservation {
                date,
                wind_speed_max,
            })
            .collect();
        Self { observations }
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &WindObservation> {
        self.observations.iter()
    }

    /// Cleaned copy of the values: missing, non-finite and negative entries dropped.
    pub fn cleaned_values(&self) -> Vec<f64> {
        self.observations
            .iter()
            .filter_map(WindObservation::valid_value)
            .collect()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.observations.first().map(|o| o.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.observations.last().map(|o| o.date)
    }
}

/// Fitted Weibull parameters with location pinned at zero.
///
/// Fields are private so the invariant `shape > 0`, `scale > 0`, `loc == 0`
/// holds for every value in circulation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeibullParams {
    shape: f64,
    loc: f64,
    scale: f64,
}

impl WeibullParams {
    pub fn new(shape: f64, scale: f64) -> PricingResult<Self> {
        if !(shape.is_finite() && shape > 0.0) {
            return Err(PricingError::invalid_argument(format!(
                "shape must be finite and > 0 (got {shape})"
            )));
        }
        if !(scale.is_finite() && scale > 0.0) {
            return Err(PricingError::invalid_argument(format!(
                "scale must be finite and > 0 (got {scale})"
            )));
        }
        Ok(Self {
            shape,
            loc: 0.0,
            scale,
        })
    }

    pub fn shape(&self) -> f64 {
        self.shape
    }

    /// Always `0.0`: wind speed cannot be negative.
    pub fn loc(&self) -> f64 {
        self.loc
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }
}

/// Bookkeeping from a single fit call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FitDiagnostics {
    /// Entries in the input series.
    pub n_input: usize,
    /// Entries retained by cleaning (finite and `>= 0`).
    pub n_valid: usize,
    pub n_missing: usize,
    pub n_negative: usize,
    /// Exact zeros kept by cleaning but left out of the likelihood.
    pub zeros_excluded: usize,
    /// Values that entered the likelihood.
    pub n_used: usize,
    pub iterations: u32,
    pub log_likelihood: f64,
}

/// Fit output: parameters plus diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeibullFit {
    pub params: WeibullParams,
    pub diagnostics: FitDiagnostics,
}

/// Premium decomposition for one pricing request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PremiumBreakdown {
    pub exceedance_probability: f64,
    pub exposure: f64,
    pub pure_premium: f64,
    pub safety_margin: f64,
    pub total_premium: f64,
}

/// User-facing loading multiplier (`>= 1`); its reciprocal is the confidence level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoadingFactor(f64);

impl LoadingFactor {
    pub fn new(factor: f64) -> PricingResult<Self> {
        if !(factor.is_finite() && factor >= 1.0) {
            return Err(PricingError::invalid_argument(format!(
                "loading factor must be finite and >= 1 (got {factor})"
            )));
        }
        Ok(Self(factor))
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    /// Confidence level in `(0, 1]`.
    pub fn confidence_level(&self) -> f64 {
        1.0 / self.0
    }
}

/// Everything that identifies one pricing request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricingRequest {
    pub location: Location,
    pub range: DateRange,
    /// Wind threshold (km/h).
    pub threshold: f64,
    /// Insured amount.
    pub exposure: f64,
    pub loading_factor: LoadingFactor,
}

/// Where observations come from.
#[derive(Debug, Clone, PartialEq)]
pub enum DataSource {
    /// Open-Meteo historical archive (network).
    Archive,
    /// Local `date,wind_speed_max` CSV.
    Csv(PathBuf),
    /// Seeded synthetic Weibull series (offline demos/tests).
    Synthetic { shape: f64, scale: f64, seed: u64 },
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct PricingConfig {
    pub request: PricingRequest,
    pub source: DataSource,

    /// Matched address when the location came from a place-name lookup.
    pub place: Option<String>,

    /// Extra thresholds priced side by side in the report.
    pub ladder: Vec<f64>,

    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,

    pub export_observations: Option<PathBuf>,
    pub export_premium: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cleaning_drops_missing_nan_and_negative_values() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let series = ObservationSeries::from_daily_values(
            start,
            &[Some(12.0), None, Some(f64::NAN), Some(-3.0), Some(0.0), Some(f64::INFINITY), Some(30.5)],
        );

        assert_eq!(series.cleaned_values(), vec![12.0, 0.0, 30.5]);
        // The source series is untouched.
        assert_eq!(series.len(), 7);
        assert_eq!(series.last_date(), NaiveDate::from_ymd_opt(2024, 1, 7));
    }

    #[test]
    fn weibull_params_pin_location_at_zero() {
        let p = WeibullParams::new(2.0, 20.0).unwrap();
        assert_eq!(p.loc(), 0.0);
        assert!(WeibullParams::new(0.0, 20.0).is_err());
        assert!(WeibullParams::new(2.0, -5.0).is_err());
        assert!(WeibullParams::new(f64::NAN, 1.0).is_err());
    }

    #[test]
    fn loading_factor_reciprocal_is_confidence() {
        let lf = LoadingFactor::new(1.25).unwrap();
        assert!((lf.confidence_level() - 0.8).abs() < 1e-15);
        assert!(LoadingFactor::new(0.9).is_err());
        assert_eq!(LoadingFactor::new(1.0).unwrap().confidence_level(), 1.0);
    }

    #[test]
    fn location_and_range_validation() {
        assert!(Location::new(44.2971, 0.1178).is_ok());
        assert!(Location::new(91.0, 0.0).is_err());
        assert!(Location::new(0.0, -181.0).is_err());

        let a = NaiveDate::from_ymd_opt(2022, 1, 1).unwrap();
        let b = NaiveDate::from_ymd_opt(2022, 12, 31).unwrap();
        assert_eq!(DateRange::new(a, b).unwrap().days(), 365);
        assert!(DateRange::new(b, a).is_err());
    }
}
