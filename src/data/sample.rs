//! Synthetic wind series from a known Weibull distribution.
//!
//! Used for offline runs (`--synthetic`) and as ground truth in tests.

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Weibull;

use crate::domain::{DateRange, ObservationSeries, WindObservation};
use crate::error::{PricingError, PricingResult};

/// `n` independent Weibull(shape, scale) draws from a seeded generator.
pub fn weibull_draws(shape: f64, scale: f64, n: usize, seed: u64) -> PricingResult<Vec<f64>> {
    let dist = weibull(shape, scale)?;
    let mut rng = StdRng::seed_from_u64(seed);
    Ok((0..n).map(|_| dist.sample(&mut rng)).collect())
}

/// One synthetic daily maximum per day of `range`.
///
/// Each day is independently marked missing with probability `missing_rate`.
pub fn generate_series(
    shape: f64,
    scale: f64,
    range: &DateRange,
    seed: u64,
    missing_rate: f64,
) -> PricingResult<ObservationSeries> {
    if !(0.0..1.0).contains(&missing_rate) {
        return Err(PricingError::invalid_argument(format!(
            "missing rate must be in [0, 1) (got {missing_rate})"
        )));
    }
    let dist = weibull(shape, scale)?;
    let mut rng = StdRng::seed_from_u64(seed);

    let observations = range
        .start
        .iter_days()
        .take(range.days())
        .map(|date| {
            let value = dist.sample(&mut rng);
            let missing = missing_rate > 0.0 && rng.gen_bool(missing_rate);
            WindObservation {
                date,
                wind_speed_max: if missing { None } else { Some(value) },
            }
        })
        .collect();

    Ok(ObservationSeries::new(observations))
}

fn weibull(shape: f64, scale: f64) -> PricingResult<Weibull<f64>> {
    if !(shape.is_finite() && shape > 0.0 && scale.is_finite() && scale > 0.0) {
        return Err(PricingError::invalid_argument(format!(
            "synthetic Weibull needs shape > 0 and scale > 0 (got {shape}, {scale})"
        )));
    }
    // rand_distr takes (scale, shape).
    Weibull::new(scale, shape)
        .map_err(|e| PricingError::invalid_argument(format!("synthetic Weibull: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn series_covers_every_day_and_is_seeded() {
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2022, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2022, 3, 31).unwrap(),
        )
        .unwrap();
        let a = generate_series(2.0, 20.0, &range, 42, 0.05).unwrap();
        let b = generate_series(2.0, 20.0, &range, 42, 0.05).unwrap();

        assert_eq!(a.len(), 90);
        assert_eq!(a, b);
        assert_eq!(a.first_date(), Some(range.start));
        assert_eq!(a.last_date(), Some(range.end));
        assert!(a.cleaned_values().iter().all(|v| *v >= 0.0));
    }

    #[test]
    fn draws_have_the_expected_mean() {
        // Weibull(2, 20) mean = 20 * Γ(1.5) ≈ 17.7245
        let draws = weibull_draws(2.0, 20.0, 20_000, 1).unwrap();
        let mean = draws.iter().sum::<f64>() / draws.len() as f64;
        assert!((mean - 17.7245).abs() < 0.3, "mean {mean}");
    }

    #[test]
    fn invalid_parameters_are_rejected() {
        assert!(weibull_draws(0.0, 20.0, 10, 1).is_err());
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2022, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2022, 1, 2).unwrap(),
        )
        .unwrap();
        assert!(generate_series(2.0, 20.0, &range, 1, 1.0).is_err());
    }
}
