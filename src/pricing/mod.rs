//! Premium calculation.
//!
//! ```text
//! pure_premium  = P(X > threshold) × exposure
//! safety_margin = pure_premium × (1 − confidence_level)
//! total_premium = pure_premium + safety_margin
//! ```
//!
//! `confidence_level` is the reciprocal of the user-facing loading factor, so a
//! loading of 1.0 means no margin at all.

use rayon::prelude::*;
use tracing::debug;

use crate::domain::{PremiumBreakdown, WeibullParams};
use crate::error::{PricingError, PricingResult};
use crate::models::exceedance_probability;

/// Price a single threshold from raw fit parameters (location assumed 0).
pub fn calculate_premium(
    shape: f64,
    scale: f64,
    threshold: f64,
    exposure: f64,
    confidence_level: f64,
) -> PricingResult<PremiumBreakdown> {
    let params = WeibullParams::new(shape, scale)?;
    premium_for_params(&params, threshold, exposure, confidence_level)
}

/// Same as [`calculate_premium`], starting from validated parameters.
pub fn premium_for_params(
    params: &WeibullParams,
    threshold: f64,
    exposure: f64,
    confidence_level: f64,
) -> PricingResult<PremiumBreakdown> {
    validate_exposure(exposure)?;
    validate_confidence(confidence_level)?;

    let exceedance_probability = exceedance_probability(params, threshold)?;
    let pure_premium = exceedance_probability * exposure;
    let safety_margin = pure_premium * (1.0 - confidence_level);
    let total_premium = pure_premium + safety_margin;

    debug!(
        threshold,
        exceedance_probability, pure_premium, safety_margin, total_premium, "premium"
    );

    Ok(PremiumBreakdown {
        exceedance_probability,
        exposure,
        pure_premium,
        safety_margin,
        total_premium,
    })
}

/// Price several thresholds at once. Output order follows `thresholds`.
///
/// Every threshold is independent, so the work is spread over the rayon pool.
pub fn premium_ladder(
    params: &WeibullParams,
    thresholds: &[f64],
    exposure: f64,
    confidence_level: f64,
) -> PricingResult<Vec<(f64, PremiumBreakdown)>> {
    thresholds
        .par_iter()
        .map(|&t| premium_for_params(params, t, exposure, confidence_level).map(|b| (t, b)))
        .collect()
}

fn validate_exposure(exposure: f64) -> PricingResult<()> {
    if !(exposure.is_finite() && exposure >= 0.0) {
        return Err(PricingError::invalid_argument(format!(
            "exposure must be finite and >= 0 (got {exposure})"
        )));
    }
    Ok(())
}

fn validate_confidence(confidence_level: f64) -> PricingResult<()> {
    if !(confidence_level > 0.0 && confidence_level <= 1.0) {
        return Err(PricingError::invalid_argument(format!(
            "confidence level must be in (0, 1] (got {confidence_level})"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_threshold_without_loading_prices_full_exposure() {
        let b = calculate_premium(2.0, 20.0, 0.0, 1_000_000.0, 1.0).unwrap();
        assert!((b.exceedance_probability - 1.0).abs() < 1e-12);
        assert!((b.pure_premium - 1_000_000.0).abs() < 1e-6);
        assert_eq!(b.safety_margin, 0.0);
        assert_eq!(b.total_premium, b.pure_premium);
        assert_eq!(b.exposure, 1_000_000.0);
    }

    #[test]
    fn loading_factor_adds_expected_margin() {
        let b = calculate_premium(2.0, 20.0, 0.0, 1_000_000.0, 1.0 / 1.2).unwrap();
        let expected = b.pure_premium * (1.0 + (1.0 - 1.0 / 1.2));
        assert!((b.total_premium - expected).abs() < 1e-6);
        assert!((b.total_premium / b.pure_premium - 1.166_666_666_7).abs() < 1e-9);
    }

    #[test]
    fn breakdown_relations_hold_exactly() {
        for &(shape, scale, threshold, exposure, c) in &[
            (2.0, 20.0, 35.0, 1_000_000.0, 0.95),
            (1.3, 12.5, 4.2, 250_000.0, 1.0 / 1.73),
            (3.7, 41.0, 80.0, 12.34, 0.5),
            (0.8, 3.0, -2.0, 9_999.0, 1.0),
        ] {
            let b = calculate_premium(shape, scale, threshold, exposure, c).unwrap();
            let p = exceedance_probability(&WeibullParams::new(shape, scale).unwrap(), threshold).unwrap();
            assert_eq!(b.exceedance_probability.to_bits(), p.to_bits());
            assert_eq!(b.pure_premium.to_bits(), (p * exposure).to_bits());
            assert_eq!(b.safety_margin.to_bits(), (b.pure_premium * (1.0 - c)).to_bits());
            assert_eq!(b.total_premium.to_bits(), (b.pure_premium + b.safety_margin).to_bits());
        }
    }

    #[test]
    fn zero_exposure_zeroes_every_premium_field() {
        let b = calculate_premium(2.0, 20.0, 10.0, 0.0, 0.5).unwrap();
        assert_eq!(b.pure_premium, 0.0);
        assert_eq!(b.safety_margin, 0.0);
        assert_eq!(b.total_premium, 0.0);
        assert!(b.exceedance_probability > 0.0);
    }

    #[test]
    fn out_of_domain_arguments_are_rejected() {
        let cases = [
            (2.0, 20.0, 35.0, -1.0, 0.9),
            (2.0, 20.0, 35.0, 1000.0, 0.0),
            (2.0, 20.0, 35.0, 1000.0, 1.5),
            (0.0, 20.0, 35.0, 1000.0, 0.9),
            (2.0, -5.0, 35.0, 1000.0, 0.9),
            (2.0, 20.0, f64::NAN, 1000.0, 0.9),
            (2.0, 20.0, 35.0, f64::INFINITY, 0.9),
            (2.0, 20.0, 35.0, 1000.0, f64::NAN),
        ];
        for (shape, scale, t, e, c) in cases {
            let err = calculate_premium(shape, scale, t, e, c).unwrap_err();
            assert!(
                matches!(err, PricingError::InvalidArgument { .. }),
                "expected InvalidArgument for {:?}",
                (shape, scale, t, e, c)
            );
        }
    }

    #[test]
    fn ladder_preserves_order_and_is_non_increasing() {
        let params = WeibullParams::new(2.0, 20.0).unwrap();
        let thresholds = [10.0, 20.0, 30.0, 40.0, 50.0, 60.0];
        let ladder = premium_ladder(&params, &thresholds, 1_000.0, 0.8).unwrap();
        assert_eq!(ladder.len(), thresholds.len());
        for (i, (t, b)) in ladder.iter().enumerate() {
            assert_eq!(*t, thresholds[i]);
            let single = premium_for_params(&params, *t, 1_000.0, 0.8).unwrap();
            assert_eq!(*b, single);
        }
        for w in ladder.windows(2) {
            assert!(w[1].1.total_premium <= w[0].1.total_premium);
        }
    }

    #[test]
    fn ladder_fails_on_any_bad_threshold() {
        let params = WeibullParams::new(2.0, 20.0).unwrap();
        assert!(premium_ladder(&params, &[10.0, f64::NAN], 1.0, 1.0).is_err());
    }
}
