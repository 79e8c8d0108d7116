//! Weibull distribution evaluation (location fixed at 0).
//!
//! The pricing path only needs the survival function; density, CDF and
//! quantiles feed the validation charts (fitted-density overlay, Q-Q plot).

use statrs::distribution::{Continuous, ContinuousCDF, Weibull};

use crate::domain::WeibullParams;
use crate::error::{PricingError, PricingResult};

/// A fitted Weibull ready for repeated evaluation.
#[derive(Debug, Clone)]
pub struct WeibullModel {
    params: WeibullParams,
    dist: Weibull,
}

impl WeibullModel {
    pub fn new(params: WeibullParams) -> PricingResult<Self> {
        let dist = Weibull::new(params.shape(), params.scale())
            .map_err(|e| PricingError::invalid_argument(format!("invalid Weibull parameters: {e}")))?;
        Ok(Self { params, dist })
    }

    pub fn params(&self) -> &WeibullParams {
        &self.params
    }

    /// `P(X > x)`, evaluated directly as `exp(-(x/λ)^k)`.
    ///
    /// No mass below zero, so anything `<= 0` maps to exactly 1.
    pub fn survival(&self, x: f64) -> f64 {
        if x <= 0.0 {
            return 1.0;
        }
        self.dist.sf(x).clamp(0.0, 1.0)
    }

    pub fn cdf(&self, x: f64) -> f64 {
        if x <= 0.0 {
            return 0.0;
        }
        self.dist.cdf(x).clamp(0.0, 1.0)
    }

    pub fn pdf(&self, x: f64) -> f64 {
        if x < 0.0 {
            return 0.0;
        }
        self.dist.pdf(x)
    }

    /// Inverse CDF for `p` in `[0, 1)`.
    pub fn quantile(&self, p: f64) -> PricingResult<f64> {
        if !(p.is_finite() && (0.0..1.0).contains(&p)) {
            return Err(PricingError::invalid_argument(format!(
                "quantile probability must be in [0, 1) (got {p})"
            )));
        }
        let k = self.params.shape();
        let lambda = self.params.scale();
        Ok(lambda * (-(-p).ln_1p()).powf(1.0 / k))
    }
}

/// Probability that a daily maximum exceeds `threshold` under the fitted model.
pub fn exceedance_probability(params: &WeibullParams, threshold: f64) -> PricingResult<f64> {
    if !threshold.is_finite() {
        return Err(PricingError::invalid_argument(format!(
            "threshold must be finite (got {threshold})"
        )));
    }
    Ok(WeibullModel::new(*params)?.survival(threshold))
}

/// Log-likelihood of strictly positive `values` (loc = 0).
pub fn log_likelihood(params: &WeibullParams, values: &[f64]) -> f64 {
    let k = params.shape();
    let lambda = params.scale();
    let base = k.ln() - k * lambda.ln();
    values
        .iter()
        .map(|&x| base + (k - 1.0) * x.ln() - (x / lambda).powf(k))
        .sum()
}
