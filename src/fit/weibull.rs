//! Maximum-likelihood Weibull fit with location fixed at 0.
//!
//! With `loc = 0` the scale has a closed form given the shape,
//!
//! ```text
//! λ(k) = (mean(x^k))^(1/k)
//! ```
//!
//! so the two-parameter problem reduces to the profile score equation in `k`:
//!
//! ```text
//! g(k) = Σ x^k ln x / Σ x^k − 1/k − mean(ln x) = 0
//! ```
//!
//! `g` is strictly increasing (`g'(k)` is a weighted variance of `ln x` plus
//! `1/k²`), runs from `-∞` at `k → 0` to `-mean(ln(x / max))` at `k → ∞`, and
//! therefore has exactly one root whenever the sample has two distinct values.
//!
//! Values are divided by the sample maximum first: `g` is invariant to that
//! rescaling and every `y^k` stays in `(0, 1]`, so nothing overflows for large `k`.

use tracing::{debug, warn};

use crate::domain::{FitDiagnostics, ObservationSeries, WeibullFit, WeibullParams};
use crate::error::{MIN_DISTINCT_OBSERVATIONS, PricingError, PricingResult};
use crate::math::{SolverConfig, count_distinct, fit_line, newton_bisect, sort_floats};
use crate::models::log_likelihood;

/// Lower shape search limit. There is no upper limit: nearly identical
/// samples legitimately fit shapes far above 1e4, and `g` stays finite there.
const SHAPE_MIN: f64 = 1e-4;

/// Fit shape and scale to an observation series.
pub fn fit(series: &ObservationSeries) -> PricingResult<WeibullParams> {
    fit_with_diagnostics(series).map(|fit| fit.params)
}

/// Fit shape and scale, keeping the cleaning/solver bookkeeping.
pub fn fit_with_diagnostics(series: &ObservationSeries) -> PricingResult<WeibullFit> {
    let raw: Vec<f64> = series
        .iter()
        .map(|o| o.wind_speed_max.unwrap_or(f64::NAN))
        .collect();
    fit_values(&raw)
}

/// Fit raw values; NaN / infinite entries count as missing.
pub fn fit_values(raw: &[f64]) -> PricingResult<WeibullFit> {
    let n_input = raw.len();
    let n_missing = raw.iter().filter(|v| !v.is_finite()).count();
    let n_negative = raw.iter().filter(|v| v.is_finite() && **v < 0.0).count();

    let valid: Vec<f64> = raw
        .iter()
        .copied()
        .filter(|v| v.is_finite() && *v >= 0.0)
        .collect();
    let positive: Vec<f64> = valid.iter().copied().filter(|v| *v > 0.0).collect();
    let zeros_excluded = valid.len() - positive.len();

    if zeros_excluded > 0 {
        warn!(
            zeros = zeros_excluded,
            "zero wind speeds have no Weibull log-density; excluded from the likelihood"
        );
    }

    let distinct = count_distinct(&positive);
    if distinct < MIN_DISTINCT_OBSERVATIONS {
        return Err(PricingError::insufficient_data(distinct));
    }

    let (shape, iterations) = solve_shape(&positive)?;
    let scale = scale_for_shape(&positive, shape);

    let params = WeibullParams::new(shape, scale).map_err(|e| {
        PricingError::fit_convergence(iterations, format!("solver produced invalid parameters: {e}"))
    })?;
    let ll = log_likelihood(&params, &positive);

    debug!(
        shape = params.shape(),
        scale = params.scale(),
        n = positive.len(),
        iterations,
        log_likelihood = ll,
        "weibull fit"
    );

    Ok(WeibullFit {
        params,
        diagnostics: FitDiagnostics {
            n_input,
            n_valid: valid.len(),
            n_missing,
            n_negative,
            zeros_excluded,
            n_used: positive.len(),
            iterations,
            log_likelihood: ll,
        },
    })
}

/// Pre-computed `ln(x / max)` for the score equation.
struct ScoreTerms {
    log_y: Vec<f64>,
    mean_log_y: f64,
}

impl ScoreTerms {
    fn new(values: &[f64]) -> Self {
        let max = values.iter().copied().fold(f64::MIN, f64::max);
        let log_y: Vec<f64> = values.iter().map(|&x| (x / max).ln()).collect();
        let mean_log_y = log_y.iter().sum::<f64>() / log_y.len() as f64;
        Self { log_y, mean_log_y }
    }

    /// `(g(k), g'(k))`.
    fn eval(&self, k: f64) -> (f64, f64) {
        let mut s0 = 0.0;
        let mut s1 = 0.0;
        let mut s2 = 0.0;
        for &ly in &self.log_y {
            let w = (k * ly).exp();
            s0 += w;
            s1 += w * ly;
            s2 += w * ly * ly;
        }
        let m1 = s1 / s0;
        let m2 = s2 / s0;
        let g = m1 - 1.0 / k - self.mean_log_y;
        let dg = (m2 - m1 * m1).max(0.0) + 1.0 / (k * k);
        (g, dg)
    }
}

fn solve_shape(values: &[f64]) -> PricingResult<(f64, u32)> {
    let terms = ScoreTerms::new(values);
    let k0 = median_rank_shape(values).unwrap_or(1.0);

    let (lo, hi) = bracket_shape(&terms, k0)?;
    let outcome = newton_bisect(|k| terms.eval(k), lo, hi, k0, &SolverConfig::default())?;

    if !(outcome.root.is_finite() && outcome.root > 0.0) {
        return Err(PricingError::fit_convergence(
            outcome.iterations,
            format!("non-positive shape {}", outcome.root),
        ));
    }
    Ok((outcome.root, outcome.iterations))
}

/// Grow `[k0/2, 2 k0]` geometrically until it brackets the root of `g`.
///
/// The upper end doubles until `g` turns non-negative; it only gives up once
/// `k` or `g` stops being finite.
fn bracket_shape(terms: &ScoreTerms, k0: f64) -> PricingResult<(f64, f64)> {
    let mut lo = (0.5 * k0).max(SHAPE_MIN);
    let mut hi = (2.0 * k0).max(lo * 2.0);

    while terms.eval(lo).0 > 0.0 {
        if lo <= SHAPE_MIN {
            return Err(PricingError::fit_convergence(
                0,
                format!("shape root below {SHAPE_MIN:e}"),
            ));
        }
        lo = (lo * 0.5).max(SHAPE_MIN);
    }
    loop {
        let g_hi = terms.eval(hi).0;
        if !g_hi.is_finite() {
            return Err(PricingError::fit_convergence(
                0,
                format!("score not finite at shape {hi:e}"),
            ));
        }
        if g_hi >= 0.0 {
            break;
        }
        hi *= 2.0;
        if !hi.is_finite() {
            return Err(PricingError::fit_convergence(0, "shape root not bracketed"));
        }
    }
    Ok((lo, hi))
}

/// Starting shape from median rank regression (Bernard's approximation).
///
/// Regress `ln(-ln(1 - F_i))` on `ln x_(i)` with `F_i = (i - 0.3) / (n + 0.4)`;
/// the slope estimates `k`.
fn median_rank_shape(values: &[f64]) -> Option<f64> {
    let mut sorted = values.to_vec();
    sort_floats(&mut sorted);
    let n = sorted.len() as f64;

    let xs: Vec<f64> = sorted.iter().map(|x| x.ln()).collect();
    let ys: Vec<f64> = (1..=sorted.len())
        .map(|i| {
            let f = (i as f64 - 0.3) / (n + 0.4);
            (-(-f).ln_1p()).ln()
        })
        .collect();

    let (_, slope) = fit_line(&xs, &ys)?;
    if slope.is_finite() && slope > SHAPE_MIN {
        Some(slope)
    } else {
        None
    }
}

/// Closed-form MLE scale for a given shape.
fn scale_for_shape(values: &[f64], shape: f64) -> f64 {
    let max = values.iter().copied().fold(f64::MIN, f64::max);
    let mean_pow = values.iter().map(|&x| (x / max).powf(shape)).sum::<f64>() / values.len() as f64;
    max * mean_pow.powf(1.0 / shape)
}
