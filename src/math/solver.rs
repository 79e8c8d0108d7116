//! Safeguarded Newton root finder for monotone increasing functions.
//!
//! Each step tries Newton; if the step leaves the current bracket (or the
//! derivative is unusable) it bisects instead. The bracket shrinks every
//! iteration, so the method cannot diverge.

use crate::error::{PricingError, PricingResult};

/// Solver tolerances.
#[derive(Debug, Clone, Copy)]
pub struct SolverConfig {
    /// Absolute tolerance on `x` and on `|f(x)|`.
    pub tolerance: f64,
    pub max_iterations: u32,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-12,
            max_iterations: 200,
        }
    }
}

/// A converged root.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverOutcome {
    pub root: f64,
    pub iterations: u32,
    pub residual: f64,
}

/// Find `x` in `[lo, hi]` with `f(x) = 0`, for `f` increasing with `f(lo) <= 0 <= f(hi)`.
///
/// `f` returns `(value, derivative)`.
pub fn newton_bisect<F>(f: F, lo: f64, hi: f64, x0: f64, config: &SolverConfig) -> PricingResult<SolverOutcome>
where
    F: Fn(f64) -> (f64, f64),
{
    let (f_lo, _) = f(lo);
    let (f_hi, _) = f(hi);
    if !(f_lo.is_finite() && f_hi.is_finite()) || f_lo > 0.0 || f_hi < 0.0 {
        return Err(PricingError::fit_convergence(
            0,
            format!("root not bracketed: f({lo:.3e})={f_lo:.3e}, f({hi:.3e})={f_hi:.3e}"),
        ));
    }

    let mut lo = lo;
    let mut hi = hi;
    let mut x = if x0 > lo && x0 < hi { x0 } else { 0.5 * (lo + hi) };

    for iteration in 1..=config.max_iterations {
        let (fx, dfx) = f(x);
        if !fx.is_finite() {
            return Err(PricingError::fit_convergence(
                iteration,
                format!("non-finite objective at x={x:.6e}"),
            ));
        }
        if fx.abs() <= config.tolerance {
            return Ok(SolverOutcome {
                root: x,
                iterations: iteration,
                residual: fx,
            });
        }

        if fx < 0.0 {
            lo = x;
        } else {
            hi = x;
        }

        let newton = if dfx.is_finite() && dfx > 0.0 { x - fx / dfx } else { f64::NAN };
        let next = if newton.is_finite() && newton > lo && newton < hi {
            newton
        } else {
            0.5 * (lo + hi)
        };

        if (next - x).abs() <= config.tolerance * x.abs().max(1.0) || (hi - lo) <= config.tolerance {
            let (f_next, _) = f(next);
            return Ok(SolverOutcome {
                root: next,
                iterations: iteration,
                residual: f_next,
            });
        }
        x = next;
    }

    let (fx, _) = f(x);
    Err(PricingError::fit_convergence(
        config.max_iterations,
        format!("residual {fx:.3e} above tolerance"),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_cube_root() {
        let f = |x: f64| (x * x * x - 2.0, 3.0 * x * x);
        let out = newton_bisect(f, 0.0, 2.0, 1.0, &SolverConfig::default()).unwrap();
        assert!((out.root - 2f64.cbrt()).abs() < 1e-10);
    }

    #[test]
    fn falls_back_to_bisection_with_bad_derivative() {
        // Derivative deliberately reported as zero.
        let f = |x: f64| (x - 0.3, 0.0);
        let out = newton_bisect(f, 0.0, 1.0, 0.9, &SolverConfig::default()).unwrap();
        assert!((out.root - 0.3).abs() < 1e-9);
    }

    #[test]
    fn rejects_unbracketed_root() {
        let f = |x: f64| (x + 1.0, 1.0);
        let err = newton_bisect(f, 0.0, 1.0, 0.5, &SolverConfig::default()).unwrap_err();
        assert!(matches!(err, PricingError::FitConvergence { .. }));
    }
}
