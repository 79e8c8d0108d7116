//! Ordinary least squares via SVD.
//!
//! The Weibull fitter needs one small regression: the median-rank line
//!
//! ```text
//! ln(-ln(1 - F_i)) = k ln(x_i) - k ln(λ)
//! ```
//!
//! whose slope gives the starting shape for the likelihood solver.
//! Two columns and a few thousand rows; SVD keeps this robust when the
//! sample is nearly constant (tall, almost rank-deficient design).

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    for &tol in &[1e-12, 1e-10, 1e-8] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Fit `y = a + b x` and return `(a, b)`.
pub fn fit_line(xs: &[f64], ys: &[f64]) -> Option<(f64, f64)> {
    if xs.len() != ys.len() || xs.len() < 2 {
        return None;
    }
    let n = xs.len();
    let mut design = DMatrix::<f64>::zeros(n, 2);
    for (i, &x) in xs.iter().enumerate() {
        design[(i, 0)] = 1.0;
        design[(i, 1)] = x;
    }
    let rhs = DVector::from_row_slice(ys);
    let beta = solve_least_squares(&design, &rhs)?;
    Some((beta[0], beta[1]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn least_squares_solves_simple_system() {
        // Fit y = 2 + 3x on x = [0,1,2]
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[2.0, 5.0, 8.0]);

        let beta = solve_least_squares(&x, &y).unwrap();
        assert!((beta[0] - 2.0).abs() < 1e-10);
        assert!((beta[1] - 3.0).abs() < 1e-10);
    }

    #[test]
    fn fit_line_recovers_slope() {
        let xs = [1.0, 2.0, 3.0, 4.0];
        let ys: Vec<f64> = xs.iter().map(|x| -1.5 + 0.5 * x).collect();
        let (a, b) = fit_line(&xs, &ys).unwrap();
        assert!((a + 1.5).abs() < 1e-10);
        assert!((b - 0.5).abs() < 1e-10);
        assert!(fit_line(&[1.0], &[2.0]).is_none());
    }
}
