//! Mathematical utilities: descriptive statistics, least squares, root finding.

pub mod ols;
pub mod solver;
pub mod stats;

pub use ols::*;
pub use solver::*;
pub use stats::*;
