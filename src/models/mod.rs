//! Weibull model evaluation.
//!
//! Kept as small, pure functions so fitting, pricing and charting code can share them.

pub mod weibull;

pub use weibull::*;
