//! Distribution fitting.
//!
//! Responsibilities:
//!
//! - clean raw observations (missing / non-finite / negative)
//! - guard against samples too small for a likelihood fit
//! - solve the loc = 0 Weibull likelihood for shape and scale

pub mod weibull;

pub use weibull::*;
