//! Reporting utilities: descriptive statistics, chart data, terminal formatting.

pub mod charts;
pub mod format;
pub mod stats;

pub use charts::*;
pub use format::*;
pub use stats::*;
