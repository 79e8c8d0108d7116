//! Input/output helpers.
//!
//! - CSV ingest of daily observations (`ingest`)
//! - observation CSV and premium JSON exports (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;
