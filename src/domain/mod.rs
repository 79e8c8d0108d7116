//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - request inputs (`Location`, `DateRange`, `LoadingFactor`, `PricingRequest`)
//! - daily wind observations (`WindObservation`, `ObservationSeries`)
//! - fit and pricing outputs (`WeibullParams`, `WeibullFit`, `PremiumBreakdown`)

pub mod types;

pub use types::*;
