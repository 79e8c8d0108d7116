//! `wind-risk-pricer` library crate.
//!
//! The binary (`wrp`) is a thin wrapper around this library so that:
//!
//! - the fit and pricing core is testable without spawning processes
//! - the same pipeline drives the CLI report and the TUI
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod plot;
pub mod pricing;
pub mod report;
pub mod tui;
