//! Command-line parsing for the wind risk pricer.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the fitting/pricing code.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "wrp", version, about = "Parametric wind insurance pricer (Weibull exceedance)")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch observations, fit a Weibull distribution and price the cover.
    Price(PricingArgs),
    /// Fit the distribution and print parameters plus wind statistics only.
    Fit(PricingArgs),
    /// Launch the interactive TUI.
    ///
    /// This uses the same pipeline as `wrp price`, but renders results
    /// in a terminal UI using Ratatui.
    Tui(PricingArgs),
}

/// Common options for pricing, fitting and the TUI.
#[derive(Debug, Parser, Clone)]
pub struct PricingArgs {
    /// Latitude in decimal degrees.
    #[arg(long, default_value_t = 44.2971, allow_hyphen_values = true)]
    pub lat: f64,

    /// Longitude in decimal degrees.
    #[arg(long, default_value_t = 0.1178, allow_hyphen_values = true)]
    pub lon: f64,

    /// Place name to geocode (e.g. "Bordeaux, France") instead of `--lat/--lon`.
    #[arg(long, value_name = "NAME", conflicts_with_all = ["lat", "lon"])]
    pub place: Option<String>,

    /// First day of the observation window (YYYY-MM-DD).
    #[arg(long, default_value = "2022-01-01")]
    pub start: NaiveDate,

    /// Last day of the observation window (YYYY-MM-DD, inclusive).
    #[arg(long, default_value = "2025-12-31")]
    pub end: NaiveDate,

    /// Wind speed trigger in km/h.
    #[arg(short = 't', long, default_value_t = 35.0)]
    pub threshold: f64,

    /// Insured amount paid out when the trigger is hit.
    #[arg(short = 'e', long, default_value_t = 1_000_000.0)]
    pub exposure: f64,

    /// Loading factor (>= 1); the confidence level is its reciprocal.
    #[arg(short = 'l', long, default_value_t = 1.2)]
    pub loading: f64,

    /// Read observations from a `date,wind_speed_max` CSV instead of the archive.
    #[arg(long, value_name = "CSV", conflicts_with = "synthetic")]
    pub input: Option<PathBuf>,

    /// Use a seeded synthetic Weibull series instead of the archive.
    #[arg(long)]
    pub synthetic: bool,

    /// Shape of the synthetic series.
    #[arg(long, default_value_t = 2.0)]
    pub synthetic_shape: f64,

    /// Scale of the synthetic series (km/h).
    #[arg(long, default_value_t = 20.0)]
    pub synthetic_scale: f64,

    /// Random seed for the synthetic series.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Extra thresholds to price side by side (comma-separated).
    #[arg(long, value_delimiter = ',', value_name = "KMH")]
    pub ladder: Vec<f64>,

    /// Render an ASCII histogram with the fitted density (enabled by default).
    #[arg(long, default_value_t = true)]
    pub plot: bool,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Export daily observations (plus 30-day trend) to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Export the quote (request, parameters, diagnostics, breakdown) to JSON.
    #[arg(long = "export-premium")]
    pub export_premium: Option<PathBuf>,

    /// Log progress to stderr (same as `WRP_LOG=info`).
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_reference_site() {
        let cli = Cli::parse_from(["wrp", "price"]);
        let Command::Price(args) = cli.command else {
            panic!("expected price");
        };
        assert_eq!(args.lat, 44.2971);
        assert_eq!(args.lon, 0.1178);
        assert_eq!(args.start, NaiveDate::from_ymd_opt(2022, 1, 1).unwrap());
        assert_eq!(args.threshold, 35.0);
        assert_eq!(args.loading, 1.2);
        assert!(args.ladder.is_empty());
        assert_eq!(args.place, None);
    }

    #[test]
    fn ladder_and_negative_coordinates_parse() {
        let cli = Cli::parse_from([
            "wrp", "fit", "--lon", "-3.7", "--ladder", "30,40,50", "--synthetic",
        ]);
        let Command::Fit(args) = cli.command else {
            panic!("expected fit");
        };
        assert_eq!(args.lon, -3.7);
        assert_eq!(args.ladder, vec![30.0, 40.0, 50.0]);
        assert!(args.synthetic);
    }

    #[test]
    fn input_and_synthetic_are_exclusive() {
        let res = Cli::try_parse_from(["wrp", "price", "--input", "a.csv", "--synthetic"]);
        assert!(res.is_err());
    }

    #[test]
    fn place_replaces_explicit_coordinates() {
        let cli = Cli::parse_from(["wrp", "price", "--place", "Bordeaux, France"]);
        let Command::Price(args) = cli.command else {
            panic!("expected price");
        };
        assert_eq!(args.place.as_deref(), Some("Bordeaux, France"));

        assert!(Cli::try_parse_from(["wrp", "price", "--place", "Pau", "--lat", "43.3"]).is_err());
        assert!(Cli::try_parse_from(["wrp", "tui", "--place", "Pau", "--lon", "-0.37"]).is_err());
    }
}
