//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and loads `.env`
//! - sets up logging
//! - resolves the observation source
//! - runs the fit + pricing pipeline
//! - prints reports/plots
//! - writes optional exports

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::{Command, PricingArgs};
use crate::data::{GeocodeClient, GeocodedPlace};
use crate::domain::{DataSource, DateRange, LoadingFactor, Location, PricingConfig, PricingRequest};
use crate::error::AppError;

pub mod pipeline;
pub mod session;

/// Entry point for the `wrp` binary.
pub fn run() -> Result<(), AppError> {
    // We want `wrp` and `wrp -t 40` to behave like `wrp tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    let _ = dotenvy::dotenv();

    match cli.command {
        Command::Price(args) => {
            init_tracing(if args.verbose { "info" } else { "warn" });
            handle_price(&args)
        }
        Command::Fit(args) => {
            init_tracing(if args.verbose { "info" } else { "warn" });
            handle_fit(&args)
        }
        Command::Tui(args) => {
            // Log lines would tear the alternate screen.
            init_tracing("off");
            handle_tui(&args)
        }
    }
}

/// Install the stderr subscriber. `WRP_LOG` wins over `RUST_LOG`; both win
/// over `default_directive`.
fn init_tracing(default_directive: &str) {
    let filter = std::env::var("WRP_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .ok()
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(default_directive));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn handle_price(args: &PricingArgs) -> Result<(), AppError> {
    let config = pricing_config_from_args(args)?;
    let run = pipeline::run_pricing(&config)?;

    if let Some(place) = &config.place {
        println!("Place: {place}");
    }
    println!("{}", crate::report::format_run_summary(&run));

    if !run.ladder.is_empty() {
        println!("Threshold ladder:");
        println!("{}", crate::report::format_ladder(&run.ladder));
    }

    if config.plot {
        let model = crate::models::WeibullModel::new(run.fit.params)?;
        let plot = crate::plot::render_fit_plot(
            &run.series.cleaned_values(),
            &model,
            run.request.threshold,
            config.plot_width,
            config.plot_height,
        );
        println!("{plot}");
    }

    // Optional exports.
    if let Some(path) = &config.export_observations {
        crate::io::write_observations_csv(path, &run.series)?;
        info!(path = %path.display(), "wrote observations");
    }
    if let Some(path) = &config.export_premium {
        crate::io::write_premium_json(path, &run)?;
        info!(path = %path.display(), "wrote premium");
    }

    Ok(())
}

fn handle_fit(args: &PricingArgs) -> Result<(), AppError> {
    let config = pricing_config_from_args(args)?;
    let series = pipeline::load_observations(&config.request, &config.source)?;
    let fit = crate::fit::fit_with_diagnostics(&series)?;

    let mut out = String::new();
    if let Some(place) = &config.place {
        out.push_str(&format!("Place: {place}\n"));
    }
    out.push_str(&crate::report::format_request(&config.request));
    if let Some(stats) = crate::report::wind_stats(&series) {
        out.push_str("\nObservations:\n");
        out.push_str(&crate::report::format_stats(&stats));
    }
    out.push_str("\nWeibull fit (loc fixed at 0):\n");
    out.push_str(&crate::report::format_params(&fit.params));
    out.push_str(&crate::report::format_diagnostics(&fit.diagnostics));
    println!("{out}");

    if let Some(path) = &config.export_observations {
        crate::io::write_observations_csv(path, &series)?;
    }
    Ok(())
}

fn handle_tui(args: &PricingArgs) -> Result<(), AppError> {
    let config = pricing_config_from_args(args)?;
    crate::tui::run(config)
}

/// Validate CLI flags into a pipeline configuration.
///
/// `--place` is resolved through the geocoding endpoint.
pub fn pricing_config_from_args(args: &PricingArgs) -> Result<PricingConfig, AppError> {
    pricing_config_with_geocoder(args, |name| GeocodeClient::from_env()?.lookup(name))
}

/// Like [`pricing_config_from_args`], with the place lookup supplied by the caller.
pub fn pricing_config_with_geocoder<G>(args: &PricingArgs, geocode: G) -> Result<PricingConfig, AppError>
where
    G: FnOnce(&str) -> Result<GeocodedPlace, AppError>,
{
    if !args.threshold.is_finite() {
        return Err(AppError::new(2, format!("Invalid threshold {}.", args.threshold)));
    }
    if !(args.exposure.is_finite() && args.exposure >= 0.0) {
        return Err(AppError::new(
            2,
            format!("Invalid exposure {} (must be finite and >= 0).", args.exposure),
        ));
    }
    if let Some(bad) = args.ladder.iter().find(|t| !t.is_finite()) {
        return Err(AppError::new(2, format!("Invalid ladder threshold {bad}.")));
    }

    let (location, place) = match &args.place {
        Some(name) => {
            let found = geocode(name)?;
            info!(place = %found.address, "using geocoded location");
            (found.location, Some(found.address))
        }
        None => (Location::new(args.lat, args.lon)?, None),
    };

    let request = PricingRequest {
        location,
        range: DateRange::new(args.start, args.end)?,
        threshold: args.threshold,
        exposure: args.exposure,
        loading_factor: LoadingFactor::new(args.loading)?,
    };

    let source = match (&args.input, args.synthetic) {
        (Some(path), _) => DataSource::Csv(path.clone()),
        (None, true) => DataSource::Synthetic {
            shape: args.synthetic_shape,
            scale: args.synthetic_scale,
            seed: args.seed,
        },
        (None, false) => DataSource::Archive,
    };

    Ok(PricingConfig {
        request,
        source,
        place,
        ladder: args.ladder.clone(),
        plot: args.plot && !args.no_plot,
        plot_width: args.width,
        plot_height: args.height,
        export_observations: args.export.clone(),
        export_premium: args.export_premium.clone(),
    })
}

/// Rewrite argv so `wrp` defaults to `wrp tui`.
///
/// Rules:
/// - `wrp`                      -> `wrp tui`
/// - `wrp -t 40 ...`            -> `wrp tui -t 40 ...`
/// - `wrp --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "price" | "fit" | "tui");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn args(extra: &[&str]) -> PricingArgs {
        let mut full = vec!["wrp", "price"];
        full.extend_from_slice(extra);
        match crate::cli::Cli::parse_from(full).command {
            Command::Price(args) => args,
            _ => unreachable!(),
        }
    }

    #[test]
    fn bare_invocation_and_flags_default_to_tui() {
        assert_eq!(rewrite_args(argv(&["wrp"])), argv(&["wrp", "tui"]));
        assert_eq!(
            rewrite_args(argv(&["wrp", "-t", "40"])),
            argv(&["wrp", "tui", "-t", "40"])
        );
        assert_eq!(rewrite_args(argv(&["wrp", "price"])), argv(&["wrp", "price"]));
        assert_eq!(rewrite_args(argv(&["wrp", "--help"])), argv(&["wrp", "--help"]));
    }

    #[test]
    fn config_resolves_the_source() {
        let c = pricing_config_from_args(&args(&[])).unwrap();
        assert_eq!(c.source, DataSource::Archive);
        assert!(c.plot);

        let c = pricing_config_from_args(&args(&["--synthetic", "--seed", "3", "--no-plot"])).unwrap();
        assert_eq!(c.source, DataSource::Synthetic { shape: 2.0, scale: 20.0, seed: 3 });
        assert!(!c.plot);

        let c = pricing_config_from_args(&args(&["--input", "obs.csv"])).unwrap();
        assert_eq!(c.source, DataSource::Csv("obs.csv".into()));
    }

    #[test]
    fn invalid_flags_map_to_exit_code_two() {
        for bad in [
            &["--loading", "0.8"][..],
            &["--exposure=-1"][..],
            &["--lat", "95"][..],
            &["--start", "2024-01-02", "--end", "2024-01-01"][..],
        ] {
            let err = pricing_config_from_args(&args(bad)).unwrap_err();
            assert_eq!(err.exit_code(), 2, "{bad:?}");
        }
    }

    #[test]
    fn place_is_geocoded_into_the_request() {
        let bordeaux = GeocodedPlace {
            address: "Bordeaux, Gironde, France".to_string(),
            location: Location::new(44.8378, -0.5792).unwrap(),
        };
        let c = pricing_config_with_geocoder(&args(&["--place", "Bordeaux"]), |name| {
            assert_eq!(name, "Bordeaux");
            Ok(bordeaux.clone())
        })
        .unwrap();
        assert_eq!(c.request.location, bordeaux.location);
        assert_eq!(c.place.as_deref(), Some("Bordeaux, Gironde, France"));

        // Without --place the lookup is never consulted.
        let c = pricing_config_with_geocoder(&args(&[]), |_| unreachable!()).unwrap();
        assert_eq!(c.request.location, Location::new(44.2971, 0.1178).unwrap());
        assert_eq!(c.place, None);

        let err = pricing_config_with_geocoder(&args(&["--place", "Nowhere"]), |name| {
            Err(AppError::new(2, format!("Place '{name}' not found.")))
        })
        .unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
