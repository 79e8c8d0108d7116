//! Offline end-to-end runs: synthetic and CSV sources through fit, pricing and exports.

use std::fs;

use chrono::NaiveDate;

use wind_risk_pricer::app::pipeline::{load_observations, run_pricing};
use wind_risk_pricer::data::generate_series;
use wind_risk_pricer::domain::{
    DataSource, DateRange, LoadingFactor, Location, ObservationSeries, PricingConfig, PricingRequest,
};
use wind_risk_pricer::error::PricingError;
use wind_risk_pricer::fit::fit;
use wind_risk_pricer::io::{read_observations_csv, write_observations_csv, write_premium_json};
use wind_risk_pricer::models::exceedance_probability;
use wind_risk_pricer::pricing::calculate_premium;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn request(start: NaiveDate, end: NaiveDate) -> PricingRequest {
    PricingRequest {
        location: Location::new(44.2971, 0.1178).unwrap(),
        range: DateRange::new(start, end).unwrap(),
        threshold: 35.0,
        exposure: 1_000_000.0,
        loading_factor: LoadingFactor::new(1.2).unwrap(),
    }
}

fn config(request: PricingRequest, source: DataSource) -> PricingConfig {
    PricingConfig {
        request,
        source,
        place: None,
        ladder: vec![25.0, 35.0, 45.0],
        plot: false,
        plot_width: 80,
        plot_height: 20,
        export_observations: None,
        export_premium: None,
    }
}

#[test]
fn synthetic_pipeline_prices_consistently() {
    let req = request(date(2022, 1, 1), date(2025, 12, 31));
    let cfg = config(req, DataSource::Synthetic { shape: 2.0, scale: 20.0, seed: 11 });
    let run = run_pricing(&cfg).unwrap();

    let p = run.fit.params;
    assert_eq!(p.loc(), 0.0);
    assert!((p.shape() - 2.0).abs() / 2.0 < 0.15, "shape {}", p.shape());
    assert!((p.scale() - 20.0).abs() / 20.0 < 0.15, "scale {}", p.scale());

    let b = run.breakdown;
    assert_eq!(b.pure_premium, b.exceedance_probability * b.exposure);
    assert_eq!(b.total_premium, b.pure_premium + b.safety_margin);
    assert_eq!(
        b.exceedance_probability,
        exceedance_probability(&p, run.request.threshold).unwrap()
    );

    // The ladder row at the request threshold matches the headline quote.
    assert_eq!(run.ladder.len(), 3);
    assert_eq!(run.ladder[1].1, b);
    assert!(run.ladder[0].1.total_premium >= run.ladder[2].1.total_premium);
}

#[test]
fn csv_source_is_filtered_to_the_request_window() {
    let full = DateRange::new(date(2021, 1, 1), date(2023, 12, 31)).unwrap();
    let series = generate_series(1.8, 22.0, &full, 5, 0.02).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("obs.csv");
    write_observations_csv(&csv, &series).unwrap();

    // The export round-trips through the ingest path (two-decimal rounding aside).
    let back = read_observations_csv(&csv).unwrap();
    assert_eq!(back.len(), series.len());

    let req = request(date(2022, 1, 1), date(2022, 12, 31));
    let loaded = load_observations(&req, &DataSource::Csv(csv.clone())).unwrap();
    assert_eq!(loaded.len(), 365);
    assert_eq!(loaded.first_date(), Some(date(2022, 1, 1)));
    assert_eq!(loaded.last_date(), Some(date(2022, 12, 31)));

    let run = run_pricing(&config(req, DataSource::Csv(csv))).unwrap();
    assert_eq!(run.fit.params, fit(&loaded).unwrap());

    let json = dir.path().join("quote.json");
    write_premium_json(&json, &run).unwrap();
    let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&json).unwrap()).unwrap();
    assert_eq!(value["request"]["range"]["start"], "2022-01-01");
    assert_eq!(value["diagnostics"]["n_input"], 365);
}

#[test]
fn fit_is_idempotent_on_identical_input() {
    let range = DateRange::new(date(2024, 1, 1), date(2024, 12, 31)).unwrap();
    let series = generate_series(2.4, 18.0, &range, 77, 0.05).unwrap();
    let a = fit(&series).unwrap();
    let b = fit(&series).unwrap();
    assert_eq!(a.shape().to_bits(), b.shape().to_bits());
    assert_eq!(a.scale().to_bits(), b.scale().to_bits());
}

#[test]
fn premium_reference_cases() {
    let full = calculate_premium(2.0, 20.0, 0.0, 1_000_000.0, 1.0).unwrap();
    assert!((full.exceedance_probability - 1.0).abs() < 1e-9);
    assert!((full.pure_premium - 1_000_000.0).abs() < 1e-3);
    assert_eq!(full.safety_margin, 0.0);
    assert_eq!(full.total_premium, full.pure_premium);

    let loaded = calculate_premium(2.0, 20.0, 0.0, 1_000_000.0, 1.0 / 1.2).unwrap();
    assert_eq!(loaded.total_premium, loaded.pure_premium + loaded.safety_margin);
    assert!((loaded.total_premium / loaded.pure_premium - (2.0 - 1.0 / 1.2)).abs() < 1e-12);

    for (shape, scale, exposure, confidence) in [
        (2.0, 20.0, -1.0, 1.0),
        (2.0, 20.0, 1.0, 0.0),
        (2.0, 20.0, 1.0, 1.5),
        (0.0, 20.0, 1.0, 1.0),
        (2.0, -5.0, 1.0, 1.0),
    ] {
        let err = calculate_premium(shape, scale, 35.0, exposure, confidence).unwrap_err();
        assert!(matches!(err, PricingError::InvalidArgument { .. }), "{err:?}");
    }
}

#[test]
fn empty_and_all_missing_windows_are_insufficient() {
    let all_missing = ObservationSeries::from_daily_values(date(2024, 1, 1), &[None; 31]);
    assert!(matches!(
        fit(&all_missing),
        Err(PricingError::InsufficientData { .. })
    ));

    let req = request(date(2024, 1, 1), date(2024, 1, 31));
    let mut cfg = config(req, DataSource::Synthetic { shape: 2.0, scale: 20.0, seed: 1 });
    cfg.request.range = DateRange::new(date(2024, 1, 1), date(2024, 1, 1)).unwrap();
    let err = run_pricing(&cfg).unwrap_err();
    assert_eq!(err.exit_code(), 3);
}
