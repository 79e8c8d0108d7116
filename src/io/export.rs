//! Exports: observation CSV and premium JSON.
//!
//! The CSV is meant for spreadsheets; the JSON captures everything needed to
//! audit a quote (request, fitted parameters, fit diagnostics, breakdown).

use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::app::pipeline::RunOutput;
use crate::domain::{FitDiagnostics, ObservationSeries, PremiumBreakdown, PricingRequest, WeibullParams};
use crate::error::AppError;
use crate::report::{ROLLING_WINDOW, WindStats, rolling_mean};

/// Write daily observations plus the 30-day trend to CSV.
pub fn write_observations_csv(path: &Path, series: &ObservationSeries) -> Result<(), AppError> {
    let mut file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_observations(&mut file, series)
}

fn write_observations<W: Write>(out: &mut W, series: &ObservationSeries) -> Result<(), AppError> {
    writeln!(out, "date,wind_speed_max,rolling_mean_{ROLLING_WINDOW}d")
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    let trend = rolling_mean(series, ROLLING_WINDOW);
    for (o, t) in series.iter().zip(trend) {
        writeln!(
            out,
            "{},{},{}",
            o.date,
            o.wind_speed_max.map(|v| format!("{v:.2}")).unwrap_or_default(),
            t.map(|v| format!("{v:.4}")).unwrap_or_default(),
        )
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct PremiumFile<'a> {
    tool: &'static str,
    request: &'a PricingRequest,
    confidence_level: f64,
    params: &'a WeibullParams,
    diagnostics: &'a FitDiagnostics,
    stats: Option<&'a WindStats>,
    exceedance_count: usize,
    breakdown: &'a PremiumBreakdown,
    ladder: Vec<LadderRow<'a>>,
}

#[derive(Debug, Serialize)]
struct LadderRow<'a> {
    threshold: f64,
    breakdown: &'a PremiumBreakdown,
}

/// Write the quote as pretty JSON.
pub fn write_premium_json(path: &Path, run: &RunOutput) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create premium JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, &premium_file(run))
        .map_err(|e| AppError::new(2, format!("Failed to write premium JSON: {e}")))
}

fn premium_file(run: &RunOutput) -> PremiumFile<'_> {
    PremiumFile {
        tool: "wrp",
        request: &run.request,
        confidence_level: run.request.loading_factor.confidence_level(),
        params: &run.fit.params,
        diagnostics: &run.fit.diagnostics,
        stats: run.stats.as_ref(),
        exceedance_count: run.exceedance_count,
        breakdown: &run.breakdown,
        ladder: run
            .ladder
            .iter()
            .map(|(threshold, breakdown)| LadderRow {
                threshold: *threshold,
                breakdown,
            })
            .collect(),
    }
}
