//! Shared pricing pipeline used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! observations -> clean/fit -> exceedance -> premium (+ stats for reporting)
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use std::sync::Arc;

use tracing::info;

use crate::data::{ArchiveClient, generate_series};
use crate::domain::{
    DataSource, ObservationSeries, PremiumBreakdown, PricingConfig, PricingRequest, WeibullFit,
};
use crate::error::{AppError, PricingResult};
use crate::fit::fit_with_diagnostics;
use crate::pricing::{premium_for_params, premium_ladder};
use crate::report::{WindStats, count_exceedances, wind_stats};

/// Share of synthetic days marked missing, so offline runs exercise cleaning.
const SYNTHETIC_MISSING_RATE: f64 = 0.01;

/// All computed outputs of a single pricing run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub request: PricingRequest,
    /// Shared with the session cache, so repricing does not copy the series.
    pub series: Arc<ObservationSeries>,
    pub stats: Option<WindStats>,
    pub fit: WeibullFit,
    pub breakdown: PremiumBreakdown,
    /// Observed days strictly above the threshold.
    pub exceedance_count: usize,
    pub ladder: Vec<(f64, PremiumBreakdown)>,
}

/// Fetch observations and run the full pipeline.
pub fn run_pricing(config: &PricingConfig) -> Result<RunOutput, AppError> {
    let series = load_observations(&config.request, &config.source)?;
    run_pricing_with_series(&config.request, &config.ladder, series)
}

/// Load observations for the request's location and date range.
pub fn load_observations(request: &PricingRequest, source: &DataSource) -> Result<ObservationSeries, AppError> {
    match source {
        DataSource::Archive => {
            let client = ArchiveClient::from_env()?;
            client.fetch_daily_wind(&request.location, &request.range)
        }
        DataSource::Csv(path) => {
            let all = crate::io::read_observations_csv(path)?;
            let observations = all
                .observations
                .into_iter()
                .filter(|o| o.date >= request.range.start && o.date <= request.range.end)
                .collect();
            Ok(ObservationSeries::new(observations))
        }
        DataSource::Synthetic { shape, scale, seed } => Ok(generate_series(
            *shape,
            *scale,
            &request.range,
            *seed,
            SYNTHETIC_MISSING_RATE,
        )?),
    }
}

/// Run the pipeline on already-loaded observations.
pub fn run_pricing_with_series(
    request: &PricingRequest,
    ladder_thresholds: &[f64],
    series: ObservationSeries,
) -> Result<RunOutput, AppError> {
    let fit = fit_series(&series)?;
    run_pricing_with_fit(request, ladder_thresholds, Arc::new(series), fit)
}

/// Fit the Weibull to a loaded series.
pub fn fit_series(series: &ObservationSeries) -> PricingResult<WeibullFit> {
    let fit = fit_with_diagnostics(series)?;
    info!(
        shape = fit.params.shape(),
        scale = fit.params.scale(),
        used = fit.diagnostics.n_used,
        "fitted weibull"
    );
    Ok(fit)
}

/// Price against a fit that was already computed for `series`.
///
/// Threshold, exposure and loading do not enter the fit, so the TUI
/// reprices through here without refitting.
pub fn run_pricing_with_fit(
    request: &PricingRequest,
    ladder_thresholds: &[f64],
    series: Arc<ObservationSeries>,
    fit: WeibullFit,
) -> Result<RunOutput, AppError> {
    let confidence = request.loading_factor.confidence_level();
    let breakdown = premium_for_params(&fit.params, request.threshold, request.exposure, confidence)?;
    let ladder = premium_ladder(&fit.params, ladder_thresholds, request.exposure, confidence)?;
    info!(total = breakdown.total_premium, "priced request");

    Ok(RunOutput {
        request: request.clone(),
        stats: wind_stats(&series),
        exceedance_count: count_exceedances(&series, request.threshold),
        series,
        fit,
        breakdown,
        ladder,
    })
}
