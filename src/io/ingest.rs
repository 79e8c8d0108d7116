//! CSV ingest of daily wind observations.
//!
//! Expected schema (header required, extra columns ignored):
//!
//! ```text
//! date,wind_speed_max
//! 2022-01-01,18.4
//! 2022-01-02,
//! ```
//!
//! Empty cells and `NaN` / `null` / `NA` mark missing days. Anything else that
//! does not parse as a number or ISO date is a hard error (exit code 2) with
//! the offending line number.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use tracing::debug;

use crate::domain::{ObservationSeries, WindObservation};
use crate::error::AppError;

const DATE_COLUMN: &str = "date";
const VALUE_COLUMN: &str = "wind_speed_max";

/// Read observations from a CSV file.
pub fn read_observations_csv(path: &Path) -> Result<ObservationSeries, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;
    let series = parse_observations_csv(file)?;
    debug!(path = %path.display(), days = series.len(), "observations loaded");
    Ok(series)
}

/// Parse observations from any CSV reader.
pub fn parse_observations_csv<R: Read>(reader: R) -> Result<ObservationSeries, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();

    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
            .ok_or_else(|| AppError::new(2, format!("CSV is missing required column '{name}'.")))
    };
    let date_idx = column(DATE_COLUMN)?;
    let value_idx = column(VALUE_COLUMN)?;

    let mut observations = Vec::new();
    for (i, record) in reader.records().enumerate() {
        // Header is line 1.
        let line = i + 2;
        let record = record.map_err(|e| AppError::new(2, format!("CSV line {line}: {e}")))?;

        let raw_date = record.get(date_idx).unwrap_or("");
        let date = NaiveDate::parse_from_str(raw_date, "%Y-%m-%d")
            .map_err(|e| AppError::new(2, format!("CSV line {line}: invalid date '{raw_date}': {e}")))?;
        let wind_speed_max = parse_value(record.get(value_idx).unwrap_or(""))
            .map_err(|raw| AppError::new(2, format!("CSV line {line}: invalid wind speed '{raw}'")))?;

        observations.push(WindObservation {
            date,
            wind_speed_max,
        });
    }

    observations.sort_by_key(|o| o.date);
    Ok(ObservationSeries::new(observations))
}

fn parse_value(raw: &str) -> Result<Option<f64>, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty()
        || trimmed.eq_ignore_ascii_case("nan")
        || trimmed.eq_ignore_ascii_case("null")
        || trimmed.eq_ignore_ascii_case("na")
    {
        return Ok(None);
    }
    trimmed.parse::<f64>().map(Some).map_err(|_| trimmed.to_string())
}
