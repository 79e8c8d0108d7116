//! Open-Meteo historical archive integration (daily maximum wind speed).

use std::time::Duration;

use chrono::NaiveDate;
use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::{debug, info};

use crate::domain::{DateRange, Location, ObservationSeries, WindObservation};
use crate::error::AppError;

const DEFAULT_BASE_URL: &str = "https://archive-api.open-meteo.com/v1/archive";
const DAILY_VARIABLE: &str = "wind_speed_10m_max";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct ArchiveClient {
    client: Client,
    base_url: String,
}

impl ArchiveClient {
    /// Build a client; `WRP_ARCHIVE_URL` (env or `.env`) overrides the endpoint.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        let base_url = std::env::var("WRP_ARCHIVE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self::with_base_url(base_url)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AppError::new(4, format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Fetch one observation per calendar day in `range`.
    pub fn fetch_daily_wind(&self, location: &Location, range: &DateRange) -> Result<ObservationSeries, AppError> {
        info!(
            lat = location.latitude,
            lon = location.longitude,
            start = %range.start,
            end = %range.end,
            "fetching wind archive"
        );

        let resp = self
            .client
            .get(&self.base_url)
            .query(&[
                ("latitude", location.latitude.to_string()),
                ("longitude", location.longitude.to_string()),
                ("start_date", range.start.to_string()),
                ("end_date", range.end.to_string()),
                ("daily", DAILY_VARIABLE.to_string()),
                ("timezone", "auto".to_string()),
            ])
            .send()
            .map_err(|e| AppError::new(4, format!("Archive request failed: {e}")))?;

        let status = resp.status();
        let body = resp
            .text()
            .map_err(|e| AppError::new(4, format!("Failed to read archive response: {e}")))?;

        if !status.is_success() {
            let reason = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.reason)
                .unwrap_or_else(|_| body.chars().take(200).collect());
            return Err(AppError::new(
                4,
                format!("Archive request failed with status {status}: {reason}"),
            ));
        }

        let series = parse_archive_body(&body)?;
        debug!(days = series.len(), "archive response parsed");
        Ok(series)
    }
}

#[derive(Debug, Deserialize)]
struct ArchiveResponse {
    daily: DailyBlock,
}

#[derive(Debug, Deserialize)]
struct DailyBlock {
    time: Vec<String>,
    wind_speed_10m_max: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    reason: String,
}

/// Parse an archive JSON body into a series. `null` values become missing.
pub fn parse_archive_body(body: &str) -> Result<ObservationSeries, AppError> {
    let parsed: ArchiveResponse = serde_json::from_str(body)
        .map_err(|e| AppError::new(4, format!("Failed to parse archive response: {e}")))?;
    let daily = parsed.daily;

    if daily.time.len() != daily.wind_speed_10m_max.len() {
        return Err(AppError::new(
            4,
            format!(
                "Archive response has {} dates but {} wind values.",
                daily.time.len(),
                daily.wind_speed_10m_max.len()
            ),
        ));
    }

    let mut observations = Vec::with_capacity(daily.time.len());
    for (raw_date, value) in daily.time.iter().zip(daily.wind_speed_10m_max) {
        let date = NaiveDate::parse_from_str(raw_date, "%Y-%m-%d")
            .map_err(|e| AppError::new(4, format!("Invalid archive date '{raw_date}': {e}")))?;
        observations.push(WindObservation {
            date,
            wind_speed_max: value,
        });
    }

    Ok(ObservationSeries::new(observations))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_daily_block_with_nulls() {
        let body = r#"{
            "latitude": 44.3,
            "longitude": 0.12,
            "daily_units": {"time": "iso8601", "wind_speed_10m_max": "km/h"},
            "daily": {
                "time": ["2022-01-01", "2022-01-02", "2022-01-03"],
                "wind_speed_10m_max": [18.4, null, 31.0]
            }
        }"#;
        let series = parse_archive_body(body).unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.observations[1].wind_speed_max, None);
        assert_eq!(series.cleaned_values(), vec![18.4, 31.0]);
        assert_eq!(series.first_date(), NaiveDate::from_ymd_opt(2022, 1, 1));
    }

    #[test]
    fn rejects_mismatched_arrays_and_bad_dates() {
        let mismatched = r#"{"daily": {"time": ["2022-01-01"], "wind_speed_10m_max": [1.0, 2.0]}}"#;
        assert_eq!(parse_archive_body(mismatched).unwrap_err().exit_code(), 4);

        let bad_date = r#"{"daily": {"time": ["01/01/2022"], "wind_speed_10m_max": [1.0]}}"#;
        assert!(parse_archive_body(bad_date).is_err());

        assert!(parse_archive_body("not json").is_err());
    }
}
