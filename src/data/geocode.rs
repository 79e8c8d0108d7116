//! Place-name lookup through a Nominatim search endpoint.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::{debug, info};

use crate::domain::Location;
use crate::error::AppError;

const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org/search";
const USER_AGENT: &str = "wind_risk_pricer";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// A resolved place: the matched address and its coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodedPlace {
    pub address: String,
    pub location: Location,
}

pub struct GeocodeClient {
    client: Client,
    base_url: String,
}

impl GeocodeClient {
    /// Build a client; `WRP_GEOCODE_URL` (env or `.env`) overrides the endpoint.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        let base_url = std::env::var("WRP_GEOCODE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self::with_base_url(base_url)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, AppError> {
        // Nominatim rejects requests without an identifying user agent.
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| AppError::new(4, format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Resolve `name` to the best match. An unknown place is a usage error (exit code 2).
    pub fn lookup(&self, name: &str) -> Result<GeocodedPlace, AppError> {
        let query = name.trim();
        if query.is_empty() {
            return Err(AppError::new(2, "Place name is empty."));
        }
        info!(place = query, "geocoding");

        let resp = self
            .client
            .get(&self.base_url)
            .query(&[("q", query), ("format", "jsonv2"), ("limit", "1")])
            .send()
            .map_err(|e| AppError::new(4, format!("Geocoding request failed: {e}")))?;

        let status = resp.status();
        let body = resp
            .text()
            .map_err(|e| AppError::new(4, format!("Failed to read geocoding response: {e}")))?;
        if !status.is_success() {
            let snippet: String = body.chars().take(200).collect();
            return Err(AppError::new(
                4,
                format!("Geocoding request failed with status {status}: {snippet}"),
            ));
        }

        let place = parse_geocode_body(&body)?
            .ok_or_else(|| AppError::new(2, format!("Place '{query}' not found.")))?;
        debug!(address = %place.address, lat = place.location.latitude, lon = place.location.longitude, "place resolved");
        Ok(place)
    }
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    lat: String,
    lon: String,
    display_name: String,
}

/// Parse a search body (a JSON array of hits) and keep the first hit.
///
/// `Ok(None)` means the search matched nothing.
pub fn parse_geocode_body(body: &str) -> Result<Option<GeocodedPlace>, AppError> {
    let hits: Vec<SearchHit> = serde_json::from_str(body)
        .map_err(|e| AppError::new(4, format!("Failed to parse geocoding response: {e}")))?;
    let Some(hit) = hits.into_iter().next() else {
        return Ok(None);
    };

    let coordinate = |raw: &str| {
        raw.trim()
            .parse::<f64>()
            .map_err(|e| AppError::new(4, format!("Invalid coordinate '{raw}' in geocoding response: {e}")))
    };
    let location = Location::new(coordinate(&hit.lat)?, coordinate(&hit.lon)?)?;

    Ok(Some(GeocodedPlace {
        address: hit.display_name,
        location,
    }))
}
