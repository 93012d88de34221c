//! HTTP clients for the `OpenMeteo` marine, forecast and geocoding APIs
//!
//! No API key is needed. Each fetch is exactly one GET bounded by the client
//! timeout; failures are surfaced immediately.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument, warn};

use super::payload::{GeocodingResponse, RawMarinePayload, RawWindPayload};
use super::{ForecastSource, GeocodingCandidate, Geocoder};
use crate::error::{SurfError, Upstream, UpstreamError, UpstreamFailure};
use crate::models::Coordinates;

pub const MARINE_URL: &str = "https://marine-api.open-meteo.com/v1/marine";
pub const FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";
pub const GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";

const MARINE_HOURLY: &str = "wave_height,wave_direction,wave_period,wind_wave_height,swell_wave_height,swell_wave_direction,swell_wave_period";
const MARINE_DAILY: &str = "wave_height_max,wave_direction_dominant,wave_period_max";
const MARINE_CURRENT: &str = "wave_height,wave_direction,wave_period";
const WIND_FIELDS: &str = "wind_speed_10m,wind_direction_10m";

const SLOW_RESPONSE: Duration = Duration::from_secs(5);

/// Build the shared HTTP client used by all upstream calls
pub fn http_client(timeout: Duration) -> Result<Client, SurfError> {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!("SurfReport/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| SurfError::config(format!("Failed to create HTTP client: {e}")))
}

/// Marine forecast client (waves and swell)
#[derive(Debug, Clone)]
pub struct MarineClient {
    client: Client,
    base_url: String,
}

impl MarineClient {
    #[must_use]
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Query parameters sent for one fetch
    #[must_use]
    pub fn query(coordinates: Coordinates) -> Vec<(&'static str, String)> {
        vec![
            ("latitude", coordinates.latitude().to_string()),
            ("longitude", coordinates.longitude().to_string()),
            ("hourly", MARINE_HOURLY.to_string()),
            ("daily", MARINE_DAILY.to_string()),
            ("current", MARINE_CURRENT.to_string()),
            ("timezone", "auto".to_string()),
        ]
    }
}

#[async_trait]
impl ForecastSource for MarineClient {
    type Payload = RawMarinePayload;

    fn upstream(&self) -> Upstream {
        Upstream::Marine
    }

    #[instrument(name = "fetch_marine", skip(self), fields(lat = coordinates.latitude(), lon = coordinates.longitude()))]
    async fn fetch(&self, coordinates: Coordinates) -> Result<RawMarinePayload, UpstreamError> {
        get_json(
            &self.client,
            &self.base_url,
            &Self::query(coordinates),
            self.upstream(),
        )
        .await
    }
}

/// Wind forecast client (10 m wind speed and direction)
#[derive(Debug, Clone)]
pub struct WindClient {
    client: Client,
    base_url: String,
}

impl WindClient {
    #[must_use]
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    #[must_use]
    pub fn query(coordinates: Coordinates) -> Vec<(&'static str, String)> {
        vec![
            ("latitude", coordinates.latitude().to_string()),
            ("longitude", coordinates.longitude().to_string()),
            ("hourly", WIND_FIELDS.to_string()),
            ("current", WIND_FIELDS.to_string()),
            ("timezone", "auto".to_string()),
        ]
    }
}

#[async_trait]
impl ForecastSource for WindClient {
    type Payload = RawWindPayload;

    fn upstream(&self) -> Upstream {
        Upstream::Wind
    }

    #[instrument(name = "fetch_wind", skip(self), fields(lat = coordinates.latitude(), lon = coordinates.longitude()))]
    async fn fetch(&self, coordinates: Coordinates) -> Result<RawWindPayload, UpstreamError> {
        get_json(
            &self.client,
            &self.base_url,
            &Self::query(coordinates),
            self.upstream(),
        )
        .await
    }
}

/// Geocoding client for free-text place names
#[derive(Debug, Clone)]
pub struct GeocodingClient {
    client: Client,
    base_url: String,
}

impl GeocodingClient {
    #[must_use]
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl Geocoder for GeocodingClient {
    #[instrument(name = "geocode", skip(self))]
    async fn search(&self, query: &str, count: u8) -> Result<Vec<GeocodingCandidate>, UpstreamError> {
        let params = [
            ("name", query.to_string()),
            ("count", count.to_string()),
            ("language", "en".to_string()),
            ("format", "json".to_string()),
        ];
        let response: GeocodingResponse =
            get_json(&self.client, &self.base_url, &params, Upstream::Geocoding).await?;

        let candidates: Vec<GeocodingCandidate> = response
            .results
            .unwrap_or_default()
            .into_iter()
            .map(GeocodingCandidate::from)
            .collect();

        if candidates.is_empty() {
            warn!("No results found for location '{}'", query);
        } else {
            debug!(
                "Geocoding results: {:?}",
                candidates
                    .iter()
                    .map(|c| format!("{} ({:.4}, {:.4})", c.name, c.latitude, c.longitude))
                    .collect::<Vec<_>>()
            );
        }
        Ok(candidates)
    }
}

/// Issue one GET and decode the JSON body
///
/// The body is read as text first so a snippet can be attached to decode and
/// status failures.
async fn get_json<T: DeserializeOwned>(
    client: &Client,
    url: &str,
    query: &[(&'static str, String)],
    service: Upstream,
) -> Result<T, UpstreamError> {
    let start_time = Instant::now();

    let response = client
        .get(url)
        .query(query)
        .send()
        .await
        .map_err(|e| {
            warn!("{} request failed after {:.3}s: {}", service, start_time.elapsed().as_secs_f64(), e);
            UpstreamError::from_transport(service, &e)
        })?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| UpstreamError::from_transport(service, &e))?;

    if !status.is_success() {
        warn!("{} API returned HTTP {}", service, status);
        return Err(UpstreamError::new(service, UpstreamFailure::Status(status.as_u16())).with_body(&body));
    }

    let payload = serde_json::from_str(&body).map_err(|e| {
        warn!("Failed to parse {} response: {}", service, e);
        UpstreamError::new(service, UpstreamFailure::Decode(e.to_string())).with_body(&body)
    })?;

    let total_duration = start_time.elapsed();
    info!(
        "Retrieved {} data in {:.3}s",
        service,
        total_duration.as_secs_f64()
    );
    if total_duration > SLOW_RESPONSE {
        warn!(
            "Slow {} API response detected: {:.3}s",
            service,
            total_duration.as_secs_f64()
        );
    }

    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn param<'a>(query: &'a [(&'static str, String)], key: &str) -> Option<&'a str> {
        query
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_marine_query() {
        let coordinates = Coordinates::new(-38.3667, 144.2833).unwrap();
        let query = MarineClient::query(coordinates);

        assert_eq!(param(&query, "latitude"), Some("-38.3667"));
        assert_eq!(param(&query, "longitude"), Some("144.2833"));
        assert_eq!(param(&query, "timezone"), Some("auto"));
        assert!(param(&query, "hourly").unwrap().contains("swell_wave_height"));
        assert!(param(&query, "current").unwrap().contains("wave_period"));
        assert_eq!(param(&query, "daily"), Some(MARINE_DAILY));
    }

    #[test]
    fn test_wind_query() {
        let coordinates = Coordinates::new(21.6641, -158.0533).unwrap();
        let query = WindClient::query(coordinates);

        assert_eq!(param(&query, "hourly"), Some("wind_speed_10m,wind_direction_10m"));
        assert_eq!(param(&query, "current"), Some("wind_speed_10m,wind_direction_10m"));
        assert_eq!(param(&query, "timezone"), Some("auto"));
        assert_eq!(param(&query, "daily"), None);
    }

    #[tokio::test]
    async fn test_unreachable_host_is_network_failure() {
        let client = http_client(Duration::from_secs(2)).unwrap();
        let marine = MarineClient::new(client, "http://127.0.0.1:9/v1/marine");
        let coordinates = Coordinates::new(0.0, 0.0).unwrap();

        let err = marine.fetch(coordinates).await.unwrap_err();
        assert_eq!(err.service, Upstream::Marine);
        assert!(matches!(
            err.failure,
            UpstreamFailure::Network(_) | UpstreamFailure::Timeout
        ));
        assert!(err.body_snippet.is_none());
    }
}
