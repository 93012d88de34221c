//! Upstream weather and geocoding sources

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{Upstream, UpstreamError};
use crate::models::Coordinates;

pub mod open_meteo;
pub mod payload;

pub use open_meteo::{GeocodingClient, MarineClient, WindClient, http_client};
pub use payload::{RawMarinePayload, RawWindPayload};

/// One upstream forecast service
///
/// Implementations issue a single request per call and never retry.
#[async_trait]
pub trait ForecastSource: Send + Sync {
    type Payload: Send + 'static;

    /// Which fixed role this source plays in the merge
    fn upstream(&self) -> Upstream;

    async fn fetch(&self, coordinates: Coordinates) -> Result<Self::Payload, UpstreamError>;
}

pub type MarineSource = Arc<dyn ForecastSource<Payload = RawMarinePayload>>;
pub type WindSource = Arc<dyn ForecastSource<Payload = RawWindPayload>>;

/// Free-text place lookup
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn search(&self, query: &str, count: u8) -> Result<Vec<GeocodingCandidate>, UpstreamError>;
}

/// One geocoding match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodingCandidate {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub country: Option<String>,
    pub admin1: Option<String>,
}

impl GeocodingCandidate {
    /// "Name, Region, Country" with missing parts skipped
    #[must_use]
    pub fn display_name(&self) -> String {
        [Some(&self.name), self.admin1.as_ref(), self.country.as_ref()]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl From<payload::GeocodingResult> for GeocodingCandidate {
    fn from(result: payload::GeocodingResult) -> Self {
        Self {
            name: result.name,
            latitude: result.latitude,
            longitude: result.longitude,
            country: result.country,
            admin1: result.admin1,
        }
    }
}
