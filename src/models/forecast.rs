//! Normalized forecast document produced by the aggregator

use super::Coordinates;
use crate::error::{Upstream, UpstreamError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Merged marine + wind forecast for one coordinate pair
///
/// Every nullable field is serialized as `null` rather than omitted, so
/// consumers can rely on the keys being present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedForecast {
    pub coordinates: Coordinates,
    /// When the upstream data was fetched
    pub retrieved_at: DateTime<Utc>,
    pub current: CurrentConditions,
    /// At most 24 entries, in upstream order
    pub hourly: Vec<HourlyConditions>,
    /// Marine daily aggregates, passed through as returned
    pub daily_summary: Option<serde_json::Value>,
    /// Sources that failed while the other one succeeded
    pub source_failures: Vec<SourceFailure>,
}

impl NormalizedForecast {
    /// True when one of the two sources failed
    #[must_use]
    pub fn is_partial(&self) -> bool {
        !self.source_failures.is_empty()
    }

    #[must_use]
    pub fn failed(&self, source: Upstream) -> bool {
        self.source_failures.iter().any(|f| f.source == source)
    }
}

/// Conditions at the current instant
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    /// Significant wave height in metres
    pub wave_height_m: Option<f64>,
    /// Wave period in seconds
    pub wave_period_s: Option<f64>,
    /// Wave direction in degrees clockwise from north
    pub wave_direction_deg: Option<f64>,
    /// Wind speed at 10 m in km/h
    pub wind_speed_kmh: Option<f64>,
    /// Wind direction in degrees clockwise from north
    pub wind_direction_deg: Option<f64>,
}

/// One hour of the merged series
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HourlyConditions {
    /// Local time at the spot as returned upstream (`timezone=auto`)
    pub time: Option<String>,
    pub wave_height_m: Option<f64>,
    pub swell_height_m: Option<f64>,
    pub wind_speed_kmh: Option<f64>,
    pub wind_direction_deg: Option<f64>,
}

/// Annotation recording a failed source in a partial forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceFailure {
    pub source: Upstream,
    pub reason: String,
}

impl From<&UpstreamError> for SourceFailure {
    fn from(err: &UpstreamError) -> Self {
        Self {
            source: err.service,
            reason: err.failure.to_string(),
        }
    }
}

/// Convert direction in degrees to a 16-point compass label
#[must_use]
pub fn compass_point(degrees: f64) -> &'static str {
    const POINTS: [&str; 16] = [
        "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW",
        "NW", "NNW",
    ];
    if !degrees.is_finite() {
        return "Unknown";
    }
    let normalized = degrees.rem_euclid(360.0);
    let index = ((normalized / 22.5).round() as usize) % POINTS.len();
    POINTS[index]
}
