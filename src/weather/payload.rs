//! Raw `OpenMeteo` response structures
//!
//! Every value is optional and every array element is nullable: a 2xx response
//! with missing fields is valid and its gaps are carried forward as `None`.

use serde::{Deserialize, Deserializer};

/// Response of the marine forecast endpoint
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawMarinePayload {
    pub current: Option<MarineCurrent>,
    pub hourly: Option<MarineHourly>,
    /// Daily aggregates, kept opaque
    pub daily: Option<serde_json::Value>,
}

/// Current marine readings
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MarineCurrent {
    pub time: Option<String>,
    pub wave_height: Option<f64>,
    pub wave_direction: Option<f64>,
    pub wave_period: Option<f64>,
}

/// Hourly marine series, positionally aligned with `time`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MarineHourly {
    #[serde(default, deserialize_with = "nullable_times")]
    pub time: Vec<Option<String>>,
    pub wave_height: Option<Vec<Option<f64>>>,
    pub wave_direction: Option<Vec<Option<f64>>>,
    pub wave_period: Option<Vec<Option<f64>>>,
    pub wind_wave_height: Option<Vec<Option<f64>>>,
    #[serde(rename = "swell_wave_height")]
    pub swell_height: Option<Vec<Option<f64>>>,
    #[serde(rename = "swell_wave_direction")]
    pub swell_direction: Option<Vec<Option<f64>>>,
    #[serde(rename = "swell_wave_period")]
    pub swell_period: Option<Vec<Option<f64>>>,
}

impl MarineHourly {
    /// Number of hourly entries (longest of the returned arrays)
    #[must_use]
    pub fn len(&self) -> usize {
        [
            &self.wave_height,
            &self.wave_direction,
            &self.wave_period,
            &self.wind_wave_height,
            &self.swell_height,
            &self.swell_direction,
            &self.swell_period,
        ]
        .into_iter()
        .map(series_len)
        .fold(self.time.len(), usize::max)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Response of the general forecast endpoint, wind fields only
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawWindPayload {
    pub current: Option<WindCurrent>,
    pub hourly: Option<WindHourly>,
}

/// Current wind readings
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct WindCurrent {
    pub time: Option<String>,
    #[serde(rename = "wind_speed_10m")]
    pub wind_speed: Option<f64>,
    #[serde(rename = "wind_direction_10m")]
    pub wind_direction: Option<f64>,
}

/// Hourly wind series, positionally aligned with `time`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct WindHourly {
    #[serde(default, deserialize_with = "nullable_times")]
    pub time: Vec<Option<String>>,
    #[serde(rename = "wind_speed_10m")]
    pub wind_speed: Option<Vec<Option<f64>>>,
    #[serde(rename = "wind_direction_10m")]
    pub wind_direction: Option<Vec<Option<f64>>>,
}

impl WindHourly {
    #[must_use]
    pub fn len(&self) -> usize {
        [&self.wind_speed, &self.wind_direction]
            .into_iter()
            .map(series_len)
            .fold(self.time.len(), usize::max)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// `time` may be absent, `null` or contain `null` entries; all decode to gaps
fn nullable_times<'de, D>(deserializer: D) -> Result<Vec<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Option<String>>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Timestamp at `index`, if present and non-null
#[must_use]
pub fn time_at(times: &[Option<String>], index: usize) -> Option<&str> {
    times.get(index).and_then(Option::as_deref)
}

/// Safe indexing into an optional, nullable series
#[must_use]
pub fn value_at(series: &Option<Vec<Option<f64>>>, index: usize) -> Option<f64> {
    series
        .as_ref()
        .and_then(|values| values.get(index))
        .copied()
        .flatten()
}

fn series_len(series: &Option<Vec<Option<f64>>>) -> usize {
    series.as_ref().map_or(0, Vec::len)
}

/// Geocoding response from `OpenMeteo`
#[derive(Debug, Deserialize)]
pub struct GeocodingResponse {
    pub results: Option<Vec<GeocodingResult>>,
}

#[derive(Debug, Deserialize)]
pub struct GeocodingResult {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub country: Option<String>,
    pub admin1: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marine_payload_with_nulls() {
        let json = r#"{
            "latitude": -38.375,
            "longitude": 144.25,
            "current": {"time": "2024-06-01T10:00", "wave_height": 1.8, "wave_direction": null, "wave_period": 11.2},
            "hourly": {
                "time": ["2024-06-01T00:00", "2024-06-01T01:00", "2024-06-01T02:00"],
                "wave_height": [1.7, null, 1.9],
                "swell_wave_height": [1.2, 1.3, 1.4]
            },
            "daily": {"time": ["2024-06-01"], "wave_height_max": [2.1]}
        }"#;
        let payload: RawMarinePayload = serde_json::from_str(json).unwrap();

        let current = payload.current.unwrap();
        assert_eq!(current.wave_height, Some(1.8));
        assert_eq!(current.wave_direction, None);

        let hourly = payload.hourly.unwrap();
        assert_eq!(hourly.len(), 3);
        assert_eq!(value_at(&hourly.wave_height, 1), None);
        assert_eq!(value_at(&hourly.wave_height, 2), Some(1.9));
        assert_eq!(value_at(&hourly.swell_height, 0), Some(1.2));
        assert_eq!(value_at(&hourly.wave_period, 0), None);
        assert_eq!(value_at(&hourly.wave_height, 10), None);
        assert!(payload.daily.is_some());
    }

    #[test]
    fn test_wind_payload_missing_sections() {
        let payload: RawWindPayload = serde_json::from_str(r#"{"latitude": 1.0}"#).unwrap();
        assert!(payload.current.is_none());
        assert!(payload.hourly.is_none());

        let payload: RawWindPayload = serde_json::from_str(
            r#"{"hourly": {"time": ["a", "b"], "wind_speed_10m": null, "wind_direction_10m": [10.0]}}"#,
        )
        .unwrap();
        let hourly = payload.hourly.unwrap();
        assert_eq!(hourly.len(), 2);
        assert_eq!(value_at(&hourly.wind_speed, 0), None);
        assert_eq!(value_at(&hourly.wind_direction, 0), Some(10.0));
    }

    #[test]
    fn test_null_time_series_is_not_a_decode_error() {
        let payload: RawMarinePayload =
            serde_json::from_str(r#"{"hourly": {"time": null, "wave_height": [1.0, 2.0]}}"#).unwrap();
        let hourly = payload.hourly.unwrap();
        assert!(hourly.time.is_empty());
        assert_eq!(hourly.len(), 2);
        assert_eq!(value_at(&hourly.wave_height, 1), Some(2.0));

        let payload: RawWindPayload = serde_json::from_str(
            r#"{"hourly": {"time": ["2024-06-01T00:00", null], "wind_speed_10m": [12.0, 13.0]}}"#,
        )
        .unwrap();
        let hourly = payload.hourly.unwrap();
        assert_eq!(hourly.len(), 2);
        assert_eq!(time_at(&hourly.time, 0), Some("2024-06-01T00:00"));
        assert_eq!(time_at(&hourly.time, 1), None);
        assert_eq!(time_at(&hourly.time, 5), None);
    }

    #[test]
    fn test_series_length_without_time() {
        let hourly = MarineHourly {
            wave_height: Some(vec![Some(1.0); 5]),
            ..MarineHourly::default()
        };
        assert_eq!(hourly.len(), 5);
        assert!(!hourly.is_empty());
        assert!(MarineHourly::default().is_empty());
    }
}
