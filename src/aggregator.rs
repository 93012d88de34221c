//! Forecast aggregation
//!
//! Fetches the marine and wind forecasts for one coordinate pair concurrently
//! and merges them into a [`NormalizedForecast`]. If exactly one source fails
//! the document is still produced, with that source's fields set to `null` and
//! the failure recorded in `source_failures`. If both fail the caller gets
//! [`SurfError::AggregationFailed`] and no document.
//!
//! Hourly entries are aligned by position by default. Both upstreams are
//! queried with `timezone=auto` for identical coordinates, so their series
//! normally share start and cadence; when they do not, positional merging
//! pairs wind with the wrong hour. [`MergeStrategy::TimeKeyed`] matches wind
//! entries by timestamp instead.

use std::collections::HashMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::error::{SurfError, UpstreamError};
use crate::models::{Coordinates, CurrentConditions, HourlyConditions, NormalizedForecast, SourceFailure};
use crate::weather::payload::{MarineHourly, WindHourly, time_at, value_at};
use crate::weather::{MarineSource, RawMarinePayload, RawWindPayload, WindSource};
use crate::Result;

/// Maximum number of hourly entries kept from each source
pub const HOURLY_LIMIT: usize = 24;

/// How hourly marine and wind entries are paired
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeStrategy {
    /// Pair entries by index
    #[default]
    Positional,
    /// Pair wind entries with marine entries sharing the same `time`
    TimeKeyed,
}

/// Joins the two forecast sources for a single location
pub struct ForecastAggregator {
    marine: MarineSource,
    wind: WindSource,
    strategy: MergeStrategy,
    hourly_limit: usize,
}

impl ForecastAggregator {
    #[must_use]
    pub fn new(marine: MarineSource, wind: WindSource) -> Self {
        Self {
            marine,
            wind,
            strategy: MergeStrategy::default(),
            hourly_limit: HOURLY_LIMIT,
        }
    }

    #[must_use]
    pub fn with_strategy(mut self, strategy: MergeStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Lower the hourly bound; values above [`HOURLY_LIMIT`] are clamped
    #[must_use]
    pub fn with_hourly_limit(mut self, limit: usize) -> Self {
        self.hourly_limit = limit.min(HOURLY_LIMIT);
        self
    }

    /// Fetch both sources concurrently and merge the results
    #[instrument(skip(self), fields(lat = coordinates.latitude(), lon = coordinates.longitude()))]
    pub async fn aggregate(&self, coordinates: Coordinates) -> Result<NormalizedForecast> {
        let (marine, wind) = tokio::join!(self.marine.fetch(coordinates), self.wind.fetch(coordinates));

        let forecast = merge(coordinates, marine, wind, self.strategy, self.hourly_limit)?;
        info!(
            "Aggregated forecast with {} hourly entries ({} failed sources)",
            forecast.hourly.len(),
            forecast.source_failures.len()
        );
        Ok(forecast)
    }
}

/// Merge two upstream results into one document
pub fn merge(
    coordinates: Coordinates,
    marine: std::result::Result<RawMarinePayload, UpstreamError>,
    wind: std::result::Result<RawWindPayload, UpstreamError>,
    strategy: MergeStrategy,
    hourly_limit: usize,
) -> Result<NormalizedForecast> {
    let mut source_failures = Vec::new();
    let (marine, wind) = match (marine, wind) {
        (Err(marine), Err(wind)) => {
            warn!("Both forecast sources failed: {marine}; {wind}");
            return Err(SurfError::AggregationFailed { marine, wind });
        }
        (Ok(marine), Ok(wind)) => (Some(marine), Some(wind)),
        (Ok(marine), Err(err)) => {
            warn!("Continuing without wind data: {err}");
            source_failures.push(SourceFailure::from(&err));
            (Some(marine), None)
        }
        (Err(err), Ok(wind)) => {
            warn!("Continuing without marine data: {err}");
            source_failures.push(SourceFailure::from(&err));
            (None, Some(wind))
        }
    };

    let marine_current = marine.as_ref().and_then(|m| m.current.as_ref());
    let wind_current = wind.as_ref().and_then(|w| w.current.as_ref());
    let current = CurrentConditions {
        wave_height_m: marine_current.and_then(|c| c.wave_height),
        wave_period_s: marine_current.and_then(|c| c.wave_period),
        wave_direction_deg: marine_current.and_then(|c| c.wave_direction),
        wind_speed_kmh: wind_current.and_then(|c| c.wind_speed),
        wind_direction_deg: wind_current.and_then(|c| c.wind_direction),
    };

    let marine_hourly = marine.as_ref().and_then(|m| m.hourly.as_ref());
    let wind_hourly = wind.as_ref().and_then(|w| w.hourly.as_ref());
    let hourly = match strategy {
        MergeStrategy::Positional => merge_positional(marine_hourly, wind_hourly, hourly_limit),
        MergeStrategy::TimeKeyed => merge_time_keyed(marine_hourly, wind_hourly, hourly_limit),
    };

    let daily_summary = marine.and_then(|m| m.daily);

    Ok(NormalizedForecast {
        coordinates,
        retrieved_at: Utc::now(),
        current,
        hourly,
        daily_summary,
        source_failures,
    })
}

fn merge_positional(
    marine: Option<&MarineHourly>,
    wind: Option<&WindHourly>,
    limit: usize,
) -> Vec<HourlyConditions> {
    let marine_len = marine.map_or(0, |m| m.len().min(limit));
    let wind_len = wind.map_or(0, |w| w.len().min(limit));
    if marine_len != wind_len && marine_len > 0 && wind_len > 0 {
        debug!("Hourly series differ in length (marine {marine_len}, wind {wind_len})");
    }

    (0..marine_len.max(wind_len))
        .map(|i| {
            let marine = marine.filter(|_| i < marine_len);
            let wind = wind.filter(|_| i < wind_len);
            let time = marine
                .and_then(|m| time_at(&m.time, i))
                .or_else(|| wind.and_then(|w| time_at(&w.time, i)))
                .map(str::to_string);
            hourly_entry(time, marine, i, wind, i)
        })
        .collect()
}

fn merge_time_keyed(
    marine: Option<&MarineHourly>,
    wind: Option<&WindHourly>,
    limit: usize,
) -> Vec<HourlyConditions> {
    let Some(marine) = marine.filter(|m| !m.is_empty()) else {
        return merge_positional(None, wind, limit);
    };

    let wind_index: HashMap<&str, usize> = wind
        .map(|w| {
            w.time
                .iter()
                .take(limit)
                .enumerate()
                .filter_map(|(i, t)| t.as_deref().map(|t| (t, i)))
                .collect()
        })
        .unwrap_or_default();

    let marine_len = marine.len().min(limit);
    (0..marine_len)
        .map(|i| {
            let time = time_at(&marine.time, i).map(str::to_string);
            let wind_position = time.as_deref().and_then(|t| wind_index.get(t)).copied();
            match wind_position {
                Some(j) => hourly_entry(time, Some(marine), i, wind, j),
                None => hourly_entry(time, Some(marine), i, None, 0),
            }
        })
        .collect()
}

fn hourly_entry(
    time: Option<String>,
    marine: Option<&MarineHourly>,
    marine_index: usize,
    wind: Option<&WindHourly>,
    wind_index: usize,
) -> HourlyConditions {
    HourlyConditions {
        time,
        wave_height_m: marine.and_then(|m| value_at(&m.wave_height, marine_index)),
        swell_height_m: marine.and_then(|m| value_at(&m.swell_height, marine_index)),
        wind_speed_kmh: wind.and_then(|w| value_at(&w.wind_speed, wind_index)),
        wind_direction_deg: wind.and_then(|w| value_at(&w.wind_direction, wind_index)),
    }
}
