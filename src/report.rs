//! Surf report rendering and narrative generation
//!
//! The narrative comes from an external language model behind
//! [`ReportGenerator`]. Everything else here (prompt, raw-data summary and the
//! offline table) is rendered locally from the [`NormalizedForecast`].

use std::fmt::Write as _;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::error::SurfError;
use crate::models::{HourlyConditions, NormalizedForecast, compass_point};
use crate::Result;

pub const OLLAMA_URL: &str = "http://localhost:11434";
pub const DEFAULT_MODEL: &str = "qwen3:4b";
pub const DEFAULT_MAX_TOKENS: u32 = 2000;

/// Turns a prompt into narrative text
#[async_trait]
pub trait ReportGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    num_predict: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Narrative generation through a local Ollama server
#[derive(Debug, Clone)]
pub struct OllamaReportGenerator {
    client: Client,
    base_url: String,
    model: String,
    max_tokens: u32,
}

impl OllamaReportGenerator {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>, max_tokens: u32, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SurfError::config(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            model: model.into(),
            max_tokens,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/api/generate", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl ReportGenerator for OllamaReportGenerator {
    #[instrument(skip(self, prompt), fields(model = %self.model))]
    async fn generate(&self, prompt: &str) -> Result<String> {
        let start_time = Instant::now();
        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: GenerateOptions {
                num_predict: self.max_tokens,
            },
        };

        let response = self
            .client
            .post(self.endpoint())
            .json(&request)
            .send()
            .await
            .map_err(|e| SurfError::report_generation(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!("Ollama returned HTTP {}", status);
            return Err(SurfError::report_generation(format!("model server returned HTTP {status}")));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| SurfError::report_generation(format!("invalid model response: {e}")))?;

        info!(
            "Generated {} characters of narrative in {:.3}s",
            body.response.len(),
            start_time.elapsed().as_secs_f64()
        );
        Ok(body.response)
    }
}

fn value(v: Option<f64>) -> String {
    v.map_or_else(|| "N/A".to_string(), |v| v.to_string())
}

fn series(forecast: &NormalizedForecast, field: impl Fn(&HourlyConditions) -> Option<f64>) -> String {
    let values: Vec<String> = forecast.hourly.iter().map(|h| value(field(h))).collect();
    format!("[{}]", values.join(", "))
}

/// Prompt asking the model for a full surf report
#[must_use]
pub fn render_prompt(label: &str, forecast: &NormalizedForecast) -> String {
    let current = &forecast.current;
    let mut prompt = format!(
        "You are an expert surf forecaster analyzing conditions for {label}.\n\n\
         Current Conditions:\n\
         - Wave Height: {}m\n\
         - Wave Period: {}s\n\
         - Wind Speed: {} km/h\n\
         - Wind Direction: {}°\n\n\
         24-Hour Forecast Data:\n\
         Wave Heights (m): {}\n\
         Swell Heights (m): {}\n\
         Wind Speeds (km/h): {}\n\
         Wind Directions (°): {}\n",
        value(current.wave_height_m),
        value(current.wave_period_s),
        value(current.wind_speed_kmh),
        value(current.wind_direction_deg),
        series(forecast, |h| h.wave_height_m),
        series(forecast, |h| h.swell_height_m),
        series(forecast, |h| h.wind_speed_kmh),
        series(forecast, |h| h.wind_direction_deg),
    );

    for failure in &forecast.source_failures {
        let _ = writeln!(prompt, "Note: {} data is unavailable ({}).", failure.source, failure.reason);
    }

    prompt.push_str(
        "\nPlease provide:\n\
         1. **Overall Rating** (1-10 scale) with emoji\n\
         2. **Current Conditions Summary** - describe what surfers can expect right now\n\
         3. **Best Time to Surf** - when in the next 24 hours will conditions be optimal\n\
         4. **Detailed Analysis** - discuss swell quality, wind conditions, and wave period\n\
         5. **Recommendations** - skill level suited for these conditions and any safety concerns\n\n\
         Format your response as a clear, engaging surf report that both beginners and experienced surfers can understand.",
    );
    prompt
}

/// Raw-data block shown next to the narrative
#[must_use]
pub fn render_summary(forecast: &NormalizedForecast) -> String {
    let current = &forecast.current;
    format!(
        "📊 Raw Weather Data:\n\n\
         🌊 Wave Height: {}m\n\
         📏 Wave Period: {}s\n\
         🧭 Wave Direction: {}°\n\
         💨 Wind Speed: {} km/h\n\
         🧭 Wind Direction: {}°\n",
        value(current.wave_height_m),
        value(current.wave_period_s),
        value(current.wave_direction_deg),
        value(current.wind_speed_kmh),
        value(current.wind_direction_deg),
    )
}

/// Plain-text forecast table used when no model is configured
#[must_use]
pub fn render_plain_report(label: &str, forecast: &NormalizedForecast) -> String {
    let mut out = format!(
        "Surf forecast for {label} ({})\n\n",
        forecast.coordinates.format_coordinates()
    );
    let _ = writeln!(out, "{:<18} {:>7} {:>7} {:>9} {:>5}", "Time", "Wave", "Swell", "Wind", "Dir");

    for hour in &forecast.hourly {
        let direction = hour.wind_direction_deg.map_or("-", compass_point);
        let _ = writeln!(
            out,
            "{:<18} {:>7} {:>7} {:>9} {:>5}",
            hour.time.as_deref().unwrap_or("-"),
            hour.wave_height_m.map_or_else(|| "-".to_string(), |v| format!("{v:.1}m")),
            hour.swell_height_m.map_or_else(|| "-".to_string(), |v| format!("{v:.1}m")),
            hour.wind_speed_kmh.map_or_else(|| "-".to_string(), |v| format!("{v:.0}km/h")),
            direction,
        );
    }

    for failure in &forecast.source_failures {
        let _ = writeln!(out, "\n{} data unavailable: {}", failure.source, failure.reason);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Upstream;
    use crate::models::{Coordinates, CurrentConditions, HourlyConditions, SourceFailure};
    use chrono::Utc;

    fn forecast() -> NormalizedForecast {
        NormalizedForecast {
            coordinates: Coordinates::new(-38.3667, 144.2833).unwrap(),
            retrieved_at: Utc::now(),
            current: CurrentConditions {
                wave_height_m: Some(1.8),
                wave_period_s: Some(12.5),
                wave_direction_deg: Some(225.0),
                wind_speed_kmh: None,
                wind_direction_deg: None,
            },
            hourly: vec![
                HourlyConditions {
                    time: Some("2024-06-01T00:00".into()),
                    wave_height_m: Some(1.7),
                    swell_height_m: Some(1.2),
                    wind_speed_kmh: Some(14.0),
                    wind_direction_deg: Some(315.0),
                },
                HourlyConditions {
                    time: Some("2024-06-01T01:00".into()),
                    wave_height_m: None,
                    ..HourlyConditions::default()
                },
            ],
            daily_summary: None,
            source_failures: vec![SourceFailure {
                source: Upstream::Wind,
                reason: "request timed out".into(),
            }],
        }
    }

    #[test]
    fn test_summary_uses_na_for_missing_values() {
        let summary = render_summary(&forecast());
        assert_eq!(
            summary,
            "📊 Raw Weather Data:\n\n🌊 Wave Height: 1.8m\n📏 Wave Period: 12.5s\n🧭 Wave Direction: 225°\n💨 Wind Speed: N/A km/h\n🧭 Wind Direction: N/A°\n"
        );
    }

    #[test]
    fn test_prompt_contents() {
        let prompt = render_prompt("Bells Beach, Australia", &forecast());
        assert!(prompt.starts_with("You are an expert surf forecaster analyzing conditions for Bells Beach, Australia."));
        assert!(prompt.contains("- Wave Height: 1.8m"));
        assert!(prompt.contains("Wave Heights (m): [1.7, N/A]"));
        assert!(prompt.contains("Note: wind data is unavailable (request timed out)."));
        assert!(prompt.contains("**Best Time to Surf**"));
    }

    #[test]
    fn test_plain_report_table() {
        let report = render_plain_report("Bells Beach, Australia", &forecast());
        assert!(report.starts_with("Surf forecast for Bells Beach, Australia (-38.3667, 144.2833)"));
        assert!(report.contains("2024-06-01T00:00"));
        assert!(report.contains("14km/h"));
        assert!(report.contains("NW"));
        assert!(report.contains("wind data unavailable: request timed out"));
    }

    #[test]
    fn test_generate_request_shape() {
        let request = GenerateRequest {
            model: DEFAULT_MODEL,
            prompt: "hi",
            stream: false,
            options: GenerateOptions { num_predict: DEFAULT_MAX_TOKENS },
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "qwen3:4b");
        assert_eq!(json["stream"], false);
        assert_eq!(json["options"]["num_predict"], 2000);
    }

    #[tokio::test]
    async fn test_unreachable_model_server_is_report_error() {
        let generator =
            OllamaReportGenerator::new("http://127.0.0.1:9", DEFAULT_MODEL, 10, Duration::from_secs(2)).unwrap();
        assert_eq!(generator.endpoint(), "http://127.0.0.1:9/api/generate");
        let err = generator.generate("hello").await.unwrap_err();
        assert!(matches!(err, SurfError::ReportGeneration { .. }));
    }
}
