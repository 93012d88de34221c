//! Configuration management for the surf report service
//!
//! Handles loading configuration from files and environment variables,
//! and provides validation for all configuration settings.

use crate::SurfError;
use crate::aggregator::{HOURLY_LIMIT, MergeStrategy};
use crate::report::{DEFAULT_MAX_TOKENS, DEFAULT_MODEL, OLLAMA_URL};
use crate::weather::open_meteo::{FORECAST_URL, GEOCODING_URL, MARINE_URL};
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfReportConfig {
    /// Upstream forecast services
    pub weather: WeatherConfig,
    /// Narrative model server
    pub report: ReportConfig,
    /// HTTP surface
    pub server: ServerConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Upstream forecast service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    pub marine_url: String,
    pub forecast_url: String,
    pub geocoding_url: String,
    /// Per-request timeout in seconds
    pub timeout_seconds: u32,
    /// Hourly entries kept per source
    pub hourly_limit: usize,
    pub merge_strategy: MergeStrategy,
}

/// Ollama settings for the narrative
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub timeout_seconds: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,
    /// Log format (pretty or json)
    pub format: String,
}

fn default_weather_timeout() -> u32 {
    30
}

fn default_report_timeout() -> u32 {
    120
}

fn default_port() -> u16 {
    7860
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            marine_url: MARINE_URL.to_string(),
            forecast_url: FORECAST_URL.to_string(),
            geocoding_url: GEOCODING_URL.to_string(),
            timeout_seconds: default_weather_timeout(),
            hourly_limit: HOURLY_LIMIT,
            merge_strategy: MergeStrategy::default(),
        }
    }
}

impl WeatherConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(u64::from(self.timeout_seconds))
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            base_url: OLLAMA_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout_seconds: default_report_timeout(),
        }
    }
}

impl ReportConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(u64::from(self.timeout_seconds))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: default_port() }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl SurfReportConfig {
    /// Load configuration from file and environment variables, using the
    /// user config directory when no path is given
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // SURFREPORT_WEATHER__TIMEOUT_SECONDS=10 and friends
        builder = builder.add_source(
            Environment::with_prefix("SURFREPORT")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: SurfReportConfig = settings
            .try_deserialize()
            .with_context(|| format!("Failed to deserialize configuration from {}", config_file.display()))?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("surfreport").join("config.toml"))
    }

    /// Apply default values to empty or zero configuration fields
    pub fn apply_defaults(&mut self) {
        let weather = WeatherConfig::default();
        if self.weather.marine_url.is_empty() {
            self.weather.marine_url = weather.marine_url;
        }
        if self.weather.forecast_url.is_empty() {
            self.weather.forecast_url = weather.forecast_url;
        }
        if self.weather.geocoding_url.is_empty() {
            self.weather.geocoding_url = weather.geocoding_url;
        }
        if self.weather.timeout_seconds == 0 {
            self.weather.timeout_seconds = default_weather_timeout();
        }
        if self.weather.hourly_limit == 0 {
            self.weather.hourly_limit = HOURLY_LIMIT;
        }
        if self.report.base_url.is_empty() {
            self.report.base_url = OLLAMA_URL.to_string();
        }
        if self.report.model.is_empty() {
            self.report.model = DEFAULT_MODEL.to_string();
        }
        if self.report.max_tokens == 0 {
            self.report.max_tokens = DEFAULT_MAX_TOKENS;
        }
        if self.report.timeout_seconds == 0 {
            self.report.timeout_seconds = default_report_timeout();
        }
        if self.server.port == 0 {
            self.server.port = default_port();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.weather.timeout_seconds > 300 {
            return Err(SurfError::config("Weather API timeout cannot exceed 300 seconds").into());
        }

        if self.weather.hourly_limit > HOURLY_LIMIT {
            return Err(SurfError::config(format!(
                "Hourly limit cannot exceed {HOURLY_LIMIT} entries"
            ))
            .into());
        }

        if self.report.timeout_seconds > 600 {
            return Err(SurfError::config("Report timeout cannot exceed 600 seconds").into());
        }

        if self.report.max_tokens > 32_000 {
            return Err(SurfError::config("Report max tokens cannot exceed 32000").into());
        }

        Ok(())
    }

    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(SurfError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(SurfError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        for (name, url) in [
            ("weather.marine_url", &self.weather.marine_url),
            ("weather.forecast_url", &self.weather.forecast_url),
            ("weather.geocoding_url", &self.weather.geocoding_url),
            ("report.base_url", &self.report.base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(SurfError::config(format!("{name} must be a valid HTTP or HTTPS URL")).into());
            }
        }

        Ok(())
    }
}
