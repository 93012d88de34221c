//! Error types and handling for the surf report pipeline

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Maximum number of body characters kept on an upstream failure
pub const BODY_SNIPPET_LEN: usize = 200;

/// External services the pipeline calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Upstream {
    /// Open-Meteo marine forecast
    Marine,
    /// Open-Meteo wind forecast
    Wind,
    /// Open-Meteo geocoding
    Geocoding,
}

impl Upstream {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Upstream::Marine => "marine",
            Upstream::Wind => "wind",
            Upstream::Geocoding => "geocoding",
        }
    }
}

impl fmt::Display for Upstream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why an upstream request failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpstreamFailure {
    /// Non-2xx HTTP status
    Status(u16),
    /// The request exceeded its timeout
    Timeout,
    /// Connection-level failure
    Network(String),
    /// The body was not the JSON we expected
    Decode(String),
}

impl fmt::Display for UpstreamFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpstreamFailure::Status(code) => write!(f, "HTTP status {code}"),
            UpstreamFailure::Timeout => f.write_str("request timed out"),
            UpstreamFailure::Network(message) => write!(f, "network error: {message}"),
            UpstreamFailure::Decode(message) => write!(f, "invalid response body: {message}"),
        }
    }
}

/// A single failed call to one upstream service
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{service} request failed: {failure}")]
pub struct UpstreamError {
    pub service: Upstream,
    pub failure: UpstreamFailure,
    /// Leading part of the response body, when one was received
    pub body_snippet: Option<String>,
}

impl UpstreamError {
    #[must_use]
    pub fn new(service: Upstream, failure: UpstreamFailure) -> Self {
        Self {
            service,
            failure,
            body_snippet: None,
        }
    }

    /// Attach the start of the response body
    #[must_use]
    pub fn with_body(mut self, body: &str) -> Self {
        if !body.is_empty() {
            self.body_snippet = Some(body.chars().take(BODY_SNIPPET_LEN).collect());
        }
        self
    }

    /// Classify a transport error from reqwest
    #[must_use]
    pub fn from_transport(service: Upstream, err: &reqwest::Error) -> Self {
        let failure = if err.is_timeout() {
            UpstreamFailure::Timeout
        } else {
            UpstreamFailure::Network(err.to_string())
        };
        Self::new(service, failure)
    }
}

/// Main error type for the surf report pipeline
#[derive(Error, Debug)]
pub enum SurfError {
    /// Spot name missing from the spot table (or an address with no match)
    #[error("Spot not found: {identifier}")]
    SpotNotFound { identifier: String },

    /// Latitude or longitude outside the valid range
    #[error("Invalid coordinates: {message}")]
    InvalidCoordinates { message: String },

    /// Malformed caller input
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    /// One upstream service failed
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    /// Both forecast sources failed
    #[error("All forecast sources failed ({marine}; {wind})")]
    AggregationFailed {
        marine: UpstreamError,
        wind: UpstreamError,
    },

    /// The narrative collaborator failed
    #[error("Report generation failed: {message}")]
    ReportGeneration { message: String },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl SurfError {
    pub fn spot_not_found<S: Into<String>>(identifier: S) -> Self {
        Self::SpotNotFound {
            identifier: identifier.into(),
        }
    }

    pub fn invalid_coordinates<S: Into<String>>(message: S) -> Self {
        Self::InvalidCoordinates {
            message: message.into(),
        }
    }

    pub fn invalid_input<S: Into<String>>(message: S) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub fn report_generation<S: Into<String>>(message: S) -> Self {
        Self::ReportGeneration {
            message: message.into(),
        }
    }

    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            SurfError::SpotNotFound { .. } => {
                "Spot not found. Please select from the dropdown or enter custom coordinates."
                    .to_string()
            }
            SurfError::InvalidCoordinates { message } | SurfError::InvalidInput { message } => {
                format!("Invalid input: {message}")
            }
            SurfError::Upstream(err) => {
                format!("Unable to reach the {} forecast service ({}).", err.service, err.failure)
            }
            SurfError::AggregationFailed { .. } => {
                "Unable to fetch forecast data from any weather service. Please check your internet connection."
                    .to_string()
            }
            SurfError::ReportGeneration { message } => format!("Error generating surf report: {message}"),
            SurfError::Config { .. } => {
                "Configuration error. Please check your config file.".to_string()
            }
        }
    }
}
