//! Typed tool invocations parsed from raw JSON arguments

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::{DispatchError, ToolDescriptor, ToolKind};
use crate::models::Coordinates;

#[derive(Debug, Deserialize)]
struct ForecastArguments {
    latitude: f64,
    longitude: f64,
}

/// Arguments shared by the spot lookup tools
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SpotQuery {
    pub spot_name: String,
    #[serde(default)]
    pub location: Option<String>,
}

impl SpotQuery {
    /// Spot name and location joined into one free-text query
    #[must_use]
    pub fn place(&self) -> String {
        match self.location.as_deref().map(str::trim) {
            Some(location) if !location.is_empty() => format!("{} {}", self.spot_name, location),
            _ => self.spot_name.clone(),
        }
    }

    /// Query text for a surf conditions search
    #[must_use]
    pub fn search_query(&self) -> String {
        format!(
            "{} surf spot {} best conditions optimal swell wind direction",
            self.spot_name,
            self.location.as_deref().unwrap_or_default()
        )
    }
}

/// A validated call, ready for its handler
#[derive(Debug, Clone, PartialEq)]
pub enum ToolCall {
    WeatherForecast(Coordinates),
    SpotInfo(SpotQuery),
    SpotCoordinates(SpotQuery),
}

impl ToolCall {
    /// Check required arguments, then decode them into the typed call
    pub fn parse(descriptor: &ToolDescriptor, arguments: &Map<String, Value>) -> Result<Self, DispatchError> {
        for argument in descriptor.required_arguments() {
            if arguments.get(argument).is_none_or(Value::is_null) {
                return Err(DispatchError::MissingArgument {
                    tool: descriptor.name.to_string(),
                    argument: argument.to_string(),
                });
            }
        }

        match descriptor.kind {
            ToolKind::WeatherForecast => {
                let args: ForecastArguments = decode(descriptor, arguments)?;
                Coordinates::new(args.latitude, args.longitude)
                    .map(ToolCall::WeatherForecast)
                    .map_err(|e| invalid(descriptor, e.to_string()))
            }
            ToolKind::SpotInfo => decode(descriptor, arguments).map(ToolCall::SpotInfo),
            ToolKind::SpotCoordinates => decode(descriptor, arguments).map(ToolCall::SpotCoordinates),
        }
    }

    #[must_use]
    pub fn kind(&self) -> ToolKind {
        match self {
            ToolCall::WeatherForecast(_) => ToolKind::WeatherForecast,
            ToolCall::SpotInfo(_) => ToolKind::SpotInfo,
            ToolCall::SpotCoordinates(_) => ToolKind::SpotCoordinates,
        }
    }
}

fn decode<T: DeserializeOwned>(descriptor: &ToolDescriptor, arguments: &Map<String, Value>) -> Result<T, DispatchError> {
    serde_json::from_value(Value::Object(arguments.clone())).map_err(|e| invalid(descriptor, e.to_string()))
}

fn invalid(descriptor: &ToolDescriptor, message: String) -> DispatchError {
    DispatchError::InvalidArgument {
        tool: descriptor.name.to_string(),
        message,
    }
}
