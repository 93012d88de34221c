//! Tool catalog and dispatch
//!
//! The tool surface offered to an external tool-calling agent. Descriptors
//! are built once into an immutable [`ToolCatalog`]; [`ToolDispatcher`]
//! routes a named call to its handler and always answers with a
//! [`ToolCallResponse`] envelope, including for unknown tools and bad
//! arguments.

use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value, json};
use thiserror::Error;

pub mod call;
pub mod catalog;
pub mod dispatcher;

pub use call::{SpotQuery, ToolCall};
pub use catalog::{ToolCatalog, ToolKind};
pub use dispatcher::ToolDispatcher;

/// JSON type of a tool argument
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArgumentType {
    Number,
    String,
}

/// Declaration of one tool argument
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArgumentSpec {
    #[serde(rename = "type")]
    pub kind: ArgumentType,
    pub required: bool,
    pub description: &'static str,
}

/// Public description of a callable tool
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    /// Arguments in declaration order
    #[serde(serialize_with = "serialize_arguments")]
    pub argument_schema: Vec<(&'static str, ArgumentSpec)>,
    #[serde(skip)]
    pub kind: ToolKind,
}

impl ToolDescriptor {
    pub fn required_arguments(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.argument_schema
            .iter()
            .filter(|(_, spec)| spec.required)
            .map(|(name, _)| *name)
    }

    /// The arguments as a JSON-Schema object, as agent frameworks expect
    #[must_use]
    pub fn input_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .argument_schema
            .iter()
            .map(|(name, spec)| {
                (
                    (*name).to_string(),
                    json!({"type": spec.kind, "description": spec.description}),
                )
            })
            .collect();
        let required: Vec<&str> = self.required_arguments().collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}

fn serialize_arguments<S: Serializer>(
    arguments: &[(&'static str, ArgumentSpec)],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(arguments.len()))?;
    for (name, spec) in arguments {
        map.serialize_entry(name, spec)?;
    }
    map.end()
}

/// An incoming tool invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    #[serde(alias = "name")]
    pub tool_name: String,
    #[serde(default, deserialize_with = "arguments_or_empty")]
    pub arguments: Map<String, Value>,
}

/// Agents send `"arguments": null` for calls without arguments
fn arguments_or_empty<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Map<String, Value>>::deserialize(deserializer)?.unwrap_or_default())
}

impl ToolCallRequest {
    pub fn new(tool_name: impl Into<String>, arguments: Value) -> Self {
        let arguments = match arguments {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self {
            tool_name: tool_name.into(),
            arguments,
        }
    }
}

/// Result body of a tool call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ToolPayload {
    Text(String),
    Structured(Value),
}

impl ToolPayload {
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ToolPayload::Text(text) => Some(text),
            ToolPayload::Structured(_) => None,
        }
    }

    #[must_use]
    pub fn as_structured(&self) -> Option<&Value> {
        match self {
            ToolPayload::Structured(value) => Some(value),
            ToolPayload::Text(_) => None,
        }
    }
}

/// Failure details attached to an unsuccessful call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolFailure {
    pub tool_name: String,
    pub message: String,
}

/// Uniform envelope returned for every call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallResponse {
    pub success: bool,
    pub payload: ToolPayload,
    pub error: Option<ToolFailure>,
}

impl ToolCallResponse {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            success: true,
            payload: ToolPayload::Text(text.into()),
            error: None,
        }
    }

    #[must_use]
    pub fn structured(value: Value) -> Self {
        Self {
            success: true,
            payload: ToolPayload::Structured(value),
            error: None,
        }
    }

    /// Failed call; the message doubles as the text payload
    pub fn failure(tool_name: impl Into<String>, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            success: false,
            payload: ToolPayload::Text(message.clone()),
            error: Some(ToolFailure {
                tool_name: tool_name.into(),
                message,
            }),
        }
    }
}

/// Why a call could not be routed to a handler
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    #[error("missing required argument '{argument}' for {tool}")]
    MissingArgument { tool: String, argument: String },

    #[error("invalid argument for {tool}: {message}")]
    InvalidArgument { tool: String, message: String },
}

impl DispatchError {
    /// Name of the tool the failed call targeted
    #[must_use]
    pub fn tool_name(&self) -> &str {
        match self {
            DispatchError::UnknownTool(tool)
            | DispatchError::MissingArgument { tool, .. }
            | DispatchError::InvalidArgument { tool, .. } => tool,
        }
    }
}

impl From<DispatchError> for ToolCallResponse {
    fn from(err: DispatchError) -> Self {
        ToolCallResponse::failure(err.tool_name().to_string(), err.to_string())
    }
}
