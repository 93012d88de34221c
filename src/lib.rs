//! `SurfReport` - surf forecast tools for tool-calling agents
//!
//! This library fetches marine and wind forecasts concurrently, merges them
//! into one normalized document, exposes them through a small tool catalog
//! and drives an end-to-end surf report pipeline.

pub mod aggregator;
pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod report;
pub mod spots;
pub mod telemetry;
pub mod tools;
pub mod weather;
pub mod web;

// Re-export core types for public API
pub use aggregator::{ForecastAggregator, MergeStrategy};
pub use app::Services;
pub use config::SurfReportConfig;
pub use error::{SurfError, Upstream, UpstreamError, UpstreamFailure};
pub use models::{Coordinates, NormalizedForecast, SurfSpot};
pub use pipeline::{PipelineOrchestrator, SurfReport};
pub use report::{OllamaReportGenerator, ReportGenerator};
pub use spots::{CoordinateResolver, SpotIdentifier, SpotTable};
pub use tools::{ToolCallRequest, ToolCallResponse, ToolCatalog, ToolDispatcher};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, SurfError>;
