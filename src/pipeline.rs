//! End-to-end surf report pipeline
//!
//! resolve -> aggregate -> narrate. Failures never escape as errors: they are
//! turned into the user-facing narrative strings of a [`SurfReport`].

use std::sync::Arc;

use serde::Serialize;
use tokio::runtime::{Builder, Handle};
use tracing::{error, info, warn};

use crate::aggregator::ForecastAggregator;
use crate::error::SurfError;
use crate::models::Coordinates;
use crate::report::{ReportGenerator, render_plain_report, render_prompt, render_summary};
use crate::spots::{CoordinateResolver, SpotIdentifier};

pub const SPOT_NOT_FOUND: &str =
    "❌ Spot not found. Please select from the dropdown or enter custom coordinates.";

/// Narrative plus the locally rendered raw-data summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SurfReport {
    pub narrative: String,
    /// Empty when no forecast could be retrieved
    pub summary: String,
}

impl SurfReport {
    fn failed(narrative: impl Into<String>) -> Self {
        Self {
            narrative: narrative.into(),
            summary: String::new(),
        }
    }

    fn from_error(err: &SurfError) -> Self {
        match err {
            SurfError::SpotNotFound { .. } => Self::failed(SPOT_NOT_FOUND),
            other => Self::failed(format!("❌ Error: {other}")),
        }
    }
}

/// Drives one report from spot identifier to narrative
#[derive(Clone)]
pub struct PipelineOrchestrator {
    resolver: CoordinateResolver,
    aggregator: Arc<ForecastAggregator>,
    narrator: Option<Arc<dyn ReportGenerator>>,
}

impl PipelineOrchestrator {
    #[must_use]
    pub fn new(resolver: CoordinateResolver, aggregator: Arc<ForecastAggregator>) -> Self {
        Self {
            resolver,
            aggregator,
            narrator: None,
        }
    }

    /// Use a language model for the narrative instead of the plain table
    #[must_use]
    pub fn with_narrator(mut self, narrator: Arc<dyn ReportGenerator>) -> Self {
        self.narrator = Some(narrator);
        self
    }

    #[must_use]
    pub fn resolver(&self) -> &CoordinateResolver {
        &self.resolver
    }

    /// Explicit coordinates win over the spot name
    pub async fn generate_report(&self, spot_name: &str, coordinates: Option<Coordinates>) -> SurfReport {
        self.report(&SpotIdentifier::new(spot_name, coordinates)).await
    }

    /// Same as [`Self::generate_report`] but from raw form text boxes
    pub async fn generate_report_from_form(
        &self,
        spot_name: &str,
        latitude: Option<&str>,
        longitude: Option<&str>,
    ) -> SurfReport {
        match SpotIdentifier::from_form(spot_name, latitude, longitude) {
            Ok(identifier) => self.report(&identifier).await,
            Err(err) => SurfReport::from_error(&err),
        }
    }

    pub async fn report(&self, identifier: &SpotIdentifier) -> SurfReport {
        let spot = match self.resolver.locate(identifier).await {
            Ok(spot) => spot,
            Err(err) => {
                warn!("Could not resolve {:?}: {}", identifier, err);
                return SurfReport::from_error(&err);
            }
        };
        let label = spot.label();
        info!("Generating surf report for {}", label);

        let forecast = match self.aggregator.aggregate(spot.coordinates).await {
            Ok(forecast) => forecast,
            Err(err) => {
                error!("Forecast retrieval failed for {}: {}", label, err);
                return SurfReport::from_error(&err);
            }
        };
        let summary = render_summary(&forecast);

        let narrative = match &self.narrator {
            Some(narrator) => match narrator.generate(&render_prompt(&label, &forecast)).await {
                Ok(text) => text,
                Err(err) => {
                    warn!("Narrative generation failed: {}", err);
                    let cause = match err {
                        SurfError::ReportGeneration { message } => message,
                        other => other.to_string(),
                    };
                    format!("Error generating surf report: {cause}")
                }
            },
            None => render_plain_report(&label, &forecast),
        };

        SurfReport { narrative, summary }
    }

    /// Blocking wrapper around [`Self::generate_report`]
    pub fn generate_report_blocking(&self, spot_name: &str, coordinates: Option<Coordinates>) -> SurfReport {
        self.report_blocking(&SpotIdentifier::new(spot_name, coordinates))
    }

    /// Run the whole pipeline to completion on a private runtime
    ///
    /// Must not be called from inside a Tokio runtime; doing so yields an
    /// error report instead of blocking the executor.
    pub fn report_blocking(&self, identifier: &SpotIdentifier) -> SurfReport {
        if Handle::try_current().is_ok() {
            return SurfReport::failed(
                "❌ Error: blocking report requested from inside an async runtime",
            );
        }
        match Builder::new_current_thread().enable_all().build() {
            Ok(runtime) => runtime.block_on(self.report(identifier)),
            Err(err) => SurfReport::failed(format!("❌ Error: failed to start runtime: {err}")),
        }
    }
}
