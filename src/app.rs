//! Wiring of clients, resolver, aggregator, dispatcher and pipeline

use std::sync::Arc;

use tracing::debug;

use crate::Result;
use crate::aggregator::ForecastAggregator;
use crate::config::SurfReportConfig;
use crate::pipeline::PipelineOrchestrator;
use crate::report::{OllamaReportGenerator, ReportGenerator};
use crate::spots::{CoordinateResolver, SpotTable};
use crate::tools::{ToolCatalog, ToolDispatcher};
use crate::weather::{GeocodingClient, Geocoder, MarineClient, MarineSource, WindClient, WindSource, http_client};

/// Everything a driver needs, built once and shared
#[derive(Clone)]
pub struct Services {
    pub dispatcher: ToolDispatcher,
    pub pipeline: PipelineOrchestrator,
}

impl Services {
    /// Build the production services; `offline` skips the narrative model
    pub fn from_config(config: &SurfReportConfig, offline: bool) -> Result<Self> {
        let client = http_client(config.weather.timeout())?;
        let marine: MarineSource = Arc::new(MarineClient::new(client.clone(), &config.weather.marine_url));
        let wind: WindSource = Arc::new(WindClient::new(client.clone(), &config.weather.forecast_url));
        let geocoder: Arc<dyn Geocoder> = Arc::new(GeocodingClient::new(client, &config.weather.geocoding_url));

        let aggregator = ForecastAggregator::new(marine, wind)
            .with_strategy(config.weather.merge_strategy)
            .with_hourly_limit(config.weather.hourly_limit);

        let narrator: Option<Arc<dyn ReportGenerator>> = if offline {
            None
        } else {
            Some(Arc::new(OllamaReportGenerator::new(
                &config.report.base_url,
                &config.report.model,
                config.report.max_tokens,
                config.report.timeout(),
            )?))
        };

        debug!(
            "Services configured (merge: {:?}, narrator: {})",
            config.weather.merge_strategy,
            narrator.is_some()
        );
        Self::assemble(aggregator, geocoder, narrator)
    }

    /// Build services around the given aggregator and collaborators
    pub fn assemble(
        aggregator: ForecastAggregator,
        geocoder: Arc<dyn Geocoder>,
        narrator: Option<Arc<dyn ReportGenerator>>,
    ) -> Result<Self> {
        let table = Arc::new(SpotTable::builtin()?);
        let resolver = CoordinateResolver::new(table).with_geocoder(geocoder.clone());
        let aggregator = Arc::new(aggregator);
        let catalog = Arc::new(ToolCatalog::standard());

        let dispatcher = ToolDispatcher::new(catalog, resolver.clone(), aggregator.clone(), geocoder);
        let mut pipeline = PipelineOrchestrator::new(resolver, aggregator);
        if let Some(narrator) = narrator {
            pipeline = pipeline.with_narrator(narrator);
        }

        Ok(Self { dispatcher, pipeline })
    }
}
