use std::sync::Arc;

use futures::future::join_all;
use serde_json::{Value, json};
use tracing::{debug, info, instrument, warn};

use super::{DispatchError, SpotQuery, ToolCall, ToolCallRequest, ToolCallResponse, ToolCatalog, ToolDescriptor};
use crate::aggregator::ForecastAggregator;
use crate::models::Coordinates;
use crate::spots::CoordinateResolver;
use crate::weather::{GeocodingCandidate, Geocoder};

/// Candidates requested from the geocoder per lookup
const GEOCODING_COUNT: u8 = 5;
/// Candidates returned to the caller
const MAX_COORDINATE_RESULTS: usize = 3;

/// Routes tool calls to their handlers
///
/// Holds no per-call state; clones share the same catalog and clients, so
/// concurrent calls do not interfere.
#[derive(Clone)]
pub struct ToolDispatcher {
    catalog: Arc<ToolCatalog>,
    resolver: CoordinateResolver,
    aggregator: Arc<ForecastAggregator>,
    geocoder: Arc<dyn Geocoder>,
}

impl ToolDispatcher {
    #[must_use]
    pub fn new(
        catalog: Arc<ToolCatalog>,
        resolver: CoordinateResolver,
        aggregator: Arc<ForecastAggregator>,
        geocoder: Arc<dyn Geocoder>,
    ) -> Self {
        Self {
            catalog,
            resolver,
            aggregator,
            geocoder,
        }
    }

    #[must_use]
    pub fn list_tools(&self) -> &[ToolDescriptor] {
        self.catalog.descriptors()
    }

    /// Run one call; every outcome is reported through the envelope
    #[instrument(skip(self, request), fields(tool = %request.tool_name))]
    pub async fn call(&self, request: ToolCallRequest) -> ToolCallResponse {
        let call = match self.parse(&request) {
            Ok(call) => call,
            Err(err) => {
                warn!("Rejected tool call: {}", err);
                return err.into();
            }
        };

        let tool_name = call.kind().name();
        let response = match call {
            ToolCall::WeatherForecast(coordinates) => self.weather_forecast(tool_name, coordinates).await,
            ToolCall::SpotInfo(query) => spot_info(&query),
            ToolCall::SpotCoordinates(query) => self.spot_coordinates(tool_name, &query).await,
        };
        info!("Tool {} finished (success: {})", tool_name, response.success);
        response
    }

    /// Run several calls concurrently, answering in request order
    pub async fn call_all(&self, requests: Vec<ToolCallRequest>) -> Vec<ToolCallResponse> {
        join_all(requests.into_iter().map(|request| self.call(request))).await
    }

    fn parse(&self, request: &ToolCallRequest) -> Result<ToolCall, DispatchError> {
        let descriptor = self
            .catalog
            .get(&request.tool_name)
            .ok_or_else(|| DispatchError::UnknownTool(request.tool_name.clone()))?;
        ToolCall::parse(descriptor, &request.arguments)
    }

    async fn weather_forecast(&self, tool_name: &str, coordinates: Coordinates) -> ToolCallResponse {
        match self.aggregator.aggregate(coordinates).await {
            Ok(forecast) => match serde_json::to_value(&forecast) {
                Ok(value) => ToolCallResponse::structured(value),
                Err(e) => ToolCallResponse::failure(tool_name, format!("Error fetching weather data: {e}")),
            },
            Err(e) => ToolCallResponse::failure(tool_name, format!("Error fetching weather data: {e}")),
        }
    }

    async fn spot_coordinates(&self, tool_name: &str, query: &SpotQuery) -> ToolCallResponse {
        let place = query.place();

        if let Some(spot) = self.resolver.table().get(&query.spot_name) {
            debug!("Found '{}' in the spot table", spot.name);
            return ToolCallResponse::structured(json!({
                "query": place,
                "results": [{
                    "name": spot.name,
                    "latitude": spot.coordinates.latitude(),
                    "longitude": spot.coordinates.longitude(),
                    "country": Value::Null,
                    "admin1": Value::Null,
                }],
            }));
        }

        match self.geocoder.search(&place, GEOCODING_COUNT).await {
            Ok(candidates) if candidates.is_empty() => {
                ToolCallResponse::text(format!("No coordinates found for {place}"))
            }
            Ok(candidates) => {
                let results: Vec<GeocodingCandidate> =
                    candidates.into_iter().take(MAX_COORDINATE_RESULTS).collect();
                ToolCallResponse::structured(json!({
                    "query": place,
                    "results": results,
                }))
            }
            Err(e) => ToolCallResponse::failure(tool_name, format!("Error getting coordinates: {e}")),
        }
    }
}

fn spot_info(query: &SpotQuery) -> ToolCallResponse {
    ToolCallResponse::text(format!(
        "Search query prepared: '{}'\n\nNote: no live web search is performed. Use this query with a surf \
         forecasting site such as Surfline or a local surf report to find optimal conditions for {}.",
        query.search_query(),
        query.spot_name
    ))
}
