use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::{
    app::Services,
    models::SurfSpot,
    pipeline::SurfReport,
    spots::SpotIdentifier,
    tools::{ToolCallRequest, ToolCallResponse, ToolDescriptor},
};

/// Tool descriptor plus its JSON-Schema form
#[derive(Serialize)]
pub struct ApiTool {
    #[serde(flatten)]
    pub descriptor: ToolDescriptor,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

impl From<&ToolDescriptor> for ApiTool {
    fn from(descriptor: &ToolDescriptor) -> Self {
        Self {
            descriptor: descriptor.clone(),
            input_schema: descriptor.input_schema(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ReportRequest {
    #[serde(default)]
    pub spot: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub address: Option<String>,
}

impl ReportRequest {
    fn identifier(&self) -> crate::Result<SpotIdentifier> {
        match self.address.as_deref().map(str::trim) {
            Some(address) if !address.is_empty() => Ok(SpotIdentifier::Address(address.to_string())),
            _ => SpotIdentifier::from_parts(&self.spot, self.latitude, self.longitude),
        }
    }
}

pub fn router(services: Services) -> Router {
    Router::new()
        .route("/tools", get(list_tools))
        .route("/tools/call", post(call_tool))
        .route("/spots", get(list_spots))
        .route("/report", post(create_report))
        .with_state(services)
}

async fn list_tools(State(services): State<Services>) -> Json<Vec<ApiTool>> {
    Json(services.dispatcher.list_tools().iter().map(ApiTool::from).collect())
}

async fn call_tool(
    State(services): State<Services>,
    Json(request): Json<ToolCallRequest>,
) -> Json<ToolCallResponse> {
    Json(services.dispatcher.call(request).await)
}

async fn list_spots(State(services): State<Services>) -> Json<Vec<SurfSpot>> {
    Json(services.pipeline.resolver().table().spots().to_vec())
}

async fn create_report(
    State(services): State<Services>,
    Json(request): Json<ReportRequest>,
) -> Result<Json<SurfReport>, (StatusCode, Json<Value>)> {
    let identifier = request
        .identifier()
        .map_err(|e| (StatusCode::BAD_REQUEST, Json(json!({"error": e.user_message()}))))?;
    Ok(Json(services.pipeline.report(&identifier).await))
}
