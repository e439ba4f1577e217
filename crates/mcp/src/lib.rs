//! Protocol layer — axum router, the five operation handlers, and error
//! mapping.
//!
//! One endpoint per operation under `/mcp/`, plus a liveness endpoint.
//! Authentication gating is centralized here (through the catalog's
//! partition), not duplicated per handler; a panic anywhere below is caught
//! at this layer and shaped as an internal error.

pub mod catalog;
pub mod error;
pub mod format;
pub mod protocol;
pub mod resources;
pub mod timeline;
pub mod tools;

pub use error::ApiError;
pub use timeline::TimelineDispatcher;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Query, State},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use protocol::{CallToolRequest, CallToolResponse, InitializeRequest, InitializeResponse, ReadResourceResponse};
use remilk_auth::AuthController;
use remilk_types::{GatewayError, RtmApi};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

/// Shared application state passed to all route handlers.
pub struct AppState {
    /// The backend API, behind its trait so tests can script it.
    pub backend: Arc<dyn RtmApi>,
    /// Auth status, flow and token lifecycle.
    pub auth: Arc<AuthController>,
    /// Fresh transaction handles for mutating tools.
    pub timeline: TimelineDispatcher,
}

impl AppState {
    /// Creates the shared application state wrapped in an `Arc`.
    pub fn new(backend: Arc<dyn RtmApi>, auth: Arc<AuthController>) -> Arc<Self> {
        Arc::new(Self {
            timeline: TimelineDispatcher::new(backend.clone()),
            backend,
            auth,
        })
    }
}

/// Build the full axum router.
///
/// Routes:
/// - POST /mcp/initialize       capability negotiation
/// - GET  /mcp/list_resources
/// - GET  /mcp/read_resource    `?name=<resource>`
/// - GET  /mcp/list_tools
/// - POST /mcp/call_tool        `{name, arguments, id?}`
/// - GET  /health               liveness
pub fn make_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/mcp/initialize", post(initialize))
        .route("/mcp/list_resources", get(list_resources))
        .route("/mcp/read_resource", get(read_resource))
        .route("/mcp/list_tools", get(list_tools))
        .route("/mcp/call_tool", post(call_tool))
        .route("/health", get(health))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(handle_panic))
}

async fn initialize(body: Bytes) -> Result<Json<InitializeResponse>, ApiError> {
    // An empty body is a legal negotiation; malformed JSON is not.
    let req: InitializeRequest = if body.is_empty() {
        InitializeRequest::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| GatewayError::Parse(e.to_string()))?
    };
    tracing::info!(
        client = req.client_name.as_deref().unwrap_or("unknown"),
        version = req.client_version.as_deref().unwrap_or(""),
        "initialize"
    );
    Ok(Json(InitializeResponse::current()))
}

async fn list_resources(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let visible = catalog::visible_resources(state.auth.is_authenticated());
    Json(json!({ "resources": visible }))
}

async fn list_tools(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let visible = catalog::visible_tools(state.auth.is_authenticated());
    Json(json!({ "tools": visible }))
}

#[derive(Debug, Deserialize)]
struct ReadResourceParams {
    name: Option<String>,
}

async fn read_resource(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ReadResourceParams>,
) -> Result<Json<ReadResourceResponse>, ApiError> {
    let name = params
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| GatewayError::missing_arg("name"))?;

    let (content, mime_type) = resources::read(&state, name).await?;
    Ok(Json(ReadResourceResponse { content, mime_type }))
}

async fn call_tool(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<CallToolResponse>, ApiError> {
    let req: CallToolRequest = if body.is_empty() {
        CallToolRequest::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| GatewayError::Parse(e.to_string()))?
    };
    let id = req.id.clone();

    let name = req
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ApiError::from(GatewayError::missing_arg("name")).with_id(id.clone()))?;

    let result = tools::call(&state, name, &req.arguments)
        .await
        .map_err(|e| ApiError::from(e).with_id(id))?;
    Ok(Json(CallToolResponse { result }))
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// Outermost failure path: a panic below becomes an internal error response
/// instead of a dropped connection.
fn handle_panic(err: Box<dyn std::any::Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "panic with non-string payload".to_string()
    };
    ApiError::from(GatewayError::Internal(format!("panic: {detail}"))).into_response()
}

#[cfg(test)]
pub(crate) mod testutil;
