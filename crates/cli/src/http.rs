//! HTTP front end: the same command envelopes over `POST /command`.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use copper_tool_runtime::{CommandResponse, Dispatcher, ToolDefinition};
use serde::Serialize;
use serde_json::Value;
use tower_http::cors::CorsLayer;

pub struct AppState {
    pub dispatcher: Dispatcher,
    pub config: Value,
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    tools: usize,
    config: Value,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/tools", get(tools))
        .route("/command", post(command))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        tools: state.dispatcher.tools().len(),
        config: state.config.clone(),
    })
}

async fn tools(State(state): State<Arc<AppState>>) -> Json<Vec<ToolDefinition>> {
    Json(state.dispatcher.tools())
}

async fn command(State(state): State<Arc<AppState>>, Json(body): Json<Value>) -> (StatusCode, Json<CommandResponse>) {
    let response = state.dispatcher.dispatch(body).await;
    (status_for(&response), Json(response))
}

/// HTTP status for a response envelope, keyed on the error type code.
pub fn status_for(response: &CommandResponse) -> StatusCode {
    match response {
        CommandResponse::Success { .. } => StatusCode::OK,
        CommandResponse::Error { error } => match error.code.as_str() {
            "VALIDATION_ERROR" => StatusCode::BAD_REQUEST,
            "TRANSFORMATION_ERROR" => StatusCode::UNPROCESSABLE_ENTITY,
            "NOT_FOUND_ERROR" | "UNKNOWN_COMMAND" => StatusCode::NOT_FOUND,
            "AUTHENTICATION_ERROR" => StatusCode::UNAUTHORIZED,
            "RATE_LIMIT_ERROR" => StatusCode::TOO_MANY_REQUESTS,
            "UPSTREAM_API_ERROR" => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        },
    }
}
