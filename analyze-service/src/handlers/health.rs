use axum::{extract::State, response::IntoResponse, Json};
use serde_json::json;

use crate::startup::AppState;

pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "analyze-service",
        "version": env!("CARGO_PKG_VERSION"),
        "openai_credential": state.config.has_openai_credential()
    }))
}
