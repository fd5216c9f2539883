// Status and diagnostic routes

use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};

use super::common::ApiError;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/status", get(status))
        .route("/api/v1/stats", get(stats))
        .route("/api/v1/unauthorized", get(unauthorized))
        .route("/api/v1/forbidden", get(forbidden))
        .with_state(state)
}

/// GET /api/v1/status
pub async fn status() -> Json<Value> {
    Json(json!({ "status": "OK" }))
}

/// GET /api/v1/stats - Object counts
pub async fn stats(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let users = state.directory.count().await?;
    Ok(Json(json!({ "users": users })))
}

/// GET /api/v1/unauthorized - Always 401
pub async fn unauthorized() -> ApiError {
    ApiError::unauthorized()
}

/// GET /api/v1/forbidden - Always 403
pub async fn forbidden() -> ApiError {
    ApiError::forbidden()
}
