// Gatehouse Control Plane Library
// Decision: Router assembly lives here so the binary and tests share it

// API routes and DTOs
pub mod api;

// Authentication gate and session login routes
pub mod auth;

pub mod config;
pub mod state;
pub mod telemetry;

pub use config::ServerConfig;
pub use state::AppState;

use axum::{middleware, Router};
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};
use tower_http::trace::TraceLayer;

/// All routes. The gate wraps `/api/v1/*`; the account routes stay outside it.
pub fn build_app(state: AppState) -> Router {
    let gated = Router::new()
        .merge(api::index::routes(state.clone()))
        .merge(api::users::routes(state.clone()))
        .merge(auth::routes(state.clone()))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_auth,
        ));

    Router::new()
        .merge(gated)
        .merge(api::accounts::routes(state))
        .fallback(api::common::not_found)
}

/// Request tracing plus trailing-slash normalization, applied outermost
pub fn into_service(app: Router) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(app.layer(TraceLayer::new_for_http()))
}
