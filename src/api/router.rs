use axum::{middleware, routing::get, Router};
use tower_http::trace::TraceLayer;

use super::health;
use super::key_value;
use super::middleware::{logging_middleware, metrics_middleware};
use super::state::AppState;

/// Create the full router with application state
pub fn create_router_with_state(state: AppState) -> Router {
    Router::new()
        // Health endpoints
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        .route("/live", get(health::live_check))
        // Key-value CRUD API
        .nest("/api", key_value::create_key_value_router())
        .route_layer(middleware::from_fn(metrics_middleware))
        .route_layer(middleware::from_fn(logging_middleware))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
