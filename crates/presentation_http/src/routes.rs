//! Route definitions

use axum::{Router, routing::get};

use crate::{handlers, middleware::RequestIdLayer, state::AppState};

/// Create the main router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health and status endpoints
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check))
        // HTML pages
        .route("/", get(handlers::pages::index))
        .route("/routes/{id}", get(handlers::pages::route_detail))
        // JSON API
        .route("/api/routes", get(handlers::api::list_routes))
        .route("/api/routes/{id}", get(handlers::api::get_route))
        .route("/api/routes/{id}/stops", get(handlers::api::list_stops))
        .fallback(handlers::pages::not_found)
        .layer(RequestIdLayer::new())
        .with_state(state)
}
