//! Shared state and router assembly for the API.

use std::sync::Arc;

use axum::{Router, routing::get};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use binday_core::ports::{PageRenderer, Readiness};
use binday_core::service::CollectionService;

use crate::routes;

#[derive(Clone)]
/// Shared application state handed to every handler.
pub(crate) struct AppState {
    /// Cache-backed schedule service.
    pub service: Arc<CollectionService>,
    /// Renderer used directly by the debug render endpoint.
    pub renderer: Arc<dyn PageRenderer>,
    /// Readiness condition applied to debug renders.
    pub debug_readiness: Readiness,
}

/// Assemble the router with every API route and the shared middleware.
pub(crate) fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/healthcheck", get(routes::healthcheck))
        .route("/api/v1/bin/:id", get(routes::bin_schedule))
        .route("/api/v1/bin/:id/next_collections", get(routes::next_collections))
        .route("/api/v1/bin/:id/bins_for_tomorrow", get(routes::bins_for_tomorrow))
        .route("/api/v1/bin/:id/bins_for_tomorrow_test", get(routes::bins_for_tomorrow_test))
        .route("/api/v1/cache", get(routes::cache_contents))
        .route("/api/v1/debug/render", get(routes::debug_render))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
