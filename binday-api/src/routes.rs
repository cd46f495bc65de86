//! HTTP handlers for the collection schedule API.
//!
//! Successful lookups return their payload directly; failed lookups return a
//! `{"error", "id"}` body. Either way the status is 200, which is what the
//! service's long-standing clients expect.

use std::collections::HashMap;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::response::{Html, IntoResponse, Response};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::warn;

use binday_core::model::{CacheEntry, PropertyId};
use binday_core::ports::ScheduleError;

use crate::app::AppState;

/// Healthcheck reporting whether the cache holds any data yet.
pub(crate) async fn healthcheck(State(state): State<AppState>) -> Json<Value> {
    let cache_size = state.service.cache_len().await;
    if cache_size > 0 {
        Json(json!({ "status": "ok", "cacheSize": cache_size }))
    } else {
        Json(json!({ "status": "error", "message": "No cache data found" }))
    }
}

/// Full schedule for one property.
pub(crate) async fn bin_schedule(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Response {
    match state.service.schedule(&raw_id).await {
        Ok(schedule) => Json(schedule).into_response(),
        Err(err) => error_response(&raw_id, &err),
    }
}

/// Summary of the soonest upcoming collection for one property.
pub(crate) async fn next_collections(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Response {
    match state.service.next_collections(&raw_id).await {
        Ok(summary) => Json(summary).into_response(),
        Err(err) => error_response(&raw_id, &err),
    }
}

/// Categories due for collection tomorrow.
pub(crate) async fn bins_for_tomorrow(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Response {
    match state.service.bins_for_tomorrow(&raw_id).await {
        Ok(bins) => Json(bins).into_response(),
        Err(err) => error_response(&raw_id, &err),
    }
}

/// Static fixture used by downstream display clients while developing.
pub(crate) async fn bins_for_tomorrow_test() -> Json<Value> {
    Json(json!([
        "Food Waste",
        "Mixed Recycling (Cans, Plastics & Glass)",
        "Paper & Cardboard",
        "Non-Recyclable Refuse",
        "Bulky Waste",
        "Batteries, small electrical items and textiles"
    ]))
}

/// Dump of the whole cache, keyed by property id.
pub(crate) async fn cache_contents(
    State(state): State<AppState>,
) -> Json<HashMap<PropertyId, CacheEntry>> {
    Json(state.service.cache_snapshot().await)
}

#[derive(Debug, Deserialize)]
/// Query parameters accepted by the debug render endpoint.
pub(crate) struct RenderParams {
    url: Option<String>,
}

/// Render an arbitrary URL through the page renderer and return its markup.
pub(crate) async fn debug_render(
    State(state): State<AppState>,
    Query(params): Query<RenderParams>,
) -> Response {
    let Some(url) = params.url else {
        return "please provide url".into_response();
    };
    match state.renderer.render(&url, &state.debug_readiness).await {
        Ok(markup) => Html(markup).into_response(),
        Err(err) => {
            warn!("debug render of {url} failed: {err}");
            format!("Error fetching {url}").into_response()
        }
    }
}

fn error_response(raw_id: &str, err: &ScheduleError) -> Response {
    warn!("request for bin {raw_id:?} failed: {err}");
    Json(json!({ "error": err.to_string(), "id": raw_id })).into_response()
}
