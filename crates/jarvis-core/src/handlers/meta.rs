//! Banner, liveness, and diagnostic echo endpoints, plus the 404 fallback.

use std::collections::HashMap;

use axum::{
    extract::{OriginalUri, Query},
    http::{HeaderMap, Method, StatusCode},
    response::{IntoResponse, Json, Response},
    Extension,
};
use serde_json::{json, Map, Value};

use super::{now_iso, AVAILABLE_ENDPOINTS};
use crate::gate::RequestContext;

/// `GET|* /` — service banner.
pub async fn handle_banner(Extension(ctx): Extension<RequestContext>) -> Json<Value> {
    Json(json!({
        "message": "J.A.R.V.I.S. Backend is running!",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": &AVAILABLE_ENDPOINTS[1..],
        "timestamp": now_iso(),
        "access_type": ctx.access_type.as_str(),
    }))
}

/// `GET|* /health` — liveness status.
pub async fn handle_health(Extension(ctx): Extension<RequestContext>) -> Json<Value> {
    Json(json!({
        "status": "J.A.R.V.I.S. online",
        "timestamp": now_iso(),
        "version": env!("CARGO_PKG_VERSION"),
        "origin": ctx.origin_or("direct_access"),
        "access_type": ctx.access_type.as_str(),
        "user_agent": ctx.user_agent_or("none"),
    }))
}

/// `GET|* /debug` — full request echo for diagnostics.
pub async fn handle_debug(
    method: Method,
    OriginalUri(uri): OriginalUri,
    Query(query_params): Query<HashMap<String, String>>,
    headers: HeaderMap,
    Extension(ctx): Extension<RequestContext>,
) -> Json<Value> {
    let header_map: Map<String, Value> = headers
        .iter()
        .map(|(name, value)| {
            (name.as_str().to_string(), Value::from(value.to_str().unwrap_or("")))
        })
        .collect();

    Json(json!({
        "message": "Debug information",
        "method": method.as_str(),
        "url": uri.to_string(),
        "path": uri.path(),
        "origin": ctx.origin_or("direct_access"),
        "access_type": ctx.access_type.as_str(),
        "user_agent": ctx.user_agent_or("none"),
        "headers": header_map,
        "query_params": query_params,
    }))
}

/// `GET|* /test` — diagnostic echo.
pub async fn handle_test(
    method: Method,
    OriginalUri(uri): OriginalUri,
    Extension(ctx): Extension<RequestContext>,
) -> Json<Value> {
    Json(json!({
        "message": "Test endpoint working!",
        "method": method.as_str(),
        "url": uri.to_string(),
        "origin": ctx.origin_or("direct_access"),
        "access_type": ctx.access_type.as_str(),
        "timestamp": now_iso(),
    }))
}

/// Router fallback for unknown paths.
pub async fn handle_not_found(method: Method, OriginalUri(uri): OriginalUri) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "Endpoint not found",
            "message": format!("The path {} is not available", uri.path()),
            "available_endpoints": AVAILABLE_ENDPOINTS,
            "received_path": uri.path(),
            "received_method": method.as_str(),
        })),
    )
        .into_response()
}
