//! `/api/query` — the upstream adapter endpoint.

use axum::{
    extract::State,
    http::{Method, StatusCode},
    response::{IntoResponse, Json, Response},
    Extension,
};
use serde::Deserialize;
use serde_json::json;

use super::now_iso;
use crate::error::{GatewayError, GatewayResult};
use crate::gate::RequestContext;
use crate::server::AppState;

#[derive(Debug, Deserialize)]
struct QueryRequest {
    /// `input` is the legacy variant's field name for the same thing.
    #[serde(alias = "input")]
    query: Option<String>,
}

/// `POST /api/query` — forward one query to the inference API and wrap the
/// generated text in the success envelope.
pub async fn handle_query(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    body: String,
) -> Response {
    match run_query(&state, &body).await {
        Ok(text) => (
            StatusCode::OK,
            Json(json!({
                "response": text,
                "status": "success",
                "timestamp": now_iso(),
                "model": state.upstream.model(),
                "access_type": ctx.access_type.as_str(),
            })),
        )
            .into_response(),
        Err(err) => error_response(err),
    }
}

/// Parse the body, validate, and run the single upstream call.
///
/// The body is parsed by hand: a malformed body is an internal failure
/// envelope, not an axum extractor rejection.
async fn run_query(state: &AppState, body: &str) -> GatewayResult<String> {
    let request: QueryRequest = serde_json::from_str(body)?;

    let query = request
        .query
        .filter(|q| !q.trim().is_empty())
        .ok_or(GatewayError::MissingQuery)?;

    let token = state
        .config
        .api_token
        .as_deref()
        .ok_or(GatewayError::TokenNotConfigured)?;

    state.upstream.generate(&query, token).await
}

/// `/api/query` with any method other than POST.
pub async fn handle_method_not_allowed(method: Method) -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({
            "error": "Method not allowed",
            "message": "/api/query only accepts POST requests",
            "received_method": method.as_str(),
            "required_method": "POST",
            "usage": {
                "endpoint": "/api/query",
                "method": "POST",
                "body": { "query": "Your question here" }
            }
        })),
    )
        .into_response()
}

fn error_response(err: GatewayError) -> Response {
    match err {
        GatewayError::MissingQuery => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "Query is required",
                "message": "Please provide a query in request body",
                "example": { "query": "What is the weather like?" }
            })),
        )
            .into_response(),
        GatewayError::TokenNotConfigured => {
            tracing::error!("Query rejected: no upstream API token configured");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "API token not configured",
                    "debug": "HUGGINGFACE_TOKEN environment variable not set"
                })),
            )
                .into_response()
        }
        // Upstream answered with an error status: propagate it verbatim.
        GatewayError::Upstream { status, body } => upstream_error(status, body),
        // Transport-level failure: upstream never produced a status.
        GatewayError::Network(err) => {
            tracing::error!("Upstream request failed: {}", err);
            upstream_error(StatusCode::BAD_GATEWAY.as_u16(), err.to_string())
        }
        other => {
            tracing::warn!("Query processing failed: {}", other);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Failed to process query",
                    "message": other.to_string(),
                })),
            )
                .into_response()
        }
    }
}

fn upstream_error(status: u16, details: String) -> Response {
    let code = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
    (
        code,
        Json(json!({
            "error": "AI service error",
            "status": status,
            "details": details,
        })),
    )
        .into_response()
}
