//! Router assembly and shared state.

use std::sync::Arc;

use axum::{
    middleware,
    routing::{any, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::config::GatewayConfig;
use crate::gate;
use crate::handlers;
use crate::upstream::UpstreamClient;

/// Shared application state. Immutable after startup; nothing request-scoped
/// lives here.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GatewayConfig>,
    pub upstream: Arc<UpstreamClient>,
}

impl AppState {
    pub fn new(config: GatewayConfig) -> Self {
        let upstream = Arc::new(UpstreamClient::new(config.upstream.clone()));
        Self { config: Arc::new(config), upstream }
    }
}

/// Build the gateway router.
///
/// The origin gate is the outermost layer so it runs before route matching:
/// it answers OPTIONS preflights for every path, short-circuits denials, and
/// stamps the CORS header onto permitted responses (including the 404/405
/// fallbacks).
pub fn build_gateway_router(state: AppState) -> Router {
    let config = state.config.clone();

    Router::new()
        .route("/", any(handlers::meta::handle_banner))
        .route("/health", any(handlers::meta::handle_health))
        .route("/debug", any(handlers::meta::handle_debug))
        .route("/test", any(handlers::meta::handle_test))
        .route(
            "/api/query",
            post(handlers::query::handle_query)
                .fallback(handlers::query::handle_method_not_allowed),
        )
        .fallback(handlers::meta::handle_not_found)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn_with_state(config, gate::origin_gate_middleware))
}
