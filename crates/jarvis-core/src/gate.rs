//! Origin gate middleware.
//!
//! Runs outside the route table so it also covers unknown paths: decides
//! whether the request's declared origin (or user-agent, for direct access)
//! is permitted, answers CORS preflights, and echoes the allow-origin header
//! on every permitted response. Denials are deliberately not CORS-enabled:
//! a cross-origin caller that was refused cannot read the refusal body.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::config::{GatePolicy, GatewayConfig};

/// User-agent substrings accepted as "direct access" when no `Origin`
/// header is present: browsers, curl, and the gateway's own status probe.
const DIRECT_ACCESS_AGENTS: &[&str] = &["Mozilla", "curl", "jarvis-server"];

/// Outcome of the gate check for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginDecision {
    pub allowed: bool,
    /// `Access-Control-Allow-Origin` value to echo when allowed.
    pub echo: Option<String>,
}

impl OriginDecision {
    fn denied() -> Self {
        Self { allowed: false, echo: None }
    }

    fn allowed(echo: String) -> Self {
        Self { allowed: true, echo: Some(echo) }
    }
}

/// How the caller reached the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessType {
    /// Request carried an `Origin` header (browser CORS flow).
    Cors,
    /// No `Origin` header (curl, direct browser navigation).
    Direct,
}

impl AccessType {
    pub fn as_str(self) -> &'static str {
        match self {
            AccessType::Cors => "cors",
            AccessType::Direct => "direct",
        }
    }
}

/// Request-scoped values the gate hands down to handlers via extensions.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub origin: Option<String>,
    pub user_agent: Option<String>,
    pub access_type: AccessType,
}

impl RequestContext {
    /// Origin string for response bodies, `fallback` when absent
    /// (`"direct_access"` in echoes, `"none"` in denial debug).
    pub fn origin_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.origin.as_deref().unwrap_or(fallback)
    }

    pub fn user_agent_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.user_agent.as_deref().unwrap_or(fallback)
    }
}

/// Evaluate the configured policy against the request's `Origin` and
/// `User-Agent` headers.
pub fn evaluate(
    config: &GatewayConfig,
    origin: Option<&str>,
    user_agent: Option<&str>,
) -> OriginDecision {
    match origin {
        Some(origin) => {
            if config.allowed_origins.iter().any(|allowed| allowed == origin) {
                OriginDecision::allowed(origin.to_string())
            } else {
                OriginDecision::denied()
            }
        }
        None => match config.gate_policy {
            // Strict variant: an absent Origin is always denied.
            GatePolicy::Strict => OriginDecision::denied(),
            GatePolicy::Permissive => {
                let direct = user_agent
                    .is_some_and(|ua| DIRECT_ACCESS_AGENTS.iter().any(|sig| ua.contains(sig)));
                if direct {
                    OriginDecision::allowed(config.default_allow_origin.clone())
                } else {
                    OriginDecision::denied()
                }
            }
        },
    }
}

pub async fn origin_gate_middleware(
    State(config): State<Arc<GatewayConfig>>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let origin = header_str(&request, header::ORIGIN);
    let user_agent = header_str(&request, header::USER_AGENT);

    let decision = evaluate(&config, origin.as_deref(), user_agent.as_deref());

    if method == Method::OPTIONS {
        return if let Some(echo) = decision.echo {
            preflight_response(&echo)
        } else {
            tracing::warn!("Preflight denied: {} {}", method, path);
            StatusCode::FORBIDDEN.into_response()
        };
    }

    let Some(echo) = decision.echo else {
        tracing::warn!(
            "Access denied: {} {} (origin: {}, user_agent: {})",
            method,
            path,
            origin.as_deref().unwrap_or("none"),
            user_agent.as_deref().unwrap_or("none"),
        );
        return denial_response(&config, origin.as_deref(), user_agent.as_deref());
    };

    tracing::info!("Request: {} {}", method, path);

    let context = RequestContext {
        access_type: if origin.is_some() { AccessType::Cors } else { AccessType::Direct },
        origin,
        user_agent,
    };

    let mut request = request;
    request.extensions_mut().insert(context);

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&echo) {
        response.headers_mut().insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, value);
    }
    response
}

fn header_str(request: &Request, name: header::HeaderName) -> Option<String> {
    request.headers().get(name).and_then(|v| v.to_str().ok()).map(str::to_string)
}

fn preflight_response(echo: &str) -> Response {
    (
        StatusCode::OK,
        [
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, echo.to_string()),
            (header::ACCESS_CONTROL_ALLOW_METHODS, "GET, POST, PUT, DELETE, OPTIONS".to_string()),
            (header::ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type, Authorization".to_string()),
            (header::ACCESS_CONTROL_MAX_AGE, "86400".to_string()),
        ],
    )
        .into_response()
}

/// 403 body for non-preflight requests. Carries no CORS header.
fn denial_response(
    config: &GatewayConfig,
    origin: Option<&str>,
    user_agent: Option<&str>,
) -> Response {
    let canonical = config.allowed_origins.first().map(String::as_str).unwrap_or("an allowed origin");
    (
        StatusCode::FORBIDDEN,
        Json(json!({
            "error": "Access denied",
            "message": format!(
                "This API can only be accessed from {} or directly for testing",
                canonical
            ),
            "debug": {
                "origin": origin.unwrap_or("none"),
                "user_agent": user_agent.unwrap_or("none"),
            }
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(policy: GatePolicy) -> GatewayConfig {
        GatewayConfig { gate_policy: policy, ..GatewayConfig::default() }
    }

    #[test]
    fn allowed_origin_is_echoed() {
        let config = test_config(GatePolicy::Permissive);
        let decision = evaluate(&config, Some("https://jarvis-997.pages.dev"), None);
        assert!(decision.allowed);
        assert_eq!(decision.echo.as_deref(), Some("https://jarvis-997.pages.dev"));
    }

    #[test]
    fn null_origin_is_on_the_default_allow_list() {
        let config = test_config(GatePolicy::Permissive);
        let decision = evaluate(&config, Some("null"), Some("Mozilla/5.0"));
        assert!(decision.allowed);
        assert_eq!(decision.echo.as_deref(), Some("null"));
    }

    #[test]
    fn unknown_origin_is_denied_even_with_browser_agent() {
        let config = test_config(GatePolicy::Permissive);
        let decision = evaluate(&config, Some("https://evil.example"), Some("Mozilla/5.0"));
        assert_eq!(decision, OriginDecision::denied());
    }

    #[test]
    fn absent_origin_with_browser_agent_gets_default_echo() {
        let config = test_config(GatePolicy::Permissive);
        let decision = evaluate(&config, None, Some("Mozilla/5.0 (X11; Linux x86_64)"));
        assert!(decision.allowed);
        assert_eq!(decision.echo.as_deref(), Some("*"));
    }

    #[test]
    fn absent_origin_with_curl_agent_is_direct_access() {
        let config = test_config(GatePolicy::Permissive);
        let decision = evaluate(&config, None, Some("curl/8.5.0"));
        assert!(decision.allowed);
    }

    #[test]
    fn absent_origin_with_unknown_agent_is_denied() {
        let config = test_config(GatePolicy::Permissive);
        let decision = evaluate(&config, None, Some("python-requests/2.31"));
        assert_eq!(decision, OriginDecision::denied());
    }

    #[test]
    fn absent_everything_is_denied() {
        let config = test_config(GatePolicy::Permissive);
        assert_eq!(evaluate(&config, None, None), OriginDecision::denied());
    }

    #[test]
    fn strict_policy_has_no_user_agent_fallback() {
        let config = test_config(GatePolicy::Strict);
        let decision = evaluate(&config, None, Some("Mozilla/5.0"));
        assert_eq!(decision, OriginDecision::denied());
    }

    #[test]
    fn strict_policy_still_accepts_listed_origins() {
        let config = test_config(GatePolicy::Strict);
        let decision = evaluate(&config, Some("https://jarvis-997.pages.dev"), None);
        assert!(decision.allowed);
    }
}
