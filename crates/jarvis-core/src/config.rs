//! Gateway configuration types.
//!
//! A `GatewayConfig` is assembled once at startup (CLI flags / environment)
//! and shared immutably behind an `Arc`; nothing here changes per request.

use serde::{Deserialize, Serialize};

/// Which access-control variant the origin gate applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum GatePolicy {
    /// Exact allow-list match, with a user-agent fallback for requests that
    /// carry no `Origin` header (direct browser/curl access for testing).
    #[default]
    Permissive,
    /// Exact allow-list match only. Absent `Origin` is always denied.
    Strict,
}

/// Which upstream inference API flavor to speak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum UpstreamApi {
    /// OpenAI-style `/chat/completions` (messages array, `max_tokens`).
    #[default]
    ChatCompletions,
    /// Legacy hosted-inference text generation (`inputs` + `parameters`).
    TextGeneration,
}

/// Upstream inference endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// API flavor; controls the request body shape.
    #[serde(default)]
    pub api: UpstreamApi,

    /// Full endpoint URL the query is POSTed to.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Model identifier sent upstream and echoed in the success envelope.
    #[serde(default = "default_model")]
    pub model: String,

    /// Completion length cap (`max_tokens` / `max_new_tokens`).
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f64,
}

fn default_endpoint() -> String {
    "https://router.huggingface.co/v1/chat/completions".to_string()
}

fn default_model() -> String {
    "deepseek-ai/DeepSeek-V3".to_string()
}

fn default_max_tokens() -> u32 {
    100
}

fn default_temperature() -> f64 {
    0.7
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            api: UpstreamApi::ChatCompletions,
            endpoint: default_endpoint(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

/// Gateway configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// TCP port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Exact origin strings the gate accepts. The literal string `"null"`
    /// covers file:// pages and sandboxed iframes.
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,

    /// Access-control variant.
    #[serde(default)]
    pub gate_policy: GatePolicy,

    /// `Access-Control-Allow-Origin` value echoed when the request carried
    /// no `Origin` header.
    #[serde(default = "default_allow_origin")]
    pub default_allow_origin: String,

    /// Bearer token for the upstream API. Absence is a recoverable
    /// per-request error, not a startup failure.
    #[serde(default, skip_serializing)]
    pub api_token: Option<String>,

    /// Upstream endpoint configuration.
    #[serde(default)]
    pub upstream: UpstreamConfig,
}

fn default_port() -> u16 {
    8790
}

fn default_allowed_origins() -> Vec<String> {
    vec![
        "https://jarvis-997.pages.dev".to_string(),
        "https://jarvis-997.pages.dev/".to_string(),
        "null".to_string(),
    ]
}

fn default_allow_origin() -> String {
    "*".to_string()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            allowed_origins: default_allowed_origins(),
            gate_policy: GatePolicy::Permissive,
            default_allow_origin: default_allow_origin(),
            api_token: None,
            upstream: UpstreamConfig::default(),
        }
    }
}

impl GatewayConfig {
    /// Read the upstream token from the environment, keeping any value that
    /// was already set explicitly (tests inject the token directly).
    pub fn with_env_token(mut self) -> Self {
        if self.api_token.is_none() {
            self.api_token = std::env::var("HUGGINGFACE_TOKEN").ok().filter(|t| !t.is_empty());
        }
        self
    }
}
