//! Unified error types for the JARVIS gateway.

use serde::Serialize;
use thiserror::Error;

/// Main error type for all gateway operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum GatewayError {
    /// Network request to the upstream inference API failed.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Request body carried no usable query string.
    #[error("Query is required")]
    MissingQuery,

    /// The upstream API token is not configured in the environment.
    #[error("API token not configured")]
    TokenNotConfigured,

    /// Upstream responded with a non-success status; body is kept verbatim.
    #[error("Upstream error {status}: {body}")]
    Upstream { status: u16, body: String },

    /// Unclassified error with message.
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl Serialize for GatewayError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.to_string().as_str())
    }
}

/// Result type alias for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;

impl From<String> for GatewayError {
    fn from(s: String) -> Self {
        GatewayError::Unknown(s)
    }
}

impl From<&str> for GatewayError {
    fn from(s: &str) -> Self {
        GatewayError::Unknown(s.to_string())
    }
}
