//! Upstream inference client.
//!
//! One bearer-authenticated POST per query, no retry, no streaming. The
//! response body shape varies with the hosted API flavor, so extraction
//! probes the known shapes in a fixed order before giving up.

use reqwest::Client;
use serde_json::{json, Value};

use crate::config::{UpstreamApi, UpstreamConfig};
use crate::error::{GatewayError, GatewayResult};

/// System instruction for the chat-completions flavor.
pub const SYSTEM_PROMPT: &str = "You are Jarvis. Be brief, precise, and witty. Address me as Sir.";

/// Inline instruction for the legacy text-generation flavor, which takes a
/// single prompt string instead of a messages array.
const LEGACY_SYSTEM_PROMPT: &str =
    "You are Jarvis, a helpful AI assistant. Answer briefly, concisely, and address the user as 'Sir'.";

/// Returned when the upstream answered 2xx but none of the known response
/// shapes matched.
pub const FALLBACK_REPLY: &str = "I'm sorry, Sir. I couldn't process that request.";

/// Some hosted APIs echo the full prompt ahead of the completion; everything
/// up to and including this marker (and the echoed query line after it) is
/// dropped from the extracted text.
pub const PROMPT_ECHO_MARKER: &str = "User query:";

pub struct UpstreamClient {
    http_client: Client,
    config: UpstreamConfig,
}

impl UpstreamClient {
    pub fn new(config: UpstreamConfig) -> Self {
        Self { http_client: Client::new(), config }
    }

    /// Model identifier echoed in the success envelope.
    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn request_body(&self, query: &str) -> Value {
        match self.config.api {
            UpstreamApi::ChatCompletions => json!({
                "model": self.config.model,
                "messages": [
                    { "role": "system", "content": SYSTEM_PROMPT },
                    { "role": "user", "content": query },
                ],
                "max_tokens": self.config.max_tokens,
                "temperature": self.config.temperature,
            }),
            UpstreamApi::TextGeneration => json!({
                "inputs": format!("{LEGACY_SYSTEM_PROMPT}\n\nUser query: {query}\nJarvis:"),
                "parameters": {
                    "max_new_tokens": self.config.max_tokens,
                    "temperature": self.config.temperature,
                    "do_sample": true,
                    "return_full_text": false,
                },
            }),
        }
    }

    /// Send one query upstream and return the generated text.
    ///
    /// Non-success statuses come back as `GatewayError::Upstream` with the
    /// raw error body so the handler can propagate both verbatim.
    pub async fn generate(&self, query: &str, token: &str) -> GatewayResult<String> {
        let response = self
            .http_client
            .post(&self.config.endpoint)
            .bearer_auth(token)
            .json(&self.request_body(query))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("Upstream error {}: {}", status, body);
            return Err(GatewayError::Upstream { status: status.as_u16(), body });
        }

        // Decode by hand so a 2xx with an unparseable body surfaces as a
        // JSON error, not a transport error.
        let raw = response.text().await?;
        let data: Value = serde_json::from_str(&raw)?;
        let text = extract_generated_text(&data).unwrap_or_else(|| {
            tracing::warn!("Unexpected upstream response shape: {}", data);
            FALLBACK_REPLY.to_string()
        });

        Ok(strip_prompt_echo(&text))
    }
}

/// Pull the generated text out of an upstream success body.
///
/// Shape-detection order: chat-completion (`choices[0].message.content`),
/// then legacy generation array (`[0].generated_text`), then a bare string
/// or `output` string field.
pub fn extract_generated_text(data: &Value) -> Option<String> {
    if let Some(content) = data.pointer("/choices/0/message/content").and_then(Value::as_str) {
        return Some(content.to_string());
    }
    if let Some(text) = data.pointer("/0/generated_text").and_then(Value::as_str) {
        return Some(text.to_string());
    }
    if let Some(text) = data.as_str() {
        return Some(text.to_string());
    }
    if let Some(text) = data.get("output").and_then(Value::as_str) {
        return Some(text.to_string());
    }
    None
}

/// Drop an echoed prompt prefix: everything up to and including the marker,
/// plus the echoed query line it introduces, leaving only the completion.
pub fn strip_prompt_echo(text: &str) -> String {
    let Some(at) = text.find(PROMPT_ECHO_MARKER) else {
        return text.to_string();
    };
    let tail = &text[at + PROMPT_ECHO_MARKER.len()..];
    match tail.find('\n') {
        Some(newline) => tail[newline + 1..].trim().to_string(),
        None => tail.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn chat_completion_shape_wins_first() {
        let data = json!({ "choices": [{ "message": { "content": "X" } }] });
        assert_eq!(extract_generated_text(&data).as_deref(), Some("X"));
    }

    #[test]
    fn generation_array_shape() {
        let data = json!([{ "generated_text": "Indeed, Sir." }]);
        assert_eq!(extract_generated_text(&data).as_deref(), Some("Indeed, Sir."));
    }

    #[test]
    fn bare_string_shape() {
        let data = json!("Right away, Sir.");
        assert_eq!(extract_generated_text(&data).as_deref(), Some("Right away, Sir."));
    }

    #[test]
    fn output_field_shape() {
        let data = json!({ "output": "Done, Sir." });
        assert_eq!(extract_generated_text(&data).as_deref(), Some("Done, Sir."));
    }

    #[test]
    fn unknown_shape_yields_none() {
        assert_eq!(extract_generated_text(&json!({ "choices": [] })), None);
        assert_eq!(extract_generated_text(&json!({ "candidates": [{}] })), None);
        assert_eq!(extract_generated_text(&json!(42)), None);
    }

    #[test]
    fn prompt_echo_is_stripped_through_the_query_line() {
        let echoed = "You are Jarvis, a helpful AI assistant.\n\nUser query: hello\nX";
        assert_eq!(strip_prompt_echo(echoed), "X");
    }

    #[test]
    fn text_without_marker_passes_through_unmodified() {
        assert_eq!(strip_prompt_echo("Certainly, Sir."), "Certainly, Sir.");
    }

    #[test]
    fn marker_with_no_trailing_newline_keeps_the_remainder() {
        assert_eq!(strip_prompt_echo("User query: as you wish"), "as you wish");
    }

    #[test]
    fn chat_request_body_carries_system_and_user_messages() {
        let client = UpstreamClient::new(UpstreamConfig::default());
        let body = client.request_body("hello");
        assert_eq!(body["model"], "deepseek-ai/DeepSeek-V3");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "hello");
        assert_eq!(body["max_tokens"], 100);
    }

    #[test]
    fn text_generation_body_disables_full_text_echo() {
        let config = UpstreamConfig {
            api: UpstreamApi::TextGeneration,
            max_tokens: 150,
            ..UpstreamConfig::default()
        };
        let client = UpstreamClient::new(config);
        let body = client.request_body("hello");
        assert!(body["inputs"].as_str().unwrap().contains("User query: hello"));
        assert_eq!(body["parameters"]["return_full_text"], false);
        assert_eq!(body["parameters"]["max_new_tokens"], 150);
    }
}
