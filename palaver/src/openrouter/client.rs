//! HTTP client for the completion endpoint.

use serde_json::Value;
use thiserror::Error;

use super::parse::parse_reply;
use crate::models::Reply;

/// Default completion endpoint (OpenRouter chat completions).
const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

/// Default model routed by the provider.
const DEFAULT_MODEL: &str = "openrouter/auto";

/// Expected prefix of an OpenRouter API key.
const KEY_PREFIX: &str = "sk-or-";

const DEFAULT_TEMPERATURE: f64 = 0.7;
const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Errors from one send attempt.
///
/// Every variant is contained by the conversation controller and rendered
/// as an inline assistant message; none of them ends the session.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The credential is missing or malformed. Raised before any network
    /// call is made.
    #[error("configuration error: {0}")]
    Config(String),
    /// Transport failure or a non-success HTTP status.
    #[error("request failed: {0}")]
    Request(String),
    /// The body was not the expected completion envelope, or carried no
    /// completion text.
    #[error("unexpected response: {0}")]
    Response(String),
}

/// Configuration for the completion client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Bearer credential. Validated lazily, at send time.
    pub api_key: Option<String>,
    /// Model identifier sent with every request.
    pub model: String,
    /// Full URL of the chat-completions endpoint.
    pub base_url: String,
    /// Sampling temperature.
    pub temperature: f64,
    /// Completion length cap.
    pub max_tokens: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

impl ClientConfig {
    /// Read configuration from the environment.
    ///
    /// `OPENROUTER_API_KEY` carries the credential; `PALAVER_MODEL` and
    /// `PALAVER_BASE_URL` override the defaults when set.
    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var("OPENROUTER_API_KEY").ok(),
            model: std::env::var("PALAVER_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            base_url: std::env::var("PALAVER_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            ..Self::default()
        }
    }
}

/// Backend seam between the conversation controller and the wire.
///
/// The controller only needs "one user message in, one parsed reply or
/// typed error out"; tests substitute a stub here.
#[allow(async_fn_in_trait)]
pub trait CompletionBackend {
    /// Send one user message and return the parsed reply.
    async fn send_message(&self, text: &str) -> Result<Reply, ApiError>;
}

/// HTTP client for an OpenRouter-compatible endpoint.
pub struct Client {
    config: ClientConfig,
    http: reqwest::Client,
}

impl Client {
    /// Create a client from configuration.
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    /// Validate the configured credential without touching the network.
    fn api_key(&self) -> Result<&str, ApiError> {
        let key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| ApiError::Config("OPENROUTER_API_KEY is not set".to_string()))?;
        if !key.starts_with(KEY_PREFIX) {
            return Err(ApiError::Config(format!(
                "API key does not look like an OpenRouter key (expected prefix '{KEY_PREFIX}')"
            )));
        }
        Ok(key)
    }
}

impl CompletionBackend for Client {
    /// Send one user message to the completion endpoint.
    ///
    /// Session state is never touched here; appending messages is the
    /// conversation controller's responsibility.
    async fn send_message(&self, text: &str) -> Result<Reply, ApiError> {
        let key = self.api_key()?;

        let body = serde_json::json!({
            "model": self.config.model,
            "messages": [{ "role": "user", "content": text }],
            "temperature": self.config.temperature,
            "max_tokens": self.config.max_tokens,
        });

        let resp = self
            .http
            .post(&self.config.base_url)
            .bearer_auth(key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ApiError::Request(format!("network error: {e}")))?;

        let status = resp.status();
        let raw = resp
            .text()
            .await
            .map_err(|e| ApiError::Request(format!("failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(ApiError::Request(status_message(status, &raw)));
        }

        let content = extract_content(&raw)?;
        Ok(parse_reply(&content))
    }
}

/// Map an HTTP failure status to its user-facing message.
fn status_message(status: reqwest::StatusCode, body: &str) -> String {
    match status.as_u16() {
        401 => "authentication failed: the API key was rejected (HTTP 401)".to_string(),
        429 => "rate limit exceeded, try again shortly (HTTP 429)".to_string(),
        _ => {
            // Prefer the provider's own error message when the body carries one.
            serde_json::from_str::<Value>(body)
                .ok()
                .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
                .unwrap_or_else(|| format!("HTTP {status}"))
        }
    }
}

/// Pull the completion text out of the provider envelope
/// (`{"choices":[{"message":{"content":...}}]}`).
fn extract_content(body: &str) -> Result<String, ApiError> {
    let v: Value = serde_json::from_str(body)
        .map_err(|e| ApiError::Response(format!("body is not valid JSON: {e}")))?;
    v["choices"][0]["message"]["content"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| ApiError::Response("no completion content in response".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_with_key(key: Option<&str>) -> Client {
        Client::new(ClientConfig {
            api_key: key.map(str::to_string),
            ..ClientConfig::default()
        })
    }

    #[test]
    fn missing_key_is_config_error() {
        let client = client_with_key(None);
        let err = client.api_key().unwrap_err();
        assert!(matches!(err, ApiError::Config(_)));
        assert!(err.to_string().contains("OPENROUTER_API_KEY"));
    }

    #[test]
    fn malformed_key_is_config_error() {
        let client = client_with_key(Some("sk-openai-123"));
        let err = client.api_key().unwrap_err();
        assert!(matches!(err, ApiError::Config(_)));
        assert!(err.to_string().contains("sk-or-"));
    }

    #[test]
    fn well_formed_key_passes() {
        let client = client_with_key(Some("sk-or-v1-abc"));
        assert_eq!(client.api_key().unwrap(), "sk-or-v1-abc");
    }

    #[test]
    fn status_401_mentions_authentication() {
        let msg = status_message(reqwest::StatusCode::UNAUTHORIZED, "");
        assert!(msg.contains("authentication"));
        assert!(msg.contains("401"));
    }

    #[test]
    fn status_429_mentions_rate_limit() {
        let msg = status_message(reqwest::StatusCode::TOO_MANY_REQUESTS, "");
        assert!(msg.contains("rate limit"));
    }

    #[test]
    fn other_status_prefers_provider_message() {
        let body = r#"{"error":{"message":"model overloaded","code":502}}"#;
        let msg = status_message(reqwest::StatusCode::BAD_GATEWAY, body);
        assert_eq!(msg, "model overloaded");
    }

    #[test]
    fn other_status_without_envelope_is_generic() {
        let msg = status_message(reqwest::StatusCode::INTERNAL_SERVER_ERROR, "boom");
        assert!(msg.contains("500"));
    }

    #[test]
    fn extract_content_reads_first_choice() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"Hello"}}]}"#;
        assert_eq!(extract_content(body).unwrap(), "Hello");
    }

    #[test]
    fn extract_content_rejects_missing_text() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#;
        let err = extract_content(body).unwrap_err();
        assert!(matches!(err, ApiError::Response(_)));
    }

    #[test]
    fn extract_content_rejects_non_json_body() {
        let err = extract_content("<html>gateway error</html>").unwrap_err();
        assert!(matches!(err, ApiError::Response(_)));
    }
}
