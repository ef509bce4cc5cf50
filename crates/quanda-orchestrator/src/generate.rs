//! The generative-text capability.
//!
//! [`Generator`] is the seam between the pipeline and the external
//! model service: one call, one prompt, one text or one failure. The
//! production implementation is [`GeminiClient`]; tests substitute their
//! own implementations to count calls and script failures.
//!
//! The client makes no retries and holds no per-request state. The one
//! resource it owns, the underlying HTTP connection pool, is created
//! once at startup and shared read-only across request handlers.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Base URL for the Gemini `generateContent` API.
const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Errors from a generative call.
///
/// Every variant reaches the client as a `GenerationFailed` / HTTP 500;
/// the split exists for logs and tests, not for the wire.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(String),

    /// The request never completed: connection failure, DNS, timeout.
    #[error("request to generative service failed: {0}")]
    Transport(String),

    /// The service answered with a non-success status.
    #[error("generative service returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, passed through for diagnosis.
        body: String,
    },

    /// The response decoded to something without usable text.
    #[error("generative service returned an unusable response: {0}")]
    MalformedResponse(String),
}

/// An external text-generation capability.
///
/// Implementations must be safe to share across concurrent request
/// handlers; the pipeline holds one instance for the process lifetime.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Generates text for `prompt` using `model`.
    ///
    /// # Errors
    ///
    /// Returns a [`GenerateError`] on any transport, status, or decode
    /// failure. Implementations make at most one attempt.
    async fn generate(&self, model: &str, prompt: &str) -> Result<String, GenerateError>;
}

// ============================================================================
// Wire types (Gemini generateContent)
// ============================================================================

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

impl GenerateContentRequest {
    fn from_prompt(prompt: &str) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        }
    }
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate. An empty answer is a
    /// valid (if useless) response and is returned as-is.
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .map(|p| p.text.as_str())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

// ============================================================================
// Gemini client
// ============================================================================

/// Production [`Generator`] backed by the Gemini HTTP API.
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    /// Creates a client with the given credential and per-request
    /// timeout. The timeout covers the entire call; a slow backend
    /// surfaces as a `Transport` error rather than blocking forever.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::ClientBuild`] if the underlying HTTP
    /// client cannot be constructed.
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self, GenerateError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GenerateError::ClientBuild(e.to_string()))?;
        Ok(Self {
            http,
            api_key: api_key.into(),
            base_url: GEMINI_API_BASE.to_string(),
        })
    }

    /// Overrides the API base URL. Used by tests to point the client at
    /// a local stub server.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl Generator for GeminiClient {
    async fn generate(&self, model: &str, prompt: &str) -> Result<String, GenerateError> {
        let url = format!("{}/{}:generateContent", self.base_url, model);
        let body = GenerateContentRequest::from_prompt(prompt);

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| GenerateError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(GenerateError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let decoded: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| GenerateError::MalformedResponse(e.to_string()))?;

        Ok(decoded.text())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let request = GenerateContentRequest::from_prompt("Summarize clearly: rain");
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "contents": [{"parts": [{"text": "Summarize clearly: rain"}]}]
            })
        );
    }

    #[test]
    fn test_response_text_extraction() {
        let decoded: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates": [{"content": {"parts": [{"text": "Hello "}, {"text": "world"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(decoded.text(), "Hello world");
    }

    #[test]
    fn test_response_without_candidates_is_empty_text() {
        let decoded: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(decoded.text(), "");
    }

    #[test]
    fn test_response_candidate_without_content() {
        let decoded: GenerateContentResponse =
            serde_json::from_str(r#"{"candidates": [{}]}"#).unwrap();
        assert_eq!(decoded.text(), "");
    }

    #[test]
    fn test_error_display_carries_detail() {
        let err = GenerateError::Status {
            status: 429,
            body: "quota exceeded".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("429"));
        assert!(msg.contains("quota exceeded"));
    }

    // ------------------------------------------------------------------------
    // HTTP path tests against a local stub server
    // ------------------------------------------------------------------------

    /// Starts a stub backend answering every generateContent call with
    /// `status`/`body` after `delay`, and returns its base URL.
    async fn spawn_stub(
        status: axum::http::StatusCode,
        body: &'static str,
        delay: Duration,
    ) -> String {
        let router = axum::Router::new().route(
            "/:call",
            axum::routing::post(move || async move {
                tokio::time::sleep(delay).await;
                (status, body)
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        format!("http://{addr}")
    }

    fn client_against(base_url: String) -> GeminiClient {
        GeminiClient::new("test-key", Duration::from_secs(5))
            .unwrap()
            .with_base_url(base_url)
    }

    #[tokio::test]
    async fn test_generate_extracts_text_from_stub_response() {
        let base = spawn_stub(
            axum::http::StatusCode::OK,
            r#"{"candidates": [{"content": {"parts": [{"text": "stubbed answer"}]}}]}"#,
            Duration::ZERO,
        )
        .await;

        let client = client_against(base);
        let text = client
            .generate("gemini-2.5-flash", "Summarize clearly: rain")
            .await
            .unwrap();
        assert_eq!(text, "stubbed answer");
    }

    #[tokio::test]
    async fn test_generate_non_success_status_carries_body() {
        let base = spawn_stub(
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            "model overloaded",
            Duration::ZERO,
        )
        .await;

        let client = client_against(base);
        let err = client
            .generate("gemini-2.5-flash", "prompt")
            .await
            .unwrap_err();
        match err {
            GenerateError::Status { status, body } => {
                assert_eq!(status, 503);
                assert!(body.contains("model overloaded"));
            }
            other => panic!("expected Status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_generate_unparseable_body_is_malformed_response() {
        let base = spawn_stub(
            axum::http::StatusCode::OK,
            "definitely not json",
            Duration::ZERO,
        )
        .await;

        let client = client_against(base);
        let err = client
            .generate("gemini-2.5-flash", "prompt")
            .await
            .unwrap_err();
        assert!(matches!(err, GenerateError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_generate_timeout_surfaces_as_transport() {
        let base = spawn_stub(
            axum::http::StatusCode::OK,
            "{}",
            Duration::from_secs(10),
        )
        .await;

        let client = GeminiClient::new("test-key", Duration::from_millis(100))
            .unwrap()
            .with_base_url(base);
        let err = client
            .generate("gemini-2.5-flash", "prompt")
            .await
            .unwrap_err();
        assert!(matches!(err, GenerateError::Transport(_)));
    }
}
