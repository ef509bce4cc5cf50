//! HTTP API endpoints for the Quanda service.
//!
//! This module provides the REST surface the question box talks to.
//!
//! # Endpoints
//!
//! - `POST /ask` - Answer a free-text question
//! - `GET /health` - Liveness probe
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use quanda_orchestrator::{create_router, AppState, GeminiClient, Generator, ServiceConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ServiceConfig::default();
//! let generator: Arc<dyn Generator> = Arc::new(GeminiClient::new(
//!     "api-key",
//!     Duration::from_secs(config.generation_timeout_secs),
//! )?);
//!
//! let router = create_router(AppState::new(config, generator));
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:5000").await?;
//! axum::serve(listener, router).await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

use crate::classify::Mode;
use crate::config::{AnswerFormat, ServiceConfig};
use crate::error::AskError;
use crate::generate::Generator;
use crate::pipeline::Pipeline;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for the ask endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct AskRequest {
    /// The free-text question. An absent key is treated as an empty
    /// question and rejected by the pipeline, not by deserialization.
    #[serde(default)]
    pub question: String,
    /// Resolution mode; defaults to `auto` when absent.
    #[serde(default)]
    pub mode: Mode,
}

/// Response body for a successful answer.
///
/// Exactly one shape is active per deployment, chosen by
/// [`AnswerFormat`] in the configuration; the two are never mixed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AskResponse {
    /// Sanitized-HTML deployment shape.
    Html {
        /// The answer as a sanitized HTML fragment.
        answer_html: String,
    },
    /// Plain-text deployment shape.
    Text {
        /// The answer as raw text.
        answer: String,
    },
}

/// Error response body returned on failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Description of the error.
    pub error: String,
}

/// Response body for the health endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `"ok"` when the process is serving.
    pub status: String,
}

// ============================================================================
// Application State
// ============================================================================

/// Shared application state for the HTTP server.
///
/// Constructed once at startup around the injected generative handle;
/// cloned cheaply into handlers and never mutated afterwards.
#[derive(Clone)]
pub struct AppState {
    /// The request pipeline.
    pub pipeline: Pipeline,
}

impl AppState {
    /// Creates a new `AppState` from configuration and a generative
    /// capability.
    #[must_use]
    pub fn new(config: ServiceConfig, generator: Arc<dyn Generator>) -> Self {
        Self {
            pipeline: Pipeline::new(config, generator),
        }
    }
}

// ============================================================================
// Error Mapping
// ============================================================================

impl IntoResponse for AskError {
    fn into_response(self) -> Response {
        let status = match self {
            Self::EmptyQuestion => StatusCode::BAD_REQUEST,
            Self::GenerationFailed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(ErrorResponse {
            error: self.to_string(),
        });
        (status, body).into_response()
    }
}

/// JSON extractor whose rejections use the endpoint's error shape.
///
/// Axum's bare `Json` rejects unparseable bodies with plain text and a
/// mix of 400/422 statuses; every malformed request here gets a 400
/// with an [`ErrorResponse`] body instead.
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err((
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: rejection.body_text(),
                }),
            )
                .into_response()),
        }
    }
}

// ============================================================================
// Router Setup
// ============================================================================

/// Creates the HTTP router with all endpoints.
///
/// # Arguments
///
/// * `state` - The shared application state
///
/// # Returns
///
/// An axum `Router` configured with:
/// - `POST /ask` and `GET /health`
/// - CORS middleware (allow all origins, as the original deployment did)
/// - Tracing middleware for request logging
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/ask", post(handle_ask))
        .route("/health", get(handle_health))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(Arc::new(state))
}

// ============================================================================
// Handlers
// ============================================================================

/// Handler for `POST /ask`.
///
/// Runs the classification-and-resolution pipeline and shapes the
/// result per the deployment's answer format.
async fn handle_ask(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<AskRequest>,
) -> Result<Json<AskResponse>, AskError> {
    info!(
        mode = %request.mode,
        question_len = request.question.len(),
        "ask request received"
    );

    let answer = state.pipeline.answer(&request.question, request.mode).await?;

    let response = match state.pipeline.answer_format() {
        AnswerFormat::Html => AskResponse::Html {
            answer_html: answer.body,
        },
        AnswerFormat::Text => AskResponse::Text {
            answer: answer.body,
        },
    };
    Ok(Json(response))
}

/// Handler for `GET /health`.
async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

// ============================================================================
// Tests
// ============================================================================
