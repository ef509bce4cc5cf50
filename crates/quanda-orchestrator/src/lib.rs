//! Quanda orchestrator - question routing and answering.
//!
//! This crate is the heart of the Quanda service: it accepts a
//! free-text question, decides whether it can be answered locally by
//! the symbolic engine, and otherwise delegates to a generative
//! backend with a route-specific prompt. Answers are rendered and
//! sanitized before they leave the process.
//!
//! # Architecture
//!
//! - [`api`] - HTTP endpoints (`POST /ask`, `GET /health`)
//! - [`pipeline`] - The classify/solve/generate/render flow
//! - [`classify`] - Mode and route resolution
//! - [`prompt`] - Route-specific prompt templates
//! - [`generate`] - The [`Generator`] trait and Gemini client
//! - [`config`] - Service configuration loading and validation
//! - [`error`] - Wire-visible error types

pub mod api;
pub mod classify;
pub mod config;
pub mod error;
pub mod generate;
pub mod pipeline;
pub mod prompt;

pub use api::{
    create_router, AppState, AskRequest, AskResponse, ErrorResponse, HealthResponse,
};
pub use classify::{classify, looks_mathematical, Mode, Route};
pub use config::{AnswerFormat, ConfigError, ServiceConfig};
pub use error::{AskError, Result};
pub use generate::{GeminiClient, GenerateError, Generator};
pub use pipeline::{Answer, AnswerSource, Pipeline};
pub use prompt::build_prompt;
