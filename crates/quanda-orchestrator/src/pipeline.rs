//! The classification-and-resolution pipeline.
//!
//! One request moves through `Received -> Classified ->
//! {SolvedLocally | NeedsGeneration} -> Responded`, and always reaches
//! the end exactly once: empty input short-circuits with an error, a
//! local solve short-circuits with an answer, and everything else makes
//! exactly one generative call whose failure is the only other terminal
//! outcome.
//!
//! The pipeline is stateless across requests; concurrency is entirely
//! the server's concern.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use quanda_symbolic::{try_solve, SolveOutcome};

use crate::classify::{classify, Mode, Route};
use crate::config::{AnswerFormat, ServiceConfig};
use crate::error::{AskError, Result};
use crate::generate::Generator;
use crate::prompt::build_prompt;

/// Where an answer came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerSource {
    /// Produced locally by the symbolic engine; no external call made.
    Symbolic,
    /// Produced by the generative backend.
    Generated,
}

impl std::fmt::Display for AnswerSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Symbolic => write!(f, "symbolic"),
            Self::Generated => write!(f, "generated"),
        }
    }
}

/// A finished answer: the formatted payload and its provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    /// The payload, already formatted per the deployment's answer
    /// format (sanitized HTML fragment, or raw text).
    pub body: String,
    /// Which component produced the underlying text.
    pub source: AnswerSource,
}

/// The request pipeline. Holds the process-lifetime generative handle
/// and the deployment configuration; owns no per-request state.
#[derive(Clone)]
pub struct Pipeline {
    config: ServiceConfig,
    generator: Arc<dyn Generator>,
}

impl Pipeline {
    /// Creates a pipeline over an injected generative capability.
    #[must_use]
    pub fn new(config: ServiceConfig, generator: Arc<dyn Generator>) -> Self {
        Self { config, generator }
    }

    /// Answers a question.
    ///
    /// # Errors
    ///
    /// Returns [`AskError::EmptyQuestion`] for blank input and
    /// [`AskError::GenerationFailed`] when the generative backend was
    /// needed and failed. Symbolic-solve failures never surface here;
    /// they fall back to generation silently.
    pub async fn answer(&self, question: &str, mode: Mode) -> Result<Answer> {
        let question = question.trim();
        if question.is_empty() {
            warn!("rejected empty question");
            return Err(AskError::EmptyQuestion);
        }

        let route = classify(question, mode);
        debug!(%route, %mode, "question classified");

        if route == Route::Math {
            if let SolveOutcome::Solved(text) = try_solve(question) {
                info!(%route, source = %AnswerSource::Symbolic, "answered locally");
                return Ok(self.finish(text, AnswerSource::Symbolic));
            }
            debug!("symbolic solve did not apply, falling back to generation");
        }

        let prompt = build_prompt(question, route);
        let started = Instant::now();
        let text = self
            .generator
            .generate(&self.config.model, &prompt)
            .await
            .map_err(|e| {
                warn!(%route, error = %e, "generation failed");
                AskError::generation_failed(e.to_string())
            })?;

        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        info!(%route, elapsed_ms, source = %AnswerSource::Generated, "generation complete");

        Ok(self.finish(text, AnswerSource::Generated))
    }

    /// Formats raw answer text per the configured response shape.
    fn finish(&self, text: String, source: AnswerSource) -> Answer {
        let body = match self.config.answer_format {
            AnswerFormat::Html => quanda_render::render(&text),
            AnswerFormat::Text => text,
        };
        Answer { body, source }
    }

    /// The response shape this pipeline was configured with.
    #[must_use]
    pub const fn answer_format(&self) -> AnswerFormat {
        self.config.answer_format
    }
}
