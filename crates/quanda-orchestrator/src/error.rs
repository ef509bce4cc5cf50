//! Error types for the question pipeline.
//!
//! This is the *external* error taxonomy: the two failures a client can
//! observe. Symbolic-solve failures are deliberately absent; they are
//! absorbed inside the pipeline and silently fall back to generation.

/// A specialized `Result` type for pipeline operations.
pub type Result<T> = std::result::Result<T, AskError>;

/// Errors surfaced to the caller of the ask pipeline.
#[derive(Debug, thiserror::Error)]
pub enum AskError {
    /// The question was empty (or whitespace-only) after trimming.
    ///
    /// Rejected before classification; maps to HTTP 400. The message is
    /// part of the wire contract.
    #[error("No question provided")]
    EmptyQuestion,

    /// The generative backend failed: network, auth, quota, timeout, or
    /// an unusable response. Maps to HTTP 500 with the underlying
    /// description passed through verbatim.
    #[error("{message}")]
    GenerationFailed {
        /// Description of the underlying failure.
        message: String,
    },
}

impl AskError {
    /// Creates a new `GenerationFailed` error from the underlying
    /// failure's description.
    #[must_use]
    pub fn generation_failed(message: impl Into<String>) -> Self {
        Self::GenerationFailed {
            message: message.into(),
        }
    }
}
