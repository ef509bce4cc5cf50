//! Instruction templates for the generative backend.
//!
//! Three fixed templates, one per route. The question text is embedded
//! verbatim: no escaping, truncation, or injection filtering is applied.
//! Prompt injection through the question is a documented, accepted
//! residual risk of this design, not something this module mitigates.

use crate::classify::Route;

/// Builds the instruction sent to the generative backend for a question
/// on the given route. Total function; it cannot fail.
///
/// The math template is only ever used after the symbolic solver
/// declined the question.
#[must_use]
pub fn build_prompt(question: &str, route: Route) -> String {
    match route {
        Route::Math => format!("Solve step by step: {question}"),
        Route::Summary => format!("Summarize clearly: {question}"),
        Route::Tutor => format!("You are a helpful tutor. Explain clearly: {question}"),
    }
}
