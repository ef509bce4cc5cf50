//! Quanda Answer Rendering
//!
//! Turns the markdown-ish text produced by the solver or the generative
//! backend into an HTML fragment that is safe to hand to a browser:
//! markdown conversion first, then an allow-list sanitizer over the
//! result. The sanitizer is the authoritative safety boundary; the
//! markdown stage passes raw inline HTML through untouched.

pub mod markdown;
pub mod sanitize;

pub use markdown::markdown_to_html;
pub use sanitize::sanitize;

/// Renders answer text as a sanitized HTML fragment.
///
/// Equivalent to `sanitize(markdown_to_html(text))`. The sanitization
/// step is idempotent, so re-rendering already-rendered output through
/// [`sanitize`] changes nothing.
#[must_use]
pub fn render(text: &str) -> String {
    sanitize(&markdown_to_html(text))
}
