//! Markdown to HTML conversion.
//!
//! A thin wrapper over pulldown-cmark. The output is *not* safe on its
//! own: raw inline HTML in the source passes through verbatim, which is
//! exactly why [`crate::sanitize`] runs afterwards.

use pulldown_cmark::{html, Options, Parser};

/// Converts markdown-formatted prose into an HTML fragment.
///
/// Uses plain CommonMark with no extensions; tables, strikethrough and
/// footnotes would only produce tags the sanitizer strips anyway.
#[must_use]
pub fn markdown_to_html(text: &str) -> String {
    let parser = Parser::new_ext(text, Options::empty());
    let mut out = String::with_capacity(text.len() * 2);
    html::push_html(&mut out, parser);
    out
}
