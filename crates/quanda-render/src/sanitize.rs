//! Allow-list HTML sanitization.
//!
//! The sanitizer is a single left-to-right scan over the fragment. Tags
//! on the allow-list are re-emitted in a normalized form; everything
//! else (unknown tags, comments, doctypes, every attribute except
//! `class` on `<code>`) is stripped, keeping only text content. A `<`
//! that does not open a well-formed tag is replaced with `&lt;`.
//!
//! Normalized output is a fixed point: running the sanitizer over its
//! own output changes nothing.

/// Tags that may appear in rendered answers: a baseline of safe inline
/// markup extended with the block elements markdown produces.
const ALLOWED_TAGS: &[&str] = &[
    "a", "abbr", "acronym", "b", "blockquote", "br", "code", "em", "h1", "h2", "h3", "h4", "h5",
    "hr", "i", "li", "ol", "p", "pre", "strong", "ul",
];

/// Tags emitted in self-closing form.
const VOID_TAGS: &[&str] = &["br", "hr"];

/// Removes everything outside the tag allow-list from an HTML fragment.
///
/// Disallowed markup is stripped rather than escaped: the tag (and its
/// attributes) disappear while its text content stays. The transform is
/// idempotent; sanitizing sanitized output is a no-op.
#[must_use]
pub fn sanitize(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(idx) = rest.find('<') {
        out.push_str(&rest[..idx]);
        let tail = &rest[idx..];
        match scan_tag(tail) {
            Some((rendered, consumed)) => {
                out.push_str(&rendered);
                rest = &tail[consumed..];
            }
            None => {
                // Not a well-formed tag; neutralize the bracket and
                // carry on with the following character.
                out.push_str("&lt;");
                rest = &tail[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

/// Attempts to read one tag at the start of `s` (which begins with `<`).
///
/// Returns the normalized replacement text (empty for stripped markup)
/// and the number of input bytes consumed. `None` means the input does
/// not form a tag at all.
fn scan_tag(s: &str) -> Option<(String, usize)> {
    // Comments, doctypes and processing instructions are dropped whole.
    if let Some(after) = s.strip_prefix("<!--") {
        let consumed = after.find("-->").map_or(s.len(), |end| 4 + end + 3);
        return Some((String::new(), consumed));
    }
    if s.starts_with("<!") || s.starts_with("<?") {
        let consumed = s.find('>').map_or(s.len(), |end| end + 1);
        return Some((String::new(), consumed));
    }

    let bytes = s.as_bytes();
    let mut i = 1;
    let closing = bytes.get(i) == Some(&b'/');
    if closing {
        i += 1;
    }

    // Tag name: ASCII letter then letters/digits
    let name_start = i;
    while i < bytes.len() && bytes[i].is_ascii_alphanumeric() {
        i += 1;
    }
    if i == name_start || !bytes[name_start].is_ascii_alphabetic() {
        return None;
    }
    let name = s[name_start..i].to_ascii_lowercase();

    let mut class_attr = None;
    loop {
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        match bytes.get(i) {
            None => return None,
            Some(b'>') => {
                i += 1;
                break;
            }
            Some(b'/') => {
                i += 1;
                while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                    i += 1;
                }
                if bytes.get(i) == Some(&b'>') {
                    i += 1;
                    break;
                }
                return None;
            }
            Some(_) => {
                let (attr_name, attr_value, next) = scan_attribute(s, i)?;
                if attr_name.eq_ignore_ascii_case("class") {
                    class_attr = attr_value.filter(|v| is_safe_class(v)).map(str::to_owned);
                }
                i = next;
            }
        }
    }

    Some((render_tag(&name, closing, class_attr.as_deref()), i))
}

/// Reads one `name` or `name=value` attribute starting at byte `i`.
///
/// Returns the attribute name, its value if any, and the byte index just
/// past the attribute.
fn scan_attribute(s: &str, start: usize) -> Option<(&str, Option<&str>, usize)> {
    let bytes = s.as_bytes();
    let mut i = start;

    let name_start = i;
    while i < bytes.len() && !bytes[i].is_ascii_whitespace() && !matches!(bytes[i], b'=' | b'>' | b'/') {
        i += 1;
    }
    if i == name_start {
        return None;
    }
    let name = &s[name_start..i];

    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    if bytes.get(i) != Some(&b'=') {
        return Some((name, None, name_start + name.len()));
    }
    i += 1;
    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }

    match bytes.get(i) {
        Some(&quote @ (b'"' | b'\'')) => {
            i += 1;
            let value_start = i;
            while i < bytes.len() && bytes[i] != quote {
                i += 1;
            }
            if i >= bytes.len() {
                return None;
            }
            Some((name, Some(&s[value_start..i]), i + 1))
        }
        Some(_) => {
            let value_start = i;
            while i < bytes.len() && !bytes[i].is_ascii_whitespace() && bytes[i] != b'>' {
                i += 1;
            }
            Some((name, Some(&s[value_start..i]), i))
        }
        None => None,
    }
}

/// A class value the sanitizer will carry through unchanged. Anything
/// needing escaping is rejected outright so re-emission stays a fixed
/// point.
fn is_safe_class(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ' '))
}

fn render_tag(name: &str, closing: bool, class_attr: Option<&str>) -> String {
    if !ALLOWED_TAGS.contains(&name) {
        return String::new();
    }
    if closing {
        return format!("</{name}>");
    }
    if VOID_TAGS.contains(&name) {
        return format!("<{name} />");
    }
    // The one attribute that survives: class on code, for syntax
    // highlighting hints.
    if name == "code" {
        if let Some(class) = class_attr {
            return format!("<code class=\"{class}\">");
        }
    }
    format!("<{name}>")
}
