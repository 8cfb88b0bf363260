//! HTML fragments and the sanitization boundary for engine output.
//!
//! Plain text enters a document only through [`Markup::text`], which escapes
//! it. Engine output enters only through [`sanitize`], which rejects active
//! content. No other constructor is public.

use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use crate::utils::error::{EngineError, EngineResult};

lazy_static! {
    static ref ACTIVE_ELEMENT: Regex = Regex::new(
        r"(?i)<\s*/?\s*(script|iframe|object|embed|style|link|meta|base|form|frame|frameset)\b"
    )
    .expect("valid regex");
    // Attribute checks only look inside a tag, never at text content.
    static ref EVENT_HANDLER: Regex =
        Regex::new(r#"(?i)<[^>]*[\s"'/]on[a-z]+\s*="#).expect("valid regex");
    static ref SCRIPT_URL: Regex = Regex::new(
        r#"(?i)<[^>]*=\s*["']?\s*((java|vb)script\s*:|data\s*:\s*text/html)"#
    )
    .expect("valid regex");
}

/// An HTML fragment that is safe to insert into a document.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct Markup(String);

impl Markup {
    /// Escape `text` so it renders literally.
    pub fn text(text: &str) -> Self {
        Markup(escape_html(text))
    }

    pub(crate) fn from_parts(parts: impl IntoIterator<Item = Markup>) -> Self {
        Markup(parts.into_iter().map(|m| m.0).collect())
    }

    pub(crate) fn element(tag: &str, class: &str, inner: &Markup) -> Self {
        let mut out = String::with_capacity(inner.0.len() + tag.len() * 2 + class.len() + 16);
        out.push('<');
        out.push_str(tag);
        if !class.is_empty() {
            out.push_str(" class=\"");
            out.push_str(&escape_html(class));
            out.push('"');
        }
        out.push('>');
        out.push_str(&inner.0);
        out.push_str("</");
        out.push_str(tag);
        out.push('>');
        Markup(out)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Markup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Markup {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Escape the five HTML-significant characters.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Accept engine output as a document fragment.
///
/// Output containing script-capable elements, inline event handlers or
/// script URLs is rejected rather than repaired.
pub fn sanitize(markup: String) -> EngineResult<Markup> {
    if let Some(m) = ACTIVE_ELEMENT.find(&markup) {
        return Err(EngineError::output(format!(
            "disallowed element `{}`",
            m.as_str().trim()
        )));
    }
    if EVENT_HANDLER.is_match(&markup) {
        return Err(EngineError::output("inline event handler"));
    }
    if SCRIPT_URL.is_match(&markup) {
        return Err(EngineError::output("script URL"));
    }
    Ok(Markup(markup))
}
