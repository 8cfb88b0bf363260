//! # Mathplan
//!
//! Math-aware rendering and validation for generated lesson plans.
//!
//! Text containing LaTeX between `$...$`, `$$...$$`, `\(...\)` or `\[...\]`
//! is split into plain and math segments, and each formula is typeset on its
//! own. A formula that fails to typeset is shown as its source and never
//! breaks the rest of the text.
//!
//! ## Features
//!
//! - Linear-time delimiter scanning (see [`mathplan_segments`])
//! - MathML output via `pulldown-latex`, Typst output via `mitex`
//! - Sanitized markup with per-formula fallback
//! - Serde model and validation of generated lesson plans
//! - Optional WASM bindings
//!
//! ## Example
//!
//! ```
//! use mathplan::{render_math_text, scan, Segment};
//!
//! let segments = scan("Let $x = 1$.");
//! assert!(matches!(segments[1], Segment::Math(_)));
//!
//! let html = render_math_text("Let $x = 1$.");
//! assert!(html.contains("<math"));
//! ```

pub mod core;
pub mod credentials;
pub mod lesson;
pub mod utils;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use mathplan_segments::{
    has_math, scan, stray_delimiters, Delimiter, DisplayMode, MathSegment, PlainSegment, Scanner,
    Segment, Span, StrayDelimiter,
};

pub use crate::core::engine::{engine_by_name, untrusted_command};
pub use crate::core::{
    escape_html, sanitize, EngineOptions, Markup, MathEngine, MathRenderer, MathmlEngine,
    RenderOptions, RenderedSegment, TrustLevel, TypstEngine,
};
pub use credentials::{
    ApiKey, CredentialProvider, CredentialState, EnvCredentialProvider, StaticCredentialProvider,
};
pub use lesson::{
    parse_generation_result, render_lesson_fields, FormInputs, GenerationRequest,
    GenerationResult, ValidatedPlan, ValidationReport,
};
pub use utils::error::{ContractError, CredentialError, EngineError, EngineResult, FormError};

/// Render text to an HTML fragment with the default MathML engine and options.
pub fn render_math_text(text: &str) -> String {
    MathRenderer::default().render_html(text)
}

/// Render text with explicit options.
pub fn render_math_text_with_options(text: &str, options: RenderOptions) -> String {
    MathRenderer::with_options(MathmlEngine::new(), options).render_html(text)
}
