//! Math-aware text renderer
//!
//! Splits text with [`mathplan_segments::Scanner`] and typesets each math
//! segment with a [`MathEngine`]. A failing formula is replaced by its own
//! source in a fallback element and never affects neighbouring segments.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use mathplan_segments::{DisplayMode, MathSegment, Scanner, Segment};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::engine::{EngineOptions, MathEngine, MathmlEngine, TrustLevel};
use crate::core::markup::{sanitize, Markup};
use crate::utils::error::EngineError;

/// Renderer configuration
///
/// Class names default to the Tailwind utility classes of the lesson viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Ask the engine to report malformed formulas inside its markup.
    pub error_tolerant: bool,
    pub trust: TrustLevel,
    /// Class of the element wrapping a whole rendered text.
    pub container_class: String,
    /// Class of plain text runs.
    pub text_class: String,
    pub block_class: String,
    pub inline_class: String,
    /// Class of the element shown when a formula cannot be rendered.
    pub fallback_class: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            error_tolerant: true,
            trust: TrustLevel::Trusted,
            container_class: "leading-relaxed".to_string(),
            text_class: "whitespace-pre-wrap".to_string(),
            block_class: "block my-4 overflow-x-auto py-2".to_string(),
            inline_class: "inline-block px-0.5 align-middle".to_string(),
            fallback_class: "math-fallback bg-red-50 text-red-600 px-1".to_string(),
        }
    }
}

impl RenderOptions {
    fn engine_options(&self, display_mode: DisplayMode) -> EngineOptions {
        EngineOptions {
            display_mode,
            error_tolerant: self.error_tolerant,
            trust: self.trust,
        }
    }
}

/// One displayable unit of rendered text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RenderedSegment {
    /// Plain text, stored unescaped.
    Text { text: String },
    /// Sanitized engine output.
    Math {
        markup: Markup,
        display_mode: DisplayMode,
    },
    /// A formula that failed to render, kept as its delimited source.
    Fallback {
        source: String,
        display_mode: DisplayMode,
        reason: String,
    },
}

impl RenderedSegment {
    pub fn is_fallback(&self) -> bool {
        matches!(self, RenderedSegment::Fallback { .. })
    }

    pub fn display_mode(&self) -> Option<DisplayMode> {
        match self {
            RenderedSegment::Text { .. } => None,
            RenderedSegment::Math { display_mode, .. }
            | RenderedSegment::Fallback { display_mode, .. } => Some(*display_mode),
        }
    }
}

/// Renders text containing delimited LaTeX.
///
/// # Example
///
/// ```
/// use mathplan::MathRenderer;
///
/// let renderer: MathRenderer = MathRenderer::default();
/// let html = renderer.render_html("Area: $\\pi r^2$");
/// assert!(html.contains("<math"));
/// ```
#[derive(Debug, Clone)]
pub struct MathRenderer<E = MathmlEngine> {
    engine: E,
    options: RenderOptions,
}

impl Default for MathRenderer<MathmlEngine> {
    fn default() -> Self {
        Self::new(MathmlEngine::new())
    }
}

impl<E: MathEngine> MathRenderer<E> {
    pub fn new(engine: E) -> Self {
        Self::with_options(engine, RenderOptions::default())
    }

    pub fn with_options(engine: E, options: RenderOptions) -> Self {
        Self { engine, options }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Scan `text` and render every segment in source order.
    pub fn render(&self, text: &str) -> Vec<RenderedSegment> {
        let rendered: Vec<_> = Scanner::new(text)
            .map(|segment| self.render_segment(&segment))
            .collect();
        debug!(
            engine = self.engine.name(),
            segments = rendered.len(),
            fallbacks = rendered.iter().filter(|s| s.is_fallback()).count(),
            "rendered text"
        );
        rendered
    }

    pub fn render_segment(&self, segment: &Segment<'_>) -> RenderedSegment {
        match segment {
            Segment::Plain(plain) => RenderedSegment::Text {
                text: plain.content.to_string(),
            },
            Segment::Math(math) => self.render_math(math),
        }
    }

    /// Typeset one formula, containing any failure to this segment.
    pub fn render_math(&self, math: &MathSegment<'_>) -> RenderedSegment {
        let options = self.options.engine_options(math.display_mode);
        let attempt = panic::catch_unwind(AssertUnwindSafe(|| {
            self.engine.render(math.formula, &options)
        }));

        let outcome = match attempt {
            Ok(Ok(markup)) => sanitize(markup),
            Ok(Err(err)) => Err(err),
            Err(payload) => Err(EngineError::output(format!(
                "engine panicked: {}",
                panic_message(payload.as_ref())
            ))),
        };

        match outcome {
            Ok(markup) => RenderedSegment::Math {
                markup,
                display_mode: math.display_mode,
            },
            Err(err) => {
                warn!(
                    engine = self.engine.name(),
                    formula = math.formula,
                    error = %err,
                    "formula fell back to source"
                );
                RenderedSegment::Fallback {
                    source: math.raw.to_string(),
                    display_mode: math.display_mode,
                    reason: err.to_string(),
                }
            }
        }
    }

    /// Assemble rendered segments into one HTML fragment.
    pub fn to_markup(&self, segments: &[RenderedSegment]) -> Markup {
        let opts = &self.options;
        let parts = segments.iter().map(|segment| match segment {
            RenderedSegment::Text { text } => {
                Markup::element("span", &opts.text_class, &Markup::text(text))
            }
            RenderedSegment::Math {
                markup,
                display_mode,
            } => {
                let class = match display_mode {
                    DisplayMode::Block => &opts.block_class,
                    DisplayMode::Inline => &opts.inline_class,
                };
                Markup::element("span", class, markup)
            }
            RenderedSegment::Fallback { source, .. } => {
                Markup::element("code", &opts.fallback_class, &Markup::text(source))
            }
        });
        Markup::element("span", &opts.container_class, &Markup::from_parts(parts))
    }

    /// Render `text` straight to an HTML fragment.
    pub fn render_html(&self, text: &str) -> String {
        self.to_markup(&self.render(text)).into_string()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::EngineResult;

    struct Echo;

    impl MathEngine for Echo {
        fn name(&self) -> &'static str {
            "echo"
        }

        fn render(&self, formula: &str, options: &EngineOptions) -> EngineResult<String> {
            let tag = if options.display_mode.is_block() { "B" } else { "I" };
            Ok(format!("<{tag}>{}</{tag}>", formula))
        }
    }

    struct Refuses;

    impl MathEngine for Refuses {
        fn name(&self) -> &'static str {
            "refuses"
        }

        fn render(&self, formula: &str, _options: &EngineOptions) -> EngineResult<String> {
            Err(EngineError::parse(format!("cannot typeset {}", formula)))
        }
    }

    #[test]
    fn test_engine_error_falls_back_to_source() {
        let renderer = MathRenderer::new(Refuses);
        let segments = renderer.render("a $bad$ b");
        assert_eq!(segments.len(), 3);
        assert_eq!(
            segments[1],
            RenderedSegment::Fallback {
                source: "$bad$".to_string(),
                display_mode: DisplayMode::Inline,
                reason: "Parse error: cannot typeset bad".to_string(),
            }
        );
        let html = renderer.to_markup(&segments).into_string();
        let fallback = "<code class=\"math-fallback bg-red-50 text-red-600 px-1\">$bad$</code>";
        assert!(html.contains(fallback));
        assert!(html.contains(">a </span>"));
        assert!(html.contains("> b</span>"));
    }

    #[test]
    fn test_text_mentioning_script_url_still_renders() {
        let renderer: MathRenderer = MathRenderer::default();
        let segments = renderer.render(r"$\text{javascript: x}$");
        assert!(matches!(segments[0], RenderedSegment::Math { .. }));
    }

    #[test]
    fn test_plain_text_is_escaped() {
        let html = MathRenderer::new(Echo).render_html("a < b");
        assert_eq!(
            html,
            "<span class=\"leading-relaxed\"><span class=\"whitespace-pre-wrap\">a &lt; b</span></span>"
        );
    }

    #[test]
    fn test_display_mode_selects_class() {
        let renderer = MathRenderer::new(Echo);
        let html = renderer.render_html("$x$$$y$$");
        assert!(html.contains("<span class=\"inline-block px-0.5 align-middle\"><I>x</I></span>"));
        assert!(html.contains("<span class=\"block my-4 overflow-x-auto py-2\"><B>y</B></span>"));
    }

    #[test]
    fn test_options_from_json() {
        let opts: RenderOptions =
            serde_json::from_str(r#"{ "trust": "strict", "block_class": "eq" }"#).unwrap();
        assert_eq!(opts.trust, TrustLevel::Strict);
        assert_eq!(opts.block_class, "eq");
        assert!(opts.error_tolerant);
        assert_eq!(opts.inline_class, RenderOptions::default().inline_class);
    }

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "boom");
        let payload: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(payload.as_ref()), "bang");
    }
}
