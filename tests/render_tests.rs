//! Integration tests for math-aware rendering

use mathplan::{
    render_math_text, scan, DisplayMode, EngineError, EngineOptions, EngineResult, MathEngine,
    MathRenderer, MathmlEngine, RenderOptions, RenderedSegment, Segment, TrustLevel,
    TypstEngine,
};

// ============================================================================
// Stub engines
// ============================================================================

struct AlwaysFails;

impl MathEngine for AlwaysFails {
    fn name(&self) -> &'static str {
        "always-fails"
    }

    fn render(&self, _formula: &str, _options: &EngineOptions) -> EngineResult<String> {
        Err(EngineError::parse("stub failure"))
    }
}

struct Panics;

impl MathEngine for Panics {
    fn name(&self) -> &'static str {
        "panics"
    }

    fn render(&self, formula: &str, _options: &EngineOptions) -> EngineResult<String> {
        if formula == "boom" {
            panic!("engine exploded");
        }
        Ok(format!("<mi>{}</mi>", formula))
    }
}

struct Injects;

impl MathEngine for Injects {
    fn name(&self) -> &'static str {
        "injects"
    }

    fn render(&self, _formula: &str, _options: &EngineOptions) -> EngineResult<String> {
        Ok("<span><script>alert(1)</script></span>".to_string())
    }
}

// ============================================================================
// Failure isolation
// ============================================================================

mod fallback {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_failing_engine_shows_source() {
        let renderer = MathRenderer::new(AlwaysFails);
        let segments = renderer.render("$bad$");
        assert_eq!(segments.len(), 1);
        match &segments[0] {
            RenderedSegment::Fallback { source, .. } => assert_eq!(source, "$bad$"),
            other => panic!("expected fallback, got {:?}", other),
        }
        let html = renderer.render_html("$bad$");
        assert!(html.contains("$bad$"));
        assert!(html.contains("math-fallback"));
    }

    #[test]
    fn test_panicking_engine_only_loses_its_segment() {
        let renderer = MathRenderer::new(Panics);
        let segments = renderer.render("$a$ then $boom$ then $$c$$");
        let kinds: Vec<bool> = segments.iter().map(|s| s.is_fallback()).collect();
        assert_eq!(kinds, vec![false, false, true, false, false]);
        assert!(matches!(
            &segments[4],
            RenderedSegment::Math {
                display_mode: DisplayMode::Block,
                ..
            }
        ));
    }

    #[test]
    fn test_unsafe_output_is_rejected() {
        let renderer = MathRenderer::new(Injects);
        let html = renderer.render_html("x $y$");
        assert!(!html.contains("<script"));
        assert!(html.contains("$y$"));
    }

    #[test]
    fn test_fallback_source_is_escaped() {
        let html = MathRenderer::new(AlwaysFails).render_html("$<b>$");
        assert!(html.contains("$&lt;b&gt;$"));
    }

    #[test]
    fn test_block_fallback_keeps_delimiters() {
        let segments = MathRenderer::new(AlwaysFails).render(r"\[x\]");
        assert!(matches!(
            &segments[0],
            RenderedSegment::Fallback { source, display_mode: DisplayMode::Block, .. }
                if source == r"\[x\]"
        ));
    }
}

// ============================================================================
// MathML engine
// ============================================================================

mod mathml {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_inline_and_block() {
        let html = render_math_text("A $a$ and $$b$$ B");
        assert_eq!(html.matches("<math").count(), 2);
        assert!(html.contains("inline-block px-0.5 align-middle"));
        assert!(html.contains("block my-4 overflow-x-auto py-2"));
    }

    #[test]
    fn test_empty_block_renders() {
        let segments = scan("$$");
        assert_eq!(segments.len(), 1);
        let math = segments[0].as_math().unwrap();
        assert_eq!(math.formula, "");
        assert_eq!(math.display_mode, DisplayMode::Block);

        let rendered = MathRenderer::default().render("$$");
        assert_eq!(rendered.len(), 1);
        assert_eq!(rendered[0].display_mode(), Some(DisplayMode::Block));
    }

    #[test]
    fn test_plain_text_is_escaped() {
        let html = render_math_text("1 < 2 & 3 > 2");
        assert!(html.contains("1 &lt; 2 &amp; 3 &gt; 2"));
        assert!(!html.contains("<math"));
    }

    #[test]
    fn test_unclosed_stays_literal() {
        let html = render_math_text("unclosed $formula");
        assert!(html.contains("unclosed $formula"));
        assert!(!html.contains("<math"));
    }

    #[test]
    fn test_strict_trust_refuses_links() {
        let options = RenderOptions {
            trust: TrustLevel::Strict,
            error_tolerant: false,
            ..RenderOptions::default()
        };
        let renderer = MathRenderer::with_options(MathmlEngine::new(), options);
        let segments = renderer.render(r"see $\href{http://x}{y}$");
        assert!(segments[1].is_fallback());
    }

    #[test]
    fn test_attribute_like_text_is_not_rejected() {
        let renderer: MathRenderer = MathRenderer::default();
        for input in [r"$\text{javascript: x}$", r"$\text{a /onset= b}$"] {
            let segments = renderer.render(input);
            assert!(
                matches!(segments[0], RenderedSegment::Math { .. }),
                "{} fell back: {:?}",
                input,
                segments[0]
            );
        }
    }

    #[test]
    fn test_vietnamese_text_around_math() {
        let html = render_math_text("Định lý: $a^2 + b^2 = c^2$ (Pythagore)");
        assert!(html.contains("Định lý: "));
        assert!(html.contains("(Pythagore)"));
        assert!(html.contains("<msup>"));
    }
}

// ============================================================================
// Other engines
// ============================================================================

mod typst {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_typst_engine_through_renderer() {
        let renderer = MathRenderer::new(TypstEngine::new());
        let segments = renderer.render(r"$\frac{1}{2}$");
        match &segments[0] {
            RenderedSegment::Math { markup, .. } => {
                assert!(markup.as_str().contains("typst-math"));
            }
            other => panic!("expected math, got {:?}", other),
        }
    }

    #[test]
    fn test_boxed_engine() {
        let engine: Box<dyn MathEngine> = mathplan::engine_by_name("typst").unwrap();
        let renderer = MathRenderer::new(engine);
        assert_eq!(renderer.engine().name(), "typst");
        assert!(mathplan::engine_by_name("katex").is_none());
    }
}

// ============================================================================
// Scanner through the facade
// ============================================================================

#[test]
fn test_spans_rebuild_input() {
    let input = r"Mix $a$, $$b$$, \(c\), \[d\] and a stray $ sign";
    let rebuilt: String = scan(input).iter().map(Segment::source).collect();
    assert_eq!(rebuilt, input);
}
