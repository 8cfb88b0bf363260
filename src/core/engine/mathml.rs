//! MathML engine backed by `pulldown-latex`.

use pulldown_latex::config::DisplayMode as LatexDisplayMode;
use pulldown_latex::{push_mathml, Parser, RenderConfig, Storage};
use tracing::trace;

use super::{error_markup, untrusted_command, EngineOptions, MathEngine};
use crate::core::markup::escape_html;
use crate::utils::error::{EngineError, EngineResult};

/// Renders LaTeX to MathML Core.
///
/// In error-tolerant mode parse errors are drawn inside the `<math>` element
/// as `<merror>` by `pulldown-latex` itself; otherwise the first parse error
/// is returned. The writer can still panic on some malformed input; the
/// renderer contains such panics on native targets only, since a panic on
/// `wasm32` aborts the module.
#[derive(Debug, Clone, Default)]
pub struct MathmlEngine {
    /// Attach the LaTeX source as a `<annotation>` for copy/paste.
    pub annotate: bool,
}

impl MathmlEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_annotation() -> Self {
        Self { annotate: true }
    }
}

impl MathEngine for MathmlEngine {
    fn name(&self) -> &'static str {
        "mathml"
    }

    fn render(&self, formula: &str, options: &EngineOptions) -> EngineResult<String> {
        if let Some(command) = untrusted_command(formula, options.trust) {
            let err = EngineError::untrusted(command);
            if options.error_tolerant {
                return Ok(error_markup(formula, &err, options.display_mode));
            }
            return Err(err);
        }

        if !options.error_tolerant {
            let storage = Storage::new();
            let first_error = Parser::new(formula, &storage).find_map(|event| event.err());
            if let Some(err) = first_error {
                return Err(EngineError::parse(err.to_string()));
            }
        }

        // `pulldown-latex` copies the annotation verbatim.
        let annotation = escape_html(formula);
        let config = RenderConfig {
            display_mode: if options.display_mode.is_block() {
                LatexDisplayMode::Block
            } else {
                LatexDisplayMode::Inline
            },
            annotation: self.annotate.then_some(annotation.as_str()),
            ..RenderConfig::default()
        };

        let storage = Storage::new();
        let parser = Parser::new(formula, &storage);
        let mut mathml = String::new();
        push_mathml(&mut mathml, parser, config)
            .map_err(|e| EngineError::output(e.to_string()))?;
        trace!(formula, len = mathml.len(), "rendered MathML");
        Ok(mathml)
    }
}
