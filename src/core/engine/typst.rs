//! Typst engine backed by `mitex`.
//!
//! Produces Typst math source wrapped in a `<code>` element, for documents
//! that are typeset by Typst downstream rather than displayed in a browser.

use tracing::trace;

use super::{error_markup, untrusted_command, EngineOptions, MathEngine};
use crate::core::markup::escape_html;
use crate::utils::error::{EngineError, EngineResult};

#[derive(Debug, Clone, Copy, Default)]
pub struct TypstEngine;

impl TypstEngine {
    pub fn new() -> Self {
        TypstEngine
    }

    /// Convert one formula to Typst math, delimiters included.
    ///
    /// Block formulas get the padded `$ ... $` form Typst uses for display math.
    pub fn convert(&self, formula: &str, options: &EngineOptions) -> EngineResult<String> {
        if let Some(command) = untrusted_command(formula, options.trust) {
            return Err(EngineError::untrusted(command));
        }
        let body = mitex::convert_math(formula, None).map_err(EngineError::parse)?;
        let body = body.trim();
        Ok(if options.display_mode.is_block() {
            format!("$ {} $", body)
        } else {
            format!("${}$", body)
        })
    }
}

impl MathEngine for TypstEngine {
    fn name(&self) -> &'static str {
        "typst"
    }

    fn render(&self, formula: &str, options: &EngineOptions) -> EngineResult<String> {
        match self.convert(formula, options) {
            Ok(typst) => {
                trace!(formula, typst = typst.as_str(), "converted to Typst");
                let mode = if options.display_mode.is_block() {
                    "block"
                } else {
                    "inline"
                };
                Ok(format!(
                    "<code class=\"typst-math\" data-display=\"{}\">{}</code>",
                    mode,
                    escape_html(&typst)
                ))
            }
            Err(err) if options.error_tolerant => {
                Ok(error_markup(formula, &err, options.display_mode))
            }
            Err(err) => Err(err),
        }
    }
}
