//! Typesetting engines
//!
//! An engine turns the text of one formula into markup. The renderer treats
//! every engine as a black box that may fail or panic. Two engines ship with
//! the crate:
//! - [`MathmlEngine`]: MathML Core through `pulldown-latex` (the default)
//! - [`TypstEngine`]: Typst math source through `mitex`

mod mathml;
mod typst;

pub use mathml::MathmlEngine;
pub use typst::TypstEngine;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::core::markup::escape_html;
use crate::utils::error::{EngineError, EngineResult};
use mathplan_segments::DisplayMode;

/// How much of the macro surface a formula may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TrustLevel {
    /// Links, images and raw HTML hooks are refused.
    Strict,
    /// Every command the engine understands is allowed.
    #[default]
    Trusted,
}

/// Per-call engine configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    pub display_mode: DisplayMode,
    /// Report malformed input inside the markup instead of returning `Err`.
    pub error_tolerant: bool,
    pub trust: TrustLevel,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            display_mode: DisplayMode::Inline,
            error_tolerant: true,
            trust: TrustLevel::Trusted,
        }
    }
}

impl EngineOptions {
    pub fn inline() -> Self {
        Self::default()
    }

    pub fn block() -> Self {
        Self {
            display_mode: DisplayMode::Block,
            ..Self::default()
        }
    }

    pub fn strict(self) -> Self {
        Self {
            error_tolerant: false,
            ..self
        }
    }
}

/// A formula-to-markup converter.
///
/// Implementations must be deterministic: the same formula and options always
/// produce the same markup.
pub trait MathEngine: Send + Sync {
    /// Short identifier used in logs and on the command line.
    fn name(&self) -> &'static str;

    /// Render `formula` (delimiters already removed) to markup.
    fn render(&self, formula: &str, options: &EngineOptions) -> EngineResult<String>;
}

impl<E: MathEngine + ?Sized> MathEngine for Box<E> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn render(&self, formula: &str, options: &EngineOptions) -> EngineResult<String> {
        (**self).render(formula, options)
    }
}

impl<E: MathEngine + ?Sized> MathEngine for &E {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn render(&self, formula: &str, options: &EngineOptions) -> EngineResult<String> {
        (**self).render(formula, options)
    }
}

lazy_static! {
    static ref UNTRUSTED_COMMAND: Regex = Regex::new(
        r"\\(href|url|includegraphics|htmlClass|htmlId|htmlStyle|htmlData)\b"
    )
    .expect("valid regex");
}

/// First command in `formula` that `trust` forbids.
pub fn untrusted_command(formula: &str, trust: TrustLevel) -> Option<&str> {
    match trust {
        TrustLevel::Trusted => None,
        TrustLevel::Strict => UNTRUSTED_COMMAND.find(formula).map(|m| m.as_str()),
    }
}

/// Markup shown in place of a formula the engine could not typeset while in
/// error-tolerant mode.
pub(crate) fn error_markup(formula: &str, err: &EngineError, display: DisplayMode) -> String {
    let mode = if display.is_block() { "block" } else { "inline" };
    format!(
        "<span class=\"math-error\" data-display=\"{}\" title=\"{}\">{}</span>",
        mode,
        escape_html(&err.to_string()),
        escape_html(formula),
    )
}

/// Engine selected by name, as accepted by the CLI and WASM options.
pub fn engine_by_name(name: &str) -> Option<Box<dyn MathEngine>> {
    match name {
        "mathml" => Some(Box::new(MathmlEngine::new())),
        "typst" => Some(Box::new(TypstEngine::new())),
        _ => None,
    }
}
