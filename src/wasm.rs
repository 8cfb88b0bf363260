//! WASM bindings for mathplan
//!
//! This module provides JavaScript-accessible functions for rendering math in
//! lesson text and checking generated lesson plans.

use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

use crate::core::engine::{engine_by_name, MathEngine};
use crate::core::render::{MathRenderer, RenderOptions, RenderedSegment};
use crate::lesson::{validate, GenerationResult, ValidationIssue};

/// Rendering options (exposed to WASM)
#[derive(Serialize, Deserialize)]
pub struct WasmRenderOptions {
    /// Engine name: `mathml` or `typst`
    #[serde(default = "default_engine")]
    pub engine: String,
    /// Renderer settings; missing keys keep their defaults
    #[serde(flatten, default)]
    pub render: RenderOptions,
}

impl Default for WasmRenderOptions {
    fn default() -> Self {
        Self {
            engine: default_engine(),
            render: RenderOptions::default(),
        }
    }
}

fn default_engine() -> String {
    "mathml".to_string()
}

/// Render result with per-segment detail
#[derive(Serialize)]
pub struct RenderResult {
    /// The assembled HTML fragment
    pub html: String,
    /// Rendered segments in source order
    pub segments: Vec<RenderedSegment>,
    /// Number of formulas shown as source
    pub fallbacks: usize,
    /// Whether rendering ran to completion
    pub success: bool,
    /// Error message if rendering could not run
    pub error: Option<String>,
}

impl RenderResult {
    fn failed(error: String) -> Self {
        Self {
            html: String::new(),
            segments: vec![],
            fallbacks: 0,
            success: false,
            error: Some(error),
        }
    }
}

/// Lesson plan check result
#[derive(Serialize)]
pub struct LessonCheckResult {
    /// No errors were found (warnings are allowed)
    pub valid: bool,
    pub issues: Vec<ValidationIssue>,
    /// Set when the input is not a lesson plan at all
    pub error: Option<String>,
}

/// Safely serialize a value to JsValue, returning an error object on failure.
fn to_js_value<T: Serialize>(value: &T) -> JsValue {
    serde_wasm_bindgen::to_value(value).unwrap_or_else(|e| {
        let error_obj = RenderResult::failed(format!("Serialization error: {}", e));
        serde_wasm_bindgen::to_value(&error_obj).unwrap_or(JsValue::NULL)
    })
}

/// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Render text containing delimited LaTeX to an HTML fragment
///
/// # Arguments
/// * `input` - Text with `$...$`, `$$...$$`, `\(...\)` or `\[...\]` math
///
/// # Returns
/// HTML fragment
#[wasm_bindgen(js_name = "renderMathText")]
pub fn render_math_text_wasm(input: &str) -> String {
    crate::render_math_text(input)
}

/// Render text with options
#[wasm_bindgen(js_name = "renderMathTextWithOptions")]
pub fn render_math_text_with_options_wasm(input: &str, options: JsValue) -> JsValue {
    let opts: WasmRenderOptions = serde_wasm_bindgen::from_value(options).unwrap_or_default();

    let Some(engine) = engine_by_name(&opts.engine) else {
        return to_js_value(&RenderResult::failed(format!(
            "Unknown engine '{}'",
            opts.engine
        )));
    };

    let result = match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        render_with(engine, opts.render, input)
    })) {
        Ok(result) => result,
        Err(e) => {
            let error_msg = if let Some(s) = e.downcast_ref::<&str>() {
                format!("Rendering failed: {}", s)
            } else if let Some(s) = e.downcast_ref::<String>() {
                format!("Rendering failed: {}", s)
            } else {
                "Rendering failed: unknown error (check browser console for details)".to_string()
            };
            RenderResult::failed(error_msg)
        }
    };

    to_js_value(&result)
}

fn render_with(engine: Box<dyn MathEngine>, options: RenderOptions, input: &str) -> RenderResult {
    let renderer = MathRenderer::with_options(engine, options);
    let segments = renderer.render(input);
    let html = renderer.to_markup(&segments).into_string();
    RenderResult {
        html,
        fallbacks: segments.iter().filter(|s| s.is_fallback()).count(),
        segments,
        success: true,
        error: None,
    }
}

/// Split text into plain and math segments
#[wasm_bindgen(js_name = "scanMath")]
pub fn scan_math_wasm(input: &str) -> JsValue {
    to_js_value(&crate::scan(input))
}

/// Check a generated lesson plan
///
/// # Arguments
/// * `input` - Lesson plan JSON as returned by the provider
#[wasm_bindgen(js_name = "validateLessonPlan")]
pub fn validate_lesson_plan_wasm(input: &str) -> JsValue {
    let result = match serde_json::from_str::<GenerationResult>(input) {
        Ok(plan) => {
            let report = validate(&plan);
            LessonCheckResult {
                valid: report.is_valid(),
                issues: report.issues,
                error: None,
            }
        }
        Err(e) => LessonCheckResult {
            valid: false,
            issues: vec![],
            error: Some(crate::ContractError::from(e).to_string()),
        },
    };
    to_js_value(&result)
}

/// Get version information
#[wasm_bindgen(js_name = "getVersion")]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
