//! Math rendering core
//!
//! - [`engine`]: typesetting engines behind the [`engine::MathEngine`] trait
//! - [`markup`]: escaping and the sanitization boundary for engine output
//! - [`render`]: the segment-by-segment renderer

pub mod engine;
pub mod markup;
pub mod render;

pub use engine::{EngineOptions, MathEngine, MathmlEngine, TrustLevel, TypstEngine};
pub use markup::{escape_html, sanitize, Markup};
pub use render::{MathRenderer, RenderOptions, RenderedSegment};
