//! Lesson-plan generation contract.
//!
//! - `contract`: the JSON document the provider returns
//! - `form`: teacher-entered inputs and their rules
//! - `request`: the generation request built from the form
//! - `validate`: content checks the JSON shape cannot express
//! - `fields`: which strings go through the math renderer

pub mod contract;
pub mod fields;
pub mod form;
pub mod request;
pub mod validate;

pub use contract::{
    ActivitySteps, DigitalCompetency, DigitalCompetencyMapEntry, Exercise, ExpectedProduct,
    GenerationResult, KnowledgeItem, KnowledgeKind, LessonPlanContent, ProcedureActivity,
    ProcedureSection, QualityChecklist, SectionKind, SCHEMA_VERSION,
};
pub use fields::{render_lesson_fields, MathField, RenderedField};
pub use form::{competency_tier, FormInputs, ValidForm};
pub use request::{attach_inputs, response_schema, GenerationRequest};
pub use validate::{
    accept, parse_generation_result, validate, Severity, ValidatedPlan, ValidationIssue,
    ValidationReport,
};
