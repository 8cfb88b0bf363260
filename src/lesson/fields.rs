//! Strings of a lesson plan that are displayed with math rendering.

use serde::Serialize;
use tracing::debug;

use super::contract::{Exercise, GenerationResult};
use crate::core::engine::MathEngine;
use crate::core::render::{MathRenderer, RenderedSegment};

/// One math-bearing string and where it lives in the plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MathField<'a> {
    pub path: String,
    pub text: &'a str,
}

/// A math field after rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedField {
    pub path: String,
    pub segments: Vec<RenderedSegment>,
    pub html: String,
    /// Number of formulas shown as source because they failed to render.
    pub fallbacks: usize,
}

impl GenerationResult {
    /// Every field the lesson viewer renders through the math renderer,
    /// in document order.
    ///
    /// Names, objectives lists and competency tables are shown as plain text
    /// and are not included.
    pub fn math_fields(&self) -> Vec<MathField<'_>> {
        let mut fields = Vec::new();
        let plan = &self.lesson_plan;

        for (i, text) in plan.objectives.knowledge.iter().enumerate() {
            push(&mut fields, format!("lesson_plan.muc_tieu.kien_thuc[{}]", i), text);
        }

        for (s, section) in plan.procedure.iter().enumerate() {
            for (a, activity) in section.activities.iter().enumerate() {
                let base = format!("lesson_plan.tien_trinh[{}].cac_hoat_dong[{}]", s, a);
                push(&mut fields, format!("{}.noi_dung", base), &activity.content);
                push(&mut fields, format!("{}.san_pham", base), &activity.product);

                let org = format!("{}.to_chuc_thuc_hien_2_cot", base);
                for (key, text) in activity.organization.steps.iter() {
                    push(&mut fields, format!("{}.hoat_dong_gv_hs.{}", org, key), text);
                }

                let product = &activity.organization.expected_product;
                let product_path = format!("{}.san_pham_du_kien", org);
                push(&mut fields, format!("{}.tom_tat", product_path), &product.summary);
                for (k, item) in product.new_knowledge.iter().enumerate() {
                    push(
                        &mut fields,
                        format!("{}.kien_thuc_moi[{}].noi_dung", product_path, k),
                        &item.content,
                    );
                }
                push_exercises(&mut fields, &product_path, "vi_du", &product.examples);
                push_exercises(&mut fields, &product_path, "bai_tap", &product.exercises);
            }
        }

        for (i, text) in plan.homework.iter().enumerate() {
            push(&mut fields, format!("lesson_plan.huong_dan_ve_nha[{}]", i), text);
        }

        fields
    }
}

// Empty strings render to nothing and are skipped.
fn push<'a>(fields: &mut Vec<MathField<'a>>, path: String, text: &'a str) {
    if !text.is_empty() {
        fields.push(MathField { path, text });
    }
}

fn push_exercises<'a>(
    fields: &mut Vec<MathField<'a>>,
    parent: &str,
    key: &str,
    exercises: &'a [Exercise],
) {
    for (i, exercise) in exercises.iter().enumerate() {
        let base = format!("{}.{}[{}]", parent, key, i);
        push(fields, format!("{}.de_bai", base), &exercise.problem);
        push(fields, format!("{}.loi_giai_chi_tiet", base), &exercise.solution);
    }
}

/// Render every math field of `result`.
///
/// Each field is rendered independently; a broken formula only marks its own
/// field's `fallbacks` count.
pub fn render_lesson_fields<E: MathEngine>(
    result: &GenerationResult,
    renderer: &MathRenderer<E>,
) -> Vec<RenderedField> {
    let rendered: Vec<RenderedField> = result
        .math_fields()
        .into_iter()
        .map(|f| {
            let segments = renderer.render(f.text);
            let html = renderer.to_markup(&segments).into_string();
            let fallbacks = segments.iter().filter(|s| s.is_fallback()).count();
            RenderedField {
                path: f.path,
                segments,
                html,
                fallbacks,
            }
        })
        .collect();
    debug!(fields = rendered.len(), "rendered lesson fields");
    rendered
}
