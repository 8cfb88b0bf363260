//! Generation request payload.
//!
//! Everything the surrounding application sends to the model provider, built
//! as plain data. Transport and authentication belong to the caller.

use serde::Serialize;
use serde_json::{json, Value};
use tracing::debug;

use super::contract::GenerationResult;
use super::form::{competency_tier, FormInputs};
use super::validate::{accept, ValidatedPlan};
use crate::utils::error::{ContractError, FormError};

pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_TEMPERATURE: f32 = 0.1;
pub const RESPONSE_MIME_TYPE: &str = "application/json";

pub const SYSTEM_INSTRUCTION: &str = "Bạn là Chatbot chuyên gia soạn \"Kế hoạch bài dạy (giáo án)\" môn Toán THCS theo Công văn 5512/BGDĐT và tích hợp Năng lực số (CV 3456).

QUY TẮC MÃ NĂNG LỰC SỐ (NLS) - BẮT BUỘC:
- Định dạng mã NLS phải là: [STT].[STT].TC1[ký tự] (cho Lớp 6, 7) HOẶC [STT].[STT].TC2[ký tự] (cho Lớp 8, 9).
- Ví dụ Lớp 6, 7: 3.1.TC1a, 4.2.TC1b.
- Ví dụ Lớp 8, 9: 5.2.TC2b, 1.3.TC2a.
- TUYỆT ĐỐI không sử dụng các mã khác ngoài TC1 cho lớp 6-7 và TC2 cho lớp 8-9.

QUY TẮC TOÁN HỌC:
- Sử dụng LaTeX chuẩn: inline bọc bởi $, block bọc bởi $$.
- Trình bày công thức rõ ràng, chi tiết từng bước giải.

QUY TẮC HÀNH CHÍNH:
- Để trống tên trường, tổ, giáo viên bằng \"....................\".";

/// Request body for one lesson-plan generation.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationRequest {
    pub model: String,
    pub prompt: String,
    pub system_instruction: String,
    pub temperature: f32,
    pub response_mime_type: String,
    pub response_schema: Value,
}

impl GenerationRequest {
    /// Build the request for validated form inputs.
    pub fn new(inputs: &FormInputs) -> Result<Self, FormError> {
        let form = inputs.validate()?;
        let prompt = format!(
            "Soạn giáo án chi tiết bài \"{}\" lớp {}, thời lượng {} tiết. \n    \
             Yêu cầu ghi chú: {}. \n    \
             Lưu ý: Mã NLS phải đúng định dạng TC{} và trình bày LaTeX đẹp.",
            form.topic,
            form.grade,
            form.sessions,
            form.notes.unwrap_or("Không có"),
            competency_tier(form.grade),
        );
        debug!(grade = form.grade, sessions = form.sessions, "built generation prompt");
        Ok(Self {
            model: DEFAULT_MODEL.to_string(),
            prompt,
            system_instruction: SYSTEM_INSTRUCTION.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            response_mime_type: RESPONSE_MIME_TYPE.to_string(),
            response_schema: response_schema(),
        })
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Turn the provider's response text into a validated plan, attaching the
    /// form inputs that produced it.
    pub fn finish(
        response_text: &str,
        inputs: &FormInputs,
    ) -> Result<ValidatedPlan, ContractError> {
        if response_text.trim().is_empty() {
            return Err(ContractError::json("provider returned an empty response"));
        }
        accept(attach_inputs(response_text, inputs)?)
    }
}

/// Parse a response and attach the inputs, without validating.
pub fn attach_inputs(
    response_text: &str,
    inputs: &FormInputs,
) -> Result<GenerationResult, ContractError> {
    let mut result: GenerationResult = serde_json::from_str(response_text)?;
    result.form_inputs = Some(inputs.clone());
    Ok(result)
}

fn string() -> Value {
    json!({ "type": "STRING" })
}

fn strings() -> Value {
    json!({ "type": "ARRAY", "items": string() })
}

fn object(required: &[&str], properties: Value) -> Value {
    json!({ "type": "OBJECT", "required": required, "properties": properties })
}

fn array_of(items: Value) -> Value {
    json!({ "type": "ARRAY", "items": items })
}

/// Response schema handed to the provider, in its OpenAPI-subset dialect.
pub fn response_schema() -> Value {
    let exercise = json!({
        "type": "OBJECT",
        "properties": { "de_bai": string(), "loi_giai_chi_tiet": string() }
    });
    let knowledge = json!({
        "type": "OBJECT",
        "properties": { "loai": string(), "noi_dung": string() }
    });

    let activity = object(
        &["ten_hoat_dong", "muc_tieu", "noi_dung", "san_pham", "to_chuc_thuc_hien_2_cot"],
        json!({
            "ten_hoat_dong": string(),
            "muc_tieu": strings(),
            "noi_dung": string(),
            "san_pham": string(),
            "to_chuc_thuc_hien_2_cot": object(
                &["hoat_dong_gv_hs", "san_pham_du_kien"],
                json!({
                    "hoat_dong_gv_hs": object(
                        &["buoc_1", "buoc_2", "buoc_3", "buoc_4"],
                        json!({
                            "buoc_1": string(),
                            "buoc_2": string(),
                            "buoc_3": string(),
                            "buoc_4": string()
                        })
                    ),
                    "san_pham_du_kien": object(
                        &["tom_tat", "kien_thuc_moi", "vi_du", "bai_tap"],
                        json!({
                            "tom_tat": string(),
                            "kien_thuc_moi": array_of(knowledge),
                            "vi_du": array_of(exercise.clone()),
                            "bai_tap": array_of(exercise)
                        })
                    )
                })
            )
        }),
    );

    let lesson_plan = object(
        &["thong_tin_chung", "muc_tieu", "thiet_bi", "tien_trinh", "huong_dan_ve_nha"],
        json!({
            "thong_tin_chung": object(
                &["dong_dau_trang", "tieu_de_bai", "mon_lop_thoi_luong"],
                json!({
                    "dong_dau_trang": strings(),
                    "tieu_de_bai": string(),
                    "mon_lop_thoi_luong": string()
                })
            ),
            "muc_tieu": object(
                &["kien_thuc", "nang_luc", "nang_luc_so", "pham_chat"],
                json!({
                    "kien_thuc": strings(),
                    "nang_luc": object(
                        &["nang_luc_chung", "nang_luc_dac_thu_toan"],
                        json!({
                            "nang_luc_chung": strings(),
                            "nang_luc_dac_thu_toan": strings()
                        })
                    ),
                    "nang_luc_so": array_of(object(
                        &["ma", "mo_ta", "dia_chi_tich_hop"],
                        json!({
                            "ma": string(),
                            "mo_ta": string(),
                            "dia_chi_tich_hop": array_of(object(
                                &["hoat_dong", "muc_do", "minh_chung"],
                                json!({
                                    "hoat_dong": string(),
                                    "muc_do": string(),
                                    "minh_chung": string()
                                })
                            ))
                        })
                    )),
                    "pham_chat": strings()
                })
            ),
            "thiet_bi": object(
                &["giao_vien", "hoc_sinh"],
                json!({ "giao_vien": strings(), "hoc_sinh": strings() })
            ),
            "tien_trinh": array_of(object(
                &["ten_phan", "loai_phan", "cac_hoat_dong"],
                json!({
                    "ten_phan": string(),
                    "loai_phan": string(),
                    "cac_hoat_dong": array_of(activity)
                })
            )),
            "huong_dan_ve_nha": strings()
        }),
    );

    object(
        &["lesson_plan", "digital_competency_map", "quality_checklist", "giao_an_markdown"],
        json!({
            "lesson_plan": lesson_plan,
            "digital_competency_map": array_of(object(
                &["hoat_dong", "ma_nls", "bieu_hien", "minh_chung"],
                json!({
                    "hoat_dong": string(),
                    "ma_nls": strings(),
                    "bieu_hien": strings(),
                    "minh_chung": strings()
                })
            )),
            "quality_checklist": {
                "type": "OBJECT",
                "properties": {
                    "dung_bo_cuc_mau": { "type": "BOOLEAN" },
                    "co_danh_gia_thuong_xuyen": { "type": "BOOLEAN" },
                    "co_dia_chi_nls": { "type": "BOOLEAN" },
                    "khong_qua_tai": { "type": "BOOLEAN" },
                    "ghi_chu_loi_neu_co": strings()
                }
            },
            "giao_an_markdown": string()
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_tier_follows_grade() {
        let seven = GenerationRequest::new(&FormInputs::new("Số hữu tỉ", 7, 3)).unwrap();
        assert!(seven.prompt.contains("lớp 7"));
        assert!(seven.prompt.contains("TC1"));
        assert!(seven.prompt.contains("Không có"));

        let form = FormInputs::new("Định lý Thales", 8, 2).with_notes("Dùng GeoGebra");
        let eight = GenerationRequest::new(&form).unwrap();
        assert!(eight.prompt.contains("TC2"));
        assert!(eight.prompt.contains("Dùng GeoGebra"));
        assert!(eight.prompt.contains("thời lượng 2 tiết"));
    }

    #[test]
    fn test_request_rejects_invalid_form() {
        assert!(GenerationRequest::new(&FormInputs::new("", 8, 2)).is_err());
    }

    #[test]
    fn test_schema_shape() {
        let schema = response_schema();
        assert_eq!(schema["type"], "OBJECT");
        assert_eq!(schema["required"][0], "lesson_plan");
        let steps = &schema["properties"]["lesson_plan"]["properties"]["tien_trinh"]["items"]
            ["properties"]["cac_hoat_dong"]["items"]["properties"]["to_chuc_thuc_hien_2_cot"]
            ["properties"]["hoat_dong_gv_hs"];
        assert_eq!(steps["required"].as_array().unwrap().len(), 4);
    }

    #[test]
    fn test_finish_rejects_empty_response() {
        let inputs = FormInputs::new("x", 8, 2);
        assert!(matches!(
            GenerationRequest::finish("  ", &inputs),
            Err(ContractError::Json { .. })
        ));
    }
}
