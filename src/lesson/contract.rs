//! Lesson-plan data contract
//!
//! Rust types for the JSON object the generation provider returns. Field names
//! on the wire are the provider's Vietnamese snake_case keys; the Rust names
//! are English.

use std::fmt;

use phf::phf_map;
use serde::{Deserialize, Serialize};

use super::form::FormInputs;

/// Version of the contract these types describe.
pub const SCHEMA_VERSION: u32 = 1;

/// Complete provider response, plus the form that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form_inputs: Option<FormInputs>,
    pub lesson_plan: LessonPlanContent,
    pub digital_competency_map: Vec<DigitalCompetencyMapEntry>,
    pub quality_checklist: QualityChecklist,
    #[serde(rename = "giao_an_markdown")]
    pub markdown: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LessonPlanContent {
    #[serde(rename = "thong_tin_chung")]
    pub general_info: GeneralInfo,
    #[serde(rename = "muc_tieu")]
    pub objectives: Objectives,
    #[serde(rename = "thiet_bi")]
    pub equipment: Equipment,
    #[serde(rename = "tien_trinh")]
    pub procedure: Vec<ProcedureSection>,
    #[serde(rename = "huong_dan_ve_nha")]
    pub homework: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneralInfo {
    #[serde(rename = "dong_dau_trang")]
    pub header_lines: Vec<String>,
    #[serde(rename = "tieu_de_bai")]
    pub title: String,
    #[serde(rename = "mon_lop_thoi_luong")]
    pub subject_grade_duration: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Objectives {
    #[serde(rename = "kien_thuc")]
    pub knowledge: Vec<String>,
    #[serde(rename = "nang_luc")]
    pub competencies: Competencies,
    #[serde(rename = "nang_luc_so")]
    pub digital_competencies: Vec<DigitalCompetency>,
    #[serde(rename = "pham_chat")]
    pub qualities: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Competencies {
    #[serde(rename = "nang_luc_chung")]
    pub general: Vec<String>,
    #[serde(rename = "nang_luc_dac_thu_toan")]
    pub mathematical: Vec<String>,
}

/// A digital competency (NLS) targeted by the lesson.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigitalCompetency {
    #[serde(rename = "ma")]
    pub code: String,
    #[serde(rename = "mo_ta")]
    pub description: String,
    #[serde(rename = "dia_chi_tich_hop")]
    pub integration_points: Vec<DigitalCompetencyAddress>,
}

/// Where in the lesson a digital competency is exercised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigitalCompetencyAddress {
    #[serde(rename = "hoat_dong")]
    pub activity: String,
    #[serde(rename = "muc_do")]
    pub level: String,
    #[serde(rename = "minh_chung")]
    pub evidence: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Equipment {
    #[serde(rename = "giao_vien")]
    pub teacher: Vec<String>,
    #[serde(rename = "hoc_sinh")]
    pub students: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcedureSection {
    #[serde(rename = "ten_phan")]
    pub title: String,
    #[serde(rename = "loai_phan")]
    pub kind: SectionKind,
    #[serde(rename = "cac_hoat_dong")]
    pub activities: Vec<ProcedureActivity>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcedureActivity {
    #[serde(rename = "ten_hoat_dong")]
    pub name: String,
    #[serde(rename = "muc_tieu")]
    pub objectives: Vec<String>,
    #[serde(rename = "noi_dung")]
    pub content: String,
    #[serde(rename = "san_pham")]
    pub product: String,
    #[serde(rename = "to_chuc_thuc_hien_2_cot")]
    pub organization: Organization,
    #[serde(rename = "danh_gia_thuong_xuyen", default)]
    pub formative_assessment: Vec<String>,
    #[serde(rename = "tich_hop_nls", default)]
    pub digital_integration: Vec<String>,
    #[serde(rename = "phuong_an_khong_thiet_bi", default)]
    pub no_device_alternative: String,
}

/// The two-column "organisation" table of an activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    #[serde(rename = "hoat_dong_gv_hs")]
    pub steps: ActivitySteps,
    #[serde(rename = "san_pham_du_kien")]
    pub expected_product: ExpectedProduct,
}

/// The four standard steps of a teacher/student activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivitySteps {
    /// Assigning the task
    #[serde(rename = "buoc_1")]
    pub assign: String,
    /// Carrying out the task
    #[serde(rename = "buoc_2")]
    pub perform: String,
    /// Reporting and discussion
    #[serde(rename = "buoc_3")]
    pub report: String,
    /// Conclusion
    #[serde(rename = "buoc_4")]
    pub conclude: String,
}

impl ActivitySteps {
    /// Steps in order, with their wire keys.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            ("buoc_1", self.assign.as_str()),
            ("buoc_2", self.perform.as_str()),
            ("buoc_3", self.report.as_str()),
            ("buoc_4", self.conclude.as_str()),
        ]
        .into_iter()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpectedProduct {
    #[serde(rename = "tom_tat")]
    pub summary: String,
    #[serde(rename = "kien_thuc_moi")]
    pub new_knowledge: Vec<KnowledgeItem>,
    #[serde(rename = "vi_du")]
    pub examples: Vec<Exercise>,
    #[serde(rename = "bai_tap")]
    pub exercises: Vec<Exercise>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct KnowledgeItem {
    #[serde(rename = "loai", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<KnowledgeKind>,
    #[serde(rename = "noi_dung", default)]
    pub content: String,
}

/// A worked example or an exercise with its solution.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Exercise {
    #[serde(rename = "de_bai", default)]
    pub problem: String,
    #[serde(rename = "loi_giai_chi_tiet", default)]
    pub solution: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigitalCompetencyMapEntry {
    #[serde(rename = "hoat_dong")]
    pub activity: String,
    #[serde(rename = "ma_nls")]
    pub codes: Vec<String>,
    #[serde(rename = "bieu_hien")]
    pub indicators: Vec<String>,
    #[serde(rename = "cong_cu_so", default)]
    pub digital_tools: Option<Vec<String>>,
    #[serde(rename = "minh_chung")]
    pub evidence: Vec<String>,
}

/// Self-check flags the provider fills in. Absent flags are `None`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QualityChecklist {
    #[serde(rename = "dung_bo_cuc_mau", default)]
    pub follows_template: Option<bool>,
    // The provider schema spells this key `co_danh_gia_thu_xuyen`.
    #[serde(
        rename = "co_danh_gia_thuong_xuyen",
        alias = "co_danh_gia_thu_xuyen",
        default
    )]
    pub has_formative_assessment: Option<bool>,
    #[serde(rename = "co_dia_chi_nls", default)]
    pub has_competency_addresses: Option<bool>,
    #[serde(rename = "khong_qua_tai", default)]
    pub not_overloaded: Option<bool>,
    #[serde(rename = "ghi_chu_loi_neu_co", default)]
    pub issues: Option<Vec<String>>,
}

impl QualityChecklist {
    /// Flags with their wire keys, in schema order.
    pub fn flags(&self) -> [(&'static str, Option<bool>); 4] {
        [
            ("dung_bo_cuc_mau", self.follows_template),
            ("co_danh_gia_thuong_xuyen", self.has_formative_assessment),
            ("co_dia_chi_nls", self.has_competency_addresses),
            ("khong_qua_tai", self.not_overloaded),
        ]
    }
}

// =============================================================================
// Enumerated kinds
// =============================================================================

/// Kind of a new-knowledge item (`loai`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum KnowledgeKind {
    Concept,
    Property,
    Theorem,
    Corollary,
    Remark,
    Conclusion,
    /// A value outside the contract, kept verbatim.
    Other(String),
}

static KNOWLEDGE_KINDS: phf::Map<&'static str, KnowledgeKind> = phf_map! {
    "khai_niem" => KnowledgeKind::Concept,
    "tinh_chat" => KnowledgeKind::Property,
    "dinh_ly" => KnowledgeKind::Theorem,
    "he_qua" => KnowledgeKind::Corollary,
    "nhan_xet" => KnowledgeKind::Remark,
    "ket_luan" => KnowledgeKind::Conclusion,
};

impl KnowledgeKind {
    pub fn as_wire(&self) -> &str {
        match self {
            KnowledgeKind::Concept => "khai_niem",
            KnowledgeKind::Property => "tinh_chat",
            KnowledgeKind::Theorem => "dinh_ly",
            KnowledgeKind::Corollary => "he_qua",
            KnowledgeKind::Remark => "nhan_xet",
            KnowledgeKind::Conclusion => "ket_luan",
            KnowledgeKind::Other(s) => s,
        }
    }

    /// Heading shown above the item in the printed plan.
    pub fn label(&self) -> &str {
        match self {
            KnowledgeKind::Concept => "Khái niệm",
            KnowledgeKind::Property => "Tính chất",
            KnowledgeKind::Theorem => "Định lý",
            KnowledgeKind::Corollary => "Hệ quả",
            KnowledgeKind::Remark => "Nhận xét",
            KnowledgeKind::Conclusion => "Kết luận",
            KnowledgeKind::Other(s) => s,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, KnowledgeKind::Other(_))
    }
}

impl From<String> for KnowledgeKind {
    fn from(value: String) -> Self {
        KNOWLEDGE_KINDS
            .get(value.as_str())
            .cloned()
            .unwrap_or(KnowledgeKind::Other(value))
    }
}

impl From<KnowledgeKind> for String {
    fn from(kind: KnowledgeKind) -> Self {
        kind.as_wire().to_string()
    }
}

impl fmt::Display for KnowledgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Stage of the lesson a procedure section belongs to (`loai_phan`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SectionKind {
    WarmUp,
    NewKnowledge,
    Practice,
    Application,
    Extension,
    /// A value outside the contract, kept verbatim.
    Other(String),
}

static SECTION_KINDS: phf::Map<&'static str, SectionKind> = phf_map! {
    "khoi_dong" => SectionKind::WarmUp,
    "hinh_thanh_kien_thuc_moi" => SectionKind::NewKnowledge,
    "luyen_tap" => SectionKind::Practice,
    "van_dung" => SectionKind::Application,
    "tim_toi_mo_rong" => SectionKind::Extension,
};

impl SectionKind {
    pub fn as_wire(&self) -> &str {
        match self {
            SectionKind::WarmUp => "khoi_dong",
            SectionKind::NewKnowledge => "hinh_thanh_kien_thuc_moi",
            SectionKind::Practice => "luyen_tap",
            SectionKind::Application => "van_dung",
            SectionKind::Extension => "tim_toi_mo_rong",
            SectionKind::Other(s) => s,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            SectionKind::WarmUp => "Khởi động",
            SectionKind::NewKnowledge => "Hình thành kiến thức mới",
            SectionKind::Practice => "Luyện tập",
            SectionKind::Application => "Vận dụng",
            SectionKind::Extension => "Tìm tòi, mở rộng",
            SectionKind::Other(s) => s,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, SectionKind::Other(_))
    }
}

impl From<String> for SectionKind {
    fn from(value: String) -> Self {
        SECTION_KINDS
            .get(value.as_str())
            .cloned()
            .unwrap_or(SectionKind::Other(value))
    }
}

impl From<SectionKind> for String {
    fn from(kind: SectionKind) -> Self {
        kind.as_wire().to_string()
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_knowledge_kind_wire_values() {
        assert_eq!(KnowledgeKind::from("dinh_ly".to_string()), KnowledgeKind::Theorem);
        assert_eq!(String::from(KnowledgeKind::Remark), "nhan_xet");
        let other = KnowledgeKind::from("bo_de".to_string());
        assert!(!other.is_known());
        assert_eq!(other.as_wire(), "bo_de");
    }

    #[test]
    fn test_section_kind_serde() {
        let kind: SectionKind = serde_json::from_str("\"luyen_tap\"").unwrap();
        assert_eq!(kind, SectionKind::Practice);
        assert_eq!(serde_json::to_string(&kind).unwrap(), "\"luyen_tap\"");
        assert_eq!(kind.label(), "Luyện tập");
    }

    #[test]
    fn test_checklist_accepts_schema_spelling() {
        let checklist: QualityChecklist =
            serde_json::from_str(r#"{ "co_danh_gia_thu_xuyen": true }"#).unwrap();
        assert_eq!(checklist.has_formative_assessment, Some(true));
        assert_eq!(checklist.follows_template, None);
    }

    #[test]
    fn test_knowledge_item_without_kind() {
        let item: KnowledgeItem = serde_json::from_str(r#"{ "noi_dung": "$a^2$" }"#).unwrap();
        assert_eq!(item.kind, None);
        assert_eq!(item.content, "$a^2$");
    }
}
