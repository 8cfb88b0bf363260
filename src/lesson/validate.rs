//! Local validation of provider output.
//!
//! The provider enforces the JSON shape at generation time; these checks cover
//! what the shape cannot express.

use std::fmt;

use lazy_static::lazy_static;
use mathplan_segments::stray_delimiters;
use regex::Regex;
use serde::Serialize;
use tracing::{debug, warn};

use super::contract::{GenerationResult, SCHEMA_VERSION};
use super::form::competency_tier;
use crate::utils::error::ContractError;

lazy_static! {
    /// `<domain>.<competency>.TC<tier><letter>`, e.g. `3.1.TC1a`.
    static ref NLS_CODE: Regex = Regex::new(r"^\d+\.\d+\.TC([12])[a-z]$").expect("valid regex");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub severity: Severity,
    /// JSON-path-like location using wire keys, e.g. `lesson_plan.tien_trinh[0]`.
    pub path: String,
    pub message: String,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{} at {}: {}", level, self.path, self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub schema_version: u32,
    pub issues: Vec<ValidationIssue>,
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            issues: Vec::new(),
        }
    }
}

impl ValidationReport {
    pub fn errors(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|i| i.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    /// No errors; warnings are allowed.
    pub fn is_valid(&self) -> bool {
        self.error_count() == 0
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.push(Severity::Error, path.into(), message.into());
    }

    fn warning(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.push(Severity::Warning, path.into(), message.into());
    }

    fn push(&mut self, severity: Severity, path: String, message: String) {
        self.issues.push(ValidationIssue {
            severity,
            path,
            message,
        });
    }
}

/// A parsed lesson plan and the warnings it passed with.
#[derive(Debug, Clone)]
pub struct ValidatedPlan {
    pub plan: GenerationResult,
    pub report: ValidationReport,
}

/// Check a lesson plan against the content rules of the contract.
pub fn validate(result: &GenerationResult) -> ValidationReport {
    let mut report = ValidationReport::default();
    let plan = &result.lesson_plan;
    let grade = result.form_inputs.as_ref().and_then(|f| f.grade);

    if plan.general_info.title.trim().is_empty() {
        report.error("lesson_plan.thong_tin_chung.tieu_de_bai", "lesson title is empty");
    }

    for (i, competency) in plan.objectives.digital_competencies.iter().enumerate() {
        check_code(
            &mut report,
            format!("lesson_plan.muc_tieu.nang_luc_so[{}].ma", i),
            &competency.code,
            grade,
        );
    }

    if plan.procedure.is_empty() {
        report.error("lesson_plan.tien_trinh", "lesson has no procedure sections");
    }
    for (s, section) in plan.procedure.iter().enumerate() {
        let path = format!("lesson_plan.tien_trinh[{}]", s);
        if !section.kind.is_known() {
            report.warning(
                format!("{}.loai_phan", path),
                format!("unknown section kind '{}'", section.kind.as_wire()),
            );
        }
        if section.activities.is_empty() {
            report.error(
                format!("{}.cac_hoat_dong", path),
                format!("section '{}' has no activities", section.title),
            );
        }
        for (a, activity) in section.activities.iter().enumerate() {
            let knowledge = &activity.organization.expected_product.new_knowledge;
            for (k, item) in knowledge.iter().enumerate() {
                if let Some(kind) = item.kind.as_ref().filter(|kind| !kind.is_known()) {
                    report.warning(
                        format!(
                            "{}.cac_hoat_dong[{}].to_chuc_thuc_hien_2_cot.san_pham_du_kien.kien_thuc_moi[{}].loai",
                            path, a, k
                        ),
                        format!("unknown knowledge kind '{}'", kind.as_wire()),
                    );
                }
            }
        }
    }

    for (i, entry) in result.digital_competency_map.iter().enumerate() {
        for (j, code) in entry.codes.iter().enumerate() {
            check_code(
                &mut report,
                format!("digital_competency_map[{}].ma_nls[{}]", i, j),
                code,
                grade,
            );
        }
    }

    for (key, flag) in result.quality_checklist.flags() {
        if flag == Some(false) {
            report.warning(
                format!("quality_checklist.{}", key),
                "provider self-check reported this item as not met",
            );
        }
    }

    for field in result.math_fields() {
        for stray in stray_delimiters(field.text) {
            report.warning(
                field.path.clone(),
                format!(
                    "unmatched math delimiter `{}` at byte {}",
                    stray.token, stray.offset
                ),
            );
        }
    }

    debug!(
        errors = report.error_count(),
        issues = report.issues.len(),
        "validated lesson plan"
    );
    report
}

fn check_code(report: &mut ValidationReport, path: String, code: &str, grade: Option<u8>) {
    let Some(caps) = NLS_CODE.captures(code.trim()) else {
        report.error(
            path,
            format!("'{}' is not a digital competency code like 3.1.TC1a", code),
        );
        return;
    };
    let Some(grade) = grade else {
        return;
    };
    let expected = competency_tier(grade);
    if caps[1] != expected.to_string() {
        report.error(
            path,
            format!("'{}' uses TC{} but grade {} requires TC{}", code, &caps[1], grade, expected),
        );
    }
}

/// Parse provider text and validate it.
///
/// Fails when the JSON is malformed or when validation finds errors;
/// warnings are returned alongside the plan.
pub fn parse_generation_result(text: &str) -> Result<ValidatedPlan, ContractError> {
    accept(serde_json::from_str(text)?)
}

/// Validate an already-deserialized plan, failing on errors.
pub fn accept(plan: GenerationResult) -> Result<ValidatedPlan, ContractError> {
    let report = validate(&plan);
    if !report.is_valid() {
        for issue in report.errors() {
            warn!(path = issue.path.as_str(), "{}", issue.message);
        }
        return Err(ContractError::Invalid(report));
    }
    Ok(ValidatedPlan { plan, report })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report_for(code: &str, grade: Option<u8>) -> ValidationReport {
        let mut report = ValidationReport::default();
        check_code(&mut report, "x".to_string(), code, grade);
        report
    }

    #[test]
    fn test_code_format() {
        assert!(report_for("3.1.TC1a", None).is_valid());
        assert!(report_for("12.3.TC2b", None).is_valid());
        assert!(!report_for("3.1.TC3a", None).is_valid());
        assert!(!report_for("3.1a", None).is_valid());
        assert!(!report_for("3.1.TC1", None).is_valid());
    }

    #[test]
    fn test_code_tier_matches_grade() {
        assert!(report_for("3.1.TC1a", Some(6)).is_valid());
        assert!(report_for("5.2.TC2b", Some(9)).is_valid());
        let report = report_for("5.2.TC2b", Some(7));
        assert_eq!(report.error_count(), 1);
        assert!(report.issues[0].message.contains("requires TC1"));
    }

    #[test]
    fn test_issue_display() {
        let issue = ValidationIssue {
            severity: Severity::Warning,
            path: "a.b".to_string(),
            message: "m".to_string(),
        };
        assert_eq!(issue.to_string(), "warning at a.b: m");
    }
}
