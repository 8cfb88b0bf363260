//! Integration tests for the lesson-plan contract

use mathplan::lesson::{
    accept, attach_inputs, response_schema, validate, KnowledgeKind, SectionKind, Severity,
};
use mathplan::{
    parse_generation_result, render_lesson_fields, ContractError, CredentialError,
    CredentialProvider, CredentialState, EnvCredentialProvider, FormError, FormInputs,
    GenerationRequest, GenerationResult, MathRenderer, StaticCredentialProvider,
};

const THALES: &str = include_str!("fixtures/thales_grade8.json");

fn thales() -> GenerationResult {
    serde_json::from_str(THALES).expect("fixture parses")
}

// ============================================================================
// Contract
// ============================================================================

mod contract {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_fixture_reads_wire_names() {
        let plan = thales();
        let lesson = &plan.lesson_plan;
        assert_eq!(lesson.general_info.title, "ĐỊNH LÝ THALES TRONG TAM GIÁC");
        assert_eq!(lesson.procedure.len(), 2);
        assert_eq!(lesson.procedure[0].kind, SectionKind::WarmUp);
        assert_eq!(lesson.procedure[1].kind, SectionKind::NewKnowledge);

        let activity = &lesson.procedure[1].activities[0];
        assert_eq!(
            activity.organization.expected_product.new_knowledge[0].kind,
            Some(KnowledgeKind::Theorem)
        );
        assert_eq!(activity.digital_integration, vec!["5.2.TC2b".to_string()]);
        assert_eq!(lesson.procedure[0].activities[0].no_device_alternative, "");
        assert_eq!(plan.quality_checklist.has_formative_assessment, Some(true));
        assert!(plan.form_inputs.is_none());
    }

    #[test]
    fn test_serde_round_trip() {
        let plan = thales();
        let json = serde_json::to_string(&plan).unwrap();
        let again: GenerationResult = serde_json::from_str(&json).unwrap();
        assert_eq!(again, plan);
    }

    #[test]
    fn test_missing_section_is_json_error() {
        let err = parse_generation_result(r#"{ "lesson_plan": {} }"#).unwrap_err();
        assert!(matches!(err, ContractError::Json { .. }));
        assert!(err.report().is_none());
    }

    #[test]
    fn test_math_fields_in_document_order() {
        let plan = thales();
        let fields = plan.math_fields();
        assert_eq!(fields.len(), 21);
        assert_eq!(fields[0].path, "lesson_plan.muc_tieu.kien_thuc[0]");
        assert!(fields
            .iter()
            .all(|f| !f.path.ends_with("bai_tap[0].loi_giai_chi_tiet")));
        assert_eq!(
            fields.last().map(|f| f.path.as_str()),
            Some("lesson_plan.huong_dan_ve_nha[1]")
        );
    }
}

// ============================================================================
// Validation
// ============================================================================

mod validation {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_fixture_is_valid() {
        let validated = parse_generation_result(THALES).unwrap();
        assert!(validated.report.is_valid());
        assert!(validated.report.issues.is_empty());
    }

    #[test]
    fn test_malformed_code_is_error() {
        let mut plan = thales();
        plan.digital_competency_map[0].codes = vec!["NLS-5".to_string()];
        let report = validate(&plan);
        assert_eq!(report.error_count(), 1);
        assert_eq!(report.issues[0].path, "digital_competency_map[0].ma_nls[0]");
    }

    #[test]
    fn test_tier_mismatch_needs_grade() {
        let mut plan = thales();
        plan.lesson_plan.objectives.digital_competencies[0].code = "5.2.TC1b".to_string();
        assert!(validate(&plan).is_valid());

        plan.form_inputs = Some(FormInputs::new("Định lý Thales", 8, 2));
        let report = validate(&plan);
        assert!(!report.is_valid());
        assert!(report.issues[0].message.contains("requires TC2"));

        let err = accept(plan).unwrap_err();
        assert_eq!(err.report().map(|r| r.error_count()), Some(1));
    }

    #[test]
    fn test_warnings_do_not_fail() {
        let mut plan = thales();
        plan.lesson_plan.procedure[0].kind = SectionKind::from("on_tap".to_string());
        plan.quality_checklist.not_overloaded = Some(false);
        plan.lesson_plan.homework.push("Tính $x".to_string());

        let validated = accept(plan).unwrap();
        let warnings: Vec<_> = validated.report.warnings().map(|i| i.path.as_str()).collect();
        assert_eq!(
            warnings,
            vec![
                "lesson_plan.tien_trinh[0].loai_phan",
                "quality_checklist.khong_qua_tai",
                "lesson_plan.huong_dan_ve_nha[2]",
            ]
        );
        assert!(validated
            .report
            .issues
            .iter()
            .all(|i| i.severity == Severity::Warning));
    }

    #[test]
    fn test_empty_procedure_is_error() {
        let mut plan = thales();
        plan.lesson_plan.procedure.clear();
        assert!(matches!(accept(plan), Err(ContractError::Invalid(_))));
    }
}

// ============================================================================
// Rendering lesson fields
// ============================================================================

#[test]
fn test_render_lesson_fields() {
    let plan = thales();
    let rendered = render_lesson_fields(&plan, &MathRenderer::default());
    assert_eq!(rendered.len(), 21);
    assert!(rendered.iter().all(|f| f.fallbacks == 0));

    let theorem = rendered
        .iter()
        .find(|f| f.path.ends_with("kien_thuc_moi[0].noi_dung"))
        .unwrap();
    assert!(theorem.html.contains("display=\"block\""));
    assert!(theorem.html.contains("<mfrac>"));
}

// ============================================================================
// Form and request
// ============================================================================

mod request {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_form_rejects_out_of_range() {
        assert!(matches!(
            FormInputs::new("Hàm số", 5, 2).validate(),
            Err(FormError::OutOfRange { field: "khoi_lop", .. })
        ));
        assert!(matches!(
            FormInputs::new("Hàm số", 9, 11).validate(),
            Err(FormError::OutOfRange { field: "so_tiet", .. })
        ));
    }

    #[test]
    fn test_prompt_names_tier() {
        let seven = GenerationRequest::new(&FormInputs::new("Tỉ lệ thức", 7, 2)).unwrap();
        assert!(seven.prompt.contains("định dạng TC1"));
        let eight = GenerationRequest::new(&FormInputs::new("Định lý Thales", 8, 2)).unwrap();
        assert!(eight.prompt.contains("định dạng TC2"));
        assert_eq!(eight.model, "gemini-3-flash-preview");
        assert_eq!(eight.response_schema, response_schema());
    }

    #[test]
    fn test_request_serializes() {
        let request = GenerationRequest::new(&FormInputs::new("Định lý Thales", 8, 2))
            .unwrap()
            .with_model("custom-model");
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["model"], "custom-model");
        assert_eq!(value["response_mime_type"], "application/json");
        assert!(value["system_instruction"]
            .as_str()
            .unwrap()
            .contains("TC2"));
    }

    #[test]
    fn test_finish_attaches_inputs() {
        let inputs = FormInputs::new("Định lý Thales", 8, 2);
        let validated = GenerationRequest::finish(THALES, &inputs).unwrap();
        assert_eq!(validated.plan.form_inputs, Some(inputs.clone()));

        let attached = attach_inputs(THALES, &inputs).unwrap();
        assert_eq!(attached, validated.plan);
    }

    #[test]
    fn test_finish_checks_tier_against_inputs() {
        let inputs = FormInputs::new("Định lý Thales", 6, 2);
        let err = GenerationRequest::finish(THALES, &inputs).unwrap_err();
        assert_eq!(err.report().map(|r| r.error_count()), Some(2));
    }
}

// ============================================================================
// Credentials
// ============================================================================

mod credentials {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_env_without_vars_is_absent() {
        let provider =
            EnvCredentialProvider::with_vars(["MATHPLAN_IT_UNSET_A", "MATHPLAN_IT_UNSET_B"]);
        assert_eq!(provider.state(), CredentialState::Absent);
        assert_eq!(provider.require(), Err(CredentialError::Absent));
    }

    #[test]
    fn test_static_provider_states() {
        assert!(StaticCredentialProvider::new("AIzaSyExample").state().is_present());
        assert!(matches!(
            StaticCredentialProvider::new(" ").state(),
            CredentialState::Invalid(_)
        ));
        assert_eq!(StaticCredentialProvider::absent().state().to_string(), "absent");
    }
}
