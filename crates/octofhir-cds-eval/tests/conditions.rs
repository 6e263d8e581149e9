//! Condition evaluator tests
//!
//! One truth table per evaluator kind, plus the documented no-op behavior of
//! `custom` and unrecognized condition types.

mod common;

use common::{context_at, diagnosis, lab, medication, patient, trigger};
use octofhir_cds_eval::{evaluate_condition, AppointmentContext};
use octofhir_cds_types::{ConditionType, Gender, TriggerCondition, ValueRange};
use rstest::rstest;
use rust_decimal::Decimal;

fn ctx() -> octofhir_cds_eval::EvaluationContext {
    context_at(patient("p1", "1980-06-15", Gender::Female), "2026-03-10T12:00:00Z")
}

// ============================================================================
// Diagnosis
// ============================================================================

#[test]
fn diagnosis_matches_on_any_listed_code() {
    let mut context = ctx();
    context.diagnoses = vec![diagnosis("E11"), diagnosis("I10")];

    assert!(evaluate_condition(
        &trigger(ConditionType::Diagnosis, &["J45", "E11"]),
        &context
    ));
    assert!(!evaluate_condition(
        &trigger(ConditionType::Diagnosis, &["J45"]),
        &context
    ));
}

#[test]
fn diagnosis_is_independent_of_medications_and_labs() {
    let mut context = ctx();
    context.diagnoses = vec![diagnosis("E11")];
    context.medications = vec![medication("m1", "metformin", "biguanide")];
    context.lab_results = vec![lab("HbA1c", "9.0", "2026-03-01T00:00:00Z")];

    let condition = trigger(ConditionType::Diagnosis, &["E11"]);
    assert!(evaluate_condition(&condition, &context));

    context.medications.clear();
    context.lab_results.clear();
    assert!(evaluate_condition(&condition, &context));
}

// ============================================================================
// Medication
// ============================================================================

#[rstest]
#[case("m1", true)] // by id
#[case("metformin", true)] // by generic name
#[case("Biguanide", true)] // by classification, case-insensitive
#[case("insulin", false)]
fn medication_matches_by_id_name_or_class(#[case] code: &str, #[case] expected: bool) {
    let mut context = ctx();
    context.medications = vec![medication("m1", "metformin", "biguanide")];

    assert_eq!(
        evaluate_condition(&trigger(ConditionType::Medication, &[code]), &context),
        expected
    );
}

// ============================================================================
// Lab result
// ============================================================================

fn lab_condition(min: Option<&str>, max: Option<&str>) -> TriggerCondition {
    TriggerCondition {
        condition_type: ConditionType::LabResult,
        codes: vec!["HbA1c".to_string()],
        value_range: Some(ValueRange {
            min: min.map(|v| v.parse::<Decimal>().unwrap()),
            max: max.map(|v| v.parse::<Decimal>().unwrap()),
        }),
    }
}

#[rstest]
#[case("8.5", Some("8.0"), None, true)] // above an open-ended minimum
#[case("7.9", Some("8.0"), None, false)]
#[case("8.0", Some("8.0"), None, true)] // bounds are inclusive
#[case("6.5", Some("6.0"), Some("7.0"), true)]
#[case("7.5", Some("6.0"), Some("7.0"), false)]
#[case("not-a-number", Some("8.0"), None, false)] // unparseable value never matches
fn lab_range_checks_parsed_value(
    #[case] value: &str,
    #[case] min: Option<&str>,
    #[case] max: Option<&str>,
    #[case] expected: bool,
) {
    let mut context = ctx();
    context.lab_results = vec![lab("HbA1c", value, "2026-03-01T00:00:00Z")];

    assert_eq!(
        evaluate_condition(&lab_condition(min, max), &context),
        expected
    );
}

#[test]
fn lab_without_range_matches_on_code_alone() {
    let mut context = ctx();
    context.lab_results = vec![lab("HbA1c", "anything", "2026-03-01T00:00:00Z")];

    assert!(evaluate_condition(
        &trigger(ConditionType::LabResult, &["HbA1c"]),
        &context
    ));
    assert!(!evaluate_condition(
        &trigger(ConditionType::LabResult, &["8480-6"]),
        &context
    ));
}

// ============================================================================
// Patient demographic
// ============================================================================

// Context patient is born 1980-06-15, evaluated on 2026-03-10: age 45.
#[rstest]
#[case("age>44", true)]
#[case("age>45", false)]
#[case("age<46", true)]
#[case("age=45", true)]
#[case("age=44", false)]
#[case("gender=female", true)]
#[case("gender=FEMALE", true)]
#[case("gender=male", false)]
#[case("gender>female", false)] // only `=` is defined for gender
#[case("age>abc", false)] // malformed bound never matches
#[case("weight>100", false)] // unknown attribute never matches
fn demographic_expressions(#[case] code: &str, #[case] expected: bool) {
    assert_eq!(
        evaluate_condition(&trigger(ConditionType::PatientDemographic, &[code]), &ctx()),
        expected
    );
}

#[test]
fn demographic_codes_are_ored() {
    let condition = trigger(ConditionType::PatientDemographic, &["age>90", "gender=female"]);
    assert!(evaluate_condition(&condition, &ctx()));
}

// ============================================================================
// Seasonal
// ============================================================================

#[rstest]
#[case("month=3", true)] // evaluated in March
#[case("month=1,3,5", true)]
#[case("month=4,5", false)]
#[case("season=spring", true)]
#[case("season=SPRING", true)]
#[case("season=winter", false)]
#[case("season=monsoon", false)] // unknown season never matches
#[case("equinox", false)] // unrecognized expression never matches
fn seasonal_expressions(#[case] code: &str, #[case] expected: bool) {
    assert_eq!(
        evaluate_condition(&trigger(ConditionType::Seasonal, &[code]), &ctx()),
        expected
    );
}

#[test]
fn winter_wraps_the_year_end() {
    let december = context_at(patient("p1", "1980-06-15", Gender::Female), "2025-12-20T00:00:00Z");
    let january = context_at(patient("p1", "1980-06-15", Gender::Female), "2026-01-20T00:00:00Z");
    let condition = trigger(ConditionType::Seasonal, &["season=winter"]);

    assert!(evaluate_condition(&condition, &december));
    assert!(evaluate_condition(&condition, &january));
}

// ============================================================================
// Appointment type
// ============================================================================

#[test]
fn appointment_type_requires_an_appointment_in_context() {
    let condition = trigger(ConditionType::AppointmentType, &["annual-physical"]);
    let mut context = ctx();
    assert!(!evaluate_condition(&condition, &context));

    context.appointment = Some(AppointmentContext {
        appointment_type: "annual-physical".to_string(),
    });
    assert!(evaluate_condition(&condition, &context));

    context.appointment = Some(AppointmentContext {
        appointment_type: "follow-up".to_string(),
    });
    assert!(!evaluate_condition(&condition, &context));
}

// ============================================================================
// Custom and unknown types
// ============================================================================

#[test]
fn custom_conditions_never_match() {
    let mut context = ctx();
    context.diagnoses = vec![diagnosis("E11")];

    assert!(!evaluate_condition(
        &trigger(ConditionType::Custom, &["E11"]),
        &context
    ));
}

#[test]
fn unrecognized_condition_types_never_match() {
    let condition: TriggerCondition = serde_json::from_str(
        r#"{"condition_type": "genomic-marker", "codes": ["CYP2D6"]}"#,
    )
    .unwrap();
    assert!(!evaluate_condition(&condition, &ctx()));
}
