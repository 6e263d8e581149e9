//! Trigger condition evaluators
//!
//! Each evaluator is a pure predicate over the evaluation context. Dispatch
//! is a single `match` over [`ConditionType`], so adding a condition kind is
//! a compile-time-checked change. A malformed condition never fails the
//! containing alert; it simply does not match.

use crate::context::EvaluationContext;
use octofhir_cds_types::{ConditionType, LabResult, Medication, TriggerCondition};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Evaluate one trigger condition against the context
pub fn evaluate_condition(condition: &TriggerCondition, context: &EvaluationContext) -> bool {
    match condition.condition_type {
        ConditionType::Diagnosis => matches_diagnosis(&condition.codes, context),
        ConditionType::Medication => matches_medication(&condition.codes, &context.medications),
        ConditionType::LabResult => matches_lab_result(condition, &context.lab_results),
        ConditionType::PatientDemographic => matches_demographic(&condition.codes, context),
        ConditionType::Seasonal => matches_seasonal(&condition.codes, context.month()),
        ConditionType::AppointmentType => matches_appointment(&condition.codes, context),
        // Reserved extension point; no semantics are defined for it
        ConditionType::Custom => false,
        ConditionType::Other => false,
    }
}

/// Any active diagnosis code is listed in the condition
fn matches_diagnosis(codes: &[String], context: &EvaluationContext) -> bool {
    context
        .diagnoses
        .iter()
        .any(|diagnosis| codes.iter().any(|code| *code == diagnosis.code))
}

/// Any context medication matches a code by id, generic name or classification
fn matches_medication(codes: &[String], medications: &[Medication]) -> bool {
    medications.iter().any(|medication| {
        codes.iter().any(|code| {
            medication.id == *code
                || medication.generic_name.eq_ignore_ascii_case(code)
                || medication.classification.eq_ignore_ascii_case(code)
        })
    })
}

/// Any recent lab result matches a listed test code and, when a range is
/// present, carries a numeric value inside it
fn matches_lab_result(condition: &TriggerCondition, results: &[LabResult]) -> bool {
    results.iter().any(|result| {
        if !condition.codes.iter().any(|code| *code == result.test_code) {
            return false;
        }
        match &condition.value_range {
            None => true,
            Some(range) => Decimal::from_str(result.value.trim())
                .map(|value| range.contains(value))
                .unwrap_or(false),
        }
    })
}

static DEMOGRAPHIC_EXPR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(age|gender)\s*([<>=])\s*(\S+)\s*$").expect("valid regex"));

/// Codes are small expressions: `age>N`, `age<N`, `age=N`, `gender=X`
fn matches_demographic(codes: &[String], context: &EvaluationContext) -> bool {
    codes.iter().any(|code| {
        let Some(captures) = DEMOGRAPHIC_EXPR.captures(code) else {
            return false;
        };
        let op = &captures[2];
        match &captures[1] {
            "age" => {
                let Ok(bound) = captures[3].parse::<u32>() else {
                    return false;
                };
                match op {
                    ">" => context.age_years > bound,
                    "<" => context.age_years < bound,
                    "=" => context.age_years == bound,
                    _ => false,
                }
            }
            "gender" if op == "=" => context
                .patient
                .gender
                .as_str()
                .eq_ignore_ascii_case(&captures[3]),
            _ => false,
        }
    })
}

/// Month set for a season name
fn season_months(season: &str) -> Option<[u32; 3]> {
    match season.to_ascii_lowercase().as_str() {
        "winter" => Some([12, 1, 2]),
        "spring" => Some([3, 4, 5]),
        "summer" => Some([6, 7, 8]),
        "fall" => Some([9, 10, 11]),
        _ => None,
    }
}

/// Codes are `month=1,3,5` comma lists or `season=<name>` mappings
fn matches_seasonal(codes: &[String], month: u32) -> bool {
    codes.iter().any(|code| {
        if let Some(list) = code.strip_prefix("month=") {
            list.split(',')
                .filter_map(|part| part.trim().parse::<u32>().ok())
                .any(|m| m == month)
        } else if let Some(name) = code.strip_prefix("season=") {
            season_months(name.trim()).is_some_and(|months| months.contains(&month))
        } else {
            false
        }
    })
}

/// The context carries an in-progress appointment whose type is listed
fn matches_appointment(codes: &[String], context: &EvaluationContext) -> bool {
    context
        .appointment
        .as_ref()
        .is_some_and(|appointment| codes.iter().any(|code| *code == appointment.appointment_type))
}
