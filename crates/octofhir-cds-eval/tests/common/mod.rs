//! Shared builders for the evaluation test suites
#![allow(dead_code)]

use chrono::{DateTime, Utc};
use octofhir_cds_eval::EvaluationContext;
use octofhir_cds_types::{
    AlertCategory, AlertSeverity, Allergy, AllergenType, ClinicalAlertDefinition, ConditionType,
    Diagnosis, DiagnosisStatus, Gender, InteractionSeverity, LabResult, Medication,
    MedicationInteraction, Patient, TriggerCondition,
};
use std::collections::BTreeMap;

pub fn at(instant: &str) -> DateTime<Utc> {
    instant.parse().expect("valid RFC 3339 instant")
}

pub fn medication(id: &str, generic_name: &str, classification: &str) -> Medication {
    Medication {
        id: id.to_string(),
        name: generic_name.to_string(),
        generic_name: generic_name.to_string(),
        classification: classification.to_string(),
        interactions: Vec::new(),
    }
}

pub fn declares(
    mut medication: Medication,
    interacts_with_id: &str,
    severity: InteractionSeverity,
    description: &str,
) -> Medication {
    medication.interactions.push(MedicationInteraction {
        interacts_with_id: interacts_with_id.to_string(),
        severity,
        description: description.to_string(),
    });
    medication
}

pub fn allergy(
    id: &str,
    patient_id: &str,
    medication_id: Option<&str>,
    allergen_class: Option<&str>,
) -> Allergy {
    Allergy {
        id: id.to_string(),
        patient_id: patient_id.to_string(),
        allergen_type: AllergenType::Medication,
        medication_id: medication_id.map(str::to_string),
        allergen_class: allergen_class.map(str::to_string),
        reaction: "hives".to_string(),
        is_active: true,
    }
}

pub fn patient(id: &str, date_of_birth: &str, gender: Gender) -> Patient {
    Patient {
        id: id.to_string(),
        date_of_birth: date_of_birth.parse().expect("valid date"),
        gender,
        demographics: BTreeMap::new(),
        active_medications: Vec::new(),
    }
}

pub fn diagnosis(code: &str) -> Diagnosis {
    Diagnosis {
        code: code.to_string(),
        description: code.to_string(),
        status: DiagnosisStatus::Active,
    }
}

pub fn lab(test_code: &str, value: &str, resulted_at: &str) -> LabResult {
    LabResult {
        test_code: test_code.to_string(),
        test_name: test_code.to_string(),
        value: value.to_string(),
        unit: None,
        resulted_at: at(resulted_at),
    }
}

pub fn trigger(condition_type: ConditionType, codes: &[&str]) -> TriggerCondition {
    TriggerCondition {
        condition_type,
        codes: codes.iter().map(|c| c.to_string()).collect(),
        value_range: None,
    }
}

pub fn definition(
    id: &str,
    category: AlertCategory,
    severity: AlertSeverity,
    conditions: Vec<TriggerCondition>,
) -> ClinicalAlertDefinition {
    ClinicalAlertDefinition {
        id: id.to_string(),
        title: format!("Alert {id}"),
        description: format!("Description for {id}"),
        category,
        severity,
        is_active: true,
        is_system_defined: false,
        recommended_action: None,
        trigger_conditions: conditions,
    }
}

/// An otherwise-empty context for a patient, evaluated at a fixed instant
pub fn context_at(patient: Patient, instant: &str) -> EvaluationContext {
    let now = at(instant);
    let today = now.date_naive();
    EvaluationContext {
        age_years: patient.age_in_years(today),
        diagnoses: Vec::new(),
        medications: Vec::new(),
        lab_results: Vec::new(),
        appointment: None,
        current_medication_ids: Vec::new(),
        today,
        now,
        patient,
    }
}
