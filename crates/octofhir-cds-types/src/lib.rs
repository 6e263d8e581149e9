//! Shared domain types for the CDS engine
//!
//! This crate defines the data vocabulary used across the CDS workspace:
//! - The two severity scales (interaction severity and alert severity)
//! - Reference data: medications and their declared interactions
//! - Patient clinical data: allergies, diagnoses, lab results, demographics
//! - Alert definitions with typed trigger conditions
//! - Per-user alert preferences
//! - Findings and formatted alerts produced by the engines

pub mod alert;
pub mod allergy;
pub mod finding;
pub mod medication;
pub mod patient;
pub mod preference;
pub mod severity;

pub use alert::{
    AlertCategory, ClinicalAlertDefinition, ConditionType, FormattedAlert, TriggerCondition,
    ValueRange,
};
pub use allergy::{Allergy, AllergenType};
pub use finding::{AllergyFinding, DrugInteractionFinding, InteractionCheck};
pub use medication::{Medication, MedicationInteraction};
pub use patient::{Diagnosis, DiagnosisStatus, Gender, LabResult, Patient};
pub use preference::{
    AlertPreference, CategoryPreference, CustomText, GlobalAlertStatus, PreferenceStatus,
    PreferenceUpdate, UserAlertPreference,
};
pub use severity::{AlertSeverity, InteractionSeverity};
