//! Clinical alert definitions and trigger conditions

use crate::severity::AlertSeverity;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Category a clinical alert belongs to
///
/// Categories are the unit of per-user category preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlertCategory {
    DrugInteraction,
    PreventiveCare,
    DiagnosisAlert,
    LabAlert,
    BestPractice,
    Administrative,
}

impl AlertCategory {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::DrugInteraction => "drug-interaction",
            Self::PreventiveCare => "preventive-care",
            Self::DiagnosisAlert => "diagnosis-alert",
            Self::LabAlert => "lab-alert",
            Self::BestPractice => "best-practice",
            Self::Administrative => "administrative",
        }
    }
}

impl fmt::Display for AlertCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of predicate a trigger condition expresses
///
/// The catch-all [`ConditionType::Other`] absorbs condition kinds introduced
/// by newer catalog versions; such conditions never match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConditionType {
    /// Any active diagnosis code is in `codes`
    Diagnosis,
    /// Any current medication matches a code by id, generic name or classification
    Medication,
    /// Any recent lab result matches a code, optionally within a value range
    LabResult,
    /// Codes are expressions over age and gender (`age>65`, `gender=female`)
    PatientDemographic,
    /// Codes are month lists or season names (`month=10,11`, `season=winter`)
    Seasonal,
    /// An in-progress appointment's type is in `codes`
    AppointmentType,
    /// Reserved extension point; never matches
    Custom,
    /// Unrecognized condition kind; never matches
    #[serde(other)]
    Other,
}

/// Inclusive numeric range for lab-result conditions
///
/// A missing bound leaves that side unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueRange {
    #[serde(default)]
    pub min: Option<Decimal>,
    #[serde(default)]
    pub max: Option<Decimal>,
}

impl ValueRange {
    /// Whether a value lies within the range
    pub fn contains(&self, value: Decimal) -> bool {
        if let Some(min) = self.min {
            if value < min {
                return false;
            }
        }
        if let Some(max) = self.max {
            if value > max {
                return false;
            }
        }
        true
    }
}

/// One typed predicate attached to an alert definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerCondition {
    pub condition_type: ConditionType,
    /// Strings interpreted per condition type
    #[serde(default)]
    pub codes: Vec<String>,
    /// Only meaningful for lab-result conditions
    #[serde(default)]
    pub value_range: Option<ValueRange>,
}

/// A clinical alert definition
///
/// A definition applies when **any** of its trigger conditions matches the
/// evaluation context; there is no AND-composition. System-defined
/// definitions cannot be deleted and cannot change category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClinicalAlertDefinition {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: AlertCategory,
    pub severity: AlertSeverity,
    pub is_active: bool,
    pub is_system_defined: bool,
    #[serde(default)]
    pub recommended_action: Option<String>,
    #[serde(default)]
    pub trigger_conditions: Vec<TriggerCondition>,
}

/// An alert as returned to the caller, with user overrides already applied
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormattedAlert {
    pub alert_id: String,
    pub title: String,
    pub description: String,
    pub category: AlertCategory,
    pub severity: AlertSeverity,
    #[serde(default)]
    pub recommended_action: Option<String>,
    pub is_system_defined: bool,
}
