//! Patient allergy records

use serde::{Deserialize, Serialize};

/// Kind of allergen a patient reacts to
///
/// Only [`AllergenType::Medication`] participates in interaction checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AllergenType {
    Medication,
    Food,
    Environmental,
    Other,
}

/// A recorded patient allergy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Allergy {
    pub id: String,
    pub patient_id: String,
    pub allergen_type: AllergenType,
    /// Direct reference to a medication, when the allergen is a specific drug
    #[serde(default)]
    pub medication_id: Option<String>,
    /// Drug classification the patient reacts to (e.g. "penicillin")
    #[serde(default)]
    pub allergen_class: Option<String>,
    /// Documented reaction text
    pub reaction: String,
    pub is_active: bool,
}

impl Allergy {
    /// Whether this allergy participates in drug-allergy checks
    pub fn is_checkable(&self) -> bool {
        self.is_active && self.allergen_type == AllergenType::Medication
    }
}
