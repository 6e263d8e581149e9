//! Findings produced by the interaction resolver

use crate::alert::FormattedAlert;
use crate::severity::InteractionSeverity;
use serde::{Deserialize, Serialize};

/// A detected interaction between two of the patient's medications
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrugInteractionFinding {
    /// The colliding pair, in scan order
    pub medication_ids: [String; 2],
    pub severity: InteractionSeverity,
    pub description: String,
}

/// A detected conflict between a medication and a recorded allergy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllergyFinding {
    pub medication_id: String,
    pub allergy_id: String,
    pub severity: InteractionSeverity,
    pub description: String,
    /// The documented reaction from the allergy record
    pub reaction: String,
}

/// Combined result of the "new medication" safety check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionCheck {
    pub drug_interactions: Vec<DrugInteractionFinding>,
    pub allergy_interactions: Vec<AllergyFinding>,
    /// Present only when the check ran on behalf of a specific user, since
    /// alert suppression is user-specific
    #[serde(default)]
    pub clinical_alerts: Vec<FormattedAlert>,
}
