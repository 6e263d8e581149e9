//! Medication reference data

use crate::severity::InteractionSeverity;
use serde::{Deserialize, Serialize};

/// A medication catalog entry
///
/// Immutable reference data maintained by catalog management. Interaction
/// declarations are one-directional: a pair of medications may be declared on
/// one or both sides, and the interaction resolver arbitrates between them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Medication {
    /// Catalog identifier
    pub id: String,
    /// Brand or display name
    pub name: String,
    /// Generic (non-proprietary) name
    pub generic_name: String,
    /// Drug classification (e.g. "ACE inhibitor", "penicillin")
    pub classification: String,
    /// Interactions declared on this side
    #[serde(default)]
    pub interactions: Vec<MedicationInteraction>,
}

/// An interaction declared by one medication against another
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicationInteraction {
    /// Catalog id of the interacting medication
    pub interacts_with_id: String,
    /// Severity of the combination
    pub severity: InteractionSeverity,
    /// Clinical description of the interaction
    pub description: String,
}
