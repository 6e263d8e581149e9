//! Severity scales
//!
//! Two distinct totally ordered scales are used by the engines:
//! - [`InteractionSeverity`] ranks drug-drug and drug-allergy findings
//! - [`AlertSeverity`] ranks clinical alert definitions
//!
//! The scales have different domains and defaults and are never unified;
//! ordering on each follows variant declaration order.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a drug-drug or drug-allergy interaction
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum InteractionSeverity {
    /// Minor interaction, usually no intervention required
    Mild,
    /// Interaction that may require monitoring or dose adjustment
    Moderate,
    /// Interaction with significant clinical consequences
    Severe,
    /// The combination must not be prescribed
    Contraindicated,
}

impl InteractionSeverity {
    /// Numeric rank on the scale mild(1) < moderate(2) < severe(3) < contraindicated(4)
    pub const fn rank(&self) -> u8 {
        match self {
            Self::Mild => 1,
            Self::Moderate => 2,
            Self::Severe => 3,
            Self::Contraindicated => 4,
        }
    }

    /// Wire name of the severity
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Mild => "mild",
            Self::Moderate => "moderate",
            Self::Severe => "severe",
            Self::Contraindicated => "contraindicated",
        }
    }
}

impl fmt::Display for InteractionSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity of a clinical alert definition
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    /// Informational prompt
    Info,
    /// Warning that deserves clinician attention
    Warning,
    /// Critical alert; survives the `critical-only` global preference mode
    Critical,
}

impl AlertSeverity {
    /// Wire name of the severity
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
