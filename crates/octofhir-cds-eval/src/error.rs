//! Errors raised by the CDS engines

use octofhir_cds_model::ProviderError;
use std::fmt;
use thiserror::Error;

/// Result type for CDS operations
pub type CdsResult<T> = Result<T, CdsError>;

/// Phase of the combined interaction check that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckPhase {
    DrugInteractions,
    AllergyInteractions,
    ClinicalAlerts,
}

impl fmt::Display for CheckPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::DrugInteractions => "drug-interactions",
            Self::AllergyInteractions => "allergy-interactions",
            Self::ClinicalAlerts => "clinical-alerts",
        };
        f.write_str(name)
    }
}

/// Errors that can occur in the CDS engines
#[derive(Debug, Clone, Error)]
pub enum CdsError {
    /// Patient lookup came back empty
    #[error("Patient not found: {id}")]
    PatientNotFound { id: String },

    /// Alert definition lookup came back empty
    #[error("Alert definition not found: {id}")]
    AlertNotFound { id: String },

    /// Attempted mutation of a protected system-defined alert
    #[error("Alert definition {id} is system-defined; cannot {action}")]
    SystemAlertProtected { id: String, action: String },

    /// A catalog or preference write carried invalid data
    #[error("Invalid alert definition: {message}")]
    InvalidDefinition { message: String },

    /// A data collaborator failed
    #[error("Provider error: {message}")]
    Provider { message: String },

    /// The combined interaction check aborted; no partial result is returned
    #[error("Interaction check failed during {phase}: {message}")]
    InteractionCheck { phase: CheckPhase, message: String },
}

impl CdsError {
    /// Create a patient-not-found error
    pub fn patient_not_found(id: impl Into<String>) -> Self {
        Self::PatientNotFound { id: id.into() }
    }

    /// Create an alert-not-found error
    pub fn alert_not_found(id: impl Into<String>) -> Self {
        Self::AlertNotFound { id: id.into() }
    }

    /// Create a system-alert-protected error
    pub fn system_alert_protected(id: impl Into<String>, action: impl Into<String>) -> Self {
        Self::SystemAlertProtected {
            id: id.into(),
            action: action.into(),
        }
    }

    /// Create an invalid-definition error
    pub fn invalid_definition(message: impl Into<String>) -> Self {
        Self::InvalidDefinition {
            message: message.into(),
        }
    }

    /// Wrap a failure with the interaction-check phase it occurred in
    pub fn check_phase(phase: CheckPhase, source: impl fmt::Display) -> Self {
        Self::InteractionCheck {
            phase,
            message: source.to_string(),
        }
    }
}

impl From<ProviderError> for CdsError {
    fn from(err: ProviderError) -> Self {
        Self::Provider {
            message: err.to_string(),
        }
    }
}
