//! Provider traits for clinical data access

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use octofhir_cds_types::{
    AlertCategory, AlertSeverity, Allergy, ClinicalAlertDefinition, Diagnosis, LabResult,
    Medication, Patient, PreferenceUpdate, UserAlertPreference,
};

/// Error returned by any data provider
#[derive(Debug, Clone, thiserror::Error)]
pub enum ProviderError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Provider unavailable: {0}")]
    Unavailable(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    IoError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Patient lookup by id
#[async_trait]
pub trait PatientProvider: Send + Sync {
    /// Fetch a patient record; `None` when the id is unknown
    async fn patient(&self, patient_id: &str) -> Result<Option<Patient>, ProviderError>;
}

/// Problem-list access
#[async_trait]
pub trait DiagnosisProvider: Send + Sync {
    /// Active diagnoses for a patient
    async fn active_diagnoses(&self, patient_id: &str) -> Result<Vec<Diagnosis>, ProviderError>;
}

/// Medication catalog access
#[async_trait]
pub trait MedicationProvider: Send + Sync {
    /// Resolve medication records for a list of ids
    ///
    /// Unknown ids are skipped rather than treated as errors; the returned
    /// list preserves the order of the ids that resolved.
    async fn medications_by_ids(&self, ids: &[String]) -> Result<Vec<Medication>, ProviderError>;
}

/// Laboratory result access
#[async_trait]
pub trait LabResultProvider: Send + Sync {
    /// Results for a patient resulted at or after `since`
    async fn recent_results(
        &self,
        patient_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<LabResult>, ProviderError>;
}

/// Allergy record access
#[async_trait]
pub trait AllergyProvider: Send + Sync {
    /// Active, medication-type allergies for a patient
    async fn active_medication_allergies(
        &self,
        patient_id: &str,
    ) -> Result<Vec<Allergy>, ProviderError>;
}

/// Per-user alert preference storage
///
/// Updates are atomic per user; a supplied field of the update replaces the
/// stored value wholesale (last writer wins). Preferences are created lazily
/// with all-enabled defaults and never deleted automatically.
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    /// Load a user's preferences, creating the all-enabled default on first access
    async fn get_or_default(&self, user_id: &str) -> Result<UserAlertPreference, ProviderError>;

    /// Apply a partial update and return the stored result
    async fn update(
        &self,
        user_id: &str,
        update: PreferenceUpdate,
    ) -> Result<UserAlertPreference, ProviderError>;

    /// Remove the alert-level preference entry for `alert_id` from every user
    ///
    /// Cascade hook for alert deletion. Returns the number of users touched.
    async fn remove_alert_for_all_users(&self, alert_id: &str) -> Result<usize, ProviderError>;
}

/// Filter and pagination for alert definition listings
#[derive(Debug, Clone, Default)]
pub struct AlertListFilter {
    pub category: Option<AlertCategory>,
    pub severity: Option<AlertSeverity>,
    pub active: Option<bool>,
    /// Case-insensitive substring match over title and description
    pub search: Option<String>,
    /// 1-based page number; 0 is treated as 1
    pub page: usize,
    /// Clamped to 1..=100; 0 selects the default of 20
    pub page_size: usize,
}

/// One page of an alert definition listing
#[derive(Debug, Clone, PartialEq)]
pub struct AlertPage {
    pub items: Vec<ClinicalAlertDefinition>,
    /// Total matches before pagination
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
}

/// Alert definition storage
#[async_trait]
pub trait AlertDefinitionStore: Send + Sync {
    /// Paginated, filterable listing
    async fn list(&self, filter: &AlertListFilter) -> Result<AlertPage, ProviderError>;

    /// Fetch one definition; `None` when the id is unknown
    async fn get(&self, id: &str) -> Result<Option<ClinicalAlertDefinition>, ProviderError>;

    /// All active definitions, in insertion order
    async fn active_definitions(&self) -> Result<Vec<ClinicalAlertDefinition>, ProviderError>;

    /// Insert a new definition; conflicts on an existing id
    async fn insert(&self, definition: ClinicalAlertDefinition) -> Result<(), ProviderError>;

    /// Replace an existing definition
    async fn update(&self, definition: ClinicalAlertDefinition) -> Result<(), ProviderError>;

    /// Delete a definition; returns whether it existed
    async fn delete(&self, id: &str) -> Result<bool, ProviderError>;

    /// Number of system-defined definitions currently stored
    async fn system_defined_count(&self) -> Result<usize, ProviderError>;
}
