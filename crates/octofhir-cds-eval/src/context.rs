//! Evaluation context construction
//!
//! The context is the per-call snapshot of patient clinical data that trigger
//! conditions are evaluated against. It is built once, before any evaluation
//! starts, and never mutated afterwards; evaluators may therefore run in any
//! order, or in parallel, over the same snapshot.

use crate::error::CdsResult;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use octofhir_cds_model::{DiagnosisProvider, LabResultProvider, MedicationProvider, ProviderError};
use octofhir_cds_types::{Diagnosis, LabResult, Medication, Patient};
use std::sync::Arc;

/// Rolling window for "recent" lab results
pub const LAB_WINDOW_DAYS: i64 = 30;

/// An in-progress appointment supplied by the caller
#[derive(Debug, Clone, PartialEq)]
pub struct AppointmentContext {
    /// Appointment type code (e.g. "annual-physical", "well-child")
    pub appointment_type: String,
}

/// Caller-supplied overrides for context construction
///
/// A supplied field replaces the corresponding live query entirely; there is
/// no merging. This is how prescribing workflows evaluate a candidate
/// medication list that has not been persisted yet.
#[derive(Debug, Clone, Default)]
pub struct ContextOverrides {
    pub diagnoses: Option<Vec<Diagnosis>>,
    pub medications: Option<Vec<Medication>>,
    pub lab_results: Option<Vec<LabResult>>,
    pub appointment: Option<AppointmentContext>,
    pub current_medication_ids: Option<Vec<String>>,
    /// Overrides the evaluation instant; seasonal conditions and mute
    /// expiries resolve against this
    pub now: Option<DateTime<Utc>>,
}

/// The immutable per-call evaluation snapshot
#[derive(Debug, Clone)]
pub struct EvaluationContext {
    pub patient: Patient,
    /// Age in whole years as of `today`
    pub age_years: u32,
    /// Active diagnoses
    pub diagnoses: Vec<Diagnosis>,
    /// Medications under evaluation (persisted or candidate)
    pub medications: Vec<Medication>,
    /// Lab results within the rolling window
    pub lab_results: Vec<LabResult>,
    pub appointment: Option<AppointmentContext>,
    /// Ids of the patient's current medication list
    pub current_medication_ids: Vec<String>,
    pub today: NaiveDate,
    pub now: DateTime<Utc>,
}

impl EvaluationContext {
    /// Calendar month (1-12) of the evaluation date
    pub fn month(&self) -> u32 {
        use chrono::Datelike;
        self.today.month()
    }
}

/// Assembles evaluation contexts from the data providers
#[derive(Clone)]
pub struct ContextBuilder {
    diagnoses: Arc<dyn DiagnosisProvider>,
    medications: Arc<dyn MedicationProvider>,
    labs: Arc<dyn LabResultProvider>,
}

impl ContextBuilder {
    pub fn new(
        diagnoses: Arc<dyn DiagnosisProvider>,
        medications: Arc<dyn MedicationProvider>,
        labs: Arc<dyn LabResultProvider>,
    ) -> Self {
        Self {
            diagnoses,
            medications,
            labs,
        }
    }

    /// Build the snapshot for one patient
    ///
    /// Fetches for fields the overrides do not supply are issued concurrently
    /// and joined before returning; evaluation never sees a partially
    /// populated context.
    pub async fn build(
        &self,
        patient: Patient,
        overrides: ContextOverrides,
        now: DateTime<Utc>,
    ) -> CdsResult<EvaluationContext> {
        let today = now.date_naive();
        let since = now - Duration::days(LAB_WINDOW_DAYS);

        let (diagnoses, medications, lab_results) = tokio::try_join!(
            self.load_diagnoses(&patient, overrides.diagnoses),
            self.load_medications(&patient, overrides.medications),
            self.load_labs(&patient, overrides.lab_results, since),
        )?;

        let current_medication_ids = overrides
            .current_medication_ids
            .unwrap_or_else(|| patient.active_medications.clone());

        Ok(EvaluationContext {
            age_years: patient.age_in_years(today),
            diagnoses,
            medications,
            lab_results,
            appointment: overrides.appointment,
            current_medication_ids,
            today,
            now,
            patient,
        })
    }

    async fn load_diagnoses(
        &self,
        patient: &Patient,
        supplied: Option<Vec<Diagnosis>>,
    ) -> Result<Vec<Diagnosis>, ProviderError> {
        match supplied {
            Some(diagnoses) => Ok(diagnoses),
            None => self.diagnoses.active_diagnoses(&patient.id).await,
        }
    }

    async fn load_medications(
        &self,
        patient: &Patient,
        supplied: Option<Vec<Medication>>,
    ) -> Result<Vec<Medication>, ProviderError> {
        match supplied {
            Some(medications) => Ok(medications),
            None => {
                self.medications
                    .medications_by_ids(&patient.active_medications)
                    .await
            }
        }
    }

    async fn load_labs(
        &self,
        patient: &Patient,
        supplied: Option<Vec<LabResult>>,
        since: DateTime<Utc>,
    ) -> Result<Vec<LabResult>, ProviderError> {
        match supplied {
            Some(results) => Ok(results),
            None => self.labs.recent_results(&patient.id, since).await,
        }
    }
}
