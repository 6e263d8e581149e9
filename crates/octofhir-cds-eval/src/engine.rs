//! The alert engine and the combined interaction facade

use crate::conditions::evaluate_condition;
use crate::context::{ContextBuilder, ContextOverrides};
use crate::error::{CdsError, CdsResult, CheckPhase};
use crate::interactions::{resolve_allergy_interactions, resolve_drug_interactions};
use crate::preferences::{apply_global_mode, format_alert, is_suppressed};
use chrono::Utc;
use octofhir_cds_model::{
    AlertDefinitionStore, AllergyProvider, DiagnosisProvider, LabResultProvider,
    MedicationProvider, PatientProvider, PreferenceStore,
};
use octofhir_cds_types::{
    FormattedAlert, GlobalAlertStatus, InteractionCheck, PreferenceUpdate, UserAlertPreference,
};
use std::sync::Arc;

/// The CDS alert engine
///
/// Owns handles to the data collaborators and orchestrates a single call:
/// build the context, load the preference snapshot, apply the global mode,
/// evaluate trigger conditions, drop suppressed alerts, format the rest.
pub struct AlertEngine {
    patients: Arc<dyn PatientProvider>,
    allergies: Arc<dyn AllergyProvider>,
    medications: Arc<dyn MedicationProvider>,
    preferences: Arc<dyn PreferenceStore>,
    definitions: Arc<dyn AlertDefinitionStore>,
    context_builder: ContextBuilder,
}

impl AlertEngine {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        patients: Arc<dyn PatientProvider>,
        diagnoses: Arc<dyn DiagnosisProvider>,
        medications: Arc<dyn MedicationProvider>,
        labs: Arc<dyn LabResultProvider>,
        allergies: Arc<dyn AllergyProvider>,
        preferences: Arc<dyn PreferenceStore>,
        definitions: Arc<dyn AlertDefinitionStore>,
    ) -> Self {
        let context_builder = ContextBuilder::new(diagnoses, medications.clone(), labs);
        Self {
            patients,
            allergies,
            medications,
            preferences,
            definitions,
            context_builder,
        }
    }

    /// Construct the engine from one store implementing every provider trait
    pub fn with_store<S>(store: Arc<S>) -> Self
    where
        S: PatientProvider
            + DiagnosisProvider
            + MedicationProvider
            + LabResultProvider
            + AllergyProvider
            + PreferenceStore
            + AlertDefinitionStore
            + 'static,
    {
        Self::new(
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            store,
        )
    }

    /// Context-sensitive alerts for one patient, filtered through one user's
    /// preferences
    pub async fn patient_alerts(
        &self,
        patient_id: &str,
        user_id: &str,
        overrides: ContextOverrides,
    ) -> CdsResult<Vec<FormattedAlert>> {
        let patient = self
            .patients
            .patient(patient_id)
            .await?
            .ok_or_else(|| CdsError::patient_not_found(patient_id))?;

        let now = overrides.now.unwrap_or_else(Utc::now);

        // Context build and preference load are independent; join both before
        // suppression or evaluation starts.
        let (context, preference) = tokio::join!(
            self.context_builder.build(patient, overrides, now),
            self.load_preference_snapshot(user_id),
        );
        let context = context?;

        let global_status = preference
            .as_ref()
            .map(|p| p.global_status)
            .unwrap_or(GlobalAlertStatus::Enabled);
        if global_status == GlobalAlertStatus::Disabled {
            return Ok(Vec::new());
        }

        let definitions = self.definitions.active_definitions().await?;
        let definitions = apply_global_mode(global_status, definitions);

        let alerts = definitions
            .into_iter()
            .filter(|definition| !is_suppressed(definition, preference.as_ref(), now))
            .filter(|definition| {
                definition
                    .trigger_conditions
                    .iter()
                    .any(|condition| evaluate_condition(condition, &context))
            })
            .map(|definition| {
                let alert_preference = preference
                    .as_ref()
                    .and_then(|p| p.alert_preference(&definition.id));
                format_alert(&definition, alert_preference)
            })
            .collect();

        Ok(alerts)
    }

    /// Full safety check for a (candidate) medication list
    ///
    /// Drug-drug and drug-allergy resolution always run; clinical alerts run
    /// only when a user id is supplied, since suppression is user-specific.
    /// Any sub-resolution failure aborts the whole call with the failing
    /// phase; a partial safety check is worse than none.
    pub async fn check_all_interactions(
        &self,
        patient_id: &str,
        medication_ids: &[String],
        user_id: Option<&str>,
    ) -> CdsResult<InteractionCheck> {
        let medications = self
            .medications
            .medications_by_ids(medication_ids)
            .await
            .map_err(|e| CdsError::check_phase(CheckPhase::DrugInteractions, e))?;
        let drug_interactions = resolve_drug_interactions(&medications);

        let allergies = self
            .allergies
            .active_medication_allergies(patient_id)
            .await
            .map_err(|e| CdsError::check_phase(CheckPhase::AllergyInteractions, e))?;
        let allergy_interactions = resolve_allergy_interactions(&allergies, &medications);

        let clinical_alerts = match user_id {
            Some(user_id) => {
                let overrides = ContextOverrides {
                    medications: Some(medications),
                    current_medication_ids: Some(medication_ids.to_vec()),
                    ..ContextOverrides::default()
                };
                self.patient_alerts(patient_id, user_id, overrides)
                    .await
                    .map_err(|e| CdsError::check_phase(CheckPhase::ClinicalAlerts, e))?
            }
            None => Vec::new(),
        };

        Ok(InteractionCheck {
            drug_interactions,
            allergy_interactions,
            clinical_alerts,
        })
    }

    /// Update one user's preferences (atomic per user, last writer wins)
    pub async fn update_preferences(
        &self,
        user_id: &str,
        update: PreferenceUpdate,
    ) -> CdsResult<UserAlertPreference> {
        Ok(self.preferences.update(user_id, update).await?)
    }

    /// Load the preference snapshot for a user
    ///
    /// A store failure is logged and evaluation continues without
    /// preferences: alerts stay visible rather than being hidden by an
    /// unavailable subsystem.
    async fn load_preference_snapshot(&self, user_id: &str) -> Option<UserAlertPreference> {
        match self.preferences.get_or_default(user_id).await {
            Ok(preference) => Some(preference),
            Err(err) => {
                log::warn!(
                    "preference load failed for user {user_id}; continuing without preferences: {err}"
                );
                None
            }
        }
    }
}
