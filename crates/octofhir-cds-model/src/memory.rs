//! In-memory store implementing every provider trait
//!
//! Backs the test suites and the CLI. Data is loaded from a [`DataBundle`]
//! (the JSON shape the CLI consumes) or assembled programmatically through
//! the `insert_*` helpers.

use crate::provider::{
    AlertDefinitionStore, AlertListFilter, AlertPage, AllergyProvider, DiagnosisProvider,
    LabResultProvider, MedicationProvider, PatientProvider, PreferenceStore, ProviderError,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use octofhir_cds_types::{
    Allergy, ClinicalAlertDefinition, Diagnosis, LabResult, Medication, Patient,
    PreferenceUpdate, UserAlertPreference,
};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

const DEFAULT_PAGE_SIZE: usize = 20;
const MAX_PAGE_SIZE: usize = 100;

/// Serializable snapshot of a full clinical data set
///
/// Diagnoses and lab results are keyed by patient id; everything else is a
/// flat list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataBundle {
    #[serde(default)]
    pub patients: Vec<Patient>,
    #[serde(default)]
    pub diagnoses: BTreeMap<String, Vec<Diagnosis>>,
    #[serde(default)]
    pub medications: Vec<Medication>,
    #[serde(default)]
    pub lab_results: BTreeMap<String, Vec<LabResult>>,
    #[serde(default)]
    pub allergies: Vec<Allergy>,
    #[serde(default)]
    pub alert_definitions: Vec<ClinicalAlertDefinition>,
    #[serde(default)]
    pub preferences: Vec<UserAlertPreference>,
}

#[derive(Debug, Default)]
struct StoreData {
    patients: IndexMap<String, Patient>,
    diagnoses: IndexMap<String, Vec<Diagnosis>>,
    medications: IndexMap<String, Medication>,
    lab_results: IndexMap<String, Vec<LabResult>>,
    allergies: Vec<Allergy>,
    alert_definitions: IndexMap<String, ClinicalAlertDefinition>,
    preferences: IndexMap<String, UserAlertPreference>,
}

/// In-memory implementation of all provider traits
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    data: Arc<RwLock<StoreData>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated from a bundle
    pub fn from_bundle(bundle: DataBundle) -> Self {
        let store = Self::new();
        {
            let mut data = store.data.write();
            for patient in bundle.patients {
                data.patients.insert(patient.id.clone(), patient);
            }
            data.diagnoses.extend(bundle.diagnoses);
            for medication in bundle.medications {
                data.medications.insert(medication.id.clone(), medication);
            }
            data.lab_results.extend(bundle.lab_results);
            data.allergies = bundle.allergies;
            for definition in bundle.alert_definitions {
                data.alert_definitions.insert(definition.id.clone(), definition);
            }
            for preference in bundle.preferences {
                data.preferences.insert(preference.user_id.clone(), preference);
            }
        }
        store
    }

    /// Parse a bundle from JSON and load it
    pub fn from_json(json: &str) -> Result<Self, ProviderError> {
        let bundle: DataBundle =
            serde_json::from_str(json).map_err(|e| ProviderError::ParseError(e.to_string()))?;
        Ok(Self::from_bundle(bundle))
    }

    /// Load a bundle from a JSON file at runtime
    pub fn from_json_file(path: impl AsRef<std::path::Path>) -> Result<Self, ProviderError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| ProviderError::IoError(e.to_string()))?;
        Self::from_json(&json)
    }

    pub fn insert_patient(&self, patient: Patient) {
        self.data.write().patients.insert(patient.id.clone(), patient);
    }

    pub fn insert_diagnoses(&self, patient_id: impl Into<String>, diagnoses: Vec<Diagnosis>) {
        self.data.write().diagnoses.insert(patient_id.into(), diagnoses);
    }

    pub fn insert_medication(&self, medication: Medication) {
        self.data
            .write()
            .medications
            .insert(medication.id.clone(), medication);
    }

    pub fn insert_lab_results(&self, patient_id: impl Into<String>, results: Vec<LabResult>) {
        self.data.write().lab_results.insert(patient_id.into(), results);
    }

    pub fn insert_allergy(&self, allergy: Allergy) {
        self.data.write().allergies.push(allergy);
    }

    pub fn insert_preference(&self, preference: UserAlertPreference) {
        self.data
            .write()
            .preferences
            .insert(preference.user_id.clone(), preference);
    }

    /// Stored preference snapshot without creating a default
    pub fn preference_of(&self, user_id: &str) -> Option<UserAlertPreference> {
        self.data.read().preferences.get(user_id).cloned()
    }
}

#[async_trait]
impl PatientProvider for MemoryStore {
    async fn patient(&self, patient_id: &str) -> Result<Option<Patient>, ProviderError> {
        Ok(self.data.read().patients.get(patient_id).cloned())
    }
}

#[async_trait]
impl DiagnosisProvider for MemoryStore {
    async fn active_diagnoses(&self, patient_id: &str) -> Result<Vec<Diagnosis>, ProviderError> {
        Ok(self
            .data
            .read()
            .diagnoses
            .get(patient_id)
            .map(|list| list.iter().filter(|d| d.is_active()).cloned().collect())
            .unwrap_or_default())
    }
}

#[async_trait]
impl MedicationProvider for MemoryStore {
    async fn medications_by_ids(&self, ids: &[String]) -> Result<Vec<Medication>, ProviderError> {
        let data = self.data.read();
        Ok(ids
            .iter()
            .filter_map(|id| data.medications.get(id).cloned())
            .collect())
    }
}

#[async_trait]
impl LabResultProvider for MemoryStore {
    async fn recent_results(
        &self,
        patient_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<LabResult>, ProviderError> {
        Ok(self
            .data
            .read()
            .lab_results
            .get(patient_id)
            .map(|list| {
                list.iter()
                    .filter(|r| r.resulted_at >= since)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[async_trait]
impl AllergyProvider for MemoryStore {
    async fn active_medication_allergies(
        &self,
        patient_id: &str,
    ) -> Result<Vec<Allergy>, ProviderError> {
        Ok(self
            .data
            .read()
            .allergies
            .iter()
            .filter(|a| a.patient_id == patient_id && a.is_checkable())
            .cloned()
            .collect())
    }
}

#[async_trait]
impl PreferenceStore for MemoryStore {
    async fn get_or_default(&self, user_id: &str) -> Result<UserAlertPreference, ProviderError> {
        let mut data = self.data.write();
        Ok(data
            .preferences
            .entry(user_id.to_string())
            .or_insert_with(|| UserAlertPreference::default_for(user_id))
            .clone())
    }

    async fn update(
        &self,
        user_id: &str,
        update: PreferenceUpdate,
    ) -> Result<UserAlertPreference, ProviderError> {
        let mut data = self.data.write();
        let preference = data
            .preferences
            .entry(user_id.to_string())
            .or_insert_with(|| UserAlertPreference::default_for(user_id));
        if let Some(global_status) = update.global_status {
            preference.global_status = global_status;
        }
        if let Some(categories) = update.categories {
            preference.categories = categories;
        }
        if let Some(alerts) = update.alerts {
            preference.alerts = alerts;
        }
        Ok(preference.clone())
    }

    async fn remove_alert_for_all_users(&self, alert_id: &str) -> Result<usize, ProviderError> {
        let mut data = self.data.write();
        let mut touched = 0;
        for preference in data.preferences.values_mut() {
            let before = preference.alerts.len();
            preference.alerts.retain(|p| p.alert_id != alert_id);
            if preference.alerts.len() != before {
                touched += 1;
            }
        }
        Ok(touched)
    }
}

#[async_trait]
impl AlertDefinitionStore for MemoryStore {
    async fn list(&self, filter: &AlertListFilter) -> Result<AlertPage, ProviderError> {
        let data = self.data.read();
        let search = filter.search.as_ref().map(|s| s.to_lowercase());
        let matches: Vec<&ClinicalAlertDefinition> = data
            .alert_definitions
            .values()
            .filter(|d| filter.category.is_none_or(|c| d.category == c))
            .filter(|d| filter.severity.is_none_or(|s| d.severity == s))
            .filter(|d| filter.active.is_none_or(|a| d.is_active == a))
            .filter(|d| {
                search.as_ref().is_none_or(|needle| {
                    d.title.to_lowercase().contains(needle)
                        || d.description.to_lowercase().contains(needle)
                })
            })
            .collect();

        let page = filter.page.max(1);
        let page_size = match filter.page_size {
            0 => DEFAULT_PAGE_SIZE,
            n => n.min(MAX_PAGE_SIZE),
        };
        let total = matches.len();
        let items = matches
            .into_iter()
            .skip((page - 1) * page_size)
            .take(page_size)
            .cloned()
            .collect();

        Ok(AlertPage {
            items,
            total,
            page,
            page_size,
        })
    }

    async fn get(&self, id: &str) -> Result<Option<ClinicalAlertDefinition>, ProviderError> {
        Ok(self.data.read().alert_definitions.get(id).cloned())
    }

    async fn active_definitions(&self) -> Result<Vec<ClinicalAlertDefinition>, ProviderError> {
        Ok(self
            .data
            .read()
            .alert_definitions
            .values()
            .filter(|d| d.is_active)
            .cloned()
            .collect())
    }

    async fn insert(&self, definition: ClinicalAlertDefinition) -> Result<(), ProviderError> {
        let mut data = self.data.write();
        if data.alert_definitions.contains_key(&definition.id) {
            return Err(ProviderError::Conflict(format!(
                "alert definition {} already exists",
                definition.id
            )));
        }
        data.alert_definitions.insert(definition.id.clone(), definition);
        Ok(())
    }

    async fn update(&self, definition: ClinicalAlertDefinition) -> Result<(), ProviderError> {
        let mut data = self.data.write();
        if !data.alert_definitions.contains_key(&definition.id) {
            return Err(ProviderError::NotFound(format!(
                "alert definition {}",
                definition.id
            )));
        }
        data.alert_definitions.insert(definition.id.clone(), definition);
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<bool, ProviderError> {
        Ok(self.data.write().alert_definitions.shift_remove(id).is_some())
    }

    async fn system_defined_count(&self) -> Result<usize, ProviderError> {
        Ok(self
            .data
            .read()
            .alert_definitions
            .values()
            .filter(|d| d.is_system_defined)
            .count())
    }
}
