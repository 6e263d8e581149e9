//! Alert catalog management
//!
//! CRUD over alert definitions with one rule: system-defined definitions
//! cannot be deleted and cannot change category or their system flag.
//! Deleting a non-system definition cascades into every user's alert-level
//! preferences.

use crate::error::{CdsError, CdsResult};
use octofhir_cds_model::{AlertDefinitionStore, AlertListFilter, AlertPage, PreferenceStore};
use octofhir_cds_types::{
    AlertCategory, AlertSeverity, ClinicalAlertDefinition, ConditionType, TriggerCondition,
    ValueRange,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Payload for creating a (non-system) alert definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAlertDefinition {
    pub title: String,
    pub description: String,
    pub category: AlertCategory,
    pub severity: AlertSeverity,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub recommended_action: Option<String>,
    #[serde(default)]
    pub trigger_conditions: Vec<TriggerCondition>,
}

fn default_active() -> bool {
    true
}

/// Partial update to an alert definition; omitted fields are untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlertDefinitionUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<AlertCategory>,
    #[serde(default)]
    pub severity: Option<AlertSeverity>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub is_system_defined: Option<bool>,
    #[serde(default)]
    pub recommended_action: Option<String>,
    #[serde(default)]
    pub trigger_conditions: Option<Vec<TriggerCondition>>,
}

/// Catalog service over the definition store and the preference store
#[derive(Clone)]
pub struct AlertCatalog {
    definitions: Arc<dyn AlertDefinitionStore>,
    preferences: Arc<dyn PreferenceStore>,
}

impl AlertCatalog {
    pub fn new(
        definitions: Arc<dyn AlertDefinitionStore>,
        preferences: Arc<dyn PreferenceStore>,
    ) -> Self {
        Self {
            definitions,
            preferences,
        }
    }

    /// Construct the catalog from one store implementing both traits
    pub fn with_store<S>(store: Arc<S>) -> Self
    where
        S: AlertDefinitionStore + PreferenceStore + 'static,
    {
        Self::new(store.clone(), store)
    }

    /// Paginated, filterable listing
    pub async fn list(&self, filter: &AlertListFilter) -> CdsResult<AlertPage> {
        Ok(self.definitions.list(filter).await?)
    }

    /// Fetch one definition
    pub async fn get(&self, id: &str) -> CdsResult<ClinicalAlertDefinition> {
        self.definitions
            .get(id)
            .await?
            .ok_or_else(|| CdsError::alert_not_found(id))
    }

    /// Create a new user-defined alert definition
    pub async fn create(&self, new: NewAlertDefinition) -> CdsResult<ClinicalAlertDefinition> {
        validate_conditions(&new.trigger_conditions)?;
        let definition = ClinicalAlertDefinition {
            id: Uuid::new_v4().to_string(),
            title: new.title,
            description: new.description,
            category: new.category,
            severity: new.severity,
            is_active: new.is_active,
            is_system_defined: false,
            recommended_action: new.recommended_action,
            trigger_conditions: new.trigger_conditions,
        };
        self.definitions.insert(definition.clone()).await?;
        Ok(definition)
    }

    /// Apply a partial update
    ///
    /// System-defined definitions reject changes to `category` and
    /// `is_system_defined`; everything else updates normally.
    pub async fn update(
        &self,
        id: &str,
        update: AlertDefinitionUpdate,
    ) -> CdsResult<ClinicalAlertDefinition> {
        let mut definition = self.get(id).await?;

        if definition.is_system_defined {
            if update
                .category
                .is_some_and(|category| category != definition.category)
            {
                return Err(CdsError::system_alert_protected(id, "change category"));
            }
            if update.is_system_defined.is_some_and(|flag| !flag) {
                return Err(CdsError::system_alert_protected(id, "change the system flag"));
            }
        }

        if let Some(title) = update.title {
            definition.title = title;
        }
        if let Some(description) = update.description {
            definition.description = description;
        }
        if let Some(category) = update.category {
            definition.category = category;
        }
        if let Some(severity) = update.severity {
            definition.severity = severity;
        }
        if let Some(is_active) = update.is_active {
            definition.is_active = is_active;
        }
        if let Some(is_system_defined) = update.is_system_defined {
            definition.is_system_defined = is_system_defined;
        }
        if let Some(recommended_action) = update.recommended_action {
            definition.recommended_action = Some(recommended_action);
        }
        if let Some(trigger_conditions) = update.trigger_conditions {
            validate_conditions(&trigger_conditions)?;
            definition.trigger_conditions = trigger_conditions;
        }

        self.definitions.update(definition.clone()).await?;
        Ok(definition)
    }

    /// Delete a non-system definition and cascade into user preferences
    pub async fn delete(&self, id: &str) -> CdsResult<()> {
        let definition = self.get(id).await?;
        if definition.is_system_defined {
            return Err(CdsError::system_alert_protected(id, "be deleted"));
        }
        self.definitions.delete(id).await?;
        self.preferences.remove_alert_for_all_users(id).await?;
        Ok(())
    }

    /// Insert the starter set of system-defined alerts
    ///
    /// Idempotent by count: any existing system-defined definition disables
    /// seeding entirely; content is not diffed. Returns how many definitions
    /// were inserted.
    pub async fn seed_system_alerts(&self) -> CdsResult<usize> {
        if self.definitions.system_defined_count().await? > 0 {
            return Ok(0);
        }
        let starters = starter_definitions();
        let count = starters.len();
        for definition in starters {
            self.definitions.insert(definition).await?;
        }
        Ok(count)
    }
}

/// Reject malformed trigger conditions on catalog writes
///
/// Evaluation is fail-open per condition, but writes are strict.
fn validate_conditions(conditions: &[TriggerCondition]) -> CdsResult<()> {
    for condition in conditions {
        match condition.condition_type {
            ConditionType::Custom | ConditionType::Other => {}
            _ => {
                if condition.codes.is_empty() {
                    return Err(CdsError::invalid_definition(format!(
                        "{:?} condition needs at least one code",
                        condition.condition_type
                    )));
                }
            }
        }
        if let Some(range) = &condition.value_range {
            if condition.condition_type != ConditionType::LabResult {
                return Err(CdsError::invalid_definition(
                    "value ranges only apply to lab-result conditions",
                ));
            }
            if let (Some(min), Some(max)) = (range.min, range.max) {
                if min > max {
                    return Err(CdsError::invalid_definition(format!(
                        "empty value range: min {min} exceeds max {max}"
                    )));
                }
            }
        }
    }
    Ok(())
}

fn condition(
    condition_type: ConditionType,
    codes: &[&str],
    value_range: Option<ValueRange>,
) -> TriggerCondition {
    TriggerCondition {
        condition_type,
        codes: codes.iter().map(|c| c.to_string()).collect(),
        value_range,
    }
}

/// The fixed starter set inserted by [`AlertCatalog::seed_system_alerts`]
fn starter_definitions() -> Vec<ClinicalAlertDefinition> {
    vec![
        ClinicalAlertDefinition {
            id: "sys-influenza-vaccination".to_string(),
            title: "Influenza vaccination due".to_string(),
            description: "Seasonal influenza vaccination is recommended during fall and early winter.".to_string(),
            category: AlertCategory::PreventiveCare,
            severity: AlertSeverity::Info,
            is_active: true,
            is_system_defined: true,
            recommended_action: Some("Offer influenza vaccination".to_string()),
            trigger_conditions: vec![condition(
                ConditionType::Seasonal,
                &["season=fall", "month=12"],
                None,
            )],
        },
        ClinicalAlertDefinition {
            id: "sys-hba1c-elevated".to_string(),
            title: "Elevated HbA1c".to_string(),
            description: "A recent HbA1c result is at or above 8.0%, indicating poor glycemic control.".to_string(),
            category: AlertCategory::LabAlert,
            severity: AlertSeverity::Critical,
            is_active: true,
            is_system_defined: true,
            recommended_action: Some("Review diabetes management plan".to_string()),
            trigger_conditions: vec![condition(
                ConditionType::LabResult,
                &["HbA1c", "4548-4"],
                Some(ValueRange {
                    min: Some(Decimal::new(80, 1)),
                    max: None,
                }),
            )],
        },
        ClinicalAlertDefinition {
            id: "sys-diabetes-foot-exam".to_string(),
            title: "Annual diabetic foot exam".to_string(),
            description: "Patients with diabetes should receive a comprehensive foot exam at least annually.".to_string(),
            category: AlertCategory::BestPractice,
            severity: AlertSeverity::Info,
            is_active: true,
            is_system_defined: true,
            recommended_action: Some("Schedule foot exam".to_string()),
            trigger_conditions: vec![condition(
                ConditionType::Diagnosis,
                &["E10", "E10.9", "E11", "E11.9"],
                None,
            )],
        },
        ClinicalAlertDefinition {
            id: "sys-hypertension-recheck".to_string(),
            title: "Blood pressure recheck".to_string(),
            description: "Hypertensive patients need a blood pressure measurement at every visit.".to_string(),
            category: AlertCategory::BestPractice,
            severity: AlertSeverity::Warning,
            is_active: true,
            is_system_defined: true,
            recommended_action: Some("Measure blood pressure".to_string()),
            trigger_conditions: vec![condition(ConditionType::Diagnosis, &["I10"], None)],
        },
        ClinicalAlertDefinition {
            id: "sys-pediatric-dose-review".to_string(),
            title: "Pediatric dosing review".to_string(),
            description: "Verify weight-based dosing for patients under 12 years of age.".to_string(),
            category: AlertCategory::BestPractice,
            severity: AlertSeverity::Warning,
            is_active: true,
            is_system_defined: true,
            recommended_action: Some("Verify weight-based dosing".to_string()),
            trigger_conditions: vec![condition(
                ConditionType::PatientDemographic,
                &["age<12"],
                None,
            )],
        },
    ]
}
