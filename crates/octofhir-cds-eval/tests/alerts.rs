//! Alert engine integration tests
//!
//! Run the full orchestration against the in-memory store: context build,
//! preference snapshot, global mode, suppression, evaluation, formatting,
//! and the combined interaction check.

mod common;

use async_trait::async_trait;
use common::{allergy, at, declares, definition, diagnosis, lab, medication, patient, trigger};
use octofhir_cds_eval::{AlertEngine, AppointmentContext, CdsError, CheckPhase, ContextOverrides};
use octofhir_cds_model::{
    AlertDefinitionStore, MemoryStore, PreferenceStore, ProviderError,
};
use octofhir_cds_types::{
    AlertCategory, AlertPreference, AlertSeverity, ConditionType, Gender, GlobalAlertStatus,
    InteractionSeverity, PreferenceStatus, PreferenceUpdate, TriggerCondition,
    UserAlertPreference, ValueRange,
};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use std::sync::Arc;

const NOW: &str = "2026-03-10T12:00:00Z";

fn overrides_now() -> ContextOverrides {
    ContextOverrides {
        now: Some(at(NOW)),
        ..ContextOverrides::default()
    }
}

/// Patient p1: diabetic, HbA1c 8.5 ten days ago
async fn diabetic_store() -> MemoryStore {
    let store = MemoryStore::new();
    store.insert_patient(patient("p1", "1980-06-15", Gender::Female));
    store.insert_diagnoses("p1", vec![diagnosis("E11")]);
    store.insert_lab_results("p1", vec![lab("HbA1c", "8.5", "2026-02-28T00:00:00Z")]);
    store
}

fn hba1c_definition() -> octofhir_cds_types::ClinicalAlertDefinition {
    let mut def = definition(
        "alert1",
        AlertCategory::LabAlert,
        AlertSeverity::Warning,
        vec![TriggerCondition {
            condition_type: ConditionType::LabResult,
            codes: vec!["HbA1c".to_string()],
            value_range: Some(ValueRange {
                min: Some(Decimal::new(80, 1)),
                max: None,
            }),
        }],
    );
    def.recommended_action = Some("Review diabetes management plan".to_string());
    def
}

fn engine(store: &MemoryStore) -> AlertEngine {
    AlertEngine::with_store(Arc::new(store.clone()))
}

#[tokio::test]
async fn unknown_patient_is_not_found() {
    let store = MemoryStore::new();
    let err = engine(&store)
        .patient_alerts("nobody", "u1", overrides_now())
        .await
        .unwrap_err();
    assert!(matches!(err, CdsError::PatientNotFound { id } if id == "nobody"));
}

#[tokio::test]
async fn matching_lab_alert_is_returned_with_definition_fields() {
    let store = diabetic_store().await;
    store.insert(hba1c_definition()).await.unwrap();

    let alerts = engine(&store)
        .patient_alerts("p1", "u1", overrides_now())
        .await
        .unwrap();

    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].alert_id, "alert1");
    assert_eq!(alerts[0].severity, AlertSeverity::Warning);
    assert_eq!(
        alerts[0].recommended_action.as_deref(),
        Some("Review diabetes management plan")
    );
}

#[tokio::test]
async fn lab_results_outside_the_window_do_not_trigger() {
    let store = MemoryStore::new();
    store.insert_patient(patient("p1", "1980-06-15", Gender::Female));
    // 30-day window: this result is three months old
    store.insert_lab_results("p1", vec![lab("HbA1c", "8.5", "2025-12-01T00:00:00Z")]);
    store.insert(hba1c_definition()).await.unwrap();

    let alerts = engine(&store)
        .patient_alerts("p1", "u1", overrides_now())
        .await
        .unwrap();
    assert_eq!(alerts, vec![]);
}

#[tokio::test]
async fn inactive_definitions_are_not_evaluated() {
    let store = diabetic_store().await;
    let mut def = hba1c_definition();
    def.is_active = false;
    store.insert(def).await.unwrap();

    let alerts = engine(&store)
        .patient_alerts("p1", "u1", overrides_now())
        .await
        .unwrap();
    assert_eq!(alerts, vec![]);
}

#[tokio::test]
async fn global_disabled_returns_nothing() {
    let store = diabetic_store().await;
    store.insert(hba1c_definition()).await.unwrap();
    store.insert_preference(UserAlertPreference {
        global_status: GlobalAlertStatus::Disabled,
        ..UserAlertPreference::default_for("u1")
    });

    let alerts = engine(&store)
        .patient_alerts("p1", "u1", overrides_now())
        .await
        .unwrap();
    assert_eq!(alerts, vec![]);
}

#[tokio::test]
async fn critical_only_prefilters_by_severity() {
    let store = diabetic_store().await;
    store.insert(hba1c_definition()).await.unwrap(); // warning
    let mut critical = hba1c_definition();
    critical.id = "alert2".to_string();
    critical.severity = AlertSeverity::Critical;
    store.insert(critical).await.unwrap();
    store.insert_preference(UserAlertPreference {
        global_status: GlobalAlertStatus::CriticalOnly,
        ..UserAlertPreference::default_for("u1")
    });

    let alerts = engine(&store)
        .patient_alerts("p1", "u1", overrides_now())
        .await
        .unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].alert_id, "alert2");
}

#[tokio::test]
async fn muting_is_per_user() {
    let store = diabetic_store().await;
    store.insert(hba1c_definition()).await.unwrap();
    store.insert_preference(UserAlertPreference {
        alerts: vec![AlertPreference {
            alert_id: "alert1".to_string(),
            status: PreferenceStatus::Muted,
            custom_severity: None,
            custom_text: None,
            mute_until: Some(at("2026-04-01T00:00:00Z")),
        }],
        ..UserAlertPreference::default_for("u1")
    });

    let engine = engine(&store);
    let muted_user = engine.patient_alerts("p1", "u1", overrides_now()).await.unwrap();
    assert_eq!(muted_user, vec![]);

    // A user without the override still receives the alert
    let other_user = engine.patient_alerts("p1", "u2", overrides_now()).await.unwrap();
    assert_eq!(other_user.len(), 1);
}

#[tokio::test]
async fn custom_severity_and_text_override_formatting() {
    let store = diabetic_store().await;
    store.insert(hba1c_definition()).await.unwrap();
    store.insert_preference(UserAlertPreference {
        alerts: vec![AlertPreference {
            alert_id: "alert1".to_string(),
            status: PreferenceStatus::Enabled,
            custom_severity: Some(AlertSeverity::Critical),
            custom_text: Some(octofhir_cds_types::CustomText {
                title: Some("Glycemic control".to_string()),
                description: None,
            }),
            mute_until: None,
        }],
        ..UserAlertPreference::default_for("u1")
    });

    let alerts = engine(&store)
        .patient_alerts("p1", "u1", overrides_now())
        .await
        .unwrap();
    assert_eq!(alerts[0].severity, AlertSeverity::Critical);
    assert_eq!(alerts[0].title, "Glycemic control");
}

#[tokio::test]
async fn caller_overrides_replace_live_queries_entirely() {
    let store = diabetic_store().await;
    store.insert(definition(
        "dx-alert",
        AlertCategory::DiagnosisAlert,
        AlertSeverity::Info,
        vec![trigger(ConditionType::Diagnosis, &["E11"])],
    ))
    .await
    .unwrap();

    // The store has an active E11 diagnosis, but the caller supplies an
    // empty diagnosis list: no merge happens, the alert stays silent.
    let overrides = ContextOverrides {
        diagnoses: Some(Vec::new()),
        ..overrides_now()
    };
    let alerts = engine(&store)
        .patient_alerts("p1", "u1", overrides)
        .await
        .unwrap();
    assert_eq!(alerts, vec![]);
}

#[tokio::test]
async fn appointment_override_enables_appointment_alerts() {
    let store = diabetic_store().await;
    store.insert(definition(
        "visit-alert",
        AlertCategory::BestPractice,
        AlertSeverity::Info,
        vec![trigger(ConditionType::AppointmentType, &["annual-physical"])],
    ))
    .await
    .unwrap();

    let overrides = ContextOverrides {
        appointment: Some(AppointmentContext {
            appointment_type: "annual-physical".to_string(),
        }),
        ..overrides_now()
    };
    let alerts = engine(&store)
        .patient_alerts("p1", "u1", overrides)
        .await
        .unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].alert_id, "visit-alert");
}

// ============================================================================
// Preference store failure: fail open
// ============================================================================

struct UnreachablePreferences;

#[async_trait]
impl PreferenceStore for UnreachablePreferences {
    async fn get_or_default(&self, _: &str) -> Result<UserAlertPreference, ProviderError> {
        Err(ProviderError::Unavailable("preference store down".to_string()))
    }

    async fn update(
        &self,
        _: &str,
        _: PreferenceUpdate,
    ) -> Result<UserAlertPreference, ProviderError> {
        Err(ProviderError::Unavailable("preference store down".to_string()))
    }

    async fn remove_alert_for_all_users(&self, _: &str) -> Result<usize, ProviderError> {
        Err(ProviderError::Unavailable("preference store down".to_string()))
    }
}

#[tokio::test]
async fn preference_store_failure_keeps_alerts_visible() {
    let store = diabetic_store().await;
    store.insert(hba1c_definition()).await.unwrap();
    let store = Arc::new(store);

    let engine = AlertEngine::new(
        store.clone(),
        store.clone(),
        store.clone(),
        store.clone(),
        store.clone(),
        Arc::new(UnreachablePreferences),
        store,
    );

    let alerts = engine
        .patient_alerts("p1", "u1", overrides_now())
        .await
        .unwrap();
    assert_eq!(alerts.len(), 1);
}

// ============================================================================
// Combined interaction check
// ============================================================================

async fn prescribing_store() -> MemoryStore {
    let store = diabetic_store().await;
    store.insert_medication(declares(
        medication("m1", "warfarin", "anticoagulant"),
        "m2",
        InteractionSeverity::Severe,
        "bleeding risk",
    ));
    store.insert_medication(medication("m2", "ibuprofen", "NSAID"));
    store.insert_allergy(allergy("a1", "p1", None, Some("NSAID")));
    store
}

#[tokio::test]
async fn combined_check_runs_both_resolvers_without_a_user() {
    let store = prescribing_store().await;
    let result = engine(&store)
        .check_all_interactions("p1", &["m1".to_string(), "m2".to_string()], None)
        .await
        .unwrap();

    assert_eq!(result.drug_interactions.len(), 1);
    assert_eq!(result.drug_interactions[0].severity, InteractionSeverity::Severe);
    assert_eq!(result.allergy_interactions.len(), 1);
    assert_eq!(result.allergy_interactions[0].medication_id, "m2");
    // Alert suppression is user-specific, so no user means no alerts
    assert_eq!(result.clinical_alerts, vec![]);
}

#[tokio::test]
async fn combined_check_evaluates_alerts_against_candidate_medications() {
    let store = prescribing_store().await;
    store.insert(definition(
        "warfarin-alert",
        AlertCategory::DrugInteraction,
        AlertSeverity::Warning,
        vec![trigger(ConditionType::Medication, &["warfarin"])],
    ))
    .await
    .unwrap();

    let result = engine(&store)
        .check_all_interactions("p1", &["m1".to_string(), "m2".to_string()], Some("u1"))
        .await
        .unwrap();

    assert_eq!(result.clinical_alerts.len(), 1);
    assert_eq!(result.clinical_alerts[0].alert_id, "warfarin-alert");
}

#[tokio::test]
async fn combined_check_aborts_with_the_failing_phase() {
    let store = prescribing_store().await;

    // The alert phase needs a patient record; an unknown patient makes the
    // clinical-alerts phase fail and the whole check abort.
    let err = engine(&store)
        .check_all_interactions("nobody", &["m1".to_string()], Some("u1"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CdsError::InteractionCheck {
            phase: CheckPhase::ClinicalAlerts,
            ..
        }
    ));
}

// ============================================================================
// Preference updates
// ============================================================================

#[tokio::test]
async fn preference_update_replaces_supplied_fields_wholesale() {
    let store = MemoryStore::new();
    let engine = engine(&store);

    engine
        .update_preferences(
            "u1",
            PreferenceUpdate {
                global_status: Some(GlobalAlertStatus::CriticalOnly),
                ..PreferenceUpdate::default()
            },
        )
        .await
        .unwrap();

    let updated = engine
        .update_preferences(
            "u1",
            PreferenceUpdate {
                alerts: Some(vec![AlertPreference {
                    alert_id: "alert1".to_string(),
                    status: PreferenceStatus::Disabled,
                    custom_severity: None,
                    custom_text: None,
                    mute_until: None,
                }]),
                ..PreferenceUpdate::default()
            },
        )
        .await
        .unwrap();

    // The earlier global status survives; the alert list was replaced
    assert_eq!(updated.global_status, GlobalAlertStatus::CriticalOnly);
    assert_eq!(updated.alerts.len(), 1);
}
