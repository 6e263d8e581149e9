//! CDS Evaluation Engines
//!
//! This crate implements the decision-support core:
//!
//! - **Interaction resolver**: pairwise drug-drug interaction detection with
//!   severity arbitration, and drug-allergy conflict detection
//! - **Condition evaluators**: seven pure predicates (diagnosis, medication,
//!   lab-result, demographic, seasonal, appointment-type, custom) dispatched
//!   over a typed condition enum
//! - **Context builder**: assembles the immutable per-call snapshot of
//!   patient clinical data, joining concurrent fetches before evaluation
//! - **Preference resolver**: per-user suppression with time-bounded mutes,
//!   global modes, and severity/text overrides
//! - **Alert engine**: orchestrates context, preferences and evaluation into
//!   a formatted alert list
//! - **Alert catalog**: definition CRUD with system-alert protection,
//!   cascade delete and idempotent seeding
//!
//! # Example
//!
//! ```ignore
//! use octofhir_cds_eval::{AlertEngine, ContextOverrides};
//! use octofhir_cds_model::MemoryStore;
//! use std::sync::Arc;
//!
//! let store = Arc::new(MemoryStore::from_json_file("bundle.json")?);
//! let engine = AlertEngine::with_store(store);
//! let alerts = engine
//!     .patient_alerts("patient-1", "dr-lee", ContextOverrides::default())
//!     .await?;
//! ```

pub mod catalog;
pub mod conditions;
pub mod context;
pub mod engine;
pub mod error;
pub mod interactions;
pub mod preferences;

// Re-export main types
pub use catalog::{AlertCatalog, AlertDefinitionUpdate, NewAlertDefinition};
pub use conditions::evaluate_condition;
pub use context::{
    AppointmentContext, ContextBuilder, ContextOverrides, EvaluationContext, LAB_WINDOW_DAYS,
};
pub use engine::AlertEngine;
pub use error::{CdsError, CdsResult, CheckPhase};
pub use interactions::{resolve_allergy_interactions, resolve_drug_interactions};
pub use preferences::{apply_global_mode, format_alert, is_suppressed};
