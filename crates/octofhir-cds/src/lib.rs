//! Clinical Decision Support (CDS) core for Rust
//!
//! This crate bundles the CDS workspace into one dependency:
//! - Drug-drug and drug-allergy interaction resolution
//! - Context-sensitive clinical alerts with typed trigger conditions
//! - Per-user alert preferences with time-bounded muting
//! - Alert catalog management with protected system definitions
//!
//! # Example
//!
//! ```
//! use octofhir_cds::{AlertEngine, ContextOverrides, MemoryStore};
//! use std::sync::Arc;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> octofhir_cds::CdsResult<()> {
//! let store = Arc::new(MemoryStore::new());
//! let engine = AlertEngine::with_store(store);
//!
//! let check = engine
//!     .check_all_interactions("patient-1", &["med-1".to_string()], None)
//!     .await?;
//! assert!(check.drug_interactions.is_empty());
//! # Ok(())
//! # }
//! ```

// Re-export all public APIs from internal crates
pub use octofhir_cds_eval as eval;
pub use octofhir_cds_model as model;
pub use octofhir_cds_types as types;

// Convenience re-exports
pub use octofhir_cds_eval::{
    AlertCatalog, AlertEngine, CdsError, CdsResult, ContextOverrides, EvaluationContext,
};
pub use octofhir_cds_model::{DataBundle, MemoryStore};
pub use octofhir_cds_types::{FormattedAlert, InteractionCheck, UserAlertPreference};
