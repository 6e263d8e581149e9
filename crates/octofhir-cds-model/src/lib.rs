//! Data access boundary for the CDS engine
//!
//! The engines never touch persistence directly; they consume the async
//! provider traits defined here. Collaborating systems (EHR storage, a
//! preference service) implement these traits; [`MemoryStore`] is the
//! in-process implementation used by tests and the CLI, and doubles as the
//! reference semantics for collaborators.

pub mod memory;
pub mod provider;

pub use memory::{DataBundle, MemoryStore};
pub use provider::{
    AlertDefinitionStore, AlertListFilter, AlertPage, AllergyProvider, DiagnosisProvider,
    LabResultProvider, MedicationProvider, PatientProvider, PreferenceStore, ProviderError,
};
