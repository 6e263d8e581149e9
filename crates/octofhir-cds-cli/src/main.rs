//! CDS command-line interface
//!
//! Loads a JSON data bundle into the in-memory store and runs the engines
//! against it: patient alerts, the combined interaction check, and catalog
//! seeding.

use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::Colorize;
use octofhir_cds::eval::AppointmentContext;
use octofhir_cds::model::AlertListFilter;
use octofhir_cds::types::{AlertSeverity, AllergyFinding, DrugInteractionFinding, InteractionSeverity};
use octofhir_cds::{AlertCatalog, AlertEngine, ContextOverrides, FormattedAlert, MemoryStore};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// CDS command-line tool
#[derive(Parser)]
#[command(name = "cds")]
#[command(author, version, about = "Clinical Decision Support (CDS) tools", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate clinical alerts for a patient
    Alerts {
        /// JSON data bundle
        #[arg(short, long)]
        bundle: PathBuf,
        /// Patient id
        #[arg(short, long)]
        patient: String,
        /// User (clinician) id whose preferences apply
        #[arg(short, long)]
        user: String,
        /// In-progress appointment type
        #[arg(short, long)]
        appointment: Option<String>,
    },
    /// Run the combined interaction check for a medication list
    Interactions {
        /// JSON data bundle
        #[arg(short, long)]
        bundle: PathBuf,
        /// Patient id
        #[arg(short, long)]
        patient: String,
        /// Medication ids to check (repeatable)
        #[arg(short, long = "medication", required = true)]
        medications: Vec<String>,
        /// Optional user id; enables the clinical-alert phase
        #[arg(short, long)]
        user: Option<String>,
    },
    /// Seed the starter set of system-defined alerts
    Seed {
        /// JSON data bundle
        #[arg(short, long)]
        bundle: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    human_panic::setup_panic!();

    let cli = Cli::parse();
    match cli.command {
        Commands::Alerts {
            bundle,
            patient,
            user,
            appointment,
        } => {
            let engine = engine_from(&bundle)?;
            let overrides = ContextOverrides {
                appointment: appointment.map(|appointment_type| AppointmentContext { appointment_type }),
                ..ContextOverrides::default()
            };
            let alerts = engine.patient_alerts(&patient, &user, overrides).await?;
            if alerts.is_empty() {
                println!("No alerts for patient {patient}");
            }
            for line in alert_lines(&alerts) {
                println!("{line}");
            }
        }
        Commands::Interactions {
            bundle,
            patient,
            medications,
            user,
        } => {
            let engine = engine_from(&bundle)?;
            let check = engine
                .check_all_interactions(&patient, &medications, user.as_deref())
                .await?;
            if check.drug_interactions.is_empty() && check.allergy_interactions.is_empty() {
                println!("No interactions detected");
            }
            for line in drug_interaction_lines(&check.drug_interactions) {
                println!("{line}");
            }
            for line in allergy_lines(&check.allergy_interactions) {
                println!("{line}");
            }
            for line in alert_lines(&check.clinical_alerts) {
                println!("{line}");
            }
        }
        Commands::Seed { bundle } => {
            let store = load_store(&bundle)?;
            let catalog = AlertCatalog::with_store(Arc::new(store.clone()));
            let inserted = catalog.seed_system_alerts().await?;
            println!("Seeded {inserted} system alert definition(s)");
            let page = catalog
                .list(&AlertListFilter {
                    active: Some(true),
                    ..AlertListFilter::default()
                })
                .await?;
            for definition in page.items.iter().filter(|d| d.is_system_defined) {
                println!("  {} [{}] {}", definition.id, definition.category, definition.title);
            }
        }
    }

    Ok(())
}

fn load_store(bundle: &Path) -> anyhow::Result<MemoryStore> {
    MemoryStore::from_json_file(bundle)
        .with_context(|| format!("failed to load bundle {}", bundle.display()))
}

fn engine_from(bundle: &Path) -> anyhow::Result<AlertEngine> {
    Ok(AlertEngine::with_store(Arc::new(load_store(bundle)?)))
}

fn severity_label(severity: AlertSeverity) -> String {
    match severity {
        AlertSeverity::Critical => severity.as_str().red().bold().to_string(),
        AlertSeverity::Warning => severity.as_str().yellow().to_string(),
        AlertSeverity::Info => severity.as_str().blue().to_string(),
    }
}

fn interaction_label(severity: InteractionSeverity) -> String {
    match severity {
        InteractionSeverity::Contraindicated => severity.as_str().red().bold().to_string(),
        InteractionSeverity::Severe => severity.as_str().red().to_string(),
        InteractionSeverity::Moderate => severity.as_str().yellow().to_string(),
        InteractionSeverity::Mild => severity.as_str().blue().to_string(),
    }
}

fn alert_lines(alerts: &[FormattedAlert]) -> Vec<String> {
    alerts
        .iter()
        .map(|alert| {
            let mut line = format!(
                "[{}] {} ({}): {}",
                severity_label(alert.severity),
                alert.title,
                alert.category,
                alert.description
            );
            if let Some(action) = &alert.recommended_action {
                line.push_str(&format!(" — recommended: {action}"));
            }
            line
        })
        .collect()
}

fn drug_interaction_lines(findings: &[DrugInteractionFinding]) -> Vec<String> {
    findings
        .iter()
        .map(|finding| {
            format!(
                "[{}] {} + {}: {}",
                interaction_label(finding.severity),
                finding.medication_ids[0],
                finding.medication_ids[1],
                finding.description
            )
        })
        .collect()
}

fn allergy_lines(findings: &[AllergyFinding]) -> Vec<String> {
    findings
        .iter()
        .map(|finding| {
            format!(
                "[{}] {} vs allergy {}: {} (reaction: {})",
                interaction_label(finding.severity),
                finding.medication_id,
                finding.allergy_id,
                finding.description,
                finding.reaction
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const BUNDLE: &str = r#"{
        "patients": [{
            "id": "p1",
            "date_of_birth": "1980-06-15",
            "gender": "female",
            "active_medications": ["m1"]
        }],
        "medications": [
            {
                "id": "m1",
                "name": "Warfarin",
                "generic_name": "warfarin",
                "classification": "anticoagulant",
                "interactions": [{
                    "interacts_with_id": "m2",
                    "severity": "severe",
                    "description": "bleeding risk"
                }]
            },
            {
                "id": "m2",
                "name": "Ibuprofen",
                "generic_name": "ibuprofen",
                "classification": "NSAID"
            }
        ]
    }"#;

    fn bundle_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(BUNDLE.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn bundle_round_trips_through_the_engine() {
        let file = bundle_file();
        let engine = engine_from(file.path()).unwrap();
        let check = engine
            .check_all_interactions("p1", &["m1".to_string(), "m2".to_string()], None)
            .await
            .unwrap();

        assert_eq!(check.drug_interactions.len(), 1);
        let lines = drug_interaction_lines(&check.drug_interactions);
        assert!(lines[0].contains("m1 + m2"));
        assert!(lines[0].contains("bleeding risk"));
    }

    #[test]
    fn missing_bundle_reports_the_path() {
        let err = load_store(&PathBuf::from("/does/not/exist.json")).unwrap_err();
        assert!(err.to_string().contains("/does/not/exist.json"));
    }
}
