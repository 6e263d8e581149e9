//! Drug-drug and drug-allergy interaction resolution
//!
//! Both resolvers are pure functions over reference data already in memory;
//! data access belongs to the caller. Medication lists are small (tens of
//! entries), so the pairwise scan stays quadratic without an index.

use octofhir_cds_types::{
    Allergy, AllergyFinding, DrugInteractionFinding, InteractionSeverity, Medication,
};

/// Detect interactions between every unordered pair of medications
///
/// Interaction entries are one-directional: for a pair (a, b), a matching
/// entry may exist on a, on b, or on both. When both sides declare the pair,
/// the entry with the higher severity wins; on a severity tie the entry on
/// the first-declared side (the earlier medication in the input list) is
/// kept.
pub fn resolve_drug_interactions(medications: &[Medication]) -> Vec<DrugInteractionFinding> {
    let mut findings = Vec::new();

    for i in 0..medications.len() {
        for j in (i + 1)..medications.len() {
            let first = &medications[i];
            let second = &medications[j];

            let forward = first
                .interactions
                .iter()
                .find(|entry| entry.interacts_with_id == second.id);
            let reverse = second
                .interactions
                .iter()
                .find(|entry| entry.interacts_with_id == first.id);

            let chosen = match (forward, reverse) {
                (None, None) => continue,
                (Some(entry), None) | (None, Some(entry)) => entry,
                // Ties keep the forward entry
                (Some(forward), Some(reverse)) => {
                    if reverse.severity > forward.severity {
                        reverse
                    } else {
                        forward
                    }
                }
            };

            findings.push(DrugInteractionFinding {
                medication_ids: [first.id.clone(), second.id.clone()],
                severity: chosen.severity,
                description: chosen.description.clone(),
            });
        }
    }

    findings
}

/// Detect conflicts between medications and recorded allergies
///
/// Only active, medication-type allergies participate. A direct medication
/// match yields a contraindicated finding and ends the checks for that
/// (medication, allergy) pair; otherwise a classification match against the
/// allergen class yields a severe finding. Each pair contributes at most one
/// finding.
pub fn resolve_allergy_interactions(
    allergies: &[Allergy],
    medications: &[Medication],
) -> Vec<AllergyFinding> {
    let mut findings = Vec::new();

    for medication in medications {
        for allergy in allergies {
            if !allergy.is_checkable() {
                continue;
            }

            if allergy.medication_id.as_deref() == Some(medication.id.as_str()) {
                findings.push(AllergyFinding {
                    medication_id: medication.id.clone(),
                    allergy_id: allergy.id.clone(),
                    severity: InteractionSeverity::Contraindicated,
                    description: format!(
                        "Patient has a documented allergy to {}",
                        medication.name
                    ),
                    reaction: allergy.reaction.clone(),
                });
                continue;
            }

            let class_match = allergy
                .allergen_class
                .as_deref()
                .is_some_and(|class| class.eq_ignore_ascii_case(&medication.classification));
            if class_match {
                findings.push(AllergyFinding {
                    medication_id: medication.id.clone(),
                    allergy_id: allergy.id.clone(),
                    severity: InteractionSeverity::Severe,
                    description: format!(
                        "{} belongs to drug class {}, which the patient is allergic to",
                        medication.name, medication.classification
                    ),
                    reaction: allergy.reaction.clone(),
                });
            }
        }
    }

    findings
}
