//! Patient clinical data: demographics, diagnoses, lab results

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Administrative gender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
    Unknown,
}

impl Gender {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
            Self::Other => "other",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A patient record as exposed by the patient collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub id: String,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    /// Free-form demographic attributes (ethnicity, language, ...)
    #[serde(default)]
    pub demographics: BTreeMap<String, String>,
    /// Ids of the patient's active medications
    #[serde(default)]
    pub active_medications: Vec<String>,
}

impl Patient {
    /// Age in whole years on the given date
    ///
    /// Returns 0 for a date of birth in the future rather than going negative.
    pub fn age_in_years(&self, on: NaiveDate) -> u32 {
        on.years_since(self.date_of_birth).unwrap_or(0)
    }
}

/// Status of a recorded diagnosis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosisStatus {
    Active,
    Resolved,
    Inactive,
}

/// A diagnosis on the patient's problem list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnosis {
    /// Diagnosis code (e.g. ICD-10 "E11.9")
    pub code: String,
    pub description: String,
    pub status: DiagnosisStatus,
}

impl Diagnosis {
    pub fn is_active(&self) -> bool {
        self.status == DiagnosisStatus::Active
    }
}

/// A laboratory result
///
/// The value is kept textual as received from the lab interface; numeric
/// comparison parses it at evaluation time and treats unparseable values as
/// non-matching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabResult {
    /// Test code (e.g. "HbA1c", LOINC)
    pub test_code: String,
    pub test_name: String,
    pub value: String,
    #[serde(default)]
    pub unit: Option<String>,
    pub resulted_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patient(dob: &str) -> Patient {
        Patient {
            id: "p1".to_string(),
            date_of_birth: dob.parse().unwrap(),
            gender: Gender::Female,
            demographics: BTreeMap::new(),
            active_medications: Vec::new(),
        }
    }

    #[test]
    fn age_counts_whole_years() {
        let p = patient("1980-06-15");
        assert_eq!(p.age_in_years("2020-06-14".parse().unwrap()), 39);
        assert_eq!(p.age_in_years("2020-06-15".parse().unwrap()), 40);
    }

    #[test]
    fn age_is_zero_before_birth() {
        let p = patient("2030-01-01");
        assert_eq!(p.age_in_years("2020-01-01".parse().unwrap()), 0);
    }
}
