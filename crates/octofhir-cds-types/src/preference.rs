//! Per-user alert preferences
//!
//! Preferences are keyed by clinician user id and control which alerts that
//! user sees. Suppression is resolved from a preference snapshot loaded once
//! per call; it is a pure function of the stored preference and the clock,
//! never of evaluation order.

use crate::alert::AlertCategory;
use crate::severity::AlertSeverity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Global preference mode, applied before any per-alert handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GlobalAlertStatus {
    /// All alerts flow through per-category and per-alert preferences
    Enabled,
    /// Only critical-severity definitions are evaluated at all
    CriticalOnly,
    /// The alert engine is skipped entirely
    Disabled,
}

/// Status of a category- or alert-level preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreferenceStatus {
    Enabled,
    Muted,
    Disabled,
}

/// Preference for a whole alert category
///
/// Category mutes have no expiry; a muted category suppresses unconditionally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryPreference {
    pub category: AlertCategory,
    pub status: PreferenceStatus,
}

/// Replacement title/description for a single alert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomText {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Preference for a single alert definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertPreference {
    pub alert_id: String,
    pub status: PreferenceStatus,
    /// Overrides the definition's severity in formatted output
    #[serde(default)]
    pub custom_severity: Option<AlertSeverity>,
    /// Overrides the definition's title/description in formatted output
    #[serde(default)]
    pub custom_text: Option<CustomText>,
    /// For `status = muted`: suppress until this instant; an expired mute
    /// reverts the alert to visible
    #[serde(default)]
    pub mute_until: Option<DateTime<Utc>>,
}

/// All alert preferences held by one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAlertPreference {
    pub user_id: String,
    pub global_status: GlobalAlertStatus,
    #[serde(default)]
    pub categories: Vec<CategoryPreference>,
    #[serde(default)]
    pub alerts: Vec<AlertPreference>,
}

impl UserAlertPreference {
    /// The all-enabled default created lazily on first access
    pub fn default_for(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            global_status: GlobalAlertStatus::Enabled,
            categories: Vec::new(),
            alerts: Vec::new(),
        }
    }

    /// Look up the preference entry for one alert
    pub fn alert_preference(&self, alert_id: &str) -> Option<&AlertPreference> {
        self.alerts.iter().find(|p| p.alert_id == alert_id)
    }

    /// Look up the preference entry for one category
    pub fn category_preference(&self, category: AlertCategory) -> Option<&CategoryPreference> {
        self.categories.iter().find(|p| p.category == category)
    }
}

/// Partial update to a user's preferences
///
/// A supplied field replaces the stored value wholesale; omitted fields are
/// untouched. Last writer wins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PreferenceUpdate {
    #[serde(default)]
    pub global_status: Option<GlobalAlertStatus>,
    #[serde(default)]
    pub categories: Option<Vec<CategoryPreference>>,
    #[serde(default)]
    pub alerts: Option<Vec<AlertPreference>>,
}
