//! Preference resolution: suppression, global mode, formatting
//!
//! Everything here is a pure function of (definition, preference snapshot,
//! clock). The snapshot is loaded once per engine call, so suppression is
//! independent of the order alerts are evaluated in.

use chrono::{DateTime, Utc};
use octofhir_cds_types::{
    AlertPreference, ClinicalAlertDefinition, FormattedAlert, GlobalAlertStatus, PreferenceStatus,
    UserAlertPreference,
};

/// Whether a user preference hides this alert
///
/// Precedence, first hit wins:
/// 1. alert-level `disabled`
/// 2. alert-level `muted` with an unexpired `mute_until` (an expired or
///    absent expiry reverts the alert to visible, not to any prior state)
/// 3. category-level `disabled`
/// 4. category-level `muted` (categories have no expiry)
/// 5. otherwise visible
///
/// System-defined critical alerts take the final branch like every other
/// alert: an explicit alert-level disable in step 1 still wins for them.
pub fn is_suppressed(
    definition: &ClinicalAlertDefinition,
    preference: Option<&UserAlertPreference>,
    now: DateTime<Utc>,
) -> bool {
    let Some(preference) = preference else {
        // No snapshot (new user, or the store was unreachable): fail open
        return false;
    };

    if let Some(alert_preference) = preference.alert_preference(&definition.id) {
        match alert_preference.status {
            PreferenceStatus::Disabled => return true,
            PreferenceStatus::Muted => {
                if alert_preference.mute_until.is_some_and(|until| until > now) {
                    return true;
                }
            }
            PreferenceStatus::Enabled => {}
        }
    }

    if let Some(category_preference) = preference.category_preference(definition.category) {
        match category_preference.status {
            PreferenceStatus::Disabled | PreferenceStatus::Muted => return true,
            PreferenceStatus::Enabled => {}
        }
    }

    false
}

/// Apply the global preference mode to the active definition set
///
/// `disabled` empties the set (the engine short-circuits before evaluation);
/// `critical-only` pre-filters to critical severity before condition
/// evaluation and per-alert suppression run.
pub fn apply_global_mode(
    status: GlobalAlertStatus,
    definitions: Vec<ClinicalAlertDefinition>,
) -> Vec<ClinicalAlertDefinition> {
    use octofhir_cds_types::AlertSeverity;
    match status {
        GlobalAlertStatus::Enabled => definitions,
        GlobalAlertStatus::CriticalOnly => definitions
            .into_iter()
            .filter(|definition| definition.severity == AlertSeverity::Critical)
            .collect(),
        GlobalAlertStatus::Disabled => Vec::new(),
    }
}

/// Render a kept alert, applying per-alert severity and text overrides
pub fn format_alert(
    definition: &ClinicalAlertDefinition,
    preference: Option<&AlertPreference>,
) -> FormattedAlert {
    let severity = preference
        .and_then(|p| p.custom_severity)
        .unwrap_or(definition.severity);
    let custom_text = preference.and_then(|p| p.custom_text.as_ref());
    let title = custom_text
        .and_then(|text| text.title.clone())
        .unwrap_or_else(|| definition.title.clone());
    let description = custom_text
        .and_then(|text| text.description.clone())
        .unwrap_or_else(|| definition.description.clone());

    FormattedAlert {
        alert_id: definition.id.clone(),
        title,
        description,
        category: definition.category,
        severity,
        recommended_action: definition.recommended_action.clone(),
        is_system_defined: definition.is_system_defined,
    }
}
