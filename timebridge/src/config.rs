use serde::{Deserialize, Serialize};
use std::time::Duration;

// Defaults tuned against the live destination UI. The dropdown needs the
// longest pause because candidates are fetched over the network.
const AFTER_CREATE_ROW: Duration = Duration::from_millis(400);
const DROPDOWN: Duration = Duration::from_millis(600);
const AFTER_SELECT: Duration = Duration::from_millis(400);
const AFTER_SERVICE: Duration = Duration::from_millis(300);
const AFTER_SAVE: Duration = Duration::from_millis(500);
const BATCH_SET: Duration = Duration::from_millis(200);
const AFTER_NOTIFY: Duration = Duration::from_millis(200);
const AFTER_BLUR: Duration = Duration::from_millis(300);

/// Settle delays between mutations.
///
/// The target UIs give no signal that a re-render has finished, so every
/// phase boundary pauses for a fixed, configurable interval instead of
/// polling. All delays flow through [`crate::engine::DomEngine::settle`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettleConfig {
    /// After clicking the row-creation control
    pub after_create_row: Duration,
    /// After typing a query, before looking for the candidate list
    pub dropdown: Duration,
    /// After clicking a candidate
    pub after_select: Duration,
    /// After writing the service field
    pub after_service: Duration,
    /// After clicking the save control
    pub after_save: Duration,
    /// After the batch-set phase, before any change notification
    pub batch_set: Duration,
    /// After change notifications, before blurring the row
    pub after_notify: Duration,
    /// After blurring the row, before verification read-back
    pub after_blur: Duration,
}

impl Default for SettleConfig {
    fn default() -> Self {
        Self {
            after_create_row: AFTER_CREATE_ROW,
            dropdown: DROPDOWN,
            after_select: AFTER_SELECT,
            after_service: AFTER_SERVICE,
            after_save: AFTER_SAVE,
            batch_set: BATCH_SET,
            after_notify: AFTER_NOTIFY,
            after_blur: AFTER_BLUR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_tuned_values() {
        let config = SettleConfig::default();
        assert_eq!(config.dropdown, Duration::from_millis(600));
        assert_eq!(config.batch_set, Duration::from_millis(200));
        assert_eq!(config.after_blur, Duration::from_millis(300));
    }

    #[test]
    fn deserializes_partial_overrides() {
        let config: SettleConfig =
            serde_json::from_str(r#"{"dropdown":{"secs":1,"nanos":0}}"#).unwrap();
        assert_eq!(config.dropdown, Duration::from_secs(1));
        assert_eq!(config.after_save, Duration::from_millis(500));
    }
}
