// src/config.rs
// =============================================================================
// Run settings: how many root folders may be probed at once, how long one
// probe may take, and which key the duplicate check groups by.
//
// Field names are camelCase so a settings file saved by the bookmark UI
// ({"maxRequests": 5, "requestTimeoutSeconds": 10, ...}) loads as-is.
// Values are layered: defaults < settings file < command-line flags.
// =============================================================================

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{GuardianError, Result};

pub const MAX_REQUESTS_RANGE: (usize, usize) = (1, 10);
pub const REQUEST_TIMEOUT_RANGE: (u64, u64) = (1, 30);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Root folders probed concurrently
    pub max_requests: usize,
    /// Per-probe timeout
    #[serde(rename = "requestTimeoutSeconds")]
    pub request_timeout_secs: u64,
    /// Group duplicates by hostname instead of by normalized URL
    pub use_domain_for_duplication_check: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_requests: 5,
            request_timeout_secs: 10,
            use_domain_for_duplication_check: false,
        }
    }
}

impl Settings {
    /// Reads a settings file; missing fields keep their defaults
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn validate(&self) -> Result<()> {
        let (min, max) = MAX_REQUESTS_RANGE;
        if !(min..=max).contains(&self.max_requests) {
            return Err(GuardianError::InvalidSetting {
                name: "maxRequests",
                value: self.max_requests as u64,
                min: min as u64,
                max: max as u64,
            });
        }

        let (min, max) = REQUEST_TIMEOUT_RANGE;
        if !(min..=max).contains(&self.request_timeout_secs) {
            return Err(GuardianError::InvalidSetting {
                name: "requestTimeoutSeconds",
                value: self.request_timeout_secs,
                min,
                max,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(Settings::default().validate().is_ok());
    }

    #[test]
    fn test_parse_ui_settings_file() {
        let settings: Settings = serde_json::from_str(
            r#"{"maxRequests": 3, "requestTimeoutSeconds": 20, "useDomainForDuplicationCheck": true}"#,
        )
        .unwrap();
        assert_eq!(
            settings,
            Settings {
                max_requests: 3,
                request_timeout_secs: 20,
                use_domain_for_duplication_check: true,
            }
        );
        assert_eq!(settings.request_timeout(), Duration::from_secs(20));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"maxRequests": 8}"#).unwrap();
        assert_eq!(settings.max_requests, 8);
        assert_eq!(settings.request_timeout_secs, 10);
    }

    #[test]
    fn test_out_of_range_values_rejected() {
        let too_many = Settings {
            max_requests: 11,
            ..Settings::default()
        };
        assert!(matches!(
            too_many.validate(),
            Err(GuardianError::InvalidSetting { name: "maxRequests", .. })
        ));

        let no_timeout = Settings {
            request_timeout_secs: 0,
            ..Settings::default()
        };
        assert!(matches!(
            no_timeout.validate(),
            Err(GuardianError::InvalidSetting { name: "requestTimeoutSeconds", .. })
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"requestTimeoutSeconds": 30}"#).unwrap();
        assert_eq!(Settings::load(&path).unwrap().request_timeout_secs, 30);
    }
}
