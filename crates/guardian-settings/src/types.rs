//! Settings type definitions.

use serde::{Deserialize, Serialize};

/// DKG can legitimately run for hours, so individual requests get a very
/// long timeout: 5 hours, in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 5 * 60 * 60;

/// Root settings object.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardianSettings {
    /// API connection settings.
    pub api: ApiSettings,
    /// Authentication settings.
    pub auth: AuthSettings,
}

/// API connection settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    /// WebSocket URL of the guardian's admin API. Required for any
    /// connection attempt.
    pub url: Option<String>,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            url: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

/// Authentication settings.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    /// Admin password. Usually supplied via `GUARDIAN_PASSWORD` rather
    /// than the settings file.
    pub password: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let settings = GuardianSettings::default();
        assert!(settings.api.url.is_none());
        assert_eq!(settings.api.request_timeout_secs, 18_000);
        assert!(settings.auth.password.is_none());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let settings: GuardianSettings =
            serde_json::from_str(r#"{ "api": { "url": "ws://localhost:18174" } }"#).unwrap();
        assert_eq!(settings.api.url.as_deref(), Some("ws://localhost:18174"));
        assert_eq!(settings.api.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
    }
}
