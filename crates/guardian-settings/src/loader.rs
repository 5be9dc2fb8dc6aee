//! Settings loading with environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`GuardianSettings::default()`]
//! 2. If `~/.guardian/settings.json` exists, parse it (missing fields keep
//!    their defaults via serde)
//! 3. Apply `GUARDIAN_*` environment variable overrides (highest priority)

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::errors::Result;
use crate::types::GuardianSettings;

/// Resolve the path to the settings file (`~/.guardian/settings.json`).
pub fn settings_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".guardian").join("settings.json")
}

/// Load settings from the default path with env var overrides.
pub fn load_settings() -> Result<GuardianSettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from a specific path with env var overrides.
///
/// If the file does not exist, returns defaults. If the file contains
/// invalid JSON, returns an error.
pub fn load_settings_from_path(path: &Path) -> Result<GuardianSettings> {
    let mut settings = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)?
    } else {
        debug!(?path, "settings file not found, using defaults");
        GuardianSettings::default()
    };
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Apply `GUARDIAN_*` environment variable overrides.
///
/// Invalid values are silently ignored (fall back to file/default).
pub fn apply_env_overrides(settings: &mut GuardianSettings) {
    apply_overrides(settings, |name| std::env::var(name).ok());
}

/// Apply overrides from an arbitrary variable lookup. Split out so tests
/// do not have to mutate the process environment.
pub fn apply_overrides<F>(settings: &mut GuardianSettings, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup("GUARDIAN_API_URL").filter(|v| !v.is_empty()) {
        settings.api.url = Some(url);
    }
    if let Some(secs) = lookup("GUARDIAN_REQUEST_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
        settings.api.request_timeout_secs = secs;
    }
    if let Some(password) = lookup("GUARDIAN_PASSWORD").filter(|v| !v.is_empty()) {
        settings.auth.password = Some(password);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup_from<'a>(map: &'a HashMap<&'a str, &'a str>) -> impl Fn(&str) -> Option<String> + 'a {
        move |name| map.get(name).map(|v| (*v).to_string())
    }

    #[test]
    fn missing_file_returns_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = load_settings_from_path(&dir.path().join("nope.json")).unwrap();
        assert!(settings.api.url.is_none());
    }

    #[test]
    fn invalid_json_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, "{{ broken").unwrap();
        assert!(load_settings_from_path(&path).is_err());
    }

    #[test]
    fn file_values_are_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{ "api": { "url": "ws://fed.example:18174", "request_timeout_secs": 60 } }"#,
        )
        .unwrap();
        let settings = load_settings_from_path(&path).unwrap();
        assert_eq!(settings.api.url.as_deref(), Some("ws://fed.example:18174"));
        assert_eq!(settings.api.request_timeout_secs, 60);
    }

    #[test]
    fn overrides_take_priority() {
        let mut settings = GuardianSettings::default();
        settings.api.url = Some("ws://from-file".into());
        let vars = HashMap::from([
            ("GUARDIAN_API_URL", "ws://from-env"),
            ("GUARDIAN_REQUEST_TIMEOUT_SECS", "30"),
            ("GUARDIAN_PASSWORD", "hunter2"),
        ]);
        apply_overrides(&mut settings, lookup_from(&vars));
        assert_eq!(settings.api.url.as_deref(), Some("ws://from-env"));
        assert_eq!(settings.api.request_timeout_secs, 30);
        assert_eq!(settings.auth.password.as_deref(), Some("hunter2"));
    }

    #[test]
    fn invalid_override_values_are_ignored() {
        let mut settings = GuardianSettings::default();
        let vars = HashMap::from([
            ("GUARDIAN_API_URL", ""),
            ("GUARDIAN_REQUEST_TIMEOUT_SECS", "soon"),
        ]);
        apply_overrides(&mut settings, lookup_from(&vars));
        assert!(settings.api.url.is_none());
        assert_eq!(
            settings.api.request_timeout_secs,
            crate::types::DEFAULT_REQUEST_TIMEOUT_SECS
        );
    }

    #[test]
    fn settings_path_is_under_home() {
        let path = settings_path();
        assert!(path.ends_with(".guardian/settings.json"));
    }
}
