//! # guardian-settings
//!
//! Configuration management with layered sources for the guardian admin client.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults** — [`GuardianSettings::default()`]
//! 2. **User file** — `~/.guardian/settings.json`
//! 3. **Environment variables** — `GUARDIAN_*` overrides (highest priority)
//!
//! The only value the client strictly requires is the API endpoint URL;
//! its absence is reported by the client as a configuration error at
//! connect time, not here.

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{apply_env_overrides, load_settings, load_settings_from_path, settings_path};
pub use types::{ApiSettings, AuthSettings, GuardianSettings};

use std::sync::OnceLock;

/// Global settings singleton, initialized on first access.
static SETTINGS: OnceLock<GuardianSettings> = OnceLock::new();

/// Get the global settings instance.
///
/// On first call, loads settings from `~/.guardian/settings.json` with env
/// var overrides; falls back to compiled defaults if loading fails.
pub fn get_settings() -> &'static GuardianSettings {
    SETTINGS.get_or_init(|| load_settings().unwrap_or_default())
}

/// Initialize the global settings with a specific value.
///
/// Returns `false` if settings were already initialized.
pub fn init_settings(settings: GuardianSettings) -> bool {
    SETTINGS.set(settings).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    // Single test: the OnceLock is process-wide state.
    #[test]
    fn init_then_get_returns_the_initialized_value() {
        let mut settings = GuardianSettings::default();
        settings.api.url = Some("ws://init.test:18174".into());
        assert!(init_settings(settings));
        assert_eq!(
            get_settings().api.url.as_deref(),
            Some("ws://init.test:18174")
        );
        // A second initialization is rejected.
        assert!(!init_settings(GuardianSettings::default()));
    }
}
