//! Credential storage.
//!
//! Holds the single admin password for the lifetime of the client
//! instance. Pure storage with no network effect; the probe that tests a
//! candidate credential lives on the client, which owns both this store
//! and the connection.

use parking_lot::RwLock;

/// The one credential attached to every outbound call.
#[derive(Debug, Default)]
pub struct AuthStore {
    credential: RwLock<Option<String>>,
}

impl AuthStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the active credential.
    pub fn set_credential(&self, value: impl Into<String>) {
        *self.credential.write() = Some(value.into());
    }

    /// The active credential, if any.
    #[must_use]
    pub fn credential(&self) -> Option<String> {
        self.credential.read().clone()
    }

    /// Drop the active credential (logout or failed verification).
    pub fn clear_credential(&self) {
        *self.credential.write() = None;
    }
}
