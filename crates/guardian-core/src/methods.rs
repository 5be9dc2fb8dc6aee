//! Remote method names, grouped by access level.
//!
//! Shared methods work in both setup and running phases. Setup methods are
//! rejected once consensus runs, and admin methods are rejected before it.

/// Methods available in both phases.
pub mod shared {
    /// Authenticated no-op used to verify a credential.
    pub const AUTH: &str = "auth";
    /// Server lifecycle status.
    pub const STATUS: &str = "status";
    /// Per-peer config hash for cross-verification.
    pub const GET_VERIFY_CONFIG_HASH: &str = "get_verify_config_hash";
}

/// Methods available only while the server is in setup mode.
pub mod setup {
    /// Set the admin password.
    pub const SET_PASSWORD: &str = "set_password";
    /// Register this guardian's name and leader URL.
    pub const SET_CONFIG_GEN_CONNECTIONS: &str = "set_config_gen_connections";
    /// Fetch default config-gen parameters.
    pub const GET_DEFAULT_CONFIG_GEN_PARAMS: &str = "get_default_config_gen_params";
    /// Fetch the consensus view of config-gen parameters.
    pub const GET_CONSENSUS_CONFIG_GEN_PARAMS: &str = "get_consensus_config_gen_params";
    /// Submit config-gen parameters.
    pub const SET_CONFIG_GEN_PARAMS: &str = "set_config_gen_params";
    /// Run distributed key generation. Long-running.
    pub const RUN_DKG: &str = "run_dkg";
    /// Mark configs as verified.
    pub const VERIFIED_CONFIGS: &str = "verified_configs";
    /// Leave setup mode and start consensus. Restarts server networking.
    pub const START_CONSENSUS: &str = "start_consensus";
    /// Reset the setup process.
    pub const RESTART_SETUP: &str = "restart_setup";
}

/// Methods available only once consensus is running.
pub mod admin {
    /// Core and module versions.
    pub const VERSION: &str = "version";
    /// Federation-wide status.
    pub const FEDERATION_STATUS: &str = "federation_status";
    /// Federation invite code.
    pub const INVITE_CODE: &str = "invite_code";
    /// Client-facing federation config.
    pub const CONFIG: &str = "config";
    /// Balance-sheet audit.
    pub const AUDIT: &str = "audit";
    /// Per-module configuration.
    pub const MODULES_CONFIG: &str = "modules_config";
}

/// Operations dispatched to a specific module instance.
pub mod module {
    /// Current block count, wallet module.
    pub const BLOCK_COUNT: &str = "block_count";
}

/// Compose a module-scoped method name: `module_<id>_<op>`.
#[must_use]
pub fn module_method(module_id: u64, op: &str) -> String {
    format!("module_{module_id}_{op}")
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
