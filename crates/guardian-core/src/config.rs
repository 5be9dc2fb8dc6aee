//! Client configuration and config-gen wire types.
//!
//! These mirror what a guardian returns from `config`, `modules_config`,
//! and the config-gen family of methods. Module configs keep their
//! kind-specific payload as raw JSON; the client only ever inspects the
//! `kind` field to resolve module ids.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ─────────────────────────────────────────────────────────────────────────────
// Modules
// ─────────────────────────────────────────────────────────────────────────────

/// Kind of a federation module.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleKind {
    /// Lightning gateway module.
    Ln,
    /// E-cash mint module.
    Mint,
    /// On-chain wallet module.
    Wallet,
    /// A module kind this client does not know about.
    #[serde(other)]
    Unknown,
}

impl fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Ln => "ln",
            Self::Mint => "mint",
            Self::Wallet => "wallet",
            Self::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// Configuration of a single module instance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModuleConfig {
    /// Module kind.
    pub kind: ModuleKind,
    /// Kind-specific configuration, kept opaque.
    #[serde(flatten)]
    pub rest: BTreeMap<String, serde_json::Value>,
}

/// Response of the `modules_config` method: module id → module config.
pub type ModulesConfigResponse = BTreeMap<String, ModuleConfig>;

// ─────────────────────────────────────────────────────────────────────────────
// Client config
// ─────────────────────────────────────────────────────────────────────────────

/// Client-facing federation configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Free-form federation metadata (name, welcome message, ...).
    #[serde(default)]
    pub meta: BTreeMap<String, String>,
    /// Active modules keyed by numeric module id (stringly on the wire).
    #[serde(default)]
    pub modules: BTreeMap<String, ModuleConfig>,
}

impl ClientConfig {
    /// Find the id of the first module of the given kind.
    #[must_use]
    pub fn module_id_by_kind(&self, kind: ModuleKind) -> Option<u64> {
        self.modules
            .iter()
            .find(|(_, module)| module.kind == kind)
            .and_then(|(id, _)| id.parse().ok())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Config generation
// ─────────────────────────────────────────────────────────────────────────────

/// Parameters exchanged during config generation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigGenParams {
    /// Federation metadata agreed by all peers.
    #[serde(default)]
    pub meta: BTreeMap<String, String>,
    /// Per-module config-gen parameters, kept opaque.
    #[serde(default)]
    pub modules: BTreeMap<String, serde_json::Value>,
}

/// Consensus view of the config-gen session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConsensusState {
    /// Parameters every peer has agreed on so far.
    pub consensus: ConfigGenParams,
    /// This guardian's peer id in the session.
    pub our_current_id: u32,
}

/// Request body for `set_config_gen_connections`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConfigGenConnectionsRequest {
    /// Display name of this guardian.
    pub our_name: String,
    /// API URL of the leader, absent when this guardian is the leader.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leader_api_url: Option<String>,
}

/// Response of `get_verify_config_hash`: peer id → config hash.
pub type PeerHashMap = BTreeMap<String, String>;

// ─────────────────────────────────────────────────────────────────────────────
// Version and audit reports
// ─────────────────────────────────────────────────────────────────────────────

/// A single API version.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiVersion {
    /// Incompatible API changes.
    pub major: u32,
    /// Backwards-compatible additions.
    pub minor: u32,
}

/// Versions advertised by the core server.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CoreApiVersions {
    /// Consensus protocol version.
    pub core_consensus: ApiVersion,
    /// Supported API versions.
    #[serde(default)]
    pub api: Vec<ApiVersion>,
}

/// Response of the `version` method.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Versions {
    /// Core server versions.
    pub core: CoreApiVersions,
    /// Per-module version info, kept opaque.
    #[serde(default)]
    pub modules: BTreeMap<String, serde_json::Value>,
}

/// Per-module audit line.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModuleSummary {
    /// Net assets held by the module, in millisatoshis.
    pub net_assets_msats: i64,
}

/// Response of the `audit` method.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AuditSummary {
    /// Net assets across all modules, in millisatoshis.
    pub net_assets_msats: i64,
    /// Per-module breakdown keyed by module id.
    #[serde(default)]
    pub module_summaries: BTreeMap<String, ModuleSummary>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
