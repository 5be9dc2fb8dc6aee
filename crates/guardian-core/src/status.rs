//! Server status types reported by a guardian.
//!
//! The client never owns this state. It reads it to drive the consensus
//! confirmation loop and to let the hosting application decide which
//! screen or prompt to show.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Lifecycle status reported by the remote guardian.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServerStatus {
    /// Fresh server waiting for an admin password.
    AwaitingPassword,
    /// Exchanging config-gen parameters with peers.
    SharingConfigGenParams,
    /// All parameters collected; ready to run config generation.
    ReadyForConfigGen,
    /// Distributed key generation failed.
    ConfigGenFailed,
    /// Peers are verifying each other's config hashes.
    VerifyingConfigs,
    /// Config hashes verified by all peers.
    VerifiedConfigs,
    /// Server is mid-upgrade.
    Upgrading,
    /// A peer restarted the setup process.
    SetupRestarted,
    /// Consensus is running; setup is complete.
    ConsensusRunning,
}

impl fmt::Display for ServerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Wire spelling, also used in log lines.
        let s = match self {
            Self::AwaitingPassword => "awaiting_password",
            Self::SharingConfigGenParams => "sharing_config_gen_params",
            Self::ReadyForConfigGen => "ready_for_config_gen",
            Self::ConfigGenFailed => "config_gen_failed",
            Self::VerifyingConfigs => "verifying_configs",
            Self::VerifiedConfigs => "verified_configs",
            Self::Upgrading => "upgrading",
            Self::SetupRestarted => "setup_restarted",
            Self::ConsensusRunning => "consensus_running",
        };
        f.write_str(s)
    }
}

/// Response of the `status` method.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Current server lifecycle status.
    pub server: ServerStatus,
    /// Federation-wide status, present once consensus is running.
    #[serde(default)]
    pub federation: Option<FederationStatus>,
}

/// Federation-wide health as seen by this guardian.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FederationStatus {
    /// Consensus session count.
    pub session_count: u64,
    /// Per-peer connection status, keyed by peer id.
    #[serde(default)]
    pub status_by_peer: BTreeMap<String, PeerConnectionStatus>,
}

/// Connection status of a single peer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PeerConnectionStatus {
    /// Whether this guardian currently has a connection to the peer.
    pub connected: bool,
    /// Whether the peer has been flagged for misbehavior.
    #[serde(default)]
    pub flagged: bool,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
