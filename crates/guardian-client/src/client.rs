//! The guardian admin client: typed RPC surface over one connection.
//!
//! Every remote method gets a typed wrapper. All of them flow through
//! [`GuardianClient::call`], which ensures a connection, attaches the
//! credential, and normalizes failures exactly once: server envelope
//! errors pass through verbatim, everything else becomes an opaque
//! transport error.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, error, warn};

use guardian_core::{
    ApiError, AuditSummary, ClientConfig, ConfigGenConnectionsRequest, ConfigGenParams,
    ConsensusState, FederationStatus, ModuleKind, ModulesConfigResponse, PeerHashMap, Result,
    ServerStatus, StatusResponse, Versions, methods,
};
use guardian_settings::GuardianSettings;

use crate::auth::AuthStore;
use crate::connection::ConnectionManager;
use crate::transport::{Connector, RpcFailure, Transport};
use crate::ws::WsConnector;

/// How long the start-consensus call may go unanswered before the client
/// assumes the server killed the connection on purpose and moves on to
/// status polling.
const START_CONSENSUS_GRACE: Duration = Duration::from_secs(5);

/// Total confirmation attempts before giving up on consensus start.
const CONFIRM_ATTEMPTS: u32 = 10;

/// Delay between confirmation attempts.
const CONFIRM_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Stateful admin client for one guardian.
///
/// Owns the single connection slot and the single credential. Constructed
/// once by the hosting application and shared by reference.
pub struct GuardianClient {
    connection: ConnectionManager,
    auth: AuthStore,
}

impl GuardianClient {
    /// Build a client that connects over WebSocket.
    #[must_use]
    pub fn new(settings: &GuardianSettings) -> Self {
        Self::with_connector(settings, Arc::new(WsConnector))
    }

    /// Build a client with a custom connector (the test seam).
    #[must_use]
    pub fn with_connector(settings: &GuardianSettings, connector: Arc<dyn Connector>) -> Self {
        let client = Self {
            connection: ConnectionManager::new(
                connector,
                settings.api.url.clone(),
                Duration::from_secs(settings.api.request_timeout_secs),
            ),
            auth: AuthStore::new(),
        };
        if let Some(password) = &settings.auth.password {
            client.auth.set_credential(password.clone());
        }
        client
    }

    // ─── Connection ──────────────────────────────────────────────────────

    /// Ensure a connection exists and return it.
    pub async fn connect(&self) -> Result<Arc<dyn Transport>> {
        self.connection.connect().await
    }

    /// Close the connection if one exists. Returns whether the close was
    /// clean; safe to call when nothing is open.
    pub async fn shutdown(&self) -> bool {
        self.connection.shutdown().await
    }

    // ─── Credential ──────────────────────────────────────────────────────

    /// The active credential, if any.
    #[must_use]
    pub fn credential(&self) -> Option<String> {
        self.auth.credential()
    }

    /// Replace the active credential without any network effect.
    pub fn set_credential(&self, value: impl Into<String>) {
        self.auth.set_credential(value);
    }

    /// Drop the active credential (logout).
    pub fn clear_credential(&self) {
        self.auth.clear_credential();
    }

    /// Verify a candidate credential with an authenticated probe call.
    ///
    /// On success the candidate stays active. On failure it is cleared and
    /// `false` is returned. Known imprecision, kept on purpose: any probe
    /// failure counts as a wrong password, even when the real cause was
    /// the transport or the server.
    pub async fn test_credential(&self, candidate: impl Into<String>) -> bool {
        self.auth.set_credential(candidate);
        match self.auth_probe().await {
            Ok(()) => true,
            Err(err) => {
                warn!(%err, "auth probe failed, clearing candidate credential");
                self.auth.clear_credential();
                false
            }
        }
    }

    // ─── Shared methods ──────────────────────────────────────────────────

    /// Authenticated no-op; fails unless the active credential is valid.
    pub async fn auth_probe(&self) -> Result<()> {
        self.call_unit(methods::shared::AUTH).await
    }

    /// Current server lifecycle status.
    pub async fn status(&self) -> Result<StatusResponse> {
        self.call(methods::shared::STATUS, Value::Null).await
    }

    /// Per-peer config hashes for cross-verification.
    pub async fn get_verify_config_hash(&self) -> Result<PeerHashMap> {
        self.call(methods::shared::GET_VERIFY_CONFIG_HASH, Value::Null)
            .await
    }

    // ─── Setup methods ───────────────────────────────────────────────────

    /// Set the admin password on the server and keep it as the active
    /// credential. If the server rejects it, the stored credential is
    /// cleared before the error propagates.
    pub async fn set_password(&self, password: impl Into<String>) -> Result<()> {
        // Stored first so the call itself carries it.
        self.auth.set_credential(password);
        match self.call_unit(methods::setup::SET_PASSWORD).await {
            Ok(()) => Ok(()),
            Err(err) => {
                self.auth.clear_credential();
                Err(err)
            }
        }
    }

    /// Register this guardian's name and, for followers, the leader URL.
    pub async fn set_config_gen_connections(
        &self,
        our_name: impl Into<String>,
        leader_api_url: Option<String>,
    ) -> Result<()> {
        let connections = ConfigGenConnectionsRequest {
            our_name: our_name.into(),
            leader_api_url,
        };
        let params = serde_json::to_value(connections)
            .map_err(|e| ApiError::Transport(format!("failed to encode params: {e}")))?;
        let _: Option<Value> = self
            .call(methods::setup::SET_CONFIG_GEN_CONNECTIONS, params)
            .await?;
        Ok(())
    }

    /// Fetch default config-gen parameters.
    pub async fn get_default_config_gen_params(&self) -> Result<ConfigGenParams> {
        self.call(methods::setup::GET_DEFAULT_CONFIG_GEN_PARAMS, Value::Null)
            .await
    }

    /// Fetch the consensus view of config-gen parameters.
    pub async fn get_consensus_config_gen_params(&self) -> Result<ConsensusState> {
        self.call(methods::setup::GET_CONSENSUS_CONFIG_GEN_PARAMS, Value::Null)
            .await
    }

    /// Submit config-gen parameters.
    pub async fn set_config_gen_params(&self, params: &ConfigGenParams) -> Result<()> {
        let params = serde_json::to_value(params)
            .map_err(|e| ApiError::Transport(format!("failed to encode params: {e}")))?;
        let _: Option<Value> = self.call(methods::setup::SET_CONFIG_GEN_PARAMS, params).await?;
        Ok(())
    }

    /// Run distributed key generation. May legitimately take hours.
    pub async fn run_dkg(&self) -> Result<()> {
        self.call_unit(methods::setup::RUN_DKG).await
    }

    /// Mark peer configs as verified.
    pub async fn verified_configs(&self) -> Result<()> {
        self.call_unit(methods::setup::VERIFIED_CONFIGS).await
    }

    /// Reset the setup process on the server.
    pub async fn restart_setup(&self) -> Result<()> {
        self.call_unit(methods::setup::RESTART_SETUP).await
    }

    // ─── Consensus start ─────────────────────────────────────────────────

    /// Start consensus and confirm the server came back up in
    /// `consensus_running`.
    ///
    /// Starting consensus makes the server leave setup mode and restart
    /// its networking, which non-deterministically drops the in-flight
    /// call. The call is therefore raced against a grace window: an early
    /// error is not fatal (the window is waited out), a late success is
    /// discarded. Afterwards the client reconnects and polls `status` on a
    /// fixed budget; only exhausting the budget surfaces an error.
    pub async fn start_consensus(&self) -> Result<()> {
        {
            let call = self.call_unit(methods::setup::START_CONSENSUS);
            let grace = tokio::time::sleep(START_CONSENSUS_GRACE);
            tokio::pin!(call);
            tokio::pin!(grace);
            tokio::select! {
                result = &mut call => {
                    if let Err(err) = result {
                        // Expected when the server kills the connection.
                        warn!(%err, "start_consensus failed before grace window elapsed");
                        grace.await;
                    }
                }
                () = &mut grace => {
                    debug!("no start_consensus response within grace window");
                }
            }
            // The block ends here so an unresolved call is dropped, along
            // with any connect attempt it was driving. The confirmation
            // loop below must start from a slot it can reset.
        }

        for attempt in 1..=CONFIRM_ATTEMPTS {
            match self.probe_server_status().await {
                Ok(ServerStatus::ConsensusRunning) => {
                    debug!(attempt, "consensus running confirmed");
                    return Ok(());
                }
                Ok(status) => {
                    warn!(attempt, %status, "server is not in consensus_running yet");
                }
                Err(err) => {
                    warn!(attempt, %err, "failed to confirm consensus is running");
                }
            }
            if attempt < CONFIRM_ATTEMPTS {
                tokio::time::sleep(CONFIRM_RETRY_DELAY).await;
            }
        }

        error!(
            attempts = CONFIRM_ATTEMPTS,
            "gave up waiting for consensus to start"
        );
        Err(ApiError::ConsensusStartFailed)
    }

    /// Discard whatever connection state is left over, reconnect from
    /// scratch (the liveness probe), then ask for the server status.
    async fn probe_server_status(&self) -> Result<ServerStatus> {
        let _ = self.connection.shutdown().await;
        let _ = self.connection.connect().await?;
        Ok(self.status().await?.server)
    }

    // ─── Admin methods ───────────────────────────────────────────────────

    /// Core and module versions.
    pub async fn version(&self) -> Result<Versions> {
        self.call(methods::admin::VERSION, Value::Null).await
    }

    /// Federation-wide status.
    pub async fn federation_status(&self) -> Result<FederationStatus> {
        self.call(methods::admin::FEDERATION_STATUS, Value::Null).await
    }

    /// Federation invite code.
    pub async fn invite_code(&self) -> Result<String> {
        self.call(methods::admin::INVITE_CODE, Value::Null).await
    }

    /// Client-facing federation config.
    pub async fn config(&self) -> Result<ClientConfig> {
        self.call(methods::admin::CONFIG, Value::Null).await
    }

    /// Balance-sheet audit.
    pub async fn audit(&self) -> Result<AuditSummary> {
        self.call(methods::admin::AUDIT, Value::Null).await
    }

    /// Per-module configuration.
    pub async fn modules_config(&self) -> Result<ModulesConfigResponse> {
        self.call(methods::admin::MODULES_CONFIG, Value::Null).await
    }

    /// Call an operation on a specific module instance.
    pub async fn module_api_call<T: DeserializeOwned>(
        &self,
        module_id: u64,
        op: &str,
    ) -> Result<T> {
        self.call(&methods::module_method(module_id, op), Value::Null)
            .await
    }

    /// Current block count from the wallet module. Fails with
    /// `ModuleNotFound` before any network call when the config has no
    /// wallet module.
    pub async fn fetch_block_count(&self, config: &ClientConfig) -> Result<u64> {
        let module_id = config
            .module_id_by_kind(ModuleKind::Wallet)
            .ok_or(ApiError::ModuleNotFound {
                kind: ModuleKind::Wallet,
            })?;
        self.module_api_call(module_id, methods::module::BLOCK_COUNT)
            .await
    }

    // ─── Dispatch ────────────────────────────────────────────────────────

    /// Send one call and return the raw `result` value.
    async fn call_raw(&self, method: &str, params: Value) -> Result<Value> {
        let transport = self.connection.connect().await?;
        let envelope = build_envelope(self.auth.credential(), params);
        match transport.request(method, envelope).await {
            Ok(result) => {
                debug!(method, %result, "rpc result");
                Ok(result)
            }
            Err(RpcFailure::Remote(err)) => {
                error!(method, code = err.code, message = %err.message, "rpc error");
                Err(ApiError::Rpc(err))
            }
            Err(RpcFailure::Transport(reason)) => {
                error!(method, %reason, "transport failure during rpc");
                Err(ApiError::Transport(reason))
            }
        }
    }

    /// Send one call and decode the `result` into the expected type.
    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T> {
        let result = self.call_raw(method, params).await?;
        serde_json::from_value(result)
            .map_err(|e| ApiError::Transport(format!("malformed {method} response: {e}")))
    }

    /// Send one call whose result carries no data.
    async fn call_unit(&self, method: &str) -> Result<()> {
        let _: Option<Value> = self.call(method, Value::Null).await?;
        Ok(())
    }
}

/// Build the request envelope: a one-element array carrying the credential
/// and the caller's parameters.
fn build_envelope(auth: Option<String>, params: Value) -> Value {
    json!([{ "auth": auth, "params": params }])
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_carries_auth_and_params() {
        let envelope = build_envelope(Some("abc123".into()), json!({ "our_name": "alpha" }));
        assert_eq!(
            envelope,
            json!([{ "auth": "abc123", "params": { "our_name": "alpha" } }])
        );
    }

    #[test]
    fn envelope_uses_null_for_missing_credential() {
        let envelope = build_envelope(None, Value::Null);
        assert_eq!(envelope, json!([{ "auth": null, "params": null }]));
    }

    #[test]
    fn grace_and_budget_constants() {
        assert_eq!(START_CONSENSUS_GRACE, Duration::from_secs(5));
        assert_eq!(CONFIRM_ATTEMPTS, 10);
        assert_eq!(CONFIRM_RETRY_DELAY, Duration::from_secs(1));
    }
}
