//! Connection lifecycle.
//!
//! Owns at most one live transport. Concurrent `connect()` callers during
//! an in-flight attempt all join the same outcome through a `watch`
//! channel, so exactly one transport open ever happens per attempt.
//! Attempts carry a generation number: a `shutdown()` that races an open
//! discards the pending slot, and the late-finishing open must not
//! resurrect it. The attempt is driven by whichever caller started it; if
//! that caller is cancelled mid-open, the dropped `watch` sender marks the
//! attempt dead and the next `connect()` clears the slot and starts over.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::{Mutex, watch};
use tracing::{debug, error};

use guardian_core::{ApiError, Result};

use crate::transport::{Connector, Transport};

type ConnectOutcome = Result<Arc<dyn Transport>>;

/// Connection slot state.
enum ConnState {
    /// No connection and no attempt in flight.
    Absent,
    /// One attempt in flight; joiners wait on the channel.
    Connecting {
        attempt: u64,
        rx: watch::Receiver<Option<ConnectOutcome>>,
    },
    /// Usable connection.
    Open(Arc<dyn Transport>),
}

/// Manages the single transport connection of a client instance.
pub struct ConnectionManager {
    connector: Arc<dyn Connector>,
    url: Option<String>,
    request_timeout: Duration,
    state: Mutex<ConnState>,
    attempts: AtomicU64,
}

impl ConnectionManager {
    /// Create a manager. `url` may be absent; that only fails once a
    /// connection is actually requested.
    pub fn new(
        connector: Arc<dyn Connector>,
        url: Option<String>,
        request_timeout: Duration,
    ) -> Self {
        Self {
            connector,
            url,
            request_timeout,
            state: Mutex::new(ConnState::Absent),
            attempts: AtomicU64::new(0),
        }
    }

    /// Return the open connection, join the pending attempt, or start a
    /// fresh one.
    pub async fn connect(&self) -> ConnectOutcome {
        loop {
            let (attempt, mut rx) = {
                let mut state = self.state.lock().await;
                match &*state {
                    ConnState::Open(transport) => return Ok(transport.clone()),
                    ConnState::Connecting { attempt, rx } => (*attempt, rx.clone()),
                    ConnState::Absent => {
                        let Some(url) = self.url.clone() else {
                            return Err(ApiError::Config(
                                "api url not set (api.url in settings or GUARDIAN_API_URL)".into(),
                            ));
                        };
                        let attempt = self.attempts.fetch_add(1, Ordering::Relaxed) + 1;
                        let (tx, rx) = watch::channel(None);
                        *state = ConnState::Connecting { attempt, rx };
                        drop(state);
                        return self.open(&url, attempt, &tx).await;
                    }
                }
            };

            // Join the in-flight attempt and share its outcome. Clone the
            // outcome out of the watch guard immediately so the non-`Send`
            // guard is not held across an await.
            let joined = rx.wait_for(Option::is_some).await.map(|outcome| outcome.clone());
            match joined {
                Ok(outcome) => return outcome.unwrap_or_else(|| Err(abandoned())),
                Err(_) => {
                    // The caller driving the attempt was cancelled before an
                    // outcome was published. Clear the dead slot and retry.
                    debug!(attempt, "connection attempt driver dropped, resetting slot");
                    let mut state = self.state.lock().await;
                    if matches!(*state, ConnState::Connecting { attempt: a, .. } if a == attempt) {
                        *state = ConnState::Absent;
                    }
                }
            }
        }
    }

    /// Run one open attempt and publish its outcome to every joiner.
    async fn open(
        &self,
        url: &str,
        attempt: u64,
        tx: &watch::Sender<Option<ConnectOutcome>>,
    ) -> ConnectOutcome {
        let outcome: ConnectOutcome = self
            .connector
            .open(url, self.request_timeout)
            .await
            .map_err(|reason| {
                error!(%url, %reason, "failed to open websocket");
                ApiError::ConnectionFailed { reason }
            });

        let mut state = self.state.lock().await;
        let still_current =
            matches!(*state, ConnState::Connecting { attempt: a, .. } if a == attempt);
        if still_current {
            *state = match &outcome {
                Ok(transport) => ConnState::Open(transport.clone()),
                Err(_) => ConnState::Absent,
            };
        } else {
            // A shutdown raced this attempt. Hand the outcome to whoever
            // is still waiting, but leave the slot alone.
            debug!(attempt, "connection attempt finished after shutdown");
        }
        drop(state);

        let _ = tx.send(Some(outcome.clone()));
        outcome
    }

    /// Close the connection if one exists. Reports whether the close was
    /// clean; a no-op close is clean. Always leaves the slot `Absent`.
    pub async fn shutdown(&self) -> bool {
        let previous = {
            let mut state = self.state.lock().await;
            std::mem::replace(&mut *state, ConnState::Absent)
        };
        match previous {
            ConnState::Open(transport) => transport.close().await,
            ConnState::Absent | ConnState::Connecting { .. } => true,
        }
    }
}

fn abandoned() -> ApiError {
    ApiError::ConnectionFailed {
        reason: "connection attempt abandoned".into(),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use async_trait::async_trait;

    struct RefusingConnector;

    #[async_trait]
    impl Connector for RefusingConnector {
        async fn open(
            &self,
            _url: &str,
            _request_timeout: Duration,
        ) -> std::result::Result<Arc<dyn Transport>, String> {
            Err("connection refused".into())
        }
    }

    fn manager(url: Option<&str>) -> ConnectionManager {
        ConnectionManager::new(
            Arc::new(RefusingConnector),
            url.map(String::from),
            Duration::from_secs(1),
        )
    }

    #[tokio::test]
    async fn missing_url_is_a_config_error() {
        let err = manager(None).connect().await.unwrap_err();
        assert_matches!(err, ApiError::Config(_));
    }

    #[tokio::test]
    async fn open_failure_surfaces_connection_failed() {
        let err = manager(Some("ws://localhost:0"))
            .connect()
            .await
            .unwrap_err();
        assert_matches!(err, ApiError::ConnectionFailed { reason } if reason == "connection refused");
    }

    #[tokio::test]
    async fn failed_attempt_resets_to_absent_and_retries() {
        let manager = manager(Some("ws://localhost:0"));
        let _ = manager.connect().await.unwrap_err();
        // Second call starts a new attempt instead of replaying a stale one.
        let _ = manager.connect().await.unwrap_err();
        assert_eq!(manager.attempts.load(Ordering::Relaxed), 2);
    }

    #[tokio::test]
    async fn shutdown_with_nothing_open_is_clean() {
        assert!(manager(None).shutdown().await);
    }
}
