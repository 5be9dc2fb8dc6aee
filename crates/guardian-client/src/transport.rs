//! Transport seam between the dispatcher and the wire.
//!
//! The transport tags failures at the source: a response envelope carrying
//! an `error` field comes back as [`RpcFailure::Remote`], anything else
//! (socket death, timeout, malformed frame) as [`RpcFailure::Transport`].
//! Callers never have to probe an error value for its shape.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use guardian_core::{ApiError, RpcError};

/// Failure of a single request, tagged at the transport layer.
#[derive(Clone, Debug)]
pub enum RpcFailure {
    /// The server answered with a structured error envelope.
    Remote(RpcError),
    /// The request never got a usable answer.
    Transport(String),
}

impl From<RpcFailure> for ApiError {
    fn from(failure: RpcFailure) -> Self {
        match failure {
            RpcFailure::Remote(err) => ApiError::Rpc(err),
            RpcFailure::Transport(reason) => ApiError::Transport(reason),
        }
    }
}

/// A live, single-shot request/response transport.
#[async_trait]
pub trait Transport: Send + Sync + std::fmt::Debug {
    /// Send one named call and await its response.
    ///
    /// `params` is the already-built envelope parameter array.
    async fn request(&self, method: &str, params: serde_json::Value)
        -> Result<serde_json::Value, RpcFailure>;

    /// Close the transport. Returns whether the close was clean.
    async fn close(&self) -> bool;
}

/// Opens transports. The seam that lets tests inject scripted connections.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Open a transport to `url` with the given per-request timeout.
    ///
    /// The error is the raw reason; the connection manager wraps it into
    /// the user-facing `ConnectionFailed`.
    async fn open(
        &self,
        url: &str,
        request_timeout: Duration,
    ) -> Result<Arc<dyn Transport>, String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_failure_becomes_rpc_error_unchanged() {
        let failure = RpcFailure::Remote(RpcError {
            code: 401,
            message: "invalid password".into(),
            data: None,
        });
        match ApiError::from(failure) {
            ApiError::Rpc(err) => {
                assert_eq!(err.code, 401);
                assert_eq!(err.message, "invalid password");
            }
            other => panic!("expected Rpc, got {other:?}"),
        }
    }

    #[test]
    fn transport_failure_stays_opaque() {
        let failure = RpcFailure::Transport("socket closed".into());
        assert!(matches!(ApiError::from(failure), ApiError::Transport(r) if r == "socket closed"));
    }
}
