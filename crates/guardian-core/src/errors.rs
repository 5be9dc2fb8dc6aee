//! Error hierarchy for the guardian admin client.
//!
//! Two layers:
//!
//! - [`RpcError`]: the structured error a guardian returns inside the
//!   response envelope. Passed through to callers unchanged.
//! - [`ApiError`]: everything that can go wrong on the client side, from
//!   missing configuration to transport failures.
//!
//! [`ApiError`] is `Clone` because a single in-flight connection attempt
//! fans its outcome out to every caller that joined it.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::config::ModuleKind;

// ─────────────────────────────────────────────────────────────────────────────
// Wire-format RPC error
// ─────────────────────────────────────────────────────────────────────────────

/// Structured error returned by the server in a response envelope.
///
/// Carried verbatim: the client never rewrites the code or message.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RpcError {
    /// Numeric error code assigned by the server.
    pub code: i64,
    /// Human-readable message from the server.
    pub message: String,
    /// Optional structured payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl fmt::Display for RpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rpc error {}: {}", self.code, self.message)
    }
}

impl std::error::Error for RpcError {}

// ─────────────────────────────────────────────────────────────────────────────
// Client-side error
// ─────────────────────────────────────────────────────────────────────────────

/// Top-level error type for the guardian admin client.
#[derive(Clone, Debug, Error)]
pub enum ApiError {
    /// Required connection configuration is missing. Fatal, never retried.
    #[error("missing connection configuration: {0}")]
    Config(String),

    /// The transport could not be opened. Connection state is reset so a
    /// later call can retry.
    #[error("failed to connect to API, confirm your server is online and try again ({reason})")]
    ConnectionFailed {
        /// Underlying transport failure.
        reason: String,
    },

    /// Structured error returned by the server, passed through unchanged.
    #[error("{0}")]
    Rpc(RpcError),

    /// Opaque transport-level failure during a call.
    #[error("transport error: {0}")]
    Transport(String),

    /// The fetched client configuration has no module of the requested kind.
    /// Raised before any network call.
    #[error("no {kind} module found in client config")]
    ModuleNotFound {
        /// The module kind that was looked up.
        kind: ModuleKind,
    },

    /// The consensus-start retry budget was exhausted.
    #[error("failed to start consensus, see logs for more info")]
    ConsensusStartFailed,
}

impl From<RpcError> for ApiError {
    fn from(err: RpcError) -> Self {
        ApiError::Rpc(err)
    }
}

/// Result alias for guardian API operations.
pub type Result<T> = std::result::Result<T, ApiError>;

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rpc_error_display() {
        let err = RpcError {
            code: 401,
            message: "invalid password".into(),
            data: None,
        };
        assert_eq!(err.to_string(), "rpc error 401: invalid password");
    }

    #[test]
    fn rpc_error_serde_skips_empty_data() {
        let err = RpcError {
            code: -32600,
            message: "invalid request".into(),
            data: None,
        };
        let value = serde_json::to_value(&err).unwrap();
        assert_eq!(value, json!({ "code": -32600, "message": "invalid request" }));
    }

    #[test]
    fn rpc_error_deserializes_with_data() {
        let err: RpcError =
            serde_json::from_value(json!({ "code": 1, "message": "boom", "data": [1, 2] }))
                .unwrap();
        assert_eq!(err.code, 1);
        assert_eq!(err.data, Some(json!([1, 2])));
    }

    #[test]
    fn connection_failed_message_is_user_facing() {
        let err = ApiError::ConnectionFailed {
            reason: "refused".into(),
        };
        assert!(err.to_string().contains("confirm your server is online"));
    }

    #[test]
    fn module_not_found_names_the_kind() {
        let err = ApiError::ModuleNotFound {
            kind: ModuleKind::Wallet,
        };
        assert!(err.to_string().contains("wallet"));
    }

    #[test]
    fn api_error_is_clone() {
        let err = ApiError::Rpc(RpcError {
            code: 2,
            message: "dup".into(),
            data: None,
        });
        let copy = err.clone();
        assert_eq!(copy.to_string(), err.to_string());
    }
}
