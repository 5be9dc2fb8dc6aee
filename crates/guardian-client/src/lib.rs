//! # guardian-client
//!
//! Stateful JSON-RPC client for administering a federation guardian over a
//! single persistent WebSocket connection.
//!
//! The crate is built from four pieces:
//!
//! - [`connection::ConnectionManager`]: owns at most one live transport and
//!   serializes concurrent connect attempts into one in-flight attempt
//! - [`auth::AuthStore`]: the single credential attached to every call
//! - [`GuardianClient`]: the dispatcher with one typed method per remote
//!   call, plus the consensus-start confirmation protocol
//! - [`transport`]: the seam between the dispatcher and the wire, with a
//!   `tokio-tungstenite` implementation in [`ws`]
//!
//! One `GuardianClient` is constructed by the hosting application and
//! shared by reference; connection and credential are process-wide state
//! for that instance.

#![deny(unsafe_code)]

pub mod auth;
pub mod client;
pub mod connection;
pub mod transport;
pub mod ws;

pub use auth::AuthStore;
pub use client::GuardianClient;
pub use connection::ConnectionManager;
pub use transport::{Connector, RpcFailure, Transport};
pub use ws::WsConnector;
