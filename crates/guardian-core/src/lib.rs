//! # guardian-core
//!
//! Shared vocabulary for the guardian admin client.
//!
//! This crate provides the types every other guardian crate depends on:
//!
//! - **Server status**: [`ServerStatus`], [`StatusResponse`] as reported by the peer
//! - **Setup phases**: [`SetupProgress`] ordered enumeration with adjacent navigation
//! - **Client config**: [`ClientConfig`], [`ModuleKind`], config-gen parameter types
//! - **RPC methods**: method name constants grouped by access level
//! - **Errors**: [`ApiError`] hierarchy via `thiserror`, wire-format [`RpcError`]

#![deny(unsafe_code)]

pub mod config;
pub mod errors;
pub mod methods;
pub mod setup;
pub mod status;

pub use config::{
    AuditSummary, ClientConfig, ConfigGenConnectionsRequest, ConfigGenParams, ConsensusState,
    ModuleConfig, ModuleKind, ModuleSummary, ModulesConfigResponse, PeerHashMap, Versions,
};
pub use errors::{ApiError, Result, RpcError};
pub use setup::SetupProgress;
pub use status::{FederationStatus, PeerConnectionStatus, ServerStatus, StatusResponse};
