//! # Herdtwin Multichain
//!
//! Top-level orchestration for digital-twin NFTs:
//!
//! - `manager` - resolves networks and fans mint submissions out across
//!   the fleet with bounded concurrency
//! - `metadata_store` - pins token metadata to content-addressed
//!   storage with a deterministic fallback URI
//! - `service` - the mint-then-mirror workflow, sole writer of
//!   canonical identity and mirror rows
//!
//! Wiring order: a `NetworkRegistry` and an `AdapterProvider` build a
//! `MultichainManager`; the manager plus a `ConsistencyStore`, a
//! `MetadataStore` and an `AuditSink` build the `MultichainNftService`.

pub mod manager;
pub mod metadata_store;
pub mod service;

pub use manager::{MultichainManager, NetworkMintResult};
pub use metadata_store::{fallback_uri, MetadataStore, PinataClient, PinataConfig};
pub use service::{MintReceipt, MirrorInfo, MultichainInfo, MultichainNftService};
