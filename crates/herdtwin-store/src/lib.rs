//! # Herdtwin Store
//!
//! Durable-state layer for the multichain subsystem:
//!
//! - `registry` - network registry with a read-through cache and a
//!   pluggable `NetworkStore` backend
//! - `catalog` - operator-provided TOML network catalog
//! - `consistency` - the cross-chain consistency store: which network
//!   holds the canonical identity, which hold mirrors
//! - `audit` - append-only sink of blockchain events for reconciliation
//!   and reporting
//!
//! In-memory backends ship here; a relational backend drops in behind
//! the same traits.

pub mod audit;
pub mod catalog;
pub mod consistency;
pub mod registry;

pub use audit::{AuditEvent, AuditEventType, AuditSink, MemoryAuditSink};
pub use catalog::NetworkCatalog;
pub use consistency::{ConsistencyStore, MemoryConsistencyStore};
pub use registry::{MemoryNetworkStore, NetworkRegistry, NetworkStore, StorageError};
