//! # Herdtwin Core
//!
//! Core domain types for the Herdtwin multichain layer. Every physical
//! livestock record gets a digital twin (an NFT) whose existence and
//! identity must stay consistent across independent, mutually-unaware
//! blockchains.
//!
//! This crate provides the fundamental building blocks:
//! - `Network` - a configured chain (EVM or Starknet family)
//! - `CanonicalIdentity` - the durable link between one physical entity
//!   and its primary token
//! - `Mirror` - a satellite token for the same entity on a non-primary chain
//! - `LivestockRecord` - the inbound domain object supplied by the CRUD layer
//! - `TokenMetadata` - the NFT metadata document shared by all chains
//!
//! ## Identity model
//!
//! ```text
//!          ┌───────────────────────────────────────────┐
//!          │            CANONICAL IDENTITY             │
//!          │                                           │
//!          │   entity E ──► primary token on POLY      │
//!          │                  │                        │
//!          │                  ├──► mirror on STARK     │
//!          │                  └──► mirror on ETH       │
//!          └───────────────────────────────────────────┘
//! ```
//!
//! One physical animal, one canonical identity, N mirrors. Mirrors are
//! never retracted by this layer.

pub mod error;
pub mod identity;
pub mod metadata;
pub mod network;
pub mod record;
pub mod types;

pub use error::*;
pub use identity::*;
pub use metadata::*;
pub use network::*;
pub use record::*;
pub use types::*;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{MultichainError, Result};
    pub use crate::identity::{CanonicalIdentity, Mirror, TwinState};
    pub use crate::metadata::{TokenAttribute, TokenMetadata};
    pub use crate::network::{ChainFamily, Network};
    pub use crate::record::LivestockRecord;
    pub use crate::types::*;
}
