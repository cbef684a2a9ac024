//! Error types for multichain operations

use crate::types::{EntityId, NetworkId};
use thiserror::Error;

/// Result type alias for multichain operations
pub type Result<T> = std::result::Result<T, MultichainError>;

/// Errors surfaced by the multichain layer.
///
/// Business-level chain failures (reverted transaction, insufficient gas)
/// travel inside adapter outcome envelopes and only become
/// `ChainExecution` at the service boundary; everything else here is a
/// resolution, configuration or persistence failure.
#[derive(Error, Debug, Clone)]
pub enum MultichainError {
    // === Network resolution ===
    /// Network id is not present in the registry
    #[error("Network not found: {0}")]
    NetworkNotFound(NetworkId),

    /// Network family/configuration cannot be serviced
    #[error("Unsupported network configuration for {network}: {reason}")]
    UnsupportedNetwork { network: NetworkId, reason: String },

    /// No primary network resolvable for the entity
    #[error("No primary network resolvable for entity: {0}")]
    NoPrimaryNetwork(EntityId),

    // === Adapter / chain ===
    /// Adapter could not reach its RPC endpoint
    #[error("Connection to {network} failed: {reason}")]
    Connection { network: NetworkId, reason: String },

    /// Chain accepted and rejected/reverted the transaction;
    /// carries the chain's raw error message
    #[error("Chain execution failed on {network}: {message}")]
    ChainExecution { network: NetworkId, message: String },

    /// Malformed address handed to an adapter
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    // === Workflow guards ===
    /// Entity was never registered for tokenization
    #[error("No canonical identity for entity: {0}")]
    IdentityNotFound(EntityId),

    /// Entity already carries a primary token
    #[error("Entity {0} already has a primary token")]
    AlreadyTokenized(EntityId),

    /// Mirror already exists for this (entity, network) pair
    #[error("Mirror already exists for entity {entity} on network {network}")]
    AlreadyMirrored { entity: EntityId, network: NetworkId },

    /// Target network already holds the primary role for this entity
    #[error("Network {network} holds the primary token for entity {entity}")]
    PrimaryNetworkConflict { entity: EntityId, network: NetworkId },

    // === Collaborators ===
    /// Metadata upload failed (non-fatal, triggers fallback URI)
    #[error("Metadata upload failed: {0}")]
    MetadataUpload(String),

    /// Persistent storage unavailable or rejected the operation
    #[error("Storage error: {0}")]
    Storage(String),
}

impl MultichainError {
    /// Stable machine-readable code for the caller-facing failure envelope
    pub fn code(&self) -> &'static str {
        match self {
            MultichainError::NetworkNotFound(_) => "NETWORK_NOT_FOUND",
            MultichainError::UnsupportedNetwork { .. } => "UNSUPPORTED_NETWORK",
            MultichainError::NoPrimaryNetwork(_) => "NO_PRIMARY_NETWORK",
            MultichainError::Connection { .. } => "CONNECTION_ERROR",
            MultichainError::ChainExecution { .. } => "CHAIN_EXECUTION_ERROR",
            MultichainError::InvalidAddress(_) => "INVALID_ADDRESS",
            MultichainError::IdentityNotFound(_) => "IDENTITY_NOT_FOUND",
            MultichainError::AlreadyTokenized(_) => "ALREADY_TOKENIZED",
            MultichainError::AlreadyMirrored { .. } => "ALREADY_MIRRORED",
            MultichainError::PrimaryNetworkConflict { .. } => "PRIMARY_NETWORK_CONFLICT",
            MultichainError::MetadataUpload(_) => "METADATA_UPLOAD_ERROR",
            MultichainError::Storage(_) => "STORAGE_ERROR",
        }
    }
}
