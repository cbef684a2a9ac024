//! Cross-chain consistency store
//!
//! Durable truth about which entity is tokenized where. Every write is
//! atomic over the entity's row: a mirror insert and the derived
//! `is_cross_chain` / `last_sync_at` flags change together or not at all.

use chrono::Utc;
use herdtwin_core::{CanonicalIdentity, EntityId, Mirror, MultichainError, NetworkId, TokenId, TxHash};
use parking_lot::RwLock;
use std::collections::HashMap;

/// Persistence seam for canonical identities and mirrors
pub trait ConsistencyStore: Send + Sync {
    /// Create the identity row if absent; idempotent
    fn ensure_identity(&self, entity: &EntityId) -> Result<CanonicalIdentity, MultichainError>;

    /// Fetch the identity, or `IdentityNotFound`
    fn identity(&self, entity: &EntityId) -> Result<CanonicalIdentity, MultichainError>;

    /// Record the primary mint. Rejects with `AlreadyTokenized` when a
    /// primary token is already on file.
    fn record_primary_mint(
        &self,
        entity: &EntityId,
        network: &NetworkId,
        token_id: TokenId,
    ) -> Result<CanonicalIdentity, MultichainError>;

    /// Record a mirror mint. Enforces (entity, network) uniqueness and
    /// refuses the primary network; flips `is_cross_chain` and stamps
    /// `last_sync_at` in the same write.
    fn record_mirror(
        &self,
        entity: &EntityId,
        network: &NetworkId,
        token_id: TokenId,
        transaction_hash: TxHash,
    ) -> Result<Mirror, MultichainError>;

    /// All mirrors for the entity, in insertion order
    fn mirrors(&self, entity: &EntityId) -> Result<Vec<Mirror>, MultichainError>;

    /// Whether an active mirror exists on the given network
    fn has_mirror(&self, entity: &EntityId, network: &NetworkId) -> Result<bool, MultichainError>;
}

struct EntityRow {
    identity: CanonicalIdentity,
    mirrors: Vec<Mirror>,
}

/// In-memory consistency store; one lock over the whole table so each
/// operation sees and writes a consistent row
pub struct MemoryConsistencyStore {
    rows: RwLock<HashMap<EntityId, EntityRow>>,
}

impl MemoryConsistencyStore {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryConsistencyStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsistencyStore for MemoryConsistencyStore {
    fn ensure_identity(&self, entity: &EntityId) -> Result<CanonicalIdentity, MultichainError> {
        let mut rows = self.rows.write();
        let row = rows.entry(entity.clone()).or_insert_with(|| EntityRow {
            identity: CanonicalIdentity::new(entity.clone()),
            mirrors: Vec::new(),
        });
        Ok(row.identity.clone())
    }

    fn identity(&self, entity: &EntityId) -> Result<CanonicalIdentity, MultichainError> {
        self.rows
            .read()
            .get(entity)
            .map(|row| row.identity.clone())
            .ok_or_else(|| MultichainError::IdentityNotFound(entity.clone()))
    }

    fn record_primary_mint(
        &self,
        entity: &EntityId,
        network: &NetworkId,
        token_id: TokenId,
    ) -> Result<CanonicalIdentity, MultichainError> {
        let mut rows = self.rows.write();
        let row = rows
            .get_mut(entity)
            .ok_or_else(|| MultichainError::IdentityNotFound(entity.clone()))?;

        if row.identity.primary_token_id.is_some() {
            return Err(MultichainError::AlreadyTokenized(entity.clone()));
        }

        row.identity.primary_network_id = Some(network.clone());
        row.identity.primary_token_id = Some(token_id);
        Ok(row.identity.clone())
    }

    fn record_mirror(
        &self,
        entity: &EntityId,
        network: &NetworkId,
        token_id: TokenId,
        transaction_hash: TxHash,
    ) -> Result<Mirror, MultichainError> {
        let mut rows = self.rows.write();
        let row = rows
            .get_mut(entity)
            .ok_or_else(|| MultichainError::IdentityNotFound(entity.clone()))?;

        if row.identity.primary_token_id.is_none() {
            return Err(MultichainError::NoPrimaryNetwork(entity.clone()));
        }
        if row.identity.primary_network_id.as_ref() == Some(network) {
            return Err(MultichainError::PrimaryNetworkConflict {
                entity: entity.clone(),
                network: network.clone(),
            });
        }
        if row.mirrors.iter().any(|m| &m.network_id == network) {
            return Err(MultichainError::AlreadyMirrored {
                entity: entity.clone(),
                network: network.clone(),
            });
        }

        let mirror = Mirror::new(entity.clone(), network.clone(), token_id, transaction_hash);
        row.mirrors.push(mirror.clone());
        row.identity.is_cross_chain = true;
        row.identity.last_sync_at = Some(Utc::now());
        Ok(mirror)
    }

    fn mirrors(&self, entity: &EntityId) -> Result<Vec<Mirror>, MultichainError> {
        Ok(self
            .rows
            .read()
            .get(entity)
            .map(|row| row.mirrors.clone())
            .unwrap_or_default())
    }

    fn has_mirror(&self, entity: &EntityId, network: &NetworkId) -> Result<bool, MultichainError> {
        Ok(self
            .rows
            .read()
            .get(entity)
            .map(|row| {
                row.mirrors
                    .iter()
                    .any(|m| &m.network_id == network && m.is_active)
            })
            .unwrap_or(false))
    }
}
