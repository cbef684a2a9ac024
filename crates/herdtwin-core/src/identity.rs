//! Canonical identity and mirror entities
//!
//! The durable record of which network holds the canonical token for a
//! physical entity and which networks hold mirrors. Rows are append-only:
//! nothing in this layer ever deletes an identity or a mirror.

use crate::types::{EntityId, NetworkId, TokenId, TxHash};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Tokenization state of a canonical identity.
///
/// `Untokenized -> PrimaryMinted -> CrossChain`; there is no transition
/// back. Mirror revocation is a higher-level policy outside this layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TwinState {
    /// Identity exists but no token has been minted yet
    Untokenized,
    /// Primary token minted, no mirrors
    PrimaryMinted,
    /// At least one mirror exists
    CrossChain,
}

/// One canonical identity per physical entity
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CanonicalIdentity {
    /// The physical entity this identity belongs to
    pub entity_id: EntityId,

    /// Network holding the canonical token; set when resolved or minted
    pub primary_network_id: Option<NetworkId>,

    /// Token id on the primary network; None until minted
    pub primary_token_id: Option<TokenId>,

    /// Derived: true iff at least one mirror exists
    pub is_cross_chain: bool,

    /// Last successful cross-chain sync
    pub last_sync_at: Option<DateTime<Utc>>,
}

impl CanonicalIdentity {
    /// Create an empty identity for a freshly registered entity
    pub fn new(entity_id: EntityId) -> Self {
        Self {
            entity_id,
            primary_network_id: None,
            primary_token_id: None,
            is_cross_chain: false,
            last_sync_at: None,
        }
    }

    /// Current state in the tokenization state machine
    pub fn state(&self) -> TwinState {
        if self.is_cross_chain {
            TwinState::CrossChain
        } else if self.primary_token_id.is_some() {
            TwinState::PrimaryMinted
        } else {
            TwinState::Untokenized
        }
    }
}

/// A satellite token for a canonical identity on a non-primary network
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Mirror {
    /// Entity the mirror belongs to
    pub entity_id: EntityId,

    /// Network holding the mirror; unique per (entity_id, network_id)
    pub network_id: NetworkId,

    /// Token id on the mirror network
    pub token_id: TokenId,

    /// Transaction that minted the mirror
    pub mirror_transaction_hash: TxHash,

    /// Active flag; mirrors are never deleted, only ever flagged
    pub is_active: bool,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Mirror {
    pub fn new(
        entity_id: EntityId,
        network_id: NetworkId,
        token_id: TokenId,
        mirror_transaction_hash: TxHash,
    ) -> Self {
        Self {
            entity_id,
            network_id,
            token_id,
            mirror_transaction_hash,
            is_active: true,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_machine_progression() {
        let mut identity = CanonicalIdentity::new(EntityId::new("E1"));
        assert_eq!(identity.state(), TwinState::Untokenized);

        identity.primary_network_id = Some(NetworkId::new("POLY"));
        identity.primary_token_id = Some(TokenId::new(7));
        assert_eq!(identity.state(), TwinState::PrimaryMinted);

        identity.is_cross_chain = true;
        assert_eq!(identity.state(), TwinState::CrossChain);
    }

    #[test]
    fn test_new_mirror_is_active() {
        let mirror = Mirror::new(
            EntityId::new("E1"),
            NetworkId::new("STARK"),
            TokenId::new(3),
            TxHash::new("0x01"),
        );
        assert!(mirror.is_active);
        assert_eq!(mirror.token_id.value(), 3);
    }
}
