//! Multichain NFT service
//!
//! Sole writer of canonical identity and mirror rows. The mint-then-
//! mirror workflow lives here:
//!
//! - `register` mints the primary token for a livestock record
//! - `mirror` mints a satellite token on another network
//! - `multichain_info` reports the entity's cross-chain footprint
//!
//! Submitted transaction hashes are logged before any store write so a
//! crash between submission and persistence leaves a reconciliation
//! trail (at-least-once, never silently lost).

use crate::manager::MultichainManager;
use crate::metadata_store::{fallback_uri, MetadataStore};
use herdtwin_chains::MintOutcome;
use herdtwin_core::{
    EntityId, LivestockRecord, MetadataUri, MultichainError, Network, NetworkId, TokenId,
    TokenMetadata, TwinState, TxHash,
};
use herdtwin_store::{AuditEvent, AuditEventType, AuditSink, ConsistencyStore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Result of a successful primary or mirror mint
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MintReceipt {
    pub entity_id: EntityId,
    pub network_id: NetworkId,
    pub token_id: TokenId,
    pub transaction_hash: TxHash,
    pub metadata_uri: MetadataUri,
    pub explorer_url: String,
}

/// One mirror row in the info view
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MirrorInfo {
    pub network_id: NetworkId,
    pub token_id: TokenId,
    pub transaction_hash: TxHash,
    /// Explorer link; None when the network left the registry
    pub explorer_url: Option<String>,
}

/// Cross-chain footprint of one entity
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MultichainInfo {
    pub entity_id: EntityId,
    pub state: TwinState,
    pub primary_network_id: Option<NetworkId>,
    pub primary_token_id: Option<TokenId>,
    pub is_cross_chain: bool,
    pub mirrors: Vec<MirrorInfo>,
}

/// Orchestrates the mint-then-mirror lifecycle for livestock records
pub struct MultichainNftService {
    manager: Arc<MultichainManager>,
    consistency: Arc<dyn ConsistencyStore>,
    metadata: Arc<dyn MetadataStore>,
    audit: Arc<dyn AuditSink>,
    /// Public site base for external_url/image links
    external_base: String,
    /// Gateway base for the content-hashed fallback metadata URI
    fallback_base: String,
}

impl MultichainNftService {
    pub fn new(
        manager: Arc<MultichainManager>,
        consistency: Arc<dyn ConsistencyStore>,
        metadata: Arc<dyn MetadataStore>,
        audit: Arc<dyn AuditSink>,
        external_base: impl Into<String>,
        fallback_base: impl Into<String>,
    ) -> Self {
        Self {
            manager,
            consistency,
            metadata,
            audit,
            external_base: external_base.into(),
            fallback_base: fallback_base.into(),
        }
    }

    /// Mint the primary token for a record.
    ///
    /// Primary network resolution order: explicit argument, then the
    /// identity's stored primary, then the registry's highest-priority
    /// active network.
    pub async fn register(
        &self,
        record: &LivestockRecord,
        network_id: Option<&NetworkId>,
    ) -> Result<MintReceipt, MultichainError> {
        let identity = self.consistency.ensure_identity(&record.entity_id)?;
        if identity.primary_token_id.is_some() {
            return Err(MultichainError::AlreadyTokenized(record.entity_id.clone()));
        }

        let network = self.resolve_network(
            &record.entity_id,
            network_id.or(identity.primary_network_id.as_ref()),
        )?;

        let metadata_uri = self.metadata_uri(record).await?;

        match self
            .manager
            .mint_on(&network, &record.owner_wallet, &metadata_uri)
            .await?
        {
            MintOutcome::Minted {
                transaction_hash,
                token_id,
            } => {
                // Log before the store write; the hash must survive a
                // crash between submission and persistence
                tracing::info!(
                    entity = %record.entity_id,
                    network = %network.id,
                    tx = %transaction_hash,
                    token = %token_id,
                    "primary mint submitted"
                );

                self.consistency
                    .record_primary_mint(&record.entity_id, &network.id, token_id)?;
                self.audit.record(AuditEvent::new(
                    record.entity_id.clone(),
                    AuditEventType::PrimaryMinted,
                    network.id.clone(),
                    Some(transaction_hash.clone()),
                    format!("minted token {} on {}", token_id, network.id),
                ));

                Ok(self.receipt(record, &network, token_id, transaction_hash, metadata_uri))
            }
            MintOutcome::Rejected { error } => {
                tracing::warn!(
                    entity = %record.entity_id,
                    network = %network.id,
                    error = %error,
                    "primary mint rejected"
                );
                self.audit.record(AuditEvent::new(
                    record.entity_id.clone(),
                    AuditEventType::MintFailed,
                    network.id.clone(),
                    None,
                    error.clone(),
                ));
                Err(MultichainError::ChainExecution {
                    network: network.id,
                    message: error,
                })
            }
        }
    }

    /// Mint a mirror of an already-registered entity on another network.
    ///
    /// Idempotent per (entity, network): a second call for the same pair
    /// returns `AlreadyMirrored` without touching the chain.
    pub async fn mirror(
        &self,
        record: &LivestockRecord,
        network_id: &NetworkId,
    ) -> Result<MintReceipt, MultichainError> {
        let identity = self.consistency.identity(&record.entity_id)?;

        // Guards run before any chain traffic
        if identity.primary_token_id.is_none() {
            return Err(MultichainError::NoPrimaryNetwork(record.entity_id.clone()));
        }
        if identity.primary_network_id.as_ref() == Some(network_id) {
            return Err(MultichainError::PrimaryNetworkConflict {
                entity: record.entity_id.clone(),
                network: network_id.clone(),
            });
        }
        if self.consistency.has_mirror(&record.entity_id, network_id)? {
            return Err(MultichainError::AlreadyMirrored {
                entity: record.entity_id.clone(),
                network: network_id.clone(),
            });
        }

        let network = self.manager.network(network_id)?;

        // Same content on every chain: the URI is re-derived, not stored
        let metadata_uri = self.metadata_uri(record).await?;

        match self
            .manager
            .mint_on(&network, &record.owner_wallet, &metadata_uri)
            .await?
        {
            MintOutcome::Minted {
                transaction_hash,
                token_id,
            } => {
                tracing::info!(
                    entity = %record.entity_id,
                    network = %network.id,
                    tx = %transaction_hash,
                    token = %token_id,
                    "mirror mint submitted"
                );

                self.consistency.record_mirror(
                    &record.entity_id,
                    &network.id,
                    token_id,
                    transaction_hash.clone(),
                )?;
                self.audit.record(AuditEvent::new(
                    record.entity_id.clone(),
                    AuditEventType::Mirrored,
                    network.id.clone(),
                    Some(transaction_hash.clone()),
                    format!("mirrored as token {} on {}", token_id, network.id),
                ));

                Ok(self.receipt(record, &network, token_id, transaction_hash, metadata_uri))
            }
            MintOutcome::Rejected { error } => {
                tracing::warn!(
                    entity = %record.entity_id,
                    network = %network.id,
                    error = %error,
                    "mirror mint rejected"
                );
                self.audit.record(AuditEvent::new(
                    record.entity_id.clone(),
                    AuditEventType::MirrorFailed,
                    network.id.clone(),
                    None,
                    error.clone(),
                ));
                Err(MultichainError::ChainExecution {
                    network: network.id,
                    message: error,
                })
            }
        }
    }

    /// Cross-chain footprint of one entity
    pub fn multichain_info(&self, entity: &EntityId) -> Result<MultichainInfo, MultichainError> {
        let identity = self.consistency.identity(entity)?;
        let mirrors = self
            .consistency
            .mirrors(entity)?
            .into_iter()
            .map(|m| {
                let explorer_url = self
                    .manager
                    .network(&m.network_id)
                    .map(|n| n.explorer_url(&m.mirror_transaction_hash))
                    .ok();
                MirrorInfo {
                    network_id: m.network_id,
                    token_id: m.token_id,
                    transaction_hash: m.mirror_transaction_hash,
                    explorer_url,
                }
            })
            .collect();

        Ok(MultichainInfo {
            entity_id: identity.entity_id.clone(),
            state: identity.state(),
            primary_network_id: identity.primary_network_id.clone(),
            primary_token_id: identity.primary_token_id,
            is_cross_chain: identity.is_cross_chain,
            mirrors,
        })
    }

    fn resolve_network(
        &self,
        entity: &EntityId,
        explicit: Option<&NetworkId>,
    ) -> Result<Network, MultichainError> {
        match explicit {
            Some(id) => self.manager.network(id),
            None => self
                .manager
                .primary(None)
                .ok_or_else(|| MultichainError::NoPrimaryNetwork(entity.clone())),
        }
    }

    /// Upload the document; on failure degrade to the deterministic
    /// content-hashed fallback instead of aborting the mint
    async fn metadata_uri(
        &self,
        record: &LivestockRecord,
    ) -> Result<MetadataUri, MultichainError> {
        let metadata = TokenMetadata::from_record(record, &self.external_base);
        match self.metadata.upload(&metadata).await {
            Ok(uri) => Ok(uri),
            Err(e) => {
                tracing::warn!(
                    entity = %record.entity_id,
                    error = %e,
                    "metadata upload failed, using fallback URI"
                );
                fallback_uri(&metadata, &self.fallback_base)
            }
        }
    }

    fn receipt(
        &self,
        record: &LivestockRecord,
        network: &Network,
        token_id: TokenId,
        transaction_hash: TxHash,
        metadata_uri: MetadataUri,
    ) -> MintReceipt {
        let explorer_url = network.explorer_url(&transaction_hash);
        MintReceipt {
            entity_id: record.entity_id.clone(),
            network_id: network.id.clone(),
            token_id,
            transaction_hash,
            metadata_uri,
            explorer_url,
        }
    }
}
