//! Multichain manager
//!
//! Thin orchestration over the registry and the adapter provider:
//! resolve a network, get its adapter, run one operation. The manager
//! is agnostic to primary/mirror roles; `mint_across_networks` is the
//! only parallelization point in the subsystem and bounds its fan-out
//! with a semaphore as rate-limit courtesy toward RPC providers.

use herdtwin_chains::{AdapterProvider, MintOutcome};
use herdtwin_core::{
    ChainFamily, MetadataUri, MultichainError, Network, NetworkId, TokenId, TxHash, WalletAddress,
};
use herdtwin_store::NetworkRegistry;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Concurrent mint submissions allowed in one fan-out
const DEFAULT_MINT_CONCURRENCY: usize = 4;

/// Networks targeted when the caller does not name any
const DEFAULT_FANOUT_WIDTH: usize = 2;

/// Per-network result of a fan-out mint
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum NetworkMintResult {
    Minted {
        transaction_hash: TxHash,
        token_id: TokenId,
    },
    Failed {
        error: String,
    },
}

impl NetworkMintResult {
    pub fn is_minted(&self) -> bool {
        matches!(self, NetworkMintResult::Minted { .. })
    }
}

/// Orchestrates adapter operations across the configured network fleet
pub struct MultichainManager {
    registry: Arc<NetworkRegistry>,
    adapters: Arc<dyn AdapterProvider>,
    mint_concurrency: usize,
}

impl MultichainManager {
    pub fn new(registry: Arc<NetworkRegistry>, adapters: Arc<dyn AdapterProvider>) -> Self {
        Self {
            registry,
            adapters,
            mint_concurrency: DEFAULT_MINT_CONCURRENCY,
        }
    }

    /// Override the fan-out bound
    pub fn with_mint_concurrency(mut self, limit: usize) -> Self {
        self.mint_concurrency = limit.max(1);
        self
    }

    /// Resolve one network from the registry
    pub fn network(&self, id: &NetworkId) -> Result<Network, MultichainError> {
        self.registry.get(id)
    }

    /// Highest-priority active network, optionally per family
    pub fn primary(&self, family: Option<ChainFamily>) -> Option<Network> {
        self.registry.primary(family)
    }

    /// Active networks ordered by priority
    pub fn active_networks(&self, family: Option<ChainFamily>) -> Vec<Network> {
        self.registry.list_active(family)
    }

    /// Mint on one resolved network
    pub async fn mint_on(
        &self,
        network: &Network,
        to: &WalletAddress,
        metadata_uri: &MetadataUri,
    ) -> Result<MintOutcome, MultichainError> {
        let adapter = self.adapters.adapter_for(network).await?;
        Ok(adapter.mint_nft(metadata_uri, to).await?)
    }

    /// Mint the same token content on several networks in parallel.
    ///
    /// One independent task per network; a failure on one network never
    /// cancels the others. Results are collected by network id. When
    /// `networks` is `None`, the two highest-priority active networks
    /// are targeted.
    pub async fn mint_across_networks(
        &self,
        to: &WalletAddress,
        metadata_uri: &MetadataUri,
        networks: Option<&[NetworkId]>,
    ) -> HashMap<NetworkId, NetworkMintResult> {
        let mut results = HashMap::new();

        let targets: Vec<Network> = match networks {
            Some(ids) => {
                let mut resolved = Vec::new();
                for id in ids {
                    match self.registry.get(id) {
                        Ok(network) => resolved.push(network),
                        Err(e) => {
                            results.insert(
                                id.clone(),
                                NetworkMintResult::Failed {
                                    error: e.to_string(),
                                },
                            );
                        }
                    }
                }
                resolved
            }
            None => self
                .registry
                .list_active(None)
                .into_iter()
                .take(DEFAULT_FANOUT_WIDTH)
                .collect(),
        };

        let semaphore = Arc::new(Semaphore::new(self.mint_concurrency));
        let mut handles = Vec::with_capacity(targets.len());

        for network in targets {
            let semaphore = Arc::clone(&semaphore);
            let adapters = Arc::clone(&self.adapters);
            let to = to.clone();
            let metadata_uri = metadata_uri.clone();

            handles.push(tokio::spawn(async move {
                // Closed semaphore is unreachable; treat it as a failed slot
                let _permit = match semaphore.acquire().await {
                    Ok(permit) => permit,
                    Err(e) => {
                        return (
                            network.id.clone(),
                            NetworkMintResult::Failed {
                                error: e.to_string(),
                            },
                        );
                    }
                };

                let result = match adapters.adapter_for(&network).await {
                    Ok(adapter) => match adapter.mint_nft(&metadata_uri, &to).await {
                        Ok(MintOutcome::Minted {
                            transaction_hash,
                            token_id,
                        }) => NetworkMintResult::Minted {
                            transaction_hash,
                            token_id,
                        },
                        Ok(MintOutcome::Rejected { error }) => {
                            NetworkMintResult::Failed { error }
                        }
                        Err(e) => NetworkMintResult::Failed {
                            error: e.to_string(),
                        },
                    },
                    Err(e) => NetworkMintResult::Failed {
                        error: e.to_string(),
                    },
                };

                (network.id, result)
            }));
        }

        for joined in futures::future::join_all(handles).await {
            match joined {
                Ok((id, result)) => {
                    if let NetworkMintResult::Failed { error } = &result {
                        tracing::warn!(network = %id, error = %error, "fan-out mint failed");
                    }
                    results.insert(id, result);
                }
                Err(e) => {
                    tracing::error!(error = %e, "fan-out mint task aborted");
                }
            }
        }

        results
    }
}
