//! Network registry
//!
//! Single source of truth for which chains exist and how to reach them.
//! The registry reads through an in-memory cache loaded at most once by
//! a double-checked `ensure_loaded`; a storage layer that is not ready
//! yet (startup before migrations) degrades to an empty result set with
//! a warning instead of crashing the process, and the next call retries.

use herdtwin_core::{ChainFamily, MultichainError, Network, NetworkId};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Backend storage failures
#[derive(Error, Debug, Clone)]
pub enum StorageError {
    /// Storage exists but cannot serve queries yet
    #[error("storage not ready: {0}")]
    NotReady(String),

    /// Query failed outright
    #[error("storage query failed: {0}")]
    Query(String),
}

/// Backend the registry loads from; read-mostly, operator-configured
pub trait NetworkStore: Send + Sync {
    /// All configured networks, active or not
    fn load_all(&self) -> Result<Vec<Network>, StorageError>;

    /// Active networks only, optionally narrowed to one family.
    /// Used as the direct-query fallback when the cache never loaded.
    fn find_active(&self, family: Option<ChainFamily>) -> Result<Vec<Network>, StorageError>;
}

/// Simple in-memory network store
pub struct MemoryNetworkStore {
    networks: RwLock<HashMap<NetworkId, Network>>,
}

impl MemoryNetworkStore {
    pub fn new() -> Self {
        Self {
            networks: RwLock::new(HashMap::new()),
        }
    }

    /// Insert or replace a network definition
    pub fn upsert(&self, network: Network) {
        self.networks.write().insert(network.id.clone(), network);
    }
}

impl Default for MemoryNetworkStore {
    fn default() -> Self {
        Self::new()
    }
}

impl NetworkStore for MemoryNetworkStore {
    fn load_all(&self) -> Result<Vec<Network>, StorageError> {
        Ok(self.networks.read().values().cloned().collect())
    }

    fn find_active(&self, family: Option<ChainFamily>) -> Result<Vec<Network>, StorageError> {
        let mut networks: Vec<Network> = self
            .networks
            .read()
            .values()
            .filter(|n| n.is_active && family.map_or(true, |f| n.family == f))
            .cloned()
            .collect();
        sort_by_priority(&mut networks);
        Ok(networks)
    }
}

fn sort_by_priority(networks: &mut [Network]) {
    networks.sort_by(|a, b| (a.priority, &a.id).cmp(&(b.priority, &b.id)));
}

/// Read-through registry over a `NetworkStore`
pub struct NetworkRegistry {
    store: Arc<dyn NetworkStore>,
    /// None until the first successful load
    cache: RwLock<Option<HashMap<NetworkId, Network>>>,
}

impl NetworkRegistry {
    pub fn new(store: Arc<dyn NetworkStore>) -> Self {
        Self {
            store,
            cache: RwLock::new(None),
        }
    }

    /// Idempotent lazy load. Many readers, one loader: the fast path is
    /// a read lock, the slow path re-checks under the write lock.
    pub fn ensure_loaded(&self) {
        if self.cache.read().is_some() {
            return;
        }
        let mut cache = self.cache.write();
        if cache.is_some() {
            return;
        }
        match self.store.load_all() {
            Ok(networks) => {
                tracing::info!(count = networks.len(), "network registry loaded");
                *cache = Some(networks.into_iter().map(|n| (n.id.clone(), n)).collect());
            }
            Err(e) => {
                // Leave the cache unloaded so a later call retries
                tracing::warn!(error = %e, "network registry load failed, degrading to empty");
            }
        }
    }

    /// Whether a load has succeeded yet
    pub fn is_loaded(&self) -> bool {
        self.cache.read().is_some()
    }

    /// Look up one network by id
    pub fn get(&self, id: &NetworkId) -> Result<Network, MultichainError> {
        self.ensure_loaded();
        self.cache
            .read()
            .as_ref()
            .and_then(|networks| networks.get(id).cloned())
            .ok_or_else(|| MultichainError::NetworkNotFound(id.clone()))
    }

    /// Active networks ordered by priority ascending, then id
    pub fn list_active(&self, family: Option<ChainFamily>) -> Vec<Network> {
        self.ensure_loaded();
        let mut networks: Vec<Network> = self
            .cache
            .read()
            .as_ref()
            .map(|cached| {
                cached
                    .values()
                    .filter(|n| n.is_active && family.map_or(true, |f| n.family == f))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        sort_by_priority(&mut networks);
        networks
    }

    /// Highest-priority active network. When the cache never populated,
    /// a direct store query is attempted before giving up.
    pub fn primary(&self, family: Option<ChainFamily>) -> Option<Network> {
        self.ensure_loaded();

        if !self.is_loaded() {
            return match self.store.find_active(family) {
                Ok(networks) => networks.into_iter().next(),
                Err(e) => {
                    tracing::warn!(error = %e, "primary network fallback query failed");
                    None
                }
            };
        }

        self.list_active(family).into_iter().next()
    }
}
