//! Adapter factory
//!
//! Pure dispatch on the closed `ChainFamily` set; no runtime type
//! inspection. Live connections are cached per network id, keyed on the
//! network's config version so an operator config bump reconnects.

use crate::adapter::{AdapterError, ChainAdapter};
use crate::evm::EvmAdapter;
use crate::signer::OperatorKey;
use crate::starknet::StarknetAdapter;
use async_trait::async_trait;
use herdtwin_core::{ChainFamily, Network, NetworkId};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Seam the manager and service depend on instead of concrete adapters
#[async_trait]
pub trait AdapterProvider: Send + Sync {
    /// Resolve (or build) the adapter for a network
    async fn adapter_for(
        &self,
        network: &Network,
    ) -> Result<Arc<dyn ChainAdapter>, AdapterError>;
}

/// Factory building family-specific adapters with a connection cache
pub struct AdapterFactory {
    operator: OperatorKey,
    /// network id -> (config version at connect time, live adapter)
    cache: RwLock<HashMap<NetworkId, (u64, Arc<dyn ChainAdapter>)>>,
}

impl AdapterFactory {
    pub fn new(operator: OperatorKey) -> Self {
        Self {
            operator,
            cache: RwLock::new(HashMap::new()),
        }
    }

    async fn connect(&self, network: &Network) -> Result<Arc<dyn ChainAdapter>, AdapterError> {
        let adapter: Arc<dyn ChainAdapter> = match network.family {
            ChainFamily::Evm => Arc::new(
                EvmAdapter::connect(network.clone(), self.operator.clone()).await?,
            ),
            ChainFamily::Starknet => Arc::new(
                StarknetAdapter::connect(network.clone(), self.operator.clone()).await?,
            ),
        };
        Ok(adapter)
    }
}

#[async_trait]
impl AdapterProvider for AdapterFactory {
    async fn adapter_for(
        &self,
        network: &Network,
    ) -> Result<Arc<dyn ChainAdapter>, AdapterError> {
        if let Some((version, adapter)) = self.cache.read().get(&network.id) {
            if *version == network.config_version {
                return Ok(Arc::clone(adapter));
            }
        }

        let adapter = self.connect(network).await?;
        self.cache
            .write()
            .insert(network.id.clone(), (network.config_version, Arc::clone(&adapter)));
        Ok(adapter)
    }
}
