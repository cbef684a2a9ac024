//! TOML network catalog
//!
//! Operators describe the network fleet in a TOML file; the catalog
//! parses it and seeds a `MemoryNetworkStore`. Optional fields carry
//! defaults so a minimal entry only needs identity and connectivity.

use crate::registry::MemoryNetworkStore;
use herdtwin_core::{ChainFamily, Network, NetworkId};
use serde::Deserialize;
use std::collections::HashMap;

/// Parsed catalog file
#[derive(Debug, Deserialize)]
pub struct NetworkCatalog {
    #[serde(default, rename = "network")]
    pub networks: Vec<CatalogEntry>,
}

/// One `[[network]]` table in the catalog
#[derive(Debug, Deserialize)]
pub struct CatalogEntry {
    pub id: String,
    pub name: String,
    pub family: ChainFamily,
    pub chain_id: u64,
    pub rpc_url: String,
    pub explorer_url_template: String,
    pub native_currency: String,
    #[serde(default = "default_priority")]
    pub priority: u32,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_testnet: bool,
    #[serde(default)]
    pub config: HashMap<String, String>,
    #[serde(default)]
    pub config_version: u64,
}

fn default_priority() -> u32 {
    100
}

fn default_true() -> bool {
    true
}

impl From<CatalogEntry> for Network {
    fn from(entry: CatalogEntry) -> Self {
        Network {
            id: NetworkId::new(entry.id),
            name: entry.name,
            family: entry.family,
            chain_id: entry.chain_id,
            rpc_url: entry.rpc_url,
            explorer_url_template: entry.explorer_url_template,
            native_currency: entry.native_currency,
            priority: entry.priority,
            is_active: entry.is_active,
            is_testnet: entry.is_testnet,
            config: entry.config,
            config_version: entry.config_version,
        }
    }
}

impl NetworkCatalog {
    /// Parse a catalog from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Seed an in-memory network store from the catalog
    pub fn into_store(self) -> MemoryNetworkStore {
        let store = MemoryNetworkStore::new();
        for entry in self.networks {
            store.upsert(entry.into());
        }
        store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::NetworkStore;
    use herdtwin_core::CONFIG_NFT_CONTRACT;

    const CATALOG: &str = r#"
[[network]]
id = "POLYGON_AMOY"
name = "Polygon Amoy"
family = "EVM"
chain_id = 80002
rpc_url = "https://rpc-amoy.polygon.technology"
explorer_url_template = "https://amoy.polygonscan.com/tx/{tx}"
native_currency = "POL"
priority = 1
is_testnet = true

[network.config]
nft_contract = "0x00000000000000000000000000000000000000ab"

[[network]]
id = "STARKNET_SEPOLIA"
name = "Starknet Sepolia"
family = "STARKNET"
chain_id = 393402133025997798
rpc_url = "https://starknet-sepolia.example/rpc/v0_7"
explorer_url_template = "https://sepolia.starkscan.co/tx/{tx}"
native_currency = "STRK"
"#;

    #[test]
    fn test_parse_catalog() {
        let catalog = NetworkCatalog::from_toml_str(CATALOG).unwrap();
        assert_eq!(catalog.networks.len(), 2);

        let amoy = &catalog.networks[0];
        assert_eq!(amoy.family, ChainFamily::Evm);
        assert_eq!(amoy.priority, 1);
        assert!(amoy.is_testnet);
        assert_eq!(
            amoy.config.get(CONFIG_NFT_CONTRACT).map(String::as_str),
            Some("0x00000000000000000000000000000000000000ab")
        );

        // Optional fields fall back to defaults
        let stark = &catalog.networks[1];
        assert_eq!(stark.priority, 100);
        assert!(stark.is_active);
        assert!(!stark.is_testnet);
        assert_eq!(stark.config_version, 0);
    }

    #[test]
    fn test_catalog_seeds_store() {
        let store = NetworkCatalog::from_toml_str(CATALOG).unwrap().into_store();
        let active = store.find_active(None).unwrap();
        assert_eq!(active.len(), 2);
        assert_eq!(active[0].id.as_str(), "POLYGON_AMOY");
    }

    #[test]
    fn test_empty_catalog() {
        let catalog = NetworkCatalog::from_toml_str("").unwrap();
        assert!(catalog.networks.is_empty());
    }
}
