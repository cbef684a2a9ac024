//! Network registry entries
//!
//! A `Network` is one configured chain: identity, family, connection
//! parameters and an opaque config map for family-specific settings
//! (contract addresses, account addresses, entry points). The registry
//! is operator-configured and read-mostly; only `is_active` networks
//! participate in selection.

use crate::types::{NetworkId, TxHash};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Config key for the NFT contract address (EVM) or contract felt (Starknet)
pub const CONFIG_NFT_CONTRACT: &str = "nft_contract";

/// Config key for the Starknet operator account address
pub const CONFIG_ACCOUNT_ADDRESS: &str = "account_address";

/// Placeholder substituted by the transaction hash in explorer templates
pub const EXPLORER_TX_PLACEHOLDER: &str = "{tx}";

/// Chain family, a closed set of supported transaction models
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChainFamily {
    /// EVM-compatible chains (Ethereum, Polygon, ...)
    Evm,
    /// Account-based Stark-style chains (Starknet)
    Starknet,
}

impl fmt::Display for ChainFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainFamily::Evm => f.write_str("EVM"),
            ChainFamily::Starknet => f.write_str("STARKNET"),
        }
    }
}

/// A configured blockchain network
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Network {
    /// Globally unique network id
    pub id: NetworkId,

    /// Human-readable name ("Polygon Amoy")
    pub name: String,

    /// Transaction-model family
    pub family: ChainFamily,

    /// Numeric chain id (EIP-155 for EVM, felt-derived for Starknet)
    pub chain_id: u64,

    /// JSON-RPC endpoint
    pub rpc_url: String,

    /// Explorer URL template with a `{tx}` placeholder
    pub explorer_url_template: String,

    /// Native currency symbol
    pub native_currency: String,

    /// Selection priority, lower = preferred
    pub priority: u32,

    /// Only active networks participate in selection
    pub is_active: bool,

    /// Testnet flag
    pub is_testnet: bool,

    /// Family-specific settings (contract addresses etc.)
    pub config: HashMap<String, String>,

    /// Bumped whenever `config` changes; keys the adapter connection cache
    pub config_version: u64,
}

impl Network {
    pub fn is_evm(&self) -> bool {
        self.family == ChainFamily::Evm
    }

    pub fn is_starknet(&self) -> bool {
        self.family == ChainFamily::Starknet
    }

    /// Family-specific config lookup
    pub fn config_value(&self, key: &str) -> Option<&str> {
        self.config.get(key).map(String::as_str)
    }

    /// Explorer URL for a transaction on this network.
    /// The substitution contract is uniform even though the resulting
    /// URL format is family-specific.
    pub fn explorer_url(&self, tx_hash: &TxHash) -> String {
        self.explorer_url_template
            .replace(EXPLORER_TX_PLACEHOLDER, tx_hash.as_str())
    }
}
