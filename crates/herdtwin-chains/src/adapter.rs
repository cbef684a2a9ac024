//! Chain adapter trait and outcome envelopes

use async_trait::async_trait;
use herdtwin_core::{MetadataUri, MultichainError, NetworkId, TokenId, TxHash, WalletAddress};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors for programmer/configuration mistakes only.
///
/// A reverted or rejected transaction is not an `AdapterError`; it is a
/// `Rejected` outcome.
#[derive(Error, Debug, Clone)]
pub enum AdapterError {
    /// RPC endpoint unreachable at construction time; not retried here
    #[error("Connection to {network} failed: {reason}")]
    Connection { network: NetworkId, reason: String },

    /// Missing or inconsistent network configuration
    #[error("Configuration error for {network}: {reason}")]
    Config { network: NetworkId, reason: String },

    /// Malformed address handed in by the caller
    #[error("Invalid address: {0}")]
    InvalidAddress(String),
}

impl From<AdapterError> for MultichainError {
    fn from(err: AdapterError) -> Self {
        match err {
            AdapterError::Connection { network, reason } => {
                MultichainError::Connection { network, reason }
            }
            AdapterError::Config { network, reason } => {
                MultichainError::UnsupportedNetwork { network, reason }
            }
            AdapterError::InvalidAddress(addr) => MultichainError::InvalidAddress(addr),
        }
    }
}

/// Result of a mint submission.
///
/// `Minted` means the provider accepted the raw transaction, not that it
/// was mined; confirmation is a separate explicit wait step.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum MintOutcome {
    Minted {
        transaction_hash: TxHash,
        token_id: TokenId,
    },
    Rejected {
        error: String,
    },
}

/// Result of a transfer submission
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum TransferOutcome {
    Transferred { transaction_hash: TxHash },
    Rejected { error: String },
}

/// Result of an NFT state query
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum NftInfoOutcome {
    Found { owner: String, token_uri: String },
    Rejected { error: String },
}

/// Uniform operations every chain family must implement.
///
/// Each call is a single blocking network round-trip with no internal
/// retry or cancellation; callers bound it with their own timeout. All
/// monetary/gas quantities inside implementations are integers in the
/// chain's smallest unit.
#[async_trait]
pub trait ChainAdapter: Send + Sync {
    /// Id of the network this adapter is connected to
    fn network_id(&self) -> &NetworkId;

    /// Mint a token carrying `metadata_uri` to `to_address`
    async fn mint_nft(
        &self,
        metadata_uri: &MetadataUri,
        to_address: &WalletAddress,
    ) -> Result<MintOutcome, AdapterError>;

    /// Transfer an already-minted token
    async fn transfer_nft(
        &self,
        token_id: TokenId,
        to_address: &WalletAddress,
    ) -> Result<TransferOutcome, AdapterError>;

    /// Query owner and token URI for a token
    async fn nft_info(&self, token_id: TokenId) -> Result<NftInfoOutcome, AdapterError>;
}
