//! EVM-family adapter
//!
//! Drives a fixed ERC-721-style minting contract over JSON-RPC. Every
//! submission is synchronous up to provider acceptance of the raw
//! transaction; mining confirmation is the separate `wait_for_receipt`
//! step the caller may invoke.

use crate::abi;
use crate::adapter::{
    AdapterError, ChainAdapter, MintOutcome, NftInfoOutcome, TransferOutcome,
};
use crate::rpc::{parse_hex_quantity, JsonRpcClient, RpcError};
use crate::signer::OperatorKey;
use async_trait::async_trait;
use herdtwin_core::{
    MetadataUri, Network, NetworkId, TokenId, TxHash, WalletAddress, CONFIG_NFT_CONTRACT,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;

/// Gas limit for mint and transfer submissions, in gas units
const GAS_LIMIT: u64 = 300_000;

/// Unsigned EVM transaction body, the payload the operator key signs
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EvmTransaction {
    pub nonce: u64,
    /// Gas price in wei
    pub gas_price: u128,
    pub gas_limit: u64,
    pub to: String,
    /// Value in wei
    pub value: u128,
    /// Calldata, 0x-prefixed hex
    pub data: String,
    /// EIP-155 chain id
    pub chain_id: u64,
}

/// Mined-transaction receipt subset the workflow cares about
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EvmReceipt {
    pub transaction_hash: TxHash,
    pub block_number: u64,
    /// true when the transaction executed without revert
    pub succeeded: bool,
}

/// Adapter for EVM-compatible networks
pub struct EvmAdapter {
    network: Network,
    rpc: JsonRpcClient,
    operator: OperatorKey,
    contract: [u8; 20],
}

impl EvmAdapter {
    /// Establish the adapter, probing the endpoint once.
    /// Fails if the endpoint is unreachable or reports a different
    /// chain id than the registry entry; no retry at this layer.
    pub async fn connect(network: Network, operator: OperatorKey) -> Result<Self, AdapterError> {
        let contract_hex = network
            .config_value(CONFIG_NFT_CONTRACT)
            .ok_or_else(|| AdapterError::Config {
                network: network.id.clone(),
                reason: format!("missing {CONFIG_NFT_CONTRACT} in network config"),
            })?
            .to_string();
        let contract = abi::parse_address(&contract_hex)?;

        let rpc = JsonRpcClient::new(network.rpc_url.clone());
        let reported = rpc
            .call_hex("eth_chainId", json!([]))
            .await
            .map_err(|e| AdapterError::Connection {
                network: network.id.clone(),
                reason: e.to_string(),
            })?;
        let reported = parse_hex_quantity(&reported).map_err(|e| AdapterError::Connection {
            network: network.id.clone(),
            reason: e.to_string(),
        })? as u64;
        if reported != network.chain_id {
            return Err(AdapterError::Config {
                network: network.id.clone(),
                reason: format!(
                    "endpoint reports chain id {reported}, registry says {}",
                    network.chain_id
                ),
            });
        }

        tracing::debug!(network = %network.id, endpoint = %rpc.endpoint(), "EVM adapter connected");
        Ok(Self {
            network,
            rpc,
            operator,
            contract,
        })
    }

    /// Poll for the mined receipt of a submitted transaction.
    /// Returns None when the transaction is still pending after
    /// `attempts` polls; a pending transaction is not a failed one.
    pub async fn wait_for_receipt(
        &self,
        tx_hash: &TxHash,
        attempts: u32,
        interval: Duration,
    ) -> Result<Option<EvmReceipt>, RpcError> {
        for _ in 0..attempts {
            let reply = self
                .rpc
                .call("eth_getTransactionReceipt", json!([tx_hash.as_str()]))
                .await?;
            if !reply.is_null() {
                let block_number = reply
                    .get("blockNumber")
                    .and_then(|v| v.as_str())
                    .map(parse_hex_quantity)
                    .transpose()?
                    .unwrap_or(0) as u64;
                let succeeded = reply
                    .get("status")
                    .and_then(|v| v.as_str())
                    .map(|s| s == "0x1")
                    .unwrap_or(false);
                return Ok(Some(EvmReceipt {
                    transaction_hash: tx_hash.clone(),
                    block_number,
                    succeeded,
                }));
            }
            tokio::time::sleep(interval).await;
        }
        Ok(None)
    }

    fn contract_hex(&self) -> String {
        format!("0x{}", hex::encode(self.contract))
    }

    async fn nonce(&self) -> Result<u64, RpcError> {
        let hex = self
            .rpc
            .call_hex(
                "eth_getTransactionCount",
                json!([self.operator.address_hex(), "pending"]),
            )
            .await?;
        Ok(parse_hex_quantity(&hex)? as u64)
    }

    async fn gas_price(&self) -> Result<u128, RpcError> {
        let hex = self.rpc.call_hex("eth_gasPrice", json!([])).await?;
        parse_hex_quantity(&hex)
    }

    async fn eth_call(&self, data: Vec<u8>) -> Result<String, RpcError> {
        self.rpc
            .call_hex(
                "eth_call",
                json!([
                    { "to": self.contract_hex(), "data": format!("0x{}", hex::encode(data)) },
                    "latest"
                ]),
            )
            .await
    }

    /// Pre-derive the id of the token the next mint will create.
    ///
    /// TODO: read the token id from the Transfer event in the mined
    /// receipt instead; this pre-read is stale under concurrent mints
    /// against the same contract.
    async fn next_token_id(&self) -> Result<TokenId, RpcError> {
        let raw = self.eth_call(abi::encode_nullary(abi::SELECTOR_TOTAL_SUPPLY)).await?;
        let supply = abi::decode_uint(&raw)?;
        Ok(TokenId::new(supply as u64 + 1))
    }

    fn sign_raw(&self, tx: &EvmTransaction) -> Result<String, RpcError> {
        let payload =
            serde_json::to_vec(tx).map_err(|e| RpcError::Malformed(e.to_string()))?;
        let signature = self.operator.sign(&payload);
        let mut raw = payload;
        raw.extend_from_slice(&signature);
        Ok(format!("0x{}", hex::encode(raw)))
    }

    async fn submit(&self, data: Vec<u8>) -> Result<TxHash, RpcError> {
        let tx = EvmTransaction {
            nonce: self.nonce().await?,
            gas_price: self.gas_price().await?,
            gas_limit: GAS_LIMIT,
            to: self.contract_hex(),
            value: 0,
            data: format!("0x{}", hex::encode(data)),
            chain_id: self.network.chain_id,
        };
        let raw = self.sign_raw(&tx)?;
        let hash = self
            .rpc
            .call_hex("eth_sendRawTransaction", json!([raw]))
            .await?;
        Ok(TxHash::new(hash))
    }
}

#[async_trait]
impl ChainAdapter for EvmAdapter {
    fn network_id(&self) -> &NetworkId {
        &self.network.id
    }

    async fn mint_nft(
        &self,
        metadata_uri: &MetadataUri,
        to_address: &WalletAddress,
    ) -> Result<MintOutcome, AdapterError> {
        // Malformed input is a programmer error and does throw
        let to = abi::parse_address(to_address.as_str())?;

        let token_id = match self.next_token_id().await {
            Ok(id) => id,
            Err(e) => return Ok(MintOutcome::Rejected { error: e.to_string() }),
        };
        match self.submit(abi::encode_mint(&to, metadata_uri.as_str())).await {
            Ok(transaction_hash) => {
                tracing::info!(
                    network = %self.network.id,
                    tx_hash = %transaction_hash,
                    token_id = %token_id,
                    "mint submitted"
                );
                Ok(MintOutcome::Minted {
                    transaction_hash,
                    token_id,
                })
            }
            Err(e) => {
                tracing::warn!(network = %self.network.id, error = %e, "mint rejected");
                Ok(MintOutcome::Rejected { error: e.to_string() })
            }
        }
    }

    async fn transfer_nft(
        &self,
        token_id: TokenId,
        to_address: &WalletAddress,
    ) -> Result<TransferOutcome, AdapterError> {
        let to = abi::parse_address(to_address.as_str())?;
        let from = self.operator.address();

        match self
            .submit(abi::encode_transfer_from(&from, &to, token_id.value()))
            .await
        {
            Ok(transaction_hash) => Ok(TransferOutcome::Transferred { transaction_hash }),
            Err(e) => Ok(TransferOutcome::Rejected { error: e.to_string() }),
        }
    }

    async fn nft_info(&self, token_id: TokenId) -> Result<NftInfoOutcome, AdapterError> {
        let owner_call = abi::encode_uint_call(abi::SELECTOR_OWNER_OF, token_id.value());
        let uri_call = abi::encode_uint_call(abi::SELECTOR_TOKEN_URI, token_id.value());

        let owner = match self.eth_call(owner_call).await {
            Ok(raw) => match abi::decode_address(&raw) {
                Ok(owner) => owner,
                Err(e) => return Ok(NftInfoOutcome::Rejected { error: e.to_string() }),
            },
            Err(e) => return Ok(NftInfoOutcome::Rejected { error: e.to_string() }),
        };
        let token_uri = match self.eth_call(uri_call).await {
            Ok(raw) => match abi::decode_string(&raw) {
                Ok(uri) => uri,
                Err(e) => return Ok(NftInfoOutcome::Rejected { error: e.to_string() }),
            },
            Err(e) => return Ok(NftInfoOutcome::Rejected { error: e.to_string() }),
        };

        Ok(NftInfoOutcome::Found { owner, token_uri })
    }
}
