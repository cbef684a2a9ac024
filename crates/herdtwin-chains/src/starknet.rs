//! Starknet-family adapter
//!
//! Same logical operations as the EVM adapter, translated to the
//! account/invoke contract model. Contract address, operator account and
//! entry points are resolved from network config, never hard-coded.

use crate::adapter::{
    AdapterError, ChainAdapter, MintOutcome, NftInfoOutcome, TransferOutcome,
};
use crate::rpc::{parse_hex_quantity, JsonRpcClient, RpcError};
use crate::signer::OperatorKey;
use async_trait::async_trait;
use herdtwin_core::{
    MetadataUri, Network, NetworkId, TokenId, TxHash, WalletAddress, CONFIG_ACCOUNT_ADDRESS,
    CONFIG_NFT_CONTRACT,
};
use serde_json::{json, Value};

/// Max fee attached to invoke transactions, in fri (the chain's
/// smallest unit); conversions to human units never happen here
const MAX_FEE: u128 = 10_000_000_000_000_000;

/// Bytes per short-string felt (felts hold < 2^252)
const SHORT_STRING_BYTES: usize = 31;

/// Validate a 0x-prefixed felt, at most 63 hex digits
pub fn validate_felt(value: &str) -> Result<(), AdapterError> {
    let digits = value
        .strip_prefix("0x")
        .ok_or_else(|| AdapterError::InvalidAddress(value.to_string()))?;
    if digits.is_empty()
        || digits.len() > 63
        || !digits.bytes().all(|b| b.is_ascii_hexdigit())
    {
        return Err(AdapterError::InvalidAddress(value.to_string()));
    }
    Ok(())
}

/// Entry point selector for a named entry point.
/// BLAKE3 over the name stands in for sn_keccak; truncated to 31 bytes
/// so the result is always a valid felt.
pub fn entry_point_selector(name: &str) -> String {
    let digest = blake3::hash(name.as_bytes());
    format!("0x{}", hex::encode(&digest.as_bytes()[..SHORT_STRING_BYTES]))
}

/// Pack a string into a felt array: a count felt followed by
/// 31-byte short-string chunks
pub fn encode_string_felts(value: &str) -> Vec<String> {
    let chunks: Vec<String> = value
        .as_bytes()
        .chunks(SHORT_STRING_BYTES)
        .map(|chunk| format!("0x{}", hex::encode(chunk)))
        .collect();
    let mut felts = Vec::with_capacity(chunks.len() + 1);
    felts.push(format!("0x{:x}", chunks.len()));
    felts.extend(chunks);
    felts
}

/// Inverse of `encode_string_felts` for call results
pub fn decode_string_felts(felts: &[String]) -> Result<String, RpcError> {
    let count = felts
        .first()
        .map(|f| parse_hex_quantity(f))
        .transpose()?
        .ok_or_else(|| RpcError::Malformed("empty felt array".to_string()))?;
    // The count felt comes straight from the node; an absurd value is
    // malformed data, not a reason to overflow the bounds check
    let count = usize::try_from(count)
        .ok()
        .filter(|c| felts.len() > *c)
        .ok_or_else(|| RpcError::Malformed("truncated felt array".to_string()))?;
    let mut bytes = Vec::new();
    for felt in &felts[1..=count] {
        let digits = felt.strip_prefix("0x").unwrap_or(felt);
        // Odd-length hex means a leading nibble was trimmed; restore it
        let padded = if digits.len() % 2 == 1 {
            format!("0{digits}")
        } else {
            digits.to_string()
        };
        bytes.extend(
            hex::decode(&padded).map_err(|_| RpcError::Malformed(format!("bad felt: {felt}")))?,
        );
    }
    String::from_utf8(bytes).map_err(|e| RpcError::Malformed(e.to_string()))
}

/// Adapter for Stark-style account-based networks
pub struct StarknetAdapter {
    network: Network,
    rpc: JsonRpcClient,
    operator: OperatorKey,
    /// Operator account contract, from network config
    account: String,
    /// NFT contract address, from network config
    contract: String,
}

impl StarknetAdapter {
    /// Establish the adapter, probing the endpoint once
    pub async fn connect(network: Network, operator: OperatorKey) -> Result<Self, AdapterError> {
        let contract = required_config(&network, CONFIG_NFT_CONTRACT)?;
        let account = required_config(&network, CONFIG_ACCOUNT_ADDRESS)?;
        validate_felt(&contract)?;
        validate_felt(&account)?;

        let rpc = JsonRpcClient::new(network.rpc_url.clone());
        rpc.call("starknet_chainId", json!([]))
            .await
            .map_err(|e| AdapterError::Connection {
                network: network.id.clone(),
                reason: e.to_string(),
            })?;

        tracing::debug!(network = %network.id, endpoint = %rpc.endpoint(), "Starknet adapter connected");
        Ok(Self {
            network,
            rpc,
            operator,
            account,
            contract,
        })
    }

    async fn nonce(&self) -> Result<u128, RpcError> {
        let hex = self
            .rpc
            .call_hex("starknet_getNonce", json!(["pending", self.account]))
            .await?;
        parse_hex_quantity(&hex)
    }

    /// Read-only entry point call
    async fn view_call(&self, entry_point: &str, calldata: Vec<String>) -> Result<Vec<String>, RpcError> {
        let reply = self
            .rpc
            .call(
                "starknet_call",
                json!([
                    {
                        "contract_address": self.contract,
                        "entry_point_selector": entry_point_selector(entry_point),
                        "calldata": calldata,
                    },
                    "pending"
                ]),
            )
            .await?;
        reply
            .as_array()
            .map(|felts| {
                felts
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .ok_or_else(|| RpcError::Malformed("starknet_call: result is not an array".to_string()))
    }

    /// Submit an invoke through the operator account contract
    async fn invoke(&self, entry_point: &str, calldata: Vec<String>) -> Result<TxHash, RpcError> {
        // Account __execute__ convention: one call, then its calldata
        let mut execute_calldata = vec![
            "0x1".to_string(),
            self.contract.clone(),
            entry_point_selector(entry_point),
            format!("0x{:x}", calldata.len()),
        ];
        execute_calldata.extend(calldata);

        let nonce = self.nonce().await?;
        let unsigned = json!({
            "type": "INVOKE",
            "version": "0x1",
            "sender_address": self.account,
            "calldata": execute_calldata,
            "max_fee": format!("0x{MAX_FEE:x}"),
            "nonce": format!("0x{nonce:x}"),
        });

        let payload =
            serde_json::to_vec(&unsigned).map_err(|e| RpcError::Malformed(e.to_string()))?;
        let signature = self.operator.sign(&payload);
        let (r, s) = signature.split_at(32);
        let mut tx = unsigned;
        tx["signature"] = json!([
            format!("0x{}", hex::encode(&r[..SHORT_STRING_BYTES])),
            format!("0x{}", hex::encode(&s[..SHORT_STRING_BYTES])),
        ]);

        let reply = self
            .rpc
            .call("starknet_addInvokeTransaction", json!([tx]))
            .await?;
        reply
            .get("transaction_hash")
            .and_then(Value::as_str)
            .map(|h| TxHash::new(h.to_string()))
            .ok_or_else(|| RpcError::Malformed("missing transaction_hash".to_string()))
    }

    /// Same pre-read as the EVM adapter's token-id derivation
    async fn next_token_id(&self) -> Result<TokenId, RpcError> {
        let felts = self.view_call("total_supply", Vec::new()).await?;
        let supply = felts
            .first()
            .map(|f| parse_hex_quantity(f))
            .transpose()?
            .ok_or_else(|| RpcError::Malformed("total_supply returned nothing".to_string()))?;
        Ok(TokenId::new(supply as u64 + 1))
    }
}

fn required_config(network: &Network, key: &str) -> Result<String, AdapterError> {
    network
        .config_value(key)
        .map(str::to_string)
        .ok_or_else(|| AdapterError::Config {
            network: network.id.clone(),
            reason: format!("missing {key} in network config"),
        })
}

#[async_trait]
impl ChainAdapter for StarknetAdapter {
    fn network_id(&self) -> &NetworkId {
        &self.network.id
    }

    async fn mint_nft(
        &self,
        metadata_uri: &MetadataUri,
        to_address: &WalletAddress,
    ) -> Result<MintOutcome, AdapterError> {
        validate_felt(to_address.as_str())?;

        let token_id = match self.next_token_id().await {
            Ok(id) => id,
            Err(e) => return Ok(MintOutcome::Rejected { error: e.to_string() }),
        };

        let mut calldata = vec![to_address.as_str().to_string()];
        calldata.extend(encode_string_felts(metadata_uri.as_str()));

        match self.invoke("mint", calldata).await {
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
        validate_felt(to_address.as_str())?;

        let calldata = vec![
            self.account.clone(),
            to_address.as_str().to_string(),
            format!("0x{:x}", token_id.value()),
        ];
        match self.invoke("transfer_from", calldata).await {
            Ok(transaction_hash) => Ok(TransferOutcome::Transferred { transaction_hash }),
            Err(e) => Ok(TransferOutcome::Rejected { error: e.to_string() }),
        }
    }

    async fn nft_info(&self, token_id: TokenId) -> Result<NftInfoOutcome, AdapterError> {
        let id_felt = format!("0x{:x}", token_id.value());

        let owner = match self.view_call("owner_of", vec![id_felt.clone()]).await {
            Ok(felts) => match felts.into_iter().next() {
                Some(owner) => owner,
                None => {
                    return Ok(NftInfoOutcome::Rejected {
                        error: "owner_of returned nothing".to_string(),
                    })
                }
            },
            Err(e) => return Ok(NftInfoOutcome::Rejected { error: e.to_string() }),
        };

        let token_uri = match self.view_call("token_uri", vec![id_felt]).await {
            Ok(felts) => match decode_string_felts(&felts) {
                Ok(uri) => uri,
                Err(e) => return Ok(NftInfoOutcome::Rejected { error: e.to_string() }),
            },
            Err(e) => return Ok(NftInfoOutcome::Rejected { error: e.to_string() }),
        };

        Ok(NftInfoOutcome::Found { owner, token_uri })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_felt() {
        assert!(validate_felt("0x1").is_ok());
        assert!(validate_felt("0xabcDEF123").is_ok());
        assert!(validate_felt("abc").is_err());
        assert!(validate_felt("0x").is_err());
        assert!(validate_felt(&format!("0x{}", "f".repeat(64))).is_err());
        assert!(validate_felt("0xzz").is_err());
    }

    #[test]
    fn test_selector_is_deterministic_felt() {
        let a = entry_point_selector("mint");
        let b = entry_point_selector("mint");
        assert_eq!(a, b);
        assert_ne!(a, entry_point_selector("transfer_from"));
        assert!(validate_felt(&a).is_ok());
    }

    #[test]
    fn test_string_felt_round_trip() {
        let uri = "ipfs://QmSomeLongContentHashThatSpansMultipleFeltChunks123456";
        let felts = encode_string_felts(uri);

        // 60 bytes -> 2 chunks plus the count felt
        assert_eq!(felts.len(), 3);
        assert_eq!(felts[0], "0x2");
        assert_eq!(decode_string_felts(&felts).unwrap(), uri);
    }

    #[test]
    fn test_string_felt_exact_chunk_boundary() {
        let s = "a".repeat(31);
        let felts = encode_string_felts(&s);
        assert_eq!(felts.len(), 2);
        assert_eq!(decode_string_felts(&felts).unwrap(), s);
    }

    #[test]
    fn test_decode_truncated_felt_array() {
        assert!(decode_string_felts(&["0x2".to_string(), "0x61".to_string()]).is_err());
        assert!(decode_string_felts(&[]).is_err());
    }

    #[test]
    fn test_decode_rejects_hostile_count_felt() {
        // Count felts way past the array length must surface as
        // malformed data, never wrap the bounds check
        let huge = decode_string_felts(&["0xffffffffffffffff".to_string()]);
        assert!(matches!(huge, Err(RpcError::Malformed(_))));

        let oversized = decode_string_felts(&[format!("0x{}", "f".repeat(32))]);
        assert!(matches!(oversized, Err(RpcError::Malformed(_))));
    }
}
