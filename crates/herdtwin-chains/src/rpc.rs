//! Minimal JSON-RPC 2.0 client
//!
//! Shared by the EVM and Starknet adapters. One request per call, no
//! batching, no retries; the caller decides what a failure means.

use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

/// JSON-RPC errors, split so the caller can tell transport failures
/// from error bodies the chain itself returned
#[derive(Error, Debug, Clone)]
pub enum RpcError {
    /// HTTP-level failure, endpoint unreachable or non-JSON reply
    #[error("RPC transport error: {0}")]
    Transport(String),

    /// The node returned a JSON-RPC error object
    #[error("RPC error {code}: {message}")]
    Chain { code: i64, message: String },

    /// Reply parsed but did not have the expected shape
    #[error("Malformed RPC response: {0}")]
    Malformed(String),
}

/// JSON-RPC 2.0 client over HTTP
pub struct JsonRpcClient {
    http: reqwest::Client,
    endpoint: String,
    next_id: AtomicU64,
}

impl JsonRpcClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Execute one JSON-RPC call and return the `result` value
    pub async fn call(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = request_body(id, method, params);

        let response = self
            .http
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| RpcError::Transport(e.to_string()))?;

        let reply: Value = response
            .json()
            .await
            .map_err(|e| RpcError::Transport(e.to_string()))?;

        if let Some(err) = reply.get("error") {
            return Err(RpcError::Chain {
                code: err.get("code").and_then(Value::as_i64).unwrap_or(0),
                message: err
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown RPC error")
                    .to_string(),
            });
        }

        reply
            .get("result")
            .cloned()
            .ok_or_else(|| RpcError::Malformed("missing result field".to_string()))
    }

    /// Like `call` but expects a hex string result
    pub async fn call_hex(&self, method: &str, params: Value) -> Result<String, RpcError> {
        let result = self.call(method, params).await?;
        result
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| RpcError::Malformed(format!("{method}: result is not a string")))
    }
}

fn request_body(id: u64, method: &str, params: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": method,
        "params": params,
    })
}

/// Parse a 0x-prefixed hex quantity into u128
pub fn parse_hex_quantity(hex_str: &str) -> Result<u128, RpcError> {
    let digits = hex_str.strip_prefix("0x").unwrap_or(hex_str);
    u128::from_str_radix(digits, 16)
        .map_err(|_| RpcError::Malformed(format!("not a hex quantity: {hex_str}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let body = request_body(7, "eth_gasPrice", json!([]));
        assert_eq!(body["jsonrpc"], "2.0");
        assert_eq!(body["id"], 7);
        assert_eq!(body["method"], "eth_gasPrice");
        assert!(body["params"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_parse_hex_quantity() {
        assert_eq!(parse_hex_quantity("0x0").unwrap(), 0);
        assert_eq!(parse_hex_quantity("0x2a").unwrap(), 42);
        assert_eq!(parse_hex_quantity("ff").unwrap(), 255);
        assert!(parse_hex_quantity("0xzz").is_err());
    }
}
