//! Operator signing key
//!
//! The hot-wallet key that signs every mint/transfer this layer
//! submits. Injected at adapter construction time as an opaque secret;
//! custody and rotation are outside this subsystem.

use std::fmt;
use thiserror::Error;

/// Rejected operator key material. The key is network-agnostic, so the
/// error carries no network id.
#[derive(Error, Debug, Clone)]
#[error("invalid operator key: {0}")]
pub struct KeyError(String);

/// Operator signing key, shared by all adapter instances
#[derive(Clone)]
pub struct OperatorKey {
    secret: [u8; 32],
    address: [u8; 20],
}

impl OperatorKey {
    /// Build from a 32-byte hex secret (with or without 0x prefix)
    pub fn from_hex(secret_hex: &str) -> Result<Self, KeyError> {
        let digits = secret_hex.strip_prefix("0x").unwrap_or(secret_hex);
        let bytes = hex::decode(digits)
            .map_err(|_| KeyError("not valid hex".to_string()))?;
        if bytes.len() != 32 {
            return Err(KeyError("must be 32 bytes".to_string()));
        }
        let mut secret = [0u8; 32];
        secret.copy_from_slice(&bytes);

        // Address is the last 20 bytes of the key digest. BLAKE3 stands in
        // for the keccak256-of-public-key derivation done by the HSM path.
        let digest = blake3::hash(&secret);
        let mut address = [0u8; 20];
        address.copy_from_slice(&digest.as_bytes()[12..32]);

        Ok(Self { secret, address })
    }

    /// Operator address as raw bytes
    pub fn address(&self) -> [u8; 20] {
        self.address
    }

    /// Operator address as 0x-prefixed hex
    pub fn address_hex(&self) -> String {
        format!("0x{}", hex::encode(self.address))
    }

    /// Sign a payload, returning a 64-byte signature.
    /// BLAKE3 keyed hashing stands in for secp256k1/STARK signing.
    pub fn sign(&self, payload: &[u8]) -> [u8; 64] {
        let first = blake3::keyed_hash(&self.secret, payload);
        let second = blake3::keyed_hash(&self.secret, first.as_bytes());
        let mut signature = [0u8; 64];
        signature[..32].copy_from_slice(first.as_bytes());
        signature[32..].copy_from_slice(second.as_bytes());
        signature
    }
}

impl fmt::Debug for OperatorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Secret never appears in logs
        f.debug_struct("OperatorKey")
            .field("address", &self.address_hex())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "0x4242424242424242424242424242424242424242424242424242424242424242";

    #[test]
    fn test_key_parsing() {
        let key = OperatorKey::from_hex(SECRET).unwrap();
        assert!(key.address_hex().starts_with("0x"));
        assert_eq!(key.address_hex().len(), 42);

        assert!(OperatorKey::from_hex("0x1234").is_err());
        assert!(OperatorKey::from_hex("zz").is_err());
    }

    #[test]
    fn test_key_error_carries_no_network() {
        let err = OperatorKey::from_hex("0x1234").unwrap_err();
        let printed = err.to_string();
        assert!(printed.contains("operator key"));
        assert!(!printed.contains('*'));
    }

    #[test]
    fn test_signing_is_deterministic() {
        let key = OperatorKey::from_hex(SECRET).unwrap();
        assert_eq!(key.sign(b"payload"), key.sign(b"payload"));
        assert_ne!(key.sign(b"payload"), key.sign(b"other"));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let key = OperatorKey::from_hex(SECRET).unwrap();
        let printed = format!("{key:?}");
        assert!(!printed.contains("4242424242"));
        assert!(printed.contains(&key.address_hex()));
    }
}
