//! EVM calldata encoding and decoding
//!
//! Hand-rolled ABI support for the fixed ERC-721-style surface the
//! adapter drives: 4-byte selectors followed by 32-byte words, dynamic
//! strings as offset/length/padded-bytes.

use crate::adapter::AdapterError;
use crate::rpc::RpcError;

/// mint(address,string)
pub const SELECTOR_MINT: [u8; 4] = [0xd0, 0xde, 0xf5, 0x21];
/// transferFrom(address,address,uint256)
pub const SELECTOR_TRANSFER_FROM: [u8; 4] = [0x23, 0xb8, 0x72, 0xdd];
/// totalSupply()
pub const SELECTOR_TOTAL_SUPPLY: [u8; 4] = [0x18, 0x16, 0x0d, 0xdd];
/// ownerOf(uint256)
pub const SELECTOR_OWNER_OF: [u8; 4] = [0x63, 0x52, 0x21, 0x1e];
/// tokenURI(uint256)
pub const SELECTOR_TOKEN_URI: [u8; 4] = [0xc8, 0x7b, 0x56, 0xdd];

const WORD: usize = 32;

/// Parse a 0x-prefixed 20-byte hex address
pub fn parse_address(address: &str) -> Result<[u8; 20], AdapterError> {
    let digits = address.strip_prefix("0x").unwrap_or(address);
    let bytes =
        hex::decode(digits).map_err(|_| AdapterError::InvalidAddress(address.to_string()))?;
    if bytes.len() != 20 {
        return Err(AdapterError::InvalidAddress(address.to_string()));
    }
    let mut out = [0u8; 20];
    out.copy_from_slice(&bytes);
    Ok(out)
}

fn word_from_address(address: &[u8; 20]) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    word[12..].copy_from_slice(address);
    word
}

fn word_from_u128(value: u128) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    word[16..].copy_from_slice(&value.to_be_bytes());
    word
}

/// Encode `mint(address,string)` calldata
pub fn encode_mint(to: &[u8; 20], uri: &str) -> Vec<u8> {
    let uri_bytes = uri.as_bytes();
    let padded_len = uri_bytes.len().div_ceil(WORD) * WORD;

    let mut data = Vec::with_capacity(4 + 3 * WORD + padded_len);
    data.extend_from_slice(&SELECTOR_MINT);
    data.extend_from_slice(&word_from_address(to));
    // Dynamic string: head word holds the tail offset relative to the
    // start of the argument block (two head words).
    data.extend_from_slice(&word_from_u128(2 * WORD as u128));
    data.extend_from_slice(&word_from_u128(uri_bytes.len() as u128));
    data.extend_from_slice(uri_bytes);
    data.resize(4 + 3 * WORD + padded_len, 0);
    data
}

/// Encode `transferFrom(address,address,uint256)` calldata
pub fn encode_transfer_from(from: &[u8; 20], to: &[u8; 20], token_id: u64) -> Vec<u8> {
    let mut data = Vec::with_capacity(4 + 3 * WORD);
    data.extend_from_slice(&SELECTOR_TRANSFER_FROM);
    data.extend_from_slice(&word_from_address(from));
    data.extend_from_slice(&word_from_address(to));
    data.extend_from_slice(&word_from_u128(token_id as u128));
    data
}

/// Encode a nullary view call (totalSupply)
pub fn encode_nullary(selector: [u8; 4]) -> Vec<u8> {
    selector.to_vec()
}

/// Encode a single-uint256 view call (ownerOf, tokenURI)
pub fn encode_uint_call(selector: [u8; 4], value: u64) -> Vec<u8> {
    let mut data = Vec::with_capacity(4 + WORD);
    data.extend_from_slice(&selector);
    data.extend_from_slice(&word_from_u128(value as u128));
    data
}

fn return_bytes(return_data: &str) -> Result<Vec<u8>, RpcError> {
    let digits = return_data.strip_prefix("0x").unwrap_or(return_data);
    hex::decode(digits).map_err(|_| RpcError::Malformed(format!("bad return data: {return_data}")))
}

/// Read one 32-byte word as a uint, rejecting anything above u128
fn word_uint(word: &[u8]) -> Option<u128> {
    if word.len() != WORD || word[..WORD - 16].iter().any(|b| *b != 0) {
        return None;
    }
    let mut raw = [0u8; 16];
    raw.copy_from_slice(&word[WORD - 16..]);
    Some(u128::from_be_bytes(raw))
}

/// Decode a uint256 return value, rejecting anything above u128
pub fn decode_uint(return_data: &str) -> Result<u128, RpcError> {
    let bytes = return_bytes(return_data)?;
    if bytes.len() < WORD {
        return Err(RpcError::Malformed(format!(
            "short uint return: {return_data}"
        )));
    }
    word_uint(&bytes[..WORD]).ok_or_else(|| {
        RpcError::Malformed(format!("uint return out of range: {return_data}"))
    })
}

/// Decode an address return value
pub fn decode_address(return_data: &str) -> Result<String, RpcError> {
    let bytes = return_bytes(return_data)?;
    if bytes.len() < WORD {
        return Err(RpcError::Malformed(format!(
            "short address return: {return_data}"
        )));
    }
    Ok(format!("0x{}", hex::encode(&bytes[12..WORD])))
}

/// Decode a dynamic string return value (offset word, length word, bytes).
/// Offset and length come straight from the node, so every bound is
/// checked; an out-of-range value is malformed data, never a panic.
pub fn decode_string(return_data: &str) -> Result<String, RpcError> {
    let bytes = return_bytes(return_data)?;
    let err = || RpcError::Malformed(format!("bad string return: {return_data}"));

    if bytes.len() < 2 * WORD {
        return Err(err());
    }
    let offset = word_uint(&bytes[..WORD])
        .and_then(|v| usize::try_from(v).ok())
        .ok_or_else(err)?;
    let len_end = offset.checked_add(WORD).ok_or_else(err)?;
    if bytes.len() < len_end {
        return Err(err());
    }
    let len = word_uint(&bytes[offset..len_end])
        .and_then(|v| usize::try_from(v).ok())
        .ok_or_else(err)?;
    let end = len_end.checked_add(len).ok_or_else(err)?;
    if bytes.len() < end {
        return Err(err());
    }
    String::from_utf8(bytes[len_end..end].to_vec()).map_err(|_| err())
}
