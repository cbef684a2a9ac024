//! # Herdtwin Chain Adapters
//!
//! Uniform mint/transfer/query operations translated into
//! family-specific calls:
//!
//! - `adapter` - the `ChainAdapter` trait and its outcome envelopes
//! - `rpc` - minimal JSON-RPC 2.0 client shared by both families
//! - `abi` - EVM calldata encoding/decoding (selectors, 32-byte words)
//! - `evm` - ERC-721-style adapter for EVM chains
//! - `starknet` - invoke-model adapter for Stark-style account chains
//! - `factory` - family dispatch with a per-network connection cache
//! - `signer` - the operator signing key injected at construction time
//!
//! Adapters never return `Err` for business-level chain failures
//! (reverts, insufficient gas, RPC error bodies); those come back as
//! tagged `Rejected` outcomes so the caller can decide what to persist.
//! `Err(AdapterError)` is reserved for programmer and configuration
//! mistakes.

pub mod abi;
pub mod adapter;
pub mod evm;
pub mod factory;
pub mod rpc;
pub mod signer;
pub mod starknet;

pub use adapter::*;
pub use evm::EvmAdapter;
pub use factory::{AdapterFactory, AdapterProvider};
pub use signer::{KeyError, OperatorKey};
pub use starknet::StarknetAdapter;
