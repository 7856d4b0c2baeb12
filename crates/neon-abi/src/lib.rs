//! EVM side of the NeonEVM composability bridge.
//!
//! This crate provides:
//! - Minimal ABI encoding and return-word decoding
//! - `execute(uint64,bytes32,bytes)` calldata carrying a packed Solana
//!   instruction
//! - Word layouts for SPL Token mint and account views
//! - Derivation of the Solana account NeonEVM keeps for an EVM address

pub mod abi;
pub mod composability;
pub mod error;
pub mod neon_address;

pub use composability::{
    decode_execute, encode_execute, encode_execute_with, encode_mint_view,
    encode_token_account_view, ExecuteCall, EXECUTE_SIGNATURE,
};
pub use error::AbiError;
pub use neon_address::{neon_account_address, parse_evm_address};
