//! Solana side of the NeonEVM composability bridge.
//!
//! An EVM contract that wants to run a native Solana instruction hands the
//! bridge a flat byte string describing it. This crate builds that string
//! ([`instruction`]), converts Base58 keys to the `bytes32` form contracts
//! store ([`pubkey`]), and decodes SPL Token mint and account records into
//! fixed-width views ([`token_state`]).
//!
//! Every function here is pure and synchronous. Network I/O, retries and
//! signing belong to the caller.

pub mod config;
pub mod error;
pub mod instruction;
pub mod pubkey;
pub mod spl_token;
pub mod system;
pub mod token_state;

// Re-export key public types for ergonomic imports.
pub use config::{LengthPrefix, WireConfig};
pub use error::CodecError;
pub use instruction::{
    encode_account_list, encode_account_list_with, encode_instruction_data,
    encode_instruction_data_with, pack_instruction, pack_instruction_with,
    pack_instruction_with_overrides, packed_len, unpack_instruction, AccountMeta,
    AccountOverrides, Instruction,
};
pub use pubkey::{to_base58, to_bytes32, Pubkey};
pub use spl_token::{
    derive_associated_token_address, ASSOCIATED_TOKEN_PROGRAM_ID, NATIVE_MINT, TOKEN_PROGRAM_ID,
};
pub use system::SYSTEM_PROGRAM_ID;
pub use token_state::{
    decode_mint, decode_token_account, AccountState, TokenAccountView, TokenMintView, MINT_LEN,
    TOKEN_ACCOUNT_LEN,
};
