//! Solana accounts that NeonEVM derives for EVM addresses.
//!
//! Every EVM address has a balance/contract account on Solana: a PDA of the
//! NeonEVM program with seeds `[ACCOUNT_SEED_VERSION, address]`. Contracts
//! expose it through `getNeonAddress`, and instructions executed through the
//! bridge name it as their signer.

use sol_codec::spl_token::find_program_address;
use sol_codec::Pubkey;

use crate::error::AbiError;

/// Seed version prefix used by the NeonEVM program.
pub const ACCOUNT_SEED_VERSION: u8 = 3;

/// Parses a 0x-prefixed hex address string into a 20-byte array.
pub fn parse_evm_address(address: &str) -> Result<[u8; 20], AbiError> {
    let hex_str = address
        .strip_prefix("0x")
        .or_else(|| address.strip_prefix("0X"))
        .ok_or_else(|| AbiError::InvalidAddress("address must start with 0x".into()))?;

    if hex_str.len() != 40 {
        return Err(AbiError::InvalidAddress(format!(
            "expected 40 hex characters, got {}",
            hex_str.len()
        )));
    }

    let bytes =
        hex::decode(hex_str).map_err(|e| AbiError::InvalidAddress(format!("invalid hex: {e}")))?;

    let mut addr = [0u8; 20];
    addr.copy_from_slice(&bytes);
    Ok(addr)
}

/// The Solana account NeonEVM uses for `evm_address`, under the given
/// NeonEVM program id. Returns the address and its bump seed.
pub fn neon_account_address(
    evm_address: &[u8; 20],
    neon_program_id: &Pubkey,
) -> Result<(Pubkey, u8), AbiError> {
    Ok(find_program_address(
        &[&[ACCOUNT_SEED_VERSION][..], &evm_address[..]],
        neon_program_id,
    )?)
}
