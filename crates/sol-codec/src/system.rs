//! System Program instructions and seeded address derivation.

use sha2::{Digest, Sha256};

use crate::error::CodecError;
use crate::instruction::{AccountMeta, Instruction};
use crate::pubkey::Pubkey;
use crate::spl_token::{MAX_SEED_LEN, PDA_MARKER};

/// The Solana System Program public key: 32 zero bytes.
/// Base58: `11111111111111111111111111111111`
pub const SYSTEM_PROGRAM_ID: Pubkey = Pubkey::ZERO;

/// System Program instruction indices (little-endian u32).
const SYSTEM_TRANSFER_IX_INDEX: u32 = 2;
const SYSTEM_CREATE_WITH_SEED_IX_INDEX: u32 = 3;

/// Build a System Program `Transfer` instruction.
pub fn transfer(from: &Pubkey, to: &Pubkey, lamports: u64) -> Result<Instruction, CodecError> {
    if lamports == 0 {
        return Err(CodecError::InvalidInstruction(
            "lamports must be > 0".into(),
        ));
    }

    // u32 LE instruction index (2 = Transfer) + u64 LE lamports.
    let mut data = Vec::with_capacity(12);
    data.extend_from_slice(&SYSTEM_TRANSFER_IX_INDEX.to_le_bytes());
    data.extend_from_slice(&lamports.to_le_bytes());

    Ok(Instruction::new(
        SYSTEM_PROGRAM_ID,
        vec![AccountMeta::new(*from, true), AccountMeta::new(*to, false)],
        data,
    ))
}

/// Derive the address of an account created with `CreateAccountWithSeed`:
/// `SHA-256(base || seed || owner)`.
pub fn create_with_seed(base: &Pubkey, seed: &str, owner: &Pubkey) -> Result<Pubkey, CodecError> {
    if seed.len() > MAX_SEED_LEN {
        return Err(CodecError::InvalidInstruction(format!(
            "seed of {} bytes exceeds {MAX_SEED_LEN}",
            seed.len()
        )));
    }
    if owner.as_bytes().ends_with(PDA_MARKER) {
        return Err(CodecError::InvalidInstruction(
            "owner must not end with the PDA marker".into(),
        ));
    }

    let hash: [u8; 32] = Sha256::new()
        .chain_update(base)
        .chain_update(seed.as_bytes())
        .chain_update(owner)
        .finalize()
        .into();
    Ok(Pubkey::new(hash))
}

/// Build a `CreateAccountWithSeed` instruction.
///
/// Data (bincode): u32 index, base, seed as u64-length-prefixed string,
/// lamports, space, owner.
pub fn create_account_with_seed(
    from: &Pubkey,
    to: &Pubkey,
    base: &Pubkey,
    seed: &str,
    lamports: u64,
    space: u64,
    owner: &Pubkey,
) -> Result<Instruction, CodecError> {
    let expected = create_with_seed(base, seed, owner)?;
    if expected != *to {
        return Err(CodecError::InvalidInstruction(format!(
            "{to} is not the seeded address {expected}"
        )));
    }

    let mut data = Vec::with_capacity(4 + 32 + 8 + seed.len() + 8 + 8 + 32);
    data.extend_from_slice(&SYSTEM_CREATE_WITH_SEED_IX_INDEX.to_le_bytes());
    data.extend_from_slice(base.as_bytes());
    data.extend_from_slice(&(seed.len() as u64).to_le_bytes());
    data.extend_from_slice(seed.as_bytes());
    data.extend_from_slice(&lamports.to_le_bytes());
    data.extend_from_slice(&space.to_le_bytes());
    data.extend_from_slice(owner.as_bytes());

    Ok(Instruction::new(
        SYSTEM_PROGRAM_ID,
        vec![
            AccountMeta::new(*from, true),
            AccountMeta::new(*to, false),
            AccountMeta::new_readonly(*base, true),
        ],
        data,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spl_token::TOKEN_PROGRAM_ID;

    #[test]
    fn system_program_is_all_ones() {
        assert_eq!(SYSTEM_PROGRAM_ID.to_base58(), "11111111111111111111111111111111");
    }

    #[test]
    fn transfer_data_is_12_bytes() {
        let ix = transfer(&Pubkey::new([1; 32]), &Pubkey::new([2; 32]), 1_000_000).unwrap();
        assert_eq!(ix.data.len(), 12);
        assert_eq!(&ix.data[..4], &[2, 0, 0, 0]);
        assert_eq!(&ix.data[4..], &1_000_000u64.to_le_bytes());
        assert_eq!(ix.program_id, SYSTEM_PROGRAM_ID);
    }

    #[test]
    fn transfer_accounts() {
        let from = Pubkey::new([0xAA; 32]);
        let to = Pubkey::new([0xBB; 32]);
        let ix = transfer(&from, &to, 500).unwrap();

        assert_eq!(ix.accounts[0], AccountMeta::new(from, true));
        assert_eq!(ix.accounts[1], AccountMeta::new(to, false));
    }

    #[test]
    fn transfer_zero_lamports_fails() {
        assert!(transfer(&Pubkey::new([1; 32]), &Pubkey::new([2; 32]), 0).is_err());
    }

    #[test]
    fn seeded_address_is_sha256_of_parts() {
        let base = Pubkey::new([7; 32]);
        let derived = create_with_seed(&base, "myTokenMintSeed", &TOKEN_PROGRAM_ID).unwrap();

        let mut hasher = Sha256::new();
        hasher.update([7u8; 32]);
        hasher.update(b"myTokenMintSeed");
        hasher.update(TOKEN_PROGRAM_ID.as_bytes());
        let expected: [u8; 32] = hasher.finalize().into();
        assert_eq!(derived, Pubkey::new(expected));
    }

    #[test]
    fn seeded_address_rejects_long_seed() {
        let seed = "x".repeat(33);
        assert!(create_with_seed(&Pubkey::ZERO, &seed, &TOKEN_PROGRAM_ID).is_err());
    }

    #[test]
    fn seeded_address_rejects_pda_marker_owner() {
        let mut owner = [0u8; 32];
        owner[32 - PDA_MARKER.len()..].copy_from_slice(PDA_MARKER);
        assert!(create_with_seed(&Pubkey::ZERO, "seed", &Pubkey::new(owner)).is_err());
    }

    #[test]
    fn create_account_with_seed_layout() {
        let from = Pubkey::new([1; 32]);
        let base = Pubkey::new([2; 32]);
        let to = create_with_seed(&base, "abc", &TOKEN_PROGRAM_ID).unwrap();

        let ix =
            create_account_with_seed(&from, &to, &base, "abc", 1_461_600, 82, &TOKEN_PROGRAM_ID)
                .unwrap();

        assert_eq!(ix.data.len(), 4 + 32 + 8 + 3 + 8 + 8 + 32);
        assert_eq!(&ix.data[..4], &[3, 0, 0, 0]);
        assert_eq!(&ix.data[4..36], base.as_bytes());
        assert_eq!(&ix.data[36..44], &3u64.to_le_bytes());
        assert_eq!(&ix.data[44..47], b"abc");
        assert_eq!(&ix.data[47..55], &1_461_600u64.to_le_bytes());
        assert_eq!(&ix.data[55..63], &82u64.to_le_bytes());
        assert_eq!(&ix.data[63..], TOKEN_PROGRAM_ID.as_bytes());
        assert!(ix.accounts[2].is_signer && !ix.accounts[2].is_writable);
    }

    #[test]
    fn create_account_with_seed_checks_target() {
        let wrong = Pubkey::new([9; 32]);
        assert!(create_account_with_seed(
            &Pubkey::new([1; 32]),
            &wrong,
            &Pubkey::new([2; 32]),
            "abc",
            1,
            0,
            &TOKEN_PROGRAM_ID
        )
        .is_err());
    }
}
