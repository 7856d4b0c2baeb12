//! SPL Token instruction builders and associated token account derivation.
//!
//! These produce plain [`Instruction`] values that callers pack with
//! [`crate::instruction::pack_instruction`] before handing them to the
//! bridge. Nothing here pulls in `spl-token`; the instruction tags and data
//! layouts follow the Token Program's own (little-endian) encoding.

use sha2::{Digest, Sha256};
use tracing::trace;

use crate::error::CodecError;
use crate::instruction::{AccountMeta, Instruction};
use crate::pubkey::Pubkey;
use crate::system::SYSTEM_PROGRAM_ID;

// ---------------------------------------------------------------------------
// Well-known program IDs
// ---------------------------------------------------------------------------

/// SPL Token Program ID: `TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA`
pub const TOKEN_PROGRAM_ID: Pubkey = Pubkey::new([
    0x06, 0xdd, 0xf6, 0xe1, 0xd7, 0x65, 0xa1, 0x93, 0xd9, 0xcb, 0xe1, 0x46, 0xce, 0xeb, 0x79,
    0xac, 0x1c, 0xb4, 0x85, 0xed, 0x5f, 0x5b, 0x37, 0x91, 0x3a, 0x8c, 0xf5, 0x85, 0x7e, 0xff,
    0x00, 0xa9,
]);

/// Associated Token Account Program ID: `ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL`
pub const ASSOCIATED_TOKEN_PROGRAM_ID: Pubkey = Pubkey::new([
    0x8c, 0x97, 0x25, 0x8f, 0x4e, 0x24, 0x89, 0xf1, 0xbb, 0x3d, 0x10, 0x29, 0x14, 0x8e, 0x0d,
    0x83, 0x0b, 0x5a, 0x13, 0x99, 0xda, 0xff, 0x10, 0x84, 0x04, 0x8e, 0x7b, 0xd8, 0xdb, 0xe9,
    0xf8, 0x59,
]);

/// Wrapped SOL mint: `So11111111111111111111111111111111111111112`
pub const NATIVE_MINT: Pubkey = Pubkey::new([
    0x06, 0x9b, 0x88, 0x57, 0xfe, 0xab, 0x81, 0x84, 0xfb, 0x68, 0x7f, 0x63, 0x46, 0x18, 0xc0,
    0x35, 0xda, 0xc4, 0x39, 0xdc, 0x1a, 0xeb, 0x3b, 0x55, 0x98, 0xa0, 0xf0, 0x00, 0x00, 0x00,
    0x00, 0x01,
]);

/// The string appended to PDA derivation: "ProgramDerivedAddress".
pub(crate) const PDA_MARKER: &[u8] = b"ProgramDerivedAddress";

/// Maximum length of a single PDA seed.
pub const MAX_SEED_LEN: usize = 32;

/// Maximum number of seeds (including the bump) in a PDA derivation.
pub const MAX_SEEDS: usize = 16;

// Token Program instruction tags.
const IX_TRANSFER: u8 = 3;
const IX_APPROVE: u8 = 4;
const IX_REVOKE: u8 = 5;
const IX_SET_AUTHORITY: u8 = 6;
const IX_MINT_TO: u8 = 7;
const IX_TRANSFER_CHECKED: u8 = 12;
const IX_SYNC_NATIVE: u8 = 17;
const IX_INITIALIZE_MINT2: u8 = 20;

/// Authority slots that `SetAuthority` can change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorityType {
    MintTokens = 0,
    FreezeAccount = 1,
    AccountOwner = 2,
    CloseAccount = 3,
}

// ---------------------------------------------------------------------------
// Mint management
// ---------------------------------------------------------------------------

/// Build an `InitializeMint2` instruction.
///
/// Data: `[20, decimals, mint_authority(32), freeze_option]` where the
/// freeze option is `[0]` or `[1, key(32)]`.
pub fn initialize_mint2(
    mint: &Pubkey,
    mint_authority: &Pubkey,
    freeze_authority: Option<&Pubkey>,
    decimals: u8,
) -> Instruction {
    let mut data = Vec::with_capacity(67);
    data.push(IX_INITIALIZE_MINT2);
    data.push(decimals);
    data.extend_from_slice(mint_authority.as_bytes());
    push_option_key(&mut data, freeze_authority);

    Instruction::new(TOKEN_PROGRAM_ID, vec![AccountMeta::new(*mint, false)], data)
}

/// Build a `MintTo` instruction.
pub fn mint_to(
    mint: &Pubkey,
    destination: &Pubkey,
    authority: &Pubkey,
    amount: u64,
) -> Result<Instruction, CodecError> {
    require_amount(amount, "mint")?;
    Ok(Instruction::new(
        TOKEN_PROGRAM_ID,
        vec![
            AccountMeta::new(*mint, false),
            AccountMeta::new(*destination, false),
            AccountMeta::new_readonly(*authority, true),
        ],
        amount_data(IX_MINT_TO, amount),
    ))
}

/// Build a `SetAuthority` instruction. Passing `None` removes the authority
/// for good.
pub fn set_authority(
    owned: &Pubkey,
    new_authority: Option<&Pubkey>,
    authority_type: AuthorityType,
    current_authority: &Pubkey,
) -> Instruction {
    let mut data = Vec::with_capacity(35);
    data.push(IX_SET_AUTHORITY);
    data.push(authority_type as u8);
    push_option_key(&mut data, new_authority);

    Instruction::new(
        TOKEN_PROGRAM_ID,
        vec![
            AccountMeta::new(*owned, false),
            AccountMeta::new_readonly(*current_authority, true),
        ],
        data,
    )
}

// ---------------------------------------------------------------------------
// Transfers and delegation
// ---------------------------------------------------------------------------

/// Build an SPL Token `Transfer` instruction.
///
/// SPL Token `Transfer` instruction index = 3, followed by u64 LE amount.
/// Total data: 9 bytes.
pub fn transfer(
    source: &Pubkey,
    destination: &Pubkey,
    owner: &Pubkey,
    amount: u64,
) -> Result<Instruction, CodecError> {
    require_amount(amount, "transfer")?;
    Ok(Instruction::new(
        TOKEN_PROGRAM_ID,
        vec![
            AccountMeta::new(*source, false),
            AccountMeta::new(*destination, false),
            AccountMeta::new_readonly(*owner, true),
        ],
        amount_data(IX_TRANSFER, amount),
    ))
}

/// Build a `TransferChecked` instruction: `[12, amount u64 LE, decimals]`.
pub fn transfer_checked(
    source: &Pubkey,
    mint: &Pubkey,
    destination: &Pubkey,
    owner: &Pubkey,
    amount: u64,
    decimals: u8,
) -> Result<Instruction, CodecError> {
    require_amount(amount, "transfer")?;
    let mut data = amount_data(IX_TRANSFER_CHECKED, amount);
    data.push(decimals);

    Ok(Instruction::new(
        TOKEN_PROGRAM_ID,
        vec![
            AccountMeta::new(*source, false),
            AccountMeta::new_readonly(*mint, false),
            AccountMeta::new(*destination, false),
            AccountMeta::new_readonly(*owner, true),
        ],
        data,
    ))
}

/// Build an `Approve` instruction letting `delegate` move up to `amount`.
pub fn approve(
    source: &Pubkey,
    delegate: &Pubkey,
    owner: &Pubkey,
    amount: u64,
) -> Result<Instruction, CodecError> {
    require_amount(amount, "approve")?;
    Ok(Instruction::new(
        TOKEN_PROGRAM_ID,
        vec![
            AccountMeta::new(*source, false),
            AccountMeta::new_readonly(*delegate, false),
            AccountMeta::new_readonly(*owner, true),
        ],
        amount_data(IX_APPROVE, amount),
    ))
}

/// Build a `Revoke` instruction.
pub fn revoke(source: &Pubkey, owner: &Pubkey) -> Instruction {
    Instruction::new(
        TOKEN_PROGRAM_ID,
        vec![
            AccountMeta::new(*source, false),
            AccountMeta::new_readonly(*owner, true),
        ],
        vec![IX_REVOKE],
    )
}

/// Build a `SyncNative` instruction for a wrapped SOL account.
pub fn sync_native(account: &Pubkey) -> Instruction {
    Instruction::new(
        TOKEN_PROGRAM_ID,
        vec![AccountMeta::new(*account, false)],
        vec![IX_SYNC_NATIVE],
    )
}

fn amount_data(tag: u8, amount: u64) -> Vec<u8> {
    let mut data = Vec::with_capacity(10);
    data.push(tag);
    data.extend_from_slice(&amount.to_le_bytes());
    data
}

fn require_amount(amount: u64, what: &str) -> Result<(), CodecError> {
    if amount == 0 {
        return Err(CodecError::InvalidInstruction(format!(
            "{what} amount must be > 0"
        )));
    }
    Ok(())
}

fn push_option_key(data: &mut Vec<u8>, key: Option<&Pubkey>) {
    match key {
        Some(key) => {
            data.push(1);
            data.extend_from_slice(key.as_bytes());
        }
        None => data.push(0),
    }
}

// ---------------------------------------------------------------------------
// Associated Token Account (PDA) derivation
// ---------------------------------------------------------------------------

/// Build the Associated Token Account program's `Create` instruction.
///
/// With `idempotent` the program succeeds even if the account exists.
pub fn create_associated_token_account(
    payer: &Pubkey,
    wallet: &Pubkey,
    mint: &Pubkey,
    idempotent: bool,
) -> Result<Instruction, CodecError> {
    let ata = derive_associated_token_address(wallet, mint)?;
    let data = if idempotent { vec![1] } else { Vec::new() };

    Ok(Instruction::new(
        ASSOCIATED_TOKEN_PROGRAM_ID,
        vec![
            AccountMeta::new(*payer, true),
            AccountMeta::new(ata, false),
            AccountMeta::new_readonly(*wallet, false),
            AccountMeta::new_readonly(*mint, false),
            AccountMeta::new_readonly(SYSTEM_PROGRAM_ID, false),
            AccountMeta::new_readonly(TOKEN_PROGRAM_ID, false),
        ],
        data,
    ))
}

/// Derive the associated token account address for a wallet + mint pair.
///
/// The ATA is a Program Derived Address (PDA) with seeds:
///   `[wallet_address, token_program_id, mint_address]`
/// derived from the Associated Token Account program.
pub fn derive_associated_token_address(
    wallet: &Pubkey,
    mint: &Pubkey,
) -> Result<Pubkey, CodecError> {
    find_program_address(
        &[wallet.as_ref(), TOKEN_PROGRAM_ID.as_ref(), mint.as_ref()],
        &ASSOCIATED_TOKEN_PROGRAM_ID,
    )
    .map(|(address, _bump)| address)
}

/// Find a valid Program Derived Address (PDA) for the given seeds and program.
///
/// Iterates bump seeds from 255 down to 0, computing
/// `SHA-256(seed_0 || seed_1 || ... || bump || program_id || "ProgramDerivedAddress")`
/// and returning the first result that is NOT a valid Ed25519 point.
pub fn find_program_address(
    seeds: &[&[u8]],
    program_id: &Pubkey,
) -> Result<(Pubkey, u8), CodecError> {
    if seeds.len() >= MAX_SEEDS {
        return Err(CodecError::InvalidInstruction(format!(
            "at most {} seeds allowed, got {}",
            MAX_SEEDS - 1,
            seeds.len()
        )));
    }
    if let Some(seed) = seeds.iter().find(|s| s.len() > MAX_SEED_LEN) {
        return Err(CodecError::InvalidInstruction(format!(
            "seed of {} bytes exceeds {MAX_SEED_LEN}",
            seed.len()
        )));
    }

    for bump in (0u8..=255).rev() {
        if let Some(address) = try_create_program_address(seeds, &[bump], program_id) {
            trace!(%address, bump, "found program address");
            return Ok((address, bump));
        }
    }

    Err(CodecError::InvalidInstruction(
        "could not find valid PDA bump seed".into(),
    ))
}

/// Attempt to create a PDA from seeds + bump + program_id.
///
/// Returns `None` if the hash lands on the Ed25519 curve.
fn try_create_program_address(
    seeds: &[&[u8]],
    bump_seed: &[u8],
    program_id: &Pubkey,
) -> Option<Pubkey> {
    let mut hasher = Sha256::new();

    for seed in seeds {
        hasher.update(seed);
    }
    hasher.update(bump_seed);
    hasher.update(program_id);
    hasher.update(PDA_MARKER);

    let hash: [u8; 32] = hasher.finalize().into();

    if is_on_curve(&hash) {
        return None;
    }

    Some(Pubkey::new(hash))
}

/// Check if 32 bytes decompress to an Ed25519 point.
pub fn is_on_curve(bytes: &[u8; 32]) -> bool {
    curve25519_dalek::edwards::CompressedEdwardsY(*bytes)
        .decompress()
        .is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(byte: u8) -> Pubkey {
        Pubkey::new([byte; 32])
    }

    // -- Constant verification ----------------------------------------------

    #[test]
    fn token_program_id_roundtrip() {
        assert_eq!(
            TOKEN_PROGRAM_ID.to_base58(),
            "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA"
        );
    }

    #[test]
    fn associated_token_program_id_roundtrip() {
        assert_eq!(
            ASSOCIATED_TOKEN_PROGRAM_ID.to_base58(),
            "ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL"
        );
    }

    #[test]
    fn native_mint_roundtrip() {
        assert_eq!(
            NATIVE_MINT.to_base58(),
            "So11111111111111111111111111111111111111112"
        );
    }

    // -- Instruction data ---------------------------------------------------

    #[test]
    fn transfer_data_is_9_bytes() {
        let ix = transfer(&key(1), &key(2), &key(3), 500_000).unwrap();
        assert_eq!(ix.data.len(), 9);
        assert_eq!(ix.data[0], 3);
        assert_eq!(&ix.data[1..], &500_000u64.to_le_bytes());
        assert_eq!(ix.program_id, TOKEN_PROGRAM_ID);
    }

    #[test]
    fn transfer_account_roles() {
        let ix = transfer(&key(1), &key(2), &key(3), 100).unwrap();

        assert_eq!(ix.accounts.len(), 3);
        assert!(ix.accounts[0].is_writable && !ix.accounts[0].is_signer);
        assert!(ix.accounts[1].is_writable && !ix.accounts[1].is_signer);
        assert!(ix.accounts[2].is_signer && !ix.accounts[2].is_writable);
    }

    #[test]
    fn zero_amounts_fail() {
        assert!(transfer(&key(1), &key(2), &key(3), 0).is_err());
        assert!(mint_to(&key(1), &key(2), &key(3), 0).is_err());
        assert!(approve(&key(1), &key(2), &key(3), 0).is_err());
        assert!(transfer_checked(&key(1), &key(2), &key(3), &key(4), 0, 9).is_err());
    }

    #[test]
    fn transfer_checked_layout() {
        let ix = transfer_checked(&key(1), &key(2), &key(3), &key(4), 42, 6).unwrap();
        assert_eq!(ix.data.len(), 10);
        assert_eq!(ix.data[0], 12);
        assert_eq!(ix.data[9], 6);
        assert_eq!(ix.accounts[1].pubkey, key(2));
        assert!(!ix.accounts[1].is_writable);
    }

    #[test]
    fn approve_and_revoke() {
        let ix = approve(&key(1), &key(2), &key(3), 7).unwrap();
        assert_eq!(ix.data[0], 4);
        assert!(!ix.accounts[1].is_signer && !ix.accounts[1].is_writable);

        let ix = revoke(&key(1), &key(3));
        assert_eq!(ix.data, vec![5]);
        assert_eq!(ix.accounts.len(), 2);
        assert!(ix.accounts[1].is_signer);
    }

    #[test]
    fn mint_to_layout() {
        let ix = mint_to(&key(1), &key(2), &key(3), 1_000).unwrap();
        assert_eq!(ix.data[0], 7);
        assert!(ix.accounts[0].is_writable);
        assert!(ix.accounts[2].is_signer);
    }

    #[test]
    fn initialize_mint2_without_freeze_authority() {
        let ix = initialize_mint2(&key(1), &key(2), None, 9);
        assert_eq!(ix.data.len(), 35);
        assert_eq!(ix.data[0], 20);
        assert_eq!(ix.data[1], 9);
        assert_eq!(&ix.data[2..34], key(2).as_bytes());
        assert_eq!(ix.data[34], 0);
    }

    #[test]
    fn initialize_mint2_with_freeze_authority() {
        let ix = initialize_mint2(&key(1), &key(2), Some(&key(3)), 6);
        assert_eq!(ix.data.len(), 67);
        assert_eq!(ix.data[34], 1);
        assert_eq!(&ix.data[35..], key(3).as_bytes());
    }

    #[test]
    fn set_authority_none_removes() {
        let ix = set_authority(&key(1), None, AuthorityType::MintTokens, &key(2));
        assert_eq!(ix.data, vec![6, 0, 0]);

        let ix = set_authority(&key(1), Some(&key(9)), AuthorityType::CloseAccount, &key(2));
        assert_eq!(ix.data.len(), 35);
        assert_eq!(ix.data[1], 3);
        assert_eq!(ix.data[2], 1);
    }

    #[test]
    fn sync_native_is_single_byte() {
        let ix = sync_native(&key(5));
        assert_eq!(ix.data, vec![17]);
        assert!(ix.accounts[0].is_writable);
    }

    // -- PDA derivation -----------------------------------------------------

    #[test]
    fn pda_is_not_on_curve() {
        let ata = derive_associated_token_address(&key(0xAA), &key(0xBB)).unwrap();
        assert!(!is_on_curve(ata.as_bytes()), "PDA must NOT be on the Ed25519 curve");
    }

    #[test]
    fn pda_derivation_is_deterministic() {
        let a = derive_associated_token_address(&key(0x11), &key(0x22)).unwrap();
        let b = derive_associated_token_address(&key(0x11), &key(0x22)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn pda_different_inputs_give_different_atas() {
        let a = derive_associated_token_address(&key(0x01), &key(0xFF)).unwrap();
        let b = derive_associated_token_address(&key(0x02), &key(0xFF)).unwrap();
        let c = derive_associated_token_address(&key(0x01), &key(0xFE)).unwrap();
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn oversized_seed_rejected() {
        let long = [0u8; 33];
        assert!(find_program_address(&[&long], &TOKEN_PROGRAM_ID).is_err());
    }

    #[test]
    fn is_on_curve_accepts_basepoint() {
        let mut basepoint = [0x66u8; 32];
        basepoint[0] = 0x58;
        assert!(is_on_curve(&basepoint));
    }

    #[test]
    fn is_on_curve_rejects_off_curve_bytes() {
        assert!(!is_on_curve(&[0x02; 32]));
    }

    #[test]
    fn create_ata_instruction_layout() {
        let payer = key(0x10);
        let wallet = key(0x20);
        let mint = key(0x30);
        let ix = create_associated_token_account(&payer, &wallet, &mint, false).unwrap();

        assert_eq!(ix.program_id, ASSOCIATED_TOKEN_PROGRAM_ID);
        assert!(ix.data.is_empty());
        assert_eq!(ix.accounts.len(), 6);
        assert!(ix.accounts[0].is_signer && ix.accounts[0].is_writable);
        assert_eq!(
            ix.accounts[1].pubkey,
            derive_associated_token_address(&wallet, &mint).unwrap()
        );
        assert_eq!(ix.accounts[4].pubkey, SYSTEM_PROGRAM_ID);
        assert_eq!(ix.accounts[5].pubkey, TOKEN_PROGRAM_ID);

        let idempotent = create_associated_token_account(&payer, &wallet, &mint, true).unwrap();
        assert_eq!(idempotent.data, vec![1]);
    }

    #[test]
    fn derive_ata_for_usdc_mint() {
        let usdc: Pubkey = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v".parse().unwrap();
        let ata = derive_associated_token_address(&key(0x42), &usdc).unwrap();
        assert!(!is_on_curve(ata.as_bytes()));
        assert_eq!(ata.to_base58().parse::<Pubkey>().unwrap(), ata);
    }
}
