//! Fixed-layout decoders for SPL Token account state.
//!
//! Integers inside these records are little-endian, as written by the Token
//! Program. Optional keys are stored as `COption<Pubkey>`: a u32 LE tag
//! (0 = none, 1 = some) followed by a 32-byte slot. Absent keys decode to
//! [`Pubkey::ZERO`] rather than `None` because the EVM side reading these
//! views has no null.
//!
//! ```text
//! Mint (82 bytes):
//!   0   36  mint_authority     COption<Pubkey>
//!   36  8   supply             u64
//!   44  1   decimals           u8
//!   45  1   is_initialized     bool
//!   46  36  freeze_authority   COption<Pubkey>
//!
//! Account (165 bytes):
//!   0   32  mint               Pubkey
//!   32  32  owner              Pubkey
//!   64  8   amount             u64
//!   72  36  delegate           COption<Pubkey>
//!   108 1   state              u8 (0 uninitialized, 1 initialized, 2 frozen)
//!   109 12  is_native          COption<u64> (rent-exempt reserve)
//!   121 8   delegated_amount   u64
//!   129 36  close_authority    COption<Pubkey>
//! ```

use serde::Serialize;
use tracing::{debug, trace};

use crate::error::CodecError;
use crate::pubkey::{Pubkey, PUBKEY_LEN};

/// Size of an SPL Token mint record.
pub const MINT_LEN: usize = 82;

/// Size of an SPL Token account record.
pub const TOKEN_ACCOUNT_LEN: usize = 165;

const COPTION_TAG_LEN: usize = 4;
const COPTION_PUBKEY_LEN: usize = COPTION_TAG_LEN + PUBKEY_LEN;
const COPTION_U64_LEN: usize = COPTION_TAG_LEN + 8;

// Mint offsets.
const MINT_AUTHORITY: usize = 0;
const MINT_SUPPLY: usize = 36;
const MINT_DECIMALS: usize = 44;
const MINT_IS_INITIALIZED: usize = 45;
const MINT_FREEZE_AUTHORITY: usize = 46;

// Account offsets.
const ACCOUNT_MINT: usize = 0;
const ACCOUNT_OWNER: usize = 32;
const ACCOUNT_AMOUNT: usize = 64;
const ACCOUNT_DELEGATE: usize = 72;
const ACCOUNT_STATE: usize = 108;
const ACCOUNT_IS_NATIVE: usize = 109;
const ACCOUNT_DELEGATED_AMOUNT: usize = 121;
const ACCOUNT_CLOSE_AUTHORITY: usize = 129;

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

/// Decoded SPL Token mint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TokenMintView {
    /// [`Pubkey::ZERO`] when the mint has no authority (fixed supply).
    pub mint_authority: Pubkey,
    pub supply: u64,
    pub decimals: u8,
    pub is_initialized: bool,
    /// [`Pubkey::ZERO`] when no freeze authority is set.
    pub freeze_authority: Pubkey,
}

/// Token account state byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AccountState {
    Uninitialized = 0,
    Initialized = 1,
    Frozen = 2,
}

impl TryFrom<u8> for AccountState {
    type Error = CodecError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(AccountState::Uninitialized),
            1 => Ok(AccountState::Initialized),
            2 => Ok(AccountState::Frozen),
            other => Err(CodecError::InvalidAccountData(format!(
                "account state {other} is not 0, 1 or 2"
            ))),
        }
    }
}

/// Decoded SPL Token account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TokenAccountView {
    pub mint: Pubkey,
    pub owner: Pubkey,
    pub amount: u64,
    /// [`Pubkey::ZERO`] when no delegate is approved.
    pub delegate: Pubkey,
    pub state: AccountState,
    /// Rent-exempt reserve, present only for wrapped SOL accounts.
    pub rent_exempt_reserve: Option<u64>,
    pub delegated_amount: u64,
    /// [`Pubkey::ZERO`] when no close authority is set.
    pub close_authority: Pubkey,
}

impl TokenAccountView {
    /// Frozen accounts count as initialized.
    pub fn is_initialized(&self) -> bool {
        self.state != AccountState::Uninitialized
    }

    pub fn is_frozen(&self) -> bool {
        self.state == AccountState::Frozen
    }

    /// Whether this account holds wrapped SOL.
    pub fn is_native(&self) -> bool {
        self.rent_exempt_reserve.is_some()
    }
}

// ---------------------------------------------------------------------------
// Decoders
// ---------------------------------------------------------------------------

/// Decode an 82-byte mint record.
pub fn decode_mint(raw: &[u8]) -> Result<TokenMintView, CodecError> {
    let raw = expect_len::<MINT_LEN>(raw, "mint")?;

    let view = TokenMintView {
        mint_authority: read_coption_pubkey(raw, MINT_AUTHORITY, "mint_authority")?,
        supply: read_u64_le(raw, MINT_SUPPLY),
        decimals: raw[MINT_DECIMALS],
        is_initialized: read_bool(raw[MINT_IS_INITIALIZED], "is_initialized")?,
        freeze_authority: read_coption_pubkey(raw, MINT_FREEZE_AUTHORITY, "freeze_authority")?,
    };

    trace!(supply = view.supply, decimals = view.decimals, "decoded mint");
    Ok(view)
}

/// Decode a 165-byte token account record.
pub fn decode_token_account(raw: &[u8]) -> Result<TokenAccountView, CodecError> {
    let raw = expect_len::<TOKEN_ACCOUNT_LEN>(raw, "token account")?;

    let view = TokenAccountView {
        mint: read_pubkey(raw, ACCOUNT_MINT),
        owner: read_pubkey(raw, ACCOUNT_OWNER),
        amount: read_u64_le(raw, ACCOUNT_AMOUNT),
        delegate: read_coption_pubkey(raw, ACCOUNT_DELEGATE, "delegate")?,
        state: AccountState::try_from(raw[ACCOUNT_STATE])?,
        rent_exempt_reserve: read_coption_u64(raw, ACCOUNT_IS_NATIVE, "is_native")?,
        delegated_amount: read_u64_le(raw, ACCOUNT_DELEGATED_AMOUNT),
        close_authority: read_coption_pubkey(raw, ACCOUNT_CLOSE_AUTHORITY, "close_authority")?,
    };

    trace!(
        mint = %view.mint,
        owner = %view.owner,
        amount = view.amount,
        state = ?view.state,
        "decoded token account"
    );
    Ok(view)
}

// ---------------------------------------------------------------------------
// Field readers
// ---------------------------------------------------------------------------

fn expect_len<'a, const N: usize>(raw: &'a [u8], kind: &str) -> Result<&'a [u8; N], CodecError> {
    raw.try_into().map_err(|_| {
        debug!(kind, expected = N, actual = raw.len(), "rejecting account record");
        CodecError::MalformedAccount {
            expected: N,
            actual: raw.len(),
        }
    })
}

fn read_pubkey(raw: &[u8], offset: usize) -> Pubkey {
    let mut out = [0u8; PUBKEY_LEN];
    out.copy_from_slice(&raw[offset..offset + PUBKEY_LEN]);
    Pubkey::new(out)
}

fn read_u32_le(raw: &[u8], offset: usize) -> u32 {
    let mut out = [0u8; 4];
    out.copy_from_slice(&raw[offset..offset + 4]);
    u32::from_le_bytes(out)
}

fn read_u64_le(raw: &[u8], offset: usize) -> u64 {
    let mut out = [0u8; 8];
    out.copy_from_slice(&raw[offset..offset + 8]);
    u64::from_le_bytes(out)
}

fn read_bool(byte: u8, field: &str) -> Result<bool, CodecError> {
    match byte {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(CodecError::InvalidAccountData(format!(
            "{field} byte is {other}, expected 0 or 1"
        ))),
    }
}

/// Returns whether the COption at `offset` is present.
fn read_coption_tag(raw: &[u8], offset: usize, field: &str) -> Result<bool, CodecError> {
    match read_u32_le(raw, offset) {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(CodecError::InvalidAccountData(format!(
            "{field} option tag is {other}, expected 0 or 1"
        ))),
    }
}

fn read_coption_pubkey(raw: &[u8], offset: usize, field: &str) -> Result<Pubkey, CodecError> {
    debug_assert!(offset + COPTION_PUBKEY_LEN <= raw.len());
    if read_coption_tag(raw, offset, field)? {
        Ok(read_pubkey(raw, offset + COPTION_TAG_LEN))
    } else {
        Ok(Pubkey::ZERO)
    }
}

fn read_coption_u64(raw: &[u8], offset: usize, field: &str) -> Result<Option<u64>, CodecError> {
    debug_assert!(offset + COPTION_U64_LEN <= raw.len());
    if read_coption_tag(raw, offset, field)? {
        Ok(Some(read_u64_le(raw, offset + COPTION_TAG_LEN)))
    } else {
        Ok(None)
    }
}
