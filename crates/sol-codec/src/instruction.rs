//! Packing Solana instructions for remote execution across the bridge.
//!
//! An EVM contract cannot hold a native `Instruction`, so the instruction is
//! flattened into a single self-describing byte string that the bridge
//! parses back and executes. Layout (prefix byte order per [`WireConfig`],
//! big-endian by default):
//!
//! ```text
//! WireInstruction:
//!   program_id              32 bytes
//!   num_accounts            u64 (8 bytes)
//!   accounts[]              34 bytes * num_accounts
//!   data_len                u64 (8 bytes)
//!   data                    u8 * data_len
//!
//! Account record:
//!   pubkey                  32 bytes
//!   is_signer               u8 (0 or 1)
//!   is_writable             u8 (0 or 1)
//! ```
//!
//! Account order is preserved exactly. Solana programs address their
//! accounts by position, so nothing here deduplicates or sorts.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{WireConfig, LENGTH_PREFIX_LEN};
use crate::error::CodecError;
use crate::pubkey::{Pubkey, PUBKEY_LEN};

/// Size of one encoded account record: pubkey + signer flag + writable flag.
pub const ACCOUNT_RECORD_LEN: usize = PUBKEY_LEN + 2;

// ---------------------------------------------------------------------------
// Data structures
// ---------------------------------------------------------------------------

/// A single account reference in a Solana instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountMeta {
    pub pubkey: Pubkey,
    pub is_signer: bool,
    pub is_writable: bool,
}

impl AccountMeta {
    /// A writable account.
    pub fn new(pubkey: Pubkey, is_signer: bool) -> Self {
        AccountMeta {
            pubkey,
            is_signer,
            is_writable: true,
        }
    }

    /// A read-only account.
    pub fn new_readonly(pubkey: Pubkey, is_signer: bool) -> Self {
        AccountMeta {
            pubkey,
            is_signer,
            is_writable: false,
        }
    }
}

/// A native Solana instruction before packing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    pub program_id: Pubkey,
    pub accounts: Vec<AccountMeta>,
    pub data: Vec<u8>,
}

impl Instruction {
    pub fn new(program_id: Pubkey, accounts: Vec<AccountMeta>, data: Vec<u8>) -> Self {
        Instruction {
            program_id,
            accounts,
            data,
        }
    }

    /// Build an instruction whose program id is given as Base58 text.
    pub fn from_base58(
        program_id: &str,
        accounts: Vec<AccountMeta>,
        data: Vec<u8>,
    ) -> Result<Self, CodecError> {
        if program_id.is_empty() {
            return Err(CodecError::EmptyProgramId);
        }
        Ok(Instruction::new(program_id.parse()?, accounts, data))
    }

    /// Build an instruction whose program id is given as raw big-endian
    /// bytes (at most 32, left-padded).
    pub fn from_raw_program_id(
        program_id: &[u8],
        accounts: Vec<AccountMeta>,
        data: Vec<u8>,
    ) -> Result<Self, CodecError> {
        if program_id.is_empty() {
            return Err(CodecError::EmptyProgramId);
        }
        Ok(Instruction::new(
            Pubkey::from_slice_padded(program_id)?,
            accounts,
            data,
        ))
    }
}

/// Sparse replacements keyed by account index.
///
/// Used when the executing side must substitute its own derived address for
/// a placeholder account. A replacement fully overwrites the tuple at that
/// index.
pub type AccountOverrides = BTreeMap<usize, AccountMeta>;

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Encode an ordered account list with the default wire settings.
pub fn encode_account_list(
    accounts: &[AccountMeta],
    overrides: &AccountOverrides,
) -> Result<Vec<u8>, CodecError> {
    encode_account_list_with(accounts, overrides, &WireConfig::default())
}

/// Encode an ordered account list: 8-byte count, then one 34-byte record
/// per account, applying any overrides by index.
pub fn encode_account_list_with(
    accounts: &[AccountMeta],
    overrides: &AccountOverrides,
    config: &WireConfig,
) -> Result<Vec<u8>, CodecError> {
    check_overrides(accounts, overrides)?;

    let mut buf = Vec::with_capacity(LENGTH_PREFIX_LEN + accounts.len() * ACCOUNT_RECORD_LEN);
    write_account_list(&mut buf, accounts, overrides, config);
    Ok(buf)
}

/// Encode an opaque payload with the default wire settings.
pub fn encode_instruction_data(data: &[u8]) -> Vec<u8> {
    encode_instruction_data_with(data, &WireConfig::default())
}

/// Encode an opaque payload: 8-byte length, then the raw bytes.
pub fn encode_instruction_data_with(data: &[u8], config: &WireConfig) -> Vec<u8> {
    let mut buf = Vec::with_capacity(LENGTH_PREFIX_LEN + data.len());
    write_instruction_data(&mut buf, data, config);
    buf
}

/// Total size of the packed form of `ix`.
pub fn packed_len(ix: &Instruction) -> usize {
    PUBKEY_LEN
        + LENGTH_PREFIX_LEN
        + ix.accounts.len() * ACCOUNT_RECORD_LEN
        + LENGTH_PREFIX_LEN
        + ix.data.len()
}

/// Pack an instruction with default settings and no overrides.
pub fn pack_instruction(ix: &Instruction) -> Vec<u8> {
    let mut buf = Vec::with_capacity(packed_len(ix));
    write_instruction(&mut buf, ix, &AccountOverrides::new(), &WireConfig::default());
    buf
}

/// Pack an instruction, replacing the accounts named in `overrides`.
pub fn pack_instruction_with_overrides(
    ix: &Instruction,
    overrides: &AccountOverrides,
) -> Result<Vec<u8>, CodecError> {
    pack_instruction_with(ix, overrides, &WireConfig::default())
}

/// Pack an instruction: `program_id ‖ account list ‖ data`.
pub fn pack_instruction_with(
    ix: &Instruction,
    overrides: &AccountOverrides,
    config: &WireConfig,
) -> Result<Vec<u8>, CodecError> {
    check_overrides(&ix.accounts, overrides)?;

    let mut buf = Vec::with_capacity(packed_len(ix));
    write_instruction(&mut buf, ix, overrides, config);
    Ok(buf)
}

fn check_overrides(accounts: &[AccountMeta], overrides: &AccountOverrides) -> Result<(), CodecError> {
    // Keys are sorted, so the last one is the largest.
    match overrides.keys().next_back() {
        Some(&index) if index >= accounts.len() => {
            debug!(index, len = accounts.len(), "rejecting account override");
            Err(CodecError::IndexOverrideOutOfRange {
                index,
                len: accounts.len(),
            })
        }
        _ => Ok(()),
    }
}

fn write_instruction(
    buf: &mut Vec<u8>,
    ix: &Instruction,
    overrides: &AccountOverrides,
    config: &WireConfig,
) {
    buf.extend_from_slice(ix.program_id.as_bytes());
    write_account_list(buf, &ix.accounts, overrides, config);
    write_instruction_data(buf, &ix.data, config);

    debug!(
        program_id = %ix.program_id,
        accounts = ix.accounts.len(),
        overrides = overrides.len(),
        data_len = ix.data.len(),
        "packed instruction"
    );
}

fn write_account_list(
    buf: &mut Vec<u8>,
    accounts: &[AccountMeta],
    overrides: &AccountOverrides,
    config: &WireConfig,
) {
    buf.extend_from_slice(&config.length_prefix.encode(accounts.len() as u64));
    for (i, original) in accounts.iter().enumerate() {
        let meta = overrides.get(&i).unwrap_or(original);
        buf.extend_from_slice(meta.pubkey.as_bytes());
        buf.push(meta.is_signer as u8);
        buf.push(meta.is_writable as u8);
    }
}

fn write_instruction_data(buf: &mut Vec<u8>, data: &[u8], config: &WireConfig) {
    buf.extend_from_slice(&config.length_prefix.encode(data.len() as u64));
    buf.extend_from_slice(data);
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Parse a packed instruction back into its parts.
///
/// This is the exact inverse of [`pack_instruction_with`]: the buffer must
/// be consumed completely, and every flag byte must be 0 or 1.
pub fn unpack_instruction(bytes: &[u8], config: &WireConfig) -> Result<Instruction, CodecError> {
    let mut reader = WireReader { bytes, pos: 0 };

    let program_id = Pubkey::new(reader.take_array::<PUBKEY_LEN>("program id")?);

    let count = reader.take_prefix(config, "account count")?;
    let table_len = usize::try_from(count)
        .ok()
        .and_then(|n| n.checked_mul(ACCOUNT_RECORD_LEN))
        .filter(|len| *len <= reader.remaining())
        .ok_or_else(|| {
            CodecError::TruncatedWire(format!(
                "account table of {count} records exceeds {} remaining bytes",
                reader.remaining()
            ))
        })?;

    let mut accounts = Vec::with_capacity(table_len / ACCOUNT_RECORD_LEN);
    for index in 0..table_len / ACCOUNT_RECORD_LEN {
        let pubkey = Pubkey::new(reader.take_array::<PUBKEY_LEN>("account pubkey")?);
        let [signer, writable] = reader.take_array::<2>("account flags")?;
        accounts.push(AccountMeta {
            pubkey,
            is_signer: flag(signer, index, "signer")?,
            is_writable: flag(writable, index, "writable")?,
        });
    }

    let data_len = reader.take_prefix(config, "data length")?;
    let data_len = usize::try_from(data_len)
        .ok()
        .filter(|len| *len <= reader.remaining())
        .ok_or_else(|| {
            CodecError::TruncatedWire(format!(
                "data length {data_len} exceeds {} remaining bytes",
                reader.remaining()
            ))
        })?;
    let data = reader.take(data_len, "data")?.to_vec();

    if reader.remaining() != 0 {
        return Err(CodecError::InvalidEncoding(format!(
            "{} trailing bytes after instruction data",
            reader.remaining()
        )));
    }

    Ok(Instruction {
        program_id,
        accounts,
        data,
    })
}

fn flag(byte: u8, index: usize, name: &str) -> Result<bool, CodecError> {
    match byte {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(CodecError::InvalidAccountData(format!(
            "account {index} {name} flag is {other}, expected 0 or 1"
        ))),
    }
}

struct WireReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> WireReader<'a> {
    fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    fn take(&mut self, len: usize, what: &str) -> Result<&'a [u8], CodecError> {
        if len > self.remaining() {
            return Err(CodecError::TruncatedWire(format!(
                "need {len} bytes for {what}, {} remaining",
                self.remaining()
            )));
        }
        let out = &self.bytes[self.pos..self.pos + len];
        self.pos += len;
        Ok(out)
    }

    fn take_array<const N: usize>(&mut self, what: &str) -> Result<[u8; N], CodecError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N, what)?);
        Ok(out)
    }

    fn take_prefix(&mut self, config: &WireConfig, what: &str) -> Result<u64, CodecError> {
        let raw = self.take_array::<LENGTH_PREFIX_LEN>(what)?;
        Ok(config.length_prefix.decode(raw))
    }
}
