//! Wire format settings.
//!
//! The receiving bridge contract fixes the byte order of the two 8-byte
//! prefixes in a packed instruction. Big-endian is the default; the
//! little-endian variant matches Solana's native `u64` encoding.

use serde::{Deserialize, Serialize};

/// Width of the account-count and data-length prefixes.
pub const LENGTH_PREFIX_LEN: usize = 8;

/// Byte order of the 8-byte length prefixes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LengthPrefix {
    #[default]
    BigEndian,
    LittleEndian,
}

impl LengthPrefix {
    pub fn encode(self, value: u64) -> [u8; LENGTH_PREFIX_LEN] {
        match self {
            LengthPrefix::BigEndian => value.to_be_bytes(),
            LengthPrefix::LittleEndian => value.to_le_bytes(),
        }
    }

    pub fn decode(self, bytes: [u8; LENGTH_PREFIX_LEN]) -> u64 {
        match self {
            LengthPrefix::BigEndian => u64::from_be_bytes(bytes),
            LengthPrefix::LittleEndian => u64::from_le_bytes(bytes),
        }
    }
}

/// Settings shared by the instruction encoders and the inverse decoder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WireConfig {
    pub length_prefix: LengthPrefix,
}

impl WireConfig {
    pub const fn new(length_prefix: LengthPrefix) -> Self {
        WireConfig { length_prefix }
    }
}
