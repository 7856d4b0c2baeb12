//! Solana public keys as 32-byte cross-chain identifiers.
//!
//! Externally a key is Base58 text; on the wire it is the raw 32 bytes,
//! left-padded with zeros when the decoded value is shorter. This matches
//! how EVM contracts hold Solana keys in a `bytes32` slot.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CodecError;

/// Width of a public key on the wire.
pub const PUBKEY_LEN: usize = 32;

/// A 32-byte Solana public key.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pubkey([u8; PUBKEY_LEN]);

impl Pubkey {
    /// The all-zero key. Decoders use it for absent optional keys, since the
    /// EVM side has no null.
    pub const ZERO: Pubkey = Pubkey([0u8; PUBKEY_LEN]);

    pub const fn new(bytes: [u8; PUBKEY_LEN]) -> Self {
        Pubkey(bytes)
    }

    /// Build a key from at most 32 big-endian bytes, left-padding with zeros.
    pub fn from_slice_padded(bytes: &[u8]) -> Result<Self, CodecError> {
        if bytes.len() > PUBKEY_LEN {
            return Err(CodecError::InvalidEncoding(format!(
                "key is {} bytes, at most {PUBKEY_LEN} allowed",
                bytes.len()
            )));
        }
        let mut out = [0u8; PUBKEY_LEN];
        out[PUBKEY_LEN - bytes.len()..].copy_from_slice(bytes);
        Ok(Pubkey(out))
    }

    pub const fn to_bytes(&self) -> [u8; PUBKEY_LEN] {
        self.0
    }

    pub const fn as_bytes(&self) -> &[u8; PUBKEY_LEN] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; PUBKEY_LEN]
    }

    pub fn to_base58(&self) -> String {
        to_base58(&self.0)
    }
}

/// Decode a Base58 key into its 32-byte wire form.
///
/// Shorter values are left-padded. Values wider than 32 bytes are rejected,
/// except for redundant leading zero bytes (leading `1` characters), which
/// carry no value and are dropped.
pub fn to_bytes32(base58: &str) -> Result<[u8; PUBKEY_LEN], CodecError> {
    if base58.is_empty() {
        return Err(CodecError::InvalidEncoding("empty base58 string".into()));
    }

    let decoded = bs58::decode(base58)
        .into_vec()
        .map_err(|e| CodecError::InvalidEncoding(format!("base58 decode failed: {e}")))?;

    let significant = if decoded.len() > PUBKEY_LEN {
        let (excess, tail) = decoded.split_at(decoded.len() - PUBKEY_LEN);
        if excess.iter().any(|b| *b != 0) {
            return Err(CodecError::InvalidEncoding(format!(
                "decoded value is {} bytes, exceeds {PUBKEY_LEN}",
                decoded.len()
            )));
        }
        tail
    } else {
        &decoded[..]
    };

    Pubkey::from_slice_padded(significant).map(|key| key.0)
}

/// Encode 32 bytes as Base58. Never fails.
pub fn to_base58(bytes: &[u8; PUBKEY_LEN]) -> String {
    bs58::encode(bytes).into_string()
}

impl FromStr for Pubkey {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        to_bytes32(s).map(Pubkey)
    }
}

impl From<[u8; PUBKEY_LEN]> for Pubkey {
    fn from(bytes: [u8; PUBKEY_LEN]) -> Self {
        Pubkey(bytes)
    }
}

impl From<Pubkey> for [u8; PUBKEY_LEN] {
    fn from(key: Pubkey) -> Self {
        key.0
    }
}

impl AsRef<[u8]> for Pubkey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Pubkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base58())
    }
}

impl fmt::Debug for Pubkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pubkey({})", self.to_base58())
    }
}

impl Serialize for Pubkey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Pubkey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
