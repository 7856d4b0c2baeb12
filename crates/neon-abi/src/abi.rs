//! Minimal ABI encoding for EVM function calls and return data.
//!
//! Just enough of the Solidity ABI to call the composability contracts and
//! to read their return words, without pulling in a full ABI parser.

use sha3::{Digest, Keccak256};

use crate::error::AbiError;

/// Width of one ABI word.
pub const WORD_LEN: usize = 32;

/// A single ABI-encoded parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiParam {
    /// A `bytes32` value, encoded verbatim.
    Bytes32([u8; 32]),
    /// Any unsigned integer up to 64 bits (`uint8` … `uint64`), left-padded.
    Uint64(u64),
    /// A `bool`, encoded as 0 or 1 in the last byte.
    Bool(bool),
    /// Dynamic `bytes`: an offset word in the head, then a length word and
    /// the right-padded payload in the tail.
    Bytes(Vec<u8>),
}

/// The 4-byte selector for a canonical signature such as
/// `execute(uint64,bytes32,bytes)`.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = Keccak256::digest(signature.as_bytes());
    let mut out = [0u8; 4];
    out.copy_from_slice(&hash[..4]);
    out
}

/// Encodes a function call with the given 4-byte selector and ABI parameters.
///
/// The output is `selector || encode_params(params)`.
pub fn encode_function_call(selector: [u8; 4], params: &[AbiParam]) -> Vec<u8> {
    let mut data = Vec::with_capacity(4 + encoded_len(params));
    data.extend_from_slice(&selector);
    data.extend_from_slice(&encode_params(params));
    data
}

/// Encodes a parameter tuple using head/tail layout.
pub fn encode_params(params: &[AbiParam]) -> Vec<u8> {
    let head_len = params.len() * WORD_LEN;
    let mut head = Vec::with_capacity(encoded_len(params));
    let mut tail = Vec::new();

    for param in params {
        match param {
            AbiParam::Bytes(bytes) => {
                head.extend_from_slice(&uint_word((head_len + tail.len()) as u64));
                tail.extend_from_slice(&uint_word(bytes.len() as u64));
                tail.extend_from_slice(bytes);
                tail.resize(tail.len() + padding(bytes.len()), 0);
            }
            AbiParam::Bytes32(value) => head.extend_from_slice(value),
            AbiParam::Uint64(value) => head.extend_from_slice(&uint_word(*value)),
            AbiParam::Bool(value) => head.extend_from_slice(&uint_word(*value as u64)),
        }
    }

    head.extend_from_slice(&tail);
    head
}

fn encoded_len(params: &[AbiParam]) -> usize {
    params
        .iter()
        .map(|p| match p {
            AbiParam::Bytes(bytes) => 2 * WORD_LEN + bytes.len() + padding(bytes.len()),
            _ => WORD_LEN,
        })
        .sum()
}

fn padding(len: usize) -> usize {
    (WORD_LEN - len % WORD_LEN) % WORD_LEN
}

fn uint_word(value: u64) -> [u8; WORD_LEN] {
    let mut word = [0u8; WORD_LEN];
    word[WORD_LEN - 8..].copy_from_slice(&value.to_be_bytes());
    word
}

// ---------------------------------------------------------------------------
// Return-data decoding
// ---------------------------------------------------------------------------

fn word(data: &[u8], index: usize) -> Result<&[u8], AbiError> {
    index
        .checked_mul(WORD_LEN)
        .and_then(|start| data.get(start..start.checked_add(WORD_LEN)?))
        .ok_or_else(|| {
            AbiError::Encoding(format!(
                "word {index} out of range for {} bytes of return data",
                data.len()
            ))
        })
}

/// Read word `index` as a `bytes32`.
pub fn decode_bytes32_word(data: &[u8], index: usize) -> Result<[u8; 32], AbiError> {
    let mut out = [0u8; 32];
    out.copy_from_slice(word(data, index)?);
    Ok(out)
}

/// Read word `index` as an unsigned integer, rejecting values wider than
/// 64 bits.
pub fn decode_uint64_word(data: &[u8], index: usize) -> Result<u64, AbiError> {
    let w = word(data, index)?;
    if w[..WORD_LEN - 8].iter().any(|b| *b != 0) {
        return Err(AbiError::Encoding(format!(
            "word {index} does not fit in 64 bits"
        )));
    }
    let mut out = [0u8; 8];
    out.copy_from_slice(&w[WORD_LEN - 8..]);
    Ok(u64::from_be_bytes(out))
}

/// Read word `index` as a `bool`.
pub fn decode_bool_word(data: &[u8], index: usize) -> Result<bool, AbiError> {
    match decode_uint64_word(data, index)? {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(AbiError::Encoding(format!(
            "word {index} is {other}, not a bool"
        ))),
    }
}

/// Read the dynamic `bytes` whose offset sits in head word `index`.
pub fn decode_bytes(data: &[u8], index: usize) -> Result<Vec<u8>, AbiError> {
    let offset = usize::try_from(decode_uint64_word(data, index)?)
        .map_err(|e| AbiError::Encoding(format!("bytes offset: {e}")))?;
    if offset % WORD_LEN != 0 {
        return Err(AbiError::Encoding(format!(
            "bytes offset {offset} is not word aligned"
        )));
    }

    let len_word = offset / WORD_LEN;
    let len = usize::try_from(decode_uint64_word(data, len_word)?)
        .map_err(|e| AbiError::Encoding(format!("bytes length: {e}")))?;
    offset
        .checked_add(WORD_LEN)
        .and_then(|start| data.get(start..start.checked_add(len)?))
        .map(<[u8]>::to_vec)
        .ok_or_else(|| {
            AbiError::Encoding(format!(
                "bytes of length {len} at offset {offset} exceed {} bytes",
                data.len()
            ))
        })
}
