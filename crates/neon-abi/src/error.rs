use sol_codec::CodecError;
use thiserror::Error;

/// Errors raised while building or reading EVM call data.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AbiError {
    #[error("encoding error: {0}")]
    Encoding(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error(transparent)]
    Codec(#[from] CodecError),
}
