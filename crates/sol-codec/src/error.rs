use thiserror::Error;

/// Errors produced while encoding or decoding Solana data for the bridge.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("invalid encoding: {0}")]
    InvalidEncoding(String),

    #[error("malformed account: expected {expected} bytes, got {actual}")]
    MalformedAccount { expected: usize, actual: usize },

    #[error("account override index {index} out of range for {len} accounts")]
    IndexOverrideOutOfRange { index: usize, len: usize },

    #[error("program id is empty")]
    EmptyProgramId,

    #[error("truncated wire instruction: {0}")]
    TruncatedWire(String),

    #[error("invalid account data: {0}")]
    InvalidAccountData(String),

    #[error("invalid instruction: {0}")]
    InvalidInstruction(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_invalid_encoding() {
        let err = CodecError::InvalidEncoding("bad base58".into());
        assert_eq!(err.to_string(), "invalid encoding: bad base58");
    }

    #[test]
    fn display_malformed_account() {
        let err = CodecError::MalformedAccount {
            expected: 82,
            actual: 81,
        };
        assert_eq!(
            err.to_string(),
            "malformed account: expected 82 bytes, got 81"
        );
    }

    #[test]
    fn display_index_override_out_of_range() {
        let err = CodecError::IndexOverrideOutOfRange { index: 5, len: 2 };
        assert_eq!(
            err.to_string(),
            "account override index 5 out of range for 2 accounts"
        );
    }

    #[test]
    fn display_empty_program_id() {
        assert_eq!(CodecError::EmptyProgramId.to_string(), "program id is empty");
    }

    #[test]
    fn display_truncated_wire() {
        let err = CodecError::TruncatedWire("missing data prefix".into());
        assert_eq!(
            err.to_string(),
            "truncated wire instruction: missing data prefix"
        );
    }

    #[test]
    fn error_trait_is_implemented() {
        let err: Box<dyn std::error::Error> = Box::new(CodecError::EmptyProgramId);
        assert!(err.to_string().contains("program id"));
    }

    #[test]
    fn debug_format_works() {
        let err = CodecError::InvalidAccountData("state 7".into());
        let debug = format!("{:?}", err);
        assert!(debug.contains("InvalidAccountData"));
    }
}
