//! Call data for the composability contracts and the word layout of the
//! token-data views they return.
//!
//! The contracts take a packed Solana instruction as a single `bytes`
//! argument: `execute(uint64 lamports, bytes32 salt, bytes instruction)`.
//! Token views come back as flat tuples of 32-byte words, with absent keys
//! as the zero word.

use sol_codec::instruction::{pack_instruction_with, unpack_instruction};
use sol_codec::{AccountOverrides, Instruction, TokenAccountView, TokenMintView, WireConfig};
use tracing::debug;

use crate::abi::{
    decode_bytes, decode_bytes32_word, decode_uint64_word, encode_function_call, encode_params,
    selector, AbiParam,
};
use crate::error::AbiError;

/// Canonical signature of the bridge entry point.
pub const EXECUTE_SIGNATURE: &str = "execute(uint64,bytes32,bytes)";

/// Words in an encoded [`TokenMintView`].
pub const MINT_VIEW_WORDS: usize = 5;

/// Words in an encoded [`TokenAccountView`].
pub const TOKEN_ACCOUNT_VIEW_WORDS: usize = 9;

/// A decoded `execute` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecuteCall {
    pub lamports: u64,
    pub salt: [u8; 32],
    pub instruction: Instruction,
}

/// Calldata for `execute(lamports, salt, pack(ix))` with default wire
/// settings.
pub fn encode_execute(lamports: u64, salt: [u8; 32], ix: &Instruction) -> Result<Vec<u8>, AbiError> {
    encode_execute_with(lamports, salt, ix, &AccountOverrides::new(), &WireConfig::default())
}

pub fn encode_execute_with(
    lamports: u64,
    salt: [u8; 32],
    ix: &Instruction,
    overrides: &AccountOverrides,
    config: &WireConfig,
) -> Result<Vec<u8>, AbiError> {
    let packed = pack_instruction_with(ix, overrides, config)?;
    debug!(lamports, packed_len = packed.len(), "encoding execute call");

    Ok(encode_function_call(
        selector(EXECUTE_SIGNATURE),
        &[
            AbiParam::Uint64(lamports),
            AbiParam::Bytes32(salt),
            AbiParam::Bytes(packed),
        ],
    ))
}

/// Parse `execute` calldata back into its arguments.
pub fn decode_execute(calldata: &[u8], config: &WireConfig) -> Result<ExecuteCall, AbiError> {
    let expected = selector(EXECUTE_SIGNATURE);
    let (sel, args) = calldata
        .split_first_chunk::<4>()
        .ok_or_else(|| AbiError::Encoding("calldata shorter than a selector".into()))?;
    if *sel != expected {
        return Err(AbiError::Encoding(format!(
            "selector {} is not execute ({})",
            hex::encode(sel),
            hex::encode(expected)
        )));
    }

    let packed = decode_bytes(args, 2)?;
    Ok(ExecuteCall {
        lamports: decode_uint64_word(args, 0)?,
        salt: decode_bytes32_word(args, 1)?,
        instruction: unpack_instruction(&packed, config)?,
    })
}

/// Encode a mint view as
/// `(bytes32 mintAuthority, uint64 supply, uint8 decimals, bool isInitialized, bytes32 freezeAuthority)`.
pub fn encode_mint_view(view: &TokenMintView) -> Vec<u8> {
    encode_params(&[
        AbiParam::Bytes32(view.mint_authority.to_bytes()),
        AbiParam::Uint64(view.supply),
        AbiParam::Uint64(view.decimals as u64),
        AbiParam::Bool(view.is_initialized),
        AbiParam::Bytes32(view.freeze_authority.to_bytes()),
    ])
}

/// Encode a token account view as
/// `(bytes32 mint, bytes32 owner, uint64 amount, bytes32 delegate, uint8 state,
///   bool isNative, uint64 rentExemptReserve, uint64 delegatedAmount, bytes32 closeAuthority)`.
///
/// `rentExemptReserve` is zero for non-native accounts.
pub fn encode_token_account_view(view: &TokenAccountView) -> Vec<u8> {
    encode_params(&[
        AbiParam::Bytes32(view.mint.to_bytes()),
        AbiParam::Bytes32(view.owner.to_bytes()),
        AbiParam::Uint64(view.amount),
        AbiParam::Bytes32(view.delegate.to_bytes()),
        AbiParam::Uint64(view.state as u64),
        AbiParam::Bool(view.is_native()),
        AbiParam::Uint64(view.rent_exempt_reserve.unwrap_or(0)),
        AbiParam::Uint64(view.delegated_amount),
        AbiParam::Bytes32(view.close_authority.to_bytes()),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::decode_bool_word;
    use sol_codec::{AccountMeta, AccountState, Pubkey, TOKEN_PROGRAM_ID};

    fn sample_ix() -> Instruction {
        Instruction::new(
            TOKEN_PROGRAM_ID,
            vec![
                AccountMeta::new(Pubkey::new([1; 32]), true),
                AccountMeta::new(Pubkey::new([2; 32]), false),
            ],
            vec![3, 1, 0, 0, 0, 0, 0, 0, 0],
        )
    }

    #[test]
    fn execute_calldata_layout() {
        let salt = [0x5A; 32];
        let data = encode_execute(1_000, salt, &sample_ix()).unwrap();

        assert_eq!(&data[..4], &selector(EXECUTE_SIGNATURE));
        let args = &data[4..];
        assert_eq!(decode_uint64_word(args, 0).unwrap(), 1_000);
        assert_eq!(decode_bytes32_word(args, 1).unwrap(), salt);
        // Offset of the dynamic argument: right after three head words.
        assert_eq!(decode_uint64_word(args, 2).unwrap(), 96);
        // Packed instruction length: 32 + 8 + 2 * 34 + 8 + 9.
        assert_eq!(decode_uint64_word(args, 3).unwrap(), 125);
        assert_eq!(args.len() % 32, 0);
    }

    #[test]
    fn execute_roundtrip() {
        let ix = sample_ix();
        let data = encode_execute(0, [0; 32], &ix).unwrap();
        let call = decode_execute(&data, &WireConfig::default()).unwrap();
        assert_eq!(call.lamports, 0);
        assert_eq!(call.instruction, ix);
    }

    #[test]
    fn execute_override_out_of_range() {
        let overrides = AccountOverrides::from([(9, AccountMeta::new(Pubkey::ZERO, false))]);
        let err = encode_execute_with(0, [0; 32], &sample_ix(), &overrides, &WireConfig::default())
            .unwrap_err();
        assert!(matches!(
            err,
            AbiError::Codec(sol_codec::CodecError::IndexOverrideOutOfRange { index: 9, len: 2 })
        ));
    }

    #[test]
    fn decode_execute_rejects_other_selector() {
        let mut data = encode_execute(0, [0; 32], &sample_ix()).unwrap();
        data[0] ^= 0xFF;
        assert!(matches!(
            decode_execute(&data, &WireConfig::default()),
            Err(AbiError::Encoding(_))
        ));
        assert!(decode_execute(&[0x01, 0x02], &WireConfig::default()).is_err());
    }

    #[test]
    fn mint_view_words() {
        let view = TokenMintView {
            mint_authority: Pubkey::new([0xAA; 32]),
            supply: 1_000_000,
            decimals: 9,
            is_initialized: true,
            freeze_authority: Pubkey::ZERO,
        };
        let words = encode_mint_view(&view);

        assert_eq!(words.len(), MINT_VIEW_WORDS * 32);
        assert_eq!(decode_bytes32_word(&words, 0).unwrap(), [0xAA; 32]);
        assert_eq!(decode_uint64_word(&words, 1).unwrap(), 1_000_000);
        assert_eq!(decode_uint64_word(&words, 2).unwrap(), 9);
        assert!(decode_bool_word(&words, 3).unwrap());
        assert_eq!(decode_bytes32_word(&words, 4).unwrap(), [0u8; 32]);
    }

    #[test]
    fn token_account_view_words() {
        let view = TokenAccountView {
            mint: Pubkey::new([1; 32]),
            owner: Pubkey::new([2; 32]),
            amount: 77,
            delegate: Pubkey::ZERO,
            state: AccountState::Frozen,
            rent_exempt_reserve: Some(2_039_280),
            delegated_amount: 0,
            close_authority: Pubkey::new([3; 32]),
        };
        let words = encode_token_account_view(&view);

        assert_eq!(words.len(), TOKEN_ACCOUNT_VIEW_WORDS * 32);
        assert_eq!(decode_bytes32_word(&words, 1).unwrap(), [2; 32]);
        assert_eq!(decode_uint64_word(&words, 2).unwrap(), 77);
        assert_eq!(decode_bytes32_word(&words, 3).unwrap(), [0; 32]);
        assert_eq!(decode_uint64_word(&words, 4).unwrap(), 2);
        assert!(decode_bool_word(&words, 5).unwrap());
        assert_eq!(decode_uint64_word(&words, 6).unwrap(), 2_039_280);
        assert_eq!(decode_bytes32_word(&words, 8).unwrap(), [3; 32]);
    }
}
