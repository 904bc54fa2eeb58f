//! BN254 scalar field helpers.
//!
//! Every value the generated program touches is an EVM word: 32 bytes,
//! big-endian. Field elements cross into and out of the word world here:
//! - `Word` is the raw 32-byte representation used by calldata, memory and pushes
//! - `to_word` / `from_word` convert between `ark_bn254::Fr` and words
//! - `parse_word` accepts decimal or `0x`-prefixed hex literals (CLI input)
//!
//! The modulus q = 0x30644e72...f0000001 is the BN254 scalar field order.

use ark_bn254::Fr;
use ark_ff::{BigInteger, PrimeField};
use num_bigint::BigUint;
use num_traits::Num;

/// A 256-bit machine word in big-endian byte order.
pub type Word = [u8; 32];

/// Hex digits of the field modulus q.
pub const MODULUS_HEX: &str = "30644e72e131a029b85045b68181585d2833e84879b9709143e1f593f0000001";

/// Errors from parsing a numeric literal into a word.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParseWordError {
    #[error("`{0}` is not a decimal or 0x-prefixed hex number")]
    Malformed(String),
    #[error("`{0}` does not fit in 256 bits")]
    TooWide(String),
}

/// The field modulus q as a word.
pub fn modulus_word() -> Word {
    let mut out = [0u8; 32];
    out.copy_from_slice(&Fr::MODULUS.to_bytes_be());
    out
}

/// Canonical big-endian encoding of a field element.
pub fn to_word(value: &Fr) -> Word {
    let bytes = value.into_bigint().to_bytes_be();
    let mut out = [0u8; 32];
    out[32 - bytes.len()..].copy_from_slice(&bytes);
    out
}

/// Interpret a word as a field element, reducing modulo q.
pub fn from_word(word: &Word) -> Fr {
    Fr::from_be_bytes_mod_order(word)
}

/// Word holding a small integer.
pub fn word_from_u64(value: u64) -> Word {
    let mut out = [0u8; 32];
    out[24..].copy_from_slice(&value.to_be_bytes());
    out
}

/// True if the word is already a reduced field element (< q).
pub fn is_canonical(word: &Word) -> bool {
    *word < modulus_word()
}

/// Parse a decimal or `0x`-prefixed hex literal into a word.
///
/// No reduction is applied: the generated program does not validate its
/// inputs, so the CLI passes the caller's word through unchanged.
pub fn parse_word(text: &str) -> Result<Word, ParseWordError> {
    let trimmed = text.trim();
    let parsed = match trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        Some(hex_digits) => BigUint::from_str_radix(hex_digits, 16),
        None => BigUint::from_str_radix(trimmed, 10),
    }
    .map_err(|_| ParseWordError::Malformed(text.to_string()))?;

    let bytes = parsed.to_bytes_be();
    if bytes.len() > 32 {
        return Err(ParseWordError::TooWide(text.to_string()));
    }
    let mut out = [0u8; 32];
    out[32 - bytes.len()..].copy_from_slice(&bytes);
    Ok(out)
}

/// Render a word as a decimal string.
pub fn word_to_decimal(word: &Word) -> String {
    BigUint::from_bytes_be(word).to_str_radix(10)
}
