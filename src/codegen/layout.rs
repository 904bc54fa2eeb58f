//! Memory map of the generated program.
//!
//! ```text
//!   0x00                         return register / output word
//!   32 * (1 + row*t + col)       mixing matrix, row-major
//!   32 * (1 + t*t + col)         staged state (deep widths only)
//! ```
//!
//! The return register and the output word share word 0: the output is
//! written after the last mix call has consumed its resumption address.

use crate::field::Word;

pub const WORD_SIZE: u64 = 32;

/// Holds the resumption address while the mix routine runs.
pub const RETURN_REGISTER: u64 = 0;

/// Where the result word is placed for RETURN.
pub const OUTPUT_WORD: u64 = 0;

/// Memory address of matrix entry `(row, col)` for state width `width`.
pub fn matrix_slot(width: usize, row: usize, col: usize) -> u64 {
    WORD_SIZE * (1 + (row * width + col) as u64)
}

/// Memory address holding old state element `col` during a staged mix.
pub fn staging_slot(width: usize, col: usize) -> u64 {
    WORD_SIZE * (1 + (width * width + col) as u64)
}

/// 2^224: dividing the first calldata word by this leaves the 4-byte selector.
pub fn selector_shift() -> Word {
    let mut out = [0u8; 32];
    out[3] = 1;
    out
}
