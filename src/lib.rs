//! Generates standalone EVM programs that compute the circom-compatible
//! Poseidon permutation over the BN254 scalar field, for 1 to 8 inputs.

pub mod abi;
pub mod asm;
pub mod codegen;
pub mod error;
pub mod field;
pub mod params;
pub mod reference;
pub mod stack;
pub mod vm;

pub use codegen::{generate_program, MixLayout, Program};
pub use error::{GenerationError, RuntimeAbort};
pub use params::{MAX_ARITY, MIN_ARITY};

/// Creation code for the `arity`-input permutation program.
///
/// Deploying the returned bytes installs the runtime program, which accepts
/// calls to `poseidonExt(uint256,uint256[arity])` and
/// `poseidonExt(uint256,bytes32[arity])`.
pub fn generate(arity: usize) -> Result<Vec<u8>, GenerationError> {
    Ok(generate_program(arity)?.creation)
}
