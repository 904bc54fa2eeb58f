//! Poseidon permutation computed directly over the BN254 scalar field.
//!
//! Same round structure the generated program follows:
//!   - add round constants to every element
//!   - S-box x^5 on every element (full rounds) or element 0 (partial rounds)
//!   - multiply by the mixing matrix
//!
//! Used as the oracle for generated bytecode.

use ark_bn254::Fr;
use ark_ff::Field;

use crate::error::GenerationError;
use crate::params::{params, PoseidonParams, MAX_ARITY, MIN_ARITY};

/// The S-box: x^5 as ((x^2)^2)·x.
#[inline]
pub fn sbox(x: Fr) -> Fr {
    x.square().square() * x
}

fn mix(p: &PoseidonParams, state: &[Fr]) -> Vec<Fr> {
    (0..p.width)
        .map(|row| {
            state
                .iter()
                .enumerate()
                .fold(Fr::from(0u64), |acc, (col, x)| acc + *x * p.mds_entry(row, col))
        })
        .collect()
}

/// Apply the full permutation in place. `state.len()` must equal `p.width`.
pub fn permute(p: &PoseidonParams, state: &mut [Fr]) {
    debug_assert_eq!(state.len(), p.width);
    for round in 0..p.total_rounds() {
        for (i, x) in state.iter_mut().enumerate() {
            *x += p.round_constant(round, i);
        }
        if p.is_full_round(round) {
            for x in state.iter_mut() {
                *x = sbox(*x);
            }
        } else {
            state[0] = sbox(state[0]);
        }
        let mixed = mix(p, state);
        state.copy_from_slice(&mixed);
    }
}

/// First output element of the permutation of `[capacity, inputs...]`.
pub fn poseidon_ext(capacity: Fr, inputs: &[Fr]) -> Result<Fr, GenerationError> {
    if !(MIN_ARITY..=MAX_ARITY).contains(&inputs.len()) {
        return Err(GenerationError::InvalidArity(inputs.len()));
    }
    let p = params(inputs.len() + 1)?;
    let mut state = Vec::with_capacity(p.width);
    state.push(capacity);
    state.extend_from_slice(inputs);
    permute(p, &mut state);
    Ok(state[0])
}

/// Circom-compatible Poseidon hash: capacity element zero.
pub fn poseidon(inputs: &[Fr]) -> Result<Fr, GenerationError> {
    poseidon_ext(Fr::from(0u64), inputs)
}
