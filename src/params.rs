//! Poseidon round schedule, round constants and mixing matrices.
//!
//! Parameters are the circom-compatible BN254 x^5 instances published by
//! `light-poseidon` (generated with the reference Grain LFSR script). They are
//! loaded once per process on first use and only read afterwards.

use std::sync::OnceLock;

use ark_bn254::Fr;
use light_poseidon::parameters::bn254_x5::get_poseidon_parameters;
use tracing::debug;

use crate::error::GenerationError;

/// Number of full rounds, split evenly before and after the partial rounds.
pub const N_ROUNDS_F: usize = 8;
/// Partial rounds for state widths 2..=9.
pub const N_ROUNDS_P: [usize; 8] = [56, 57, 56, 60, 60, 63, 64, 63];

/// Smallest supported arity.
pub const MIN_ARITY: usize = 1;
/// Largest supported arity.
pub const MAX_ARITY: usize = 8;

const MIN_WIDTH: usize = MIN_ARITY + 1;
const MAX_WIDTH: usize = MAX_ARITY + 1;

/// Parameters for one state width.
#[derive(Clone, Debug)]
pub struct PoseidonParams {
    pub width: usize,
    pub full_rounds: usize,
    pub partial_rounds: usize,
    /// Flat, round-major: entry (r, i) lives at `r * width + i`.
    pub round_constants: Vec<Fr>,
    /// Row-major `width × width` matrix.
    pub mds: Vec<Vec<Fr>>,
}

impl PoseidonParams {
    pub fn total_rounds(&self) -> usize {
        self.full_rounds + self.partial_rounds
    }

    pub fn round_constant(&self, round: usize, position: usize) -> &Fr {
        &self.round_constants[round * self.width + position]
    }

    pub fn mds_entry(&self, row: usize, col: usize) -> &Fr {
        &self.mds[row][col]
    }

    /// Full rounds apply the S-box to every element, partial rounds to
    /// element 0 only.
    pub fn is_full_round(&self, round: usize) -> bool {
        let half = self.full_rounds / 2;
        round < half || round >= self.partial_rounds + half
    }
}

/// Partial-round count for a state width, if supported.
pub fn partial_rounds(width: usize) -> Option<usize> {
    if (MIN_WIDTH..=MAX_WIDTH).contains(&width) {
        Some(N_ROUNDS_P[width - MIN_WIDTH])
    } else {
        None
    }
}

static TABLES: OnceLock<Result<Vec<PoseidonParams>, GenerationError>> = OnceLock::new();

/// Parameters for `width`, loading every width on first call.
pub fn params(width: usize) -> Result<&'static PoseidonParams, GenerationError> {
    let tables = TABLES.get_or_init(|| (MIN_WIDTH..=MAX_WIDTH).map(load).collect());
    match tables {
        Ok(all) => width
            .checked_sub(MIN_WIDTH)
            .and_then(|idx| all.get(idx))
            .ok_or_else(|| GenerationError::Tables {
                width,
                reason: "unsupported state width".to_string(),
            }),
        Err(e) => Err(e.clone()),
    }
}

fn load(width: usize) -> Result<PoseidonParams, GenerationError> {
    let table_error = |reason: String| GenerationError::Tables { width, reason };

    let raw = get_poseidon_parameters::<Fr>(width as u8).map_err(|e| table_error(e.to_string()))?;
    let expected_partial =
        partial_rounds(width).ok_or_else(|| table_error("unsupported state width".to_string()))?;

    if raw.full_rounds != N_ROUNDS_F || raw.partial_rounds != expected_partial {
        return Err(table_error(format!(
            "schedule {}+{} does not match {}+{}",
            raw.full_rounds, raw.partial_rounds, N_ROUNDS_F, expected_partial
        )));
    }
    if raw.ark.len() != (N_ROUNDS_F + expected_partial) * width {
        return Err(table_error(format!("{} round constants", raw.ark.len())));
    }
    if raw.mds.len() != width || raw.mds.iter().any(|row| row.len() != width) {
        return Err(table_error("mixing matrix is not square".to_string()));
    }

    debug!(width, partial_rounds = expected_partial, "loaded poseidon parameters");
    Ok(PoseidonParams {
        width,
        full_rounds: raw.full_rounds,
        partial_rounds: raw.partial_rounds,
        round_constants: raw.ark,
        mds: raw.mds,
    })
}
