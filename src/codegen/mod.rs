//! Poseidon permutation → EVM bytecode.
//!
//! The generator walks a fixed sequence of phases:
//!
//! ```text
//!   Dispatch → Setup → Round(0) → … → Round(R-1) → Finalize → MixRoutine → Done
//! ```
//!
//! Every round ends with a call to a single shared mix routine. The call
//! stores its resumption address in memory word 0 and jumps; the routine
//! returns by loading that word and jumping to it.

pub mod layout;

mod emitter;

pub use emitter::mix::MixLayout;
pub use emitter::{PermutationEmitter, Phase};

use tracing::info;

use crate::asm::{self, Instruction};
use crate::error::GenerationError;
use crate::params::{params, MAX_ARITY, MIN_ARITY};

/// A generated program in both symbolic and encoded form.
#[derive(Clone, Debug)]
pub struct Program {
    pub arity: usize,
    pub mix_layout: MixLayout,
    pub instructions: Vec<Instruction>,
    /// Code executed on each call.
    pub runtime: Vec<u8>,
    /// Loader followed by `runtime`; deploying it installs `runtime`.
    pub creation: Vec<u8>,
}

impl Program {
    /// One instruction per line, in `PUSH1 0x20` / `label:` notation.
    pub fn listing(&self) -> String {
        self.instructions
            .iter()
            .map(|inst| inst.to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Generate the permutation program for `arity` inputs (1..=8).
pub fn generate_program(arity: usize) -> Result<Program, GenerationError> {
    if !(MIN_ARITY..=MAX_ARITY).contains(&arity) {
        return Err(GenerationError::InvalidArity(arity));
    }
    let p = params(arity + 1)?;
    let emitter = PermutationEmitter::new(arity, p);
    let mix_layout = emitter.mix_layout();
    let assembler = emitter.run()?;
    let runtime = assembler.finalize()?;
    let creation = asm::creation_code(&runtime)?;
    info!(
        arity,
        ?mix_layout,
        instructions = assembler.len(),
        runtime_bytes = runtime.len(),
        "generated poseidon program"
    );
    Ok(Program {
        arity,
        mix_layout,
        instructions: assembler.into_instructions(),
        runtime,
        creation,
    })
}
