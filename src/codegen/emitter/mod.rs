mod call;
mod dispatch;
mod inst;
pub(crate) mod mix;
mod round;

use tracing::{debug, trace};

use crate::asm::{Assembler, Label};
use crate::params::PoseidonParams;
use crate::stack::{Value, VirtualStack};

use self::mix::MixLayout;
use crate::error::GenerationError;

/// Where the sequencer is in the program.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Selector check; aborts unless the call matches an entry signature.
    Dispatch,
    /// Matrix to memory, modulus and state onto the stack.
    Setup,
    /// Round constants, S-box, then a mix call.
    Round(usize),
    /// Store state element 0 and return it.
    Finalize,
    /// The shared mix routine, emitted once after the main body.
    MixRoutine,
    Done,
}

/// Emits one permutation program into an `Assembler`.
///
/// Runtime stack layout between rounds, top first:
///
/// ```text
///   st0 st1 … st(t-1) q
/// ```
pub struct PermutationEmitter {
    asm: Assembler,
    /// Mirrors the runtime stack; all DUP/SWAP depths come from here.
    stack: VirtualStack,
    params: &'static PoseidonParams,
    arity: usize,
    width: usize,
    /// Handle of the modulus slot.
    q: Option<Value>,
    /// `state[i]` is the handle of state element i.
    state: Vec<Value>,
    /// Resumption label of the mix call in flight, if any.
    return_register: Option<Label>,
    phase: Phase,
    mix_label: Label,
}

impl PermutationEmitter {
    pub fn new(arity: usize, params: &'static PoseidonParams) -> Self {
        Self {
            asm: Assembler::new(),
            stack: VirtualStack::new(),
            params,
            arity,
            width: arity + 1,
            q: None,
            state: Vec::new(),
            return_register: None,
            phase: Phase::Dispatch,
            mix_label: Label::new("mix"),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn mix_layout(&self) -> MixLayout {
        MixLayout::for_width(self.width)
    }

    /// Emit the next phase and move the sequencer forward.
    pub fn advance(&mut self) -> Result<Phase, GenerationError> {
        debug!(phase = ?self.phase, "emitting");
        let next = match self.phase {
            Phase::Dispatch => {
                self.emit_dispatch()?;
                Phase::Setup
            }
            Phase::Setup => {
                self.emit_setup()?;
                Phase::Round(0)
            }
            Phase::Round(round) => {
                self.emit_round(round)?;
                if round + 1 < self.params.total_rounds() {
                    Phase::Round(round + 1)
                } else {
                    Phase::Finalize
                }
            }
            Phase::Finalize => {
                self.emit_finalize()?;
                Phase::MixRoutine
            }
            Phase::MixRoutine => {
                self.emit_mix_routine()?;
                Phase::Done
            }
            Phase::Done => Phase::Done,
        };
        trace!(stack = %self.stack.describe(), "after {:?}", self.phase);
        self.phase = next;
        Ok(next)
    }

    /// Run every phase and hand back the assembled instruction stream.
    pub fn run(mut self) -> Result<Assembler, GenerationError> {
        while self.advance()? != Phase::Done {}
        Ok(self.asm)
    }

    fn modulus(&self) -> Result<Value, GenerationError> {
        self.q
            .ok_or_else(|| GenerationError::UntrackedValue("q".to_string()))
    }

    /// Forget the current stack and model `q, st(t-1) … st0` from scratch.
    fn reset_state_model(&mut self) {
        self.stack.clear();
        self.q = Some(self.stack.push_named("q"));
        let mut state: Vec<Value> = (0..self.width)
            .rev()
            .map(|i| self.stack.push_named(&format!("st{}", i)))
            .collect();
        state.reverse();
        self.state = state;
    }
}
