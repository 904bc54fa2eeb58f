use tracing::trace;

use super::PermutationEmitter;
use crate::asm::Label;
use crate::error::GenerationError;
use crate::field::to_word;

impl PermutationEmitter {
    /// ARK on every element, S-box on all (full) or element 0 (partial), mix.
    pub(super) fn emit_round(&mut self, round: usize) -> Result<(), GenerationError> {
        let full = self.params.is_full_round(round);
        trace!(round, full, "round");

        for i in 0..self.width {
            self.emit_ark(round, i)?;
        }
        let sboxed = if full { self.width } else { 1 };
        for i in 0..sboxed {
            self.emit_sigma(i)?;
        }

        let resume = Label::new(format!("after_mix_{}", round));
        self.call_mix(&resume)?;
        self.resume(&resume)
    }

    /// `st_i ← (st_i + C[round][i]) mod q`
    fn emit_ark(&mut self, round: usize, i: usize) -> Result<(), GenerationError> {
        let q = self.modulus()?;
        let target = self.state[i];
        self.b_dup(q)?;
        self.b_push_word(&to_word(self.params.round_constant(round, i)));
        self.b_dup(target)?;
        let sum = self.b_addmod();
        self.b_replace(target)?;
        self.stack.rename(sum, &format!("st{}", i));
        self.state[i] = sum;
        Ok(())
    }

    /// `st_i ← st_i^5 mod q`, computed as ((x·x)·(x·x))·x.
    fn emit_sigma(&mut self, i: usize) -> Result<(), GenerationError> {
        let q = self.modulus()?;
        let target = self.state[i];

        let q1 = self.b_dup(q)?;
        let x = self.b_dup(target)?;
        let q2 = self.b_dup(q1)?;
        self.b_dup(q2)?;
        let x1 = self.b_dup(x)?;
        self.b_dup(x1)?;
        let square = self.b_mulmod();
        self.b_dup(square)?;
        self.b_mulmod();
        let fifth = self.b_mulmod();

        self.b_replace(target)?;
        self.stack.rename(fifth, &format!("st{}", i));
        self.state[i] = fifth;
        Ok(())
    }
}
