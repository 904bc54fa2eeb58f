//! Calls into the shared mix routine.
//!
//! The machine has no call instruction, so a call is: store the resumption
//! address in the return register (memory word 0), jump to the routine,
//! and place the resumption label right after the jump. There is a single
//! return register, so a second call before the first resumption would
//! clobber it. The emitter refuses to produce such a program.

use super::PermutationEmitter;
use crate::asm::Label;
use crate::codegen::layout::RETURN_REGISTER;
use crate::error::GenerationError;

impl PermutationEmitter {
    pub(super) fn call_mix(&mut self, resume: &Label) -> Result<(), GenerationError> {
        if let Some(pending) = &self.return_register {
            return Err(GenerationError::ReentrantCall {
                pending: pending.to_string(),
                next: resume.to_string(),
            });
        }

        self.b_push_label(resume);
        self.b_store_at(RETURN_REGISTER);
        let mix = self.mix_label.clone();
        self.b_jump(&mix);
        self.return_register = Some(resume.clone());

        // The routine consumes the state and leaves the mixed one in its place.
        let old = self.stack.pop_n(self.width);
        if old.len() != self.width {
            return Err(GenerationError::UntrackedValue("state".to_string()));
        }
        let mut state: Vec<_> = (0..self.width)
            .rev()
            .map(|i| self.stack.push_named(&format!("st{}", i)))
            .collect();
        state.reverse();
        self.state = state;
        Ok(())
    }

    pub(super) fn resume(&mut self, label: &Label) -> Result<(), GenerationError> {
        match self.return_register.take() {
            Some(pending) if &pending == label => self.b_label(label),
            other => {
                self.return_register = other;
                Err(GenerationError::UnmatchedResume(label.to_string()))
            }
        }
    }
}
