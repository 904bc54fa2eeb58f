//! Program entry and exit: selector dispatch, setup and the final return.

use tracing::debug;

use super::PermutationEmitter;
use crate::abi::{self, CAPACITY_OFFSET};
use crate::asm::Label;
use crate::codegen::layout::{self, matrix_slot, OUTPUT_WORD, WORD_SIZE};
use crate::error::GenerationError;
use crate::field::{modulus_word, to_word};

impl PermutationEmitter {
    /// Abort unless the selector is one of the two accepted codes.
    ///
    /// ```text
    ///   sel = calldata[0..32] / 2^224
    ///   if (sel == uint_sel) | (sel == bytes32_sel) goto start
    ///   INVALID
    /// start:
    /// ```
    pub(super) fn emit_dispatch(&mut self) -> Result<(), GenerationError> {
        let [uint_sel, bytes32_sel] = abi::accepted_selectors(self.arity);
        debug!(
            uint = %hex::encode(uint_sel),
            bytes32 = %hex::encode(bytes32_sel),
            "dispatch selectors"
        );

        self.b_push_word(&layout::selector_shift());
        self.b_push_u64(0);
        self.b_calldataload();
        let selector = self.b_div();

        self.b_dup(selector)?;
        self.b_push_bytes(&uint_sel)?;
        self.b_eq();
        self.b_swap_with(selector)?;
        self.b_push_bytes(&bytes32_sel)?;
        self.b_eq();
        self.b_or();

        let start = Label::new("start");
        self.b_jumpi(&start);
        self.b_abort();
        self.b_label(&start)
    }

    /// Matrix into memory, then `q`, the inputs and the capacity element.
    ///
    /// Inputs are loaded last-first so that state element 0 (the capacity)
    /// ends up on top.
    pub(super) fn emit_setup(&mut self) -> Result<(), GenerationError> {
        let t = self.width;
        for row in 0..t {
            for col in 0..t {
                self.b_push_word(&to_word(self.params.mds_entry(row, col)));
                self.b_store_at(matrix_slot(t, row, col));
            }
        }

        let q = self.b_push_word(&modulus_word());
        self.stack.rename(q, "q");
        self.q = Some(q);

        let mut state = Vec::with_capacity(t);
        for input in (0..self.arity).rev() {
            self.b_push_u64(abi::input_offset(input));
            let st = self.b_calldataload();
            self.stack.rename(st, &format!("st{}", input + 1));
            state.push(st);
        }
        self.b_push_u64(CAPACITY_OFFSET);
        let st0 = self.b_calldataload();
        self.stack.rename(st0, "st0");
        state.push(st0);

        state.reverse();
        self.state = state;
        Ok(())
    }

    /// Write state element 0 to the output word and return it.
    pub(super) fn emit_finalize(&mut self) -> Result<(), GenerationError> {
        if let Some(pending) = &self.return_register {
            return Err(GenerationError::ReentrantCall {
                pending: pending.to_string(),
                next: "return".to_string(),
            });
        }
        let st0 = self.state[0];
        if self.stack.top() != Some(st0) {
            self.b_dup(st0)?;
        }
        self.b_store_at(OUTPUT_WORD);
        self.b_return(OUTPUT_WORD, WORD_SIZE);
        self.state.clear();
        self.q = None;
        Ok(())
    }
}
