//! The shared mix routine: `new[i] = Σ_j M[i][j] · st[j] mod q`.
//!
//! Entry and exit stack, top first: `st0 … st(t-1) q`. The resumption
//! address is in the return register.

use tracing::debug;

use super::PermutationEmitter;
use crate::asm::MAX_DUP_DEPTH;
use crate::codegen::layout::{matrix_slot, staging_slot, RETURN_REGISTER};
use crate::error::GenerationError;
use crate::stack::Value;

/// How the routine reaches the old state while accumulating.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MixLayout {
    /// Old state stays on the stack under the partial sums. The deepest
    /// access is at depth 2t+1, so this needs t ≤ 7.
    Resident,
    /// Old state is moved to memory first; the stack only holds `q` and
    /// the new elements, which are put in order at the end.
    Staged,
}

impl MixLayout {
    pub fn for_width(width: usize) -> MixLayout {
        if 2 * width as u32 + 1 <= MAX_DUP_DEPTH {
            MixLayout::Resident
        } else {
            MixLayout::Staged
        }
    }
}

impl PermutationEmitter {
    pub(super) fn emit_mix_routine(&mut self) -> Result<(), GenerationError> {
        let layout = self.mix_layout();
        debug!(width = self.width, ?layout, "mix routine");

        self.reset_state_model();
        let mix = self.mix_label.clone();
        self.b_label(&mix)?;

        match layout {
            MixLayout::Resident => self.emit_mix_resident()?,
            MixLayout::Staged => self.emit_mix_staged()?,
        }

        self.b_load_at(RETURN_REGISTER);
        self.b_jump_indirect();
        self.stack.clear();
        Ok(())
    }

    /// Accumulate one row. `term(self, col)` leaves `M[row][col] · st[col]`
    /// on top of the stack.
    fn emit_row(
        &mut self,
        q: Value,
        mut term: impl FnMut(&mut Self, usize) -> Result<Value, GenerationError>,
    ) -> Result<Value, GenerationError> {
        let mut acc = term(self, 0)?;
        for col in 1..self.width {
            term(self, col)?;
            self.b_dup(q)?;
            self.b_swap_with(acc)?;
            acc = self.b_addmod();
        }
        Ok(acc)
    }

    fn emit_mix_resident(&mut self) -> Result<(), GenerationError> {
        let t = self.width;
        let q = self.modulus()?;
        let old = self.state.clone();

        let mut new = Vec::with_capacity(t);
        for row in 0..t {
            let acc = self.emit_row(q, |e, col| {
                e.b_dup(q)?;
                e.b_load_at(matrix_slot(t, row, col));
                e.b_dup(old[col])?;
                Ok(e.b_mulmod())
            })?;
            self.stack.rename(acc, &format!("new{}", row));
            new.push(acc);
        }

        // Each new value takes the slot of its old counterpart.
        for k in (0..t).rev() {
            if self.stack.top() != Some(new[k]) {
                return Err(GenerationError::UntrackedValue(self.stack.name_of(new[k])));
            }
            self.b_replace(old[k])?;
        }
        self.state = new;
        Ok(())
    }

    fn emit_mix_staged(&mut self) -> Result<(), GenerationError> {
        let t = self.width;
        let q = self.modulus()?;

        for col in 0..t {
            self.b_store_at(staging_slot(t, col));
        }

        let mut new = Vec::with_capacity(t);
        for row in 0..t {
            let acc = self.emit_row(q, |e, col| {
                e.b_dup(q)?;
                e.b_load_at(matrix_slot(t, row, col));
                e.b_load_at(staging_slot(t, col));
                Ok(e.b_mulmod())
            })?;
            self.stack.rename(acc, &format!("new{}", row));
            new.push(acc);
        }

        self.arrange(&new)?;
        self.state = new;
        Ok(())
    }

    /// Permute the top `order.len()` slots so that `order[k]` sits at depth k.
    fn arrange(&mut self, order: &[Value]) -> Result<(), GenerationError> {
        for k in (1..order.len()).rev() {
            let depth = self
                .stack
                .depth_of(order[k])
                .ok_or_else(|| GenerationError::UntrackedValue(self.stack.name_of(order[k])))?;
            if depth == k as u32 {
                continue;
            }
            if depth != 0 {
                self.b_swap(depth)?;
            }
            self.b_swap(k as u32)?;
        }
        Ok(())
    }
}
