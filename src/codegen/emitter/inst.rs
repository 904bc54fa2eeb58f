//! Instruction helpers that update the assembler and the stack model together.

use super::PermutationEmitter;
use crate::asm::{Label, Opcode};
use crate::error::GenerationError;
use crate::field::Word;
use crate::stack::Value;

impl PermutationEmitter {
    fn depth(&self, value: Value) -> Result<u32, GenerationError> {
        self.stack
            .depth_of(value)
            .ok_or_else(|| GenerationError::UntrackedValue(self.stack.name_of(value)))
    }

    // ── Pushes ─────────────────────────────────────────────────────

    pub(super) fn b_push_word(&mut self, word: &Word) -> Value {
        self.asm.push_word(word);
        self.stack.push_temp()
    }

    pub(super) fn b_push_u64(&mut self, value: u64) -> Value {
        self.asm.push_u64(value);
        self.stack.push_temp()
    }

    pub(super) fn b_push_bytes(&mut self, bytes: &[u8]) -> Result<Value, GenerationError> {
        self.asm.push_bytes(bytes)?;
        Ok(self.stack.push_temp())
    }

    pub(super) fn b_push_label(&mut self, label: &Label) -> Value {
        self.asm.push_label(label);
        self.stack.push_temp()
    }

    // ── Stack ──────────────────────────────────────────────────────

    /// Copy `value` to the top.
    pub(super) fn b_dup(&mut self, value: Value) -> Result<Value, GenerationError> {
        let depth = self.depth(value)?;
        self.asm.dup(depth)?;
        Ok(self.stack.push_temp())
    }

    /// Exchange the top with the slot holding `value`.
    pub(super) fn b_swap_with(&mut self, value: Value) -> Result<(), GenerationError> {
        let depth = self.depth(value)?;
        self.b_swap(depth)
    }

    pub(super) fn b_swap(&mut self, depth: u32) -> Result<(), GenerationError> {
        self.asm.swap(depth)?;
        self.stack.swap_top(depth);
        Ok(())
    }

    pub(super) fn b_pop(&mut self) {
        self.asm.pop();
        self.stack.pop();
    }

    /// Move the top into the slot of `target` and drop `target`.
    pub(super) fn b_replace(&mut self, target: Value) -> Result<(), GenerationError> {
        self.b_swap_with(target)?;
        self.b_pop();
        Ok(())
    }

    // ── Arithmetic ─────────────────────────────────────────────────

    /// `op` consuming `inputs` slots and producing one.
    fn b_reduce(&mut self, op: Opcode, inputs: usize) -> Value {
        self.asm.op(op);
        self.stack.pop_n(inputs);
        self.stack.push_temp()
    }

    /// `(top + second) mod third`
    pub(super) fn b_addmod(&mut self) -> Value {
        self.b_reduce(Opcode::AddMod, 3)
    }

    /// `(top · second) mod third`
    pub(super) fn b_mulmod(&mut self) -> Value {
        self.b_reduce(Opcode::MulMod, 3)
    }

    pub(super) fn b_div(&mut self) -> Value {
        self.b_reduce(Opcode::Div, 2)
    }

    pub(super) fn b_eq(&mut self) -> Value {
        self.b_reduce(Opcode::Eq, 2)
    }

    pub(super) fn b_or(&mut self) -> Value {
        self.b_reduce(Opcode::Or, 2)
    }

    // ── Memory and input ───────────────────────────────────────────

    pub(super) fn b_calldataload(&mut self) -> Value {
        self.b_reduce(Opcode::CallDataLoad, 1)
    }

    pub(super) fn b_mload(&mut self) -> Value {
        self.b_reduce(Opcode::MLoad, 1)
    }

    /// Store the slot beneath the top at the address on top.
    pub(super) fn b_mstore(&mut self) {
        self.asm.mstore();
        self.stack.pop_n(2);
    }

    /// Push `addr` and load the word stored there.
    pub(super) fn b_load_at(&mut self, addr: u64) -> Value {
        self.b_push_u64(addr);
        self.b_mload()
    }

    /// Store the top at `addr`.
    pub(super) fn b_store_at(&mut self, addr: u64) {
        self.b_push_u64(addr);
        self.b_mstore();
    }

    // ── Control flow ───────────────────────────────────────────────

    pub(super) fn b_label(&mut self, label: &Label) -> Result<(), GenerationError> {
        self.asm.label(label)?;
        Ok(())
    }

    pub(super) fn b_jump(&mut self, label: &Label) {
        self.asm.jump(label);
    }

    /// Jump to `label` if the top is non-zero; consumes the condition.
    pub(super) fn b_jumpi(&mut self, label: &Label) {
        self.asm.jumpi(label);
        self.stack.pop();
    }

    /// Jump to the address on top of the stack.
    pub(super) fn b_jump_indirect(&mut self) {
        self.asm.jump_indirect();
        self.stack.pop();
    }

    pub(super) fn b_abort(&mut self) {
        self.asm.abort();
    }

    /// Return `length` bytes of memory at `offset`. Ends execution.
    pub(super) fn b_return(&mut self, offset: u64, length: u64) {
        self.asm.return_region(offset, length);
        self.stack.clear();
    }
}
