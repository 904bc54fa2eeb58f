//! Symbolic model of the operand stack at emission time.
//!
//! Every slot the generator pushes gets a `Value` handle. Instructions that
//! address the stack (DUP, SWAP) never take hand-computed depths: the
//! emitter asks the model where a handle currently sits and emits that
//! depth. The model mirrors the machine exactly, so after each instruction
//! the handle order equals the runtime slot order.

/// Handle to one live stack slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Value(u32);

#[derive(Clone, Debug)]
pub struct StackEntry {
    pub value: Value,
    /// Human-readable name for diagnostics (`q`, `st0`, ...); `None` for temps.
    pub name: Option<String>,
}

/// Ordered slots, bottom first: the last entry is the top of the stack.
#[derive(Clone, Debug, Default)]
pub struct VirtualStack {
    entries: Vec<StackEntry>,
    next_id: u32,
}

impl VirtualStack {
    pub fn new() -> Self {
        Self::default()
    }

    fn fresh(&mut self) -> Value {
        let v = Value(self.next_id);
        self.next_id += 1;
        v
    }

    pub fn push_named(&mut self, name: &str) -> Value {
        let value = self.fresh();
        self.entries.push(StackEntry {
            value,
            name: Some(name.to_string()),
        });
        value
    }

    pub fn push_temp(&mut self) -> Value {
        let value = self.fresh();
        self.entries.push(StackEntry { value, name: None });
        value
    }

    pub fn pop(&mut self) -> Option<Value> {
        self.entries.pop().map(|e| e.value)
    }

    /// Pop `n` slots, returning them top first.
    pub fn pop_n(&mut self, n: usize) -> Vec<Value> {
        (0..n).filter_map(|_| self.pop()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&StackEntry> {
        self.entries.last()
    }

    pub fn top(&self) -> Option<Value> {
        self.last().map(|e| e.value)
    }

    /// Depth of `value` counted from the top (0 = top).
    pub fn depth_of(&self, value: Value) -> Option<u32> {
        self.entries
            .iter()
            .rev()
            .position(|e| e.value == value)
            .map(|d| d as u32)
    }

    /// Value at `depth` from the top.
    pub fn at_depth(&self, depth: u32) -> Option<Value> {
        let idx = self.entries.len().checked_sub(1 + depth as usize)?;
        Some(self.entries[idx].value)
    }

    /// Exchange the top with the slot at `depth`. Returns false if out of range.
    pub fn swap_top(&mut self, depth: u32) -> bool {
        let len = self.entries.len();
        if depth as usize >= len {
            return false;
        }
        self.entries.swap(len - 1, len - 1 - depth as usize);
        true
    }

    /// Rename a slot (used when a value changes meaning in place).
    pub fn rename(&mut self, value: Value, name: &str) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.value == value) {
            entry.name = Some(name.to_string());
        }
    }

    pub fn name_of(&self, value: Value) -> String {
        self.entries
            .iter()
            .find(|e| e.value == value)
            .and_then(|e| e.name.clone())
            .unwrap_or_else(|| format!("%{}", value.0))
    }

    /// Handles from the top down.
    pub fn values_from_top(&self) -> impl Iterator<Item = Value> + '_ {
        self.entries.iter().rev().map(|e| e.value)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// One-line rendering, top first, for trace logs.
    pub fn describe(&self) -> String {
        self.values_from_top()
            .map(|v| self.name_of(v))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests;
