//! Instruction-stream assembler for the EVM.
//!
//! The assembler is append-only: callers record instructions and symbolic
//! labels, and `finalize` lays out the stream, resolves every label
//! reference to an absolute code offset and encodes the bytes. Label
//! references are always encoded as `PUSH3`, so instruction sizes never
//! depend on where labels land and layout is a single pass.

pub mod opcode;

use std::collections::HashMap;
use std::fmt;

pub use opcode::Opcode;
use opcode::{DUP1, PUSH1, SWAP1};

use crate::field::Word;

/// Deepest slot reachable by `DUP16`, counted from 0 at the top.
pub const MAX_DUP_DEPTH: u32 = 15;
/// Deepest slot reachable by `SWAP16`.
pub const MAX_SWAP_DEPTH: u32 = 16;
/// Width of an encoded label reference.
pub const LABEL_WIDTH: usize = 3;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum AsmError {
    #[error("label `{0}` is referenced but never defined")]
    UndefinedLabel(String),

    #[error("label `{0}` is defined more than once")]
    DuplicateLabel(String),

    #[error("dup depth {0} is outside the reachable stack window (0..={MAX_DUP_DEPTH})")]
    DupOutOfReach(u32),

    #[error("swap depth {0} is outside the reachable stack window (1..={MAX_SWAP_DEPTH})")]
    SwapOutOfReach(u32),

    #[error("push literal of {0} bytes is wider than a word")]
    LiteralTooWide(usize),

    #[error("code offset {0} does not fit a {LABEL_WIDTH}-byte label")]
    CodeTooLarge(usize),
}

/// A named position in the instruction stream.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Label(String);

impl Label {
    pub fn new(name: impl Into<String>) -> Self {
        Label(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One symbolic instruction. `Label` encodes as `JUMPDEST`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Instruction {
    /// Literal push; the bytes are the minimal big-endian immediate.
    Push(Vec<u8>),
    PushLabel(Label),
    /// Duplicate the slot at this depth (0 = top).
    Dup(u32),
    /// Exchange the top with the slot at this depth.
    Swap(u32),
    Op(Opcode),
    Label(Label),
}

impl Instruction {
    /// Encoded size in bytes.
    pub fn size(&self) -> usize {
        match self {
            Instruction::Push(bytes) => 1 + bytes.len(),
            Instruction::PushLabel(_) => 1 + LABEL_WIDTH,
            Instruction::Dup(_) | Instruction::Swap(_) | Instruction::Op(_) => 1,
            Instruction::Label(_) => 1,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Push(bytes) => write!(f, "PUSH{} 0x{}", bytes.len(), hex::encode(bytes)),
            Instruction::PushLabel(label) => write!(f, "PUSH{} @{}", LABEL_WIDTH, label),
            Instruction::Dup(depth) => write!(f, "DUP{}", depth + 1),
            Instruction::Swap(depth) => write!(f, "SWAP{}", depth),
            Instruction::Op(op) => f.write_str(op.mnemonic()),
            Instruction::Label(label) => write!(f, "{}:", label),
        }
    }
}

/// Strip leading zero bytes, keeping at least one.
fn minimal_bytes(bytes: &[u8]) -> Vec<u8> {
    match bytes.iter().position(|&b| b != 0) {
        Some(first) => bytes[first..].to_vec(),
        None => vec![0],
    }
}

/// Append-only instruction recorder.
#[derive(Clone, Debug, Default)]
pub struct Assembler {
    instructions: Vec<Instruction>,
    defined: HashMap<Label, usize>,
}

impl Assembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn into_instructions(self) -> Vec<Instruction> {
        self.instructions
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    // ── Literals ───────────────────────────────────────────────────

    pub fn push_bytes(&mut self, bytes: &[u8]) -> Result<(), AsmError> {
        let minimal = minimal_bytes(bytes);
        if minimal.len() > 32 {
            return Err(AsmError::LiteralTooWide(minimal.len()));
        }
        self.instructions.push(Instruction::Push(minimal));
        Ok(())
    }

    pub fn push_word(&mut self, word: &Word) {
        self.instructions.push(Instruction::Push(minimal_bytes(word)));
    }

    pub fn push_u64(&mut self, value: u64) {
        self.instructions
            .push(Instruction::Push(minimal_bytes(&value.to_be_bytes())));
    }

    pub fn push_label(&mut self, label: &Label) {
        self.instructions.push(Instruction::PushLabel(label.clone()));
    }

    // ── Stack ──────────────────────────────────────────────────────

    pub fn dup(&mut self, depth: u32) -> Result<(), AsmError> {
        if depth > MAX_DUP_DEPTH {
            return Err(AsmError::DupOutOfReach(depth));
        }
        self.instructions.push(Instruction::Dup(depth));
        Ok(())
    }

    pub fn swap(&mut self, depth: u32) -> Result<(), AsmError> {
        if depth == 0 || depth > MAX_SWAP_DEPTH {
            return Err(AsmError::SwapOutOfReach(depth));
        }
        self.instructions.push(Instruction::Swap(depth));
        Ok(())
    }

    pub fn op(&mut self, op: Opcode) {
        self.instructions.push(Instruction::Op(op));
    }

    pub fn pop(&mut self) {
        self.op(Opcode::Pop);
    }

    // ── Arithmetic / logic ─────────────────────────────────────────

    pub fn addmod(&mut self) {
        self.op(Opcode::AddMod);
    }

    pub fn mulmod(&mut self) {
        self.op(Opcode::MulMod);
    }

    pub fn div(&mut self) {
        self.op(Opcode::Div);
    }

    pub fn eq(&mut self) {
        self.op(Opcode::Eq);
    }

    pub fn or(&mut self) {
        self.op(Opcode::Or);
    }

    // ── Memory / input ─────────────────────────────────────────────

    pub fn mload(&mut self) {
        self.op(Opcode::MLoad);
    }

    pub fn mstore(&mut self) {
        self.op(Opcode::MStore);
    }

    pub fn calldataload(&mut self) {
        self.op(Opcode::CallDataLoad);
    }

    // ── Control flow ───────────────────────────────────────────────

    pub fn label(&mut self, label: &Label) -> Result<(), AsmError> {
        if self.defined.contains_key(label) {
            return Err(AsmError::DuplicateLabel(label.to_string()));
        }
        self.defined.insert(label.clone(), self.instructions.len());
        self.instructions.push(Instruction::Label(label.clone()));
        Ok(())
    }

    pub fn jump(&mut self, label: &Label) {
        self.push_label(label);
        self.op(Opcode::Jump);
    }

    /// Jump to `label` if the slot beneath it (the condition) is non-zero.
    pub fn jumpi(&mut self, label: &Label) {
        self.push_label(label);
        self.op(Opcode::JumpI);
    }

    /// Jump to the code offset currently on top of the stack.
    pub fn jump_indirect(&mut self) {
        self.op(Opcode::Jump);
    }

    pub fn abort(&mut self) {
        self.op(Opcode::Invalid);
    }

    /// Return `length` bytes of memory starting at `offset`.
    pub fn return_region(&mut self, offset: u64, length: u64) {
        self.push_u64(length);
        self.push_u64(offset);
        self.op(Opcode::Return);
    }

    // ── Finalization ───────────────────────────────────────────────

    /// Absolute code offset of every label.
    pub fn layout(&self) -> Result<HashMap<Label, usize>, AsmError> {
        let mut offsets = HashMap::new();
        let mut pc = 0usize;
        for inst in &self.instructions {
            if let Instruction::Label(label) = inst {
                if offsets.insert(label.clone(), pc).is_some() {
                    return Err(AsmError::DuplicateLabel(label.to_string()));
                }
            }
            pc += inst.size();
        }
        Ok(offsets)
    }

    /// Resolve labels and encode the byte sequence.
    pub fn finalize(&self) -> Result<Vec<u8>, AsmError> {
        let offsets = self.layout()?;
        let mut code = Vec::with_capacity(self.instructions.iter().map(Instruction::size).sum());
        for inst in &self.instructions {
            match inst {
                Instruction::Push(bytes) => {
                    code.push(PUSH1 + (bytes.len() as u8 - 1));
                    code.extend_from_slice(bytes);
                }
                Instruction::PushLabel(label) => {
                    let target = *offsets
                        .get(label)
                        .ok_or_else(|| AsmError::UndefinedLabel(label.to_string()))?;
                    if target >= 1 << (8 * LABEL_WIDTH) {
                        return Err(AsmError::CodeTooLarge(target));
                    }
                    code.push(PUSH1 + (LABEL_WIDTH as u8 - 1));
                    code.extend_from_slice(&(target as u32).to_be_bytes()[4 - LABEL_WIDTH..]);
                }
                Instruction::Dup(depth) => code.push(DUP1 + *depth as u8),
                Instruction::Swap(depth) => code.push(SWAP1 + (*depth as u8 - 1)),
                Instruction::Op(op) => code.push(op.byte()),
                Instruction::Label(_) => code.push(Opcode::JumpDest.byte()),
            }
        }
        Ok(code)
    }
}

/// Wrap runtime code in a loader that copies it to memory and returns it.
///
/// The loader's own length appears as a literal inside it, so it is
/// recomputed until it stops changing.
pub fn creation_code(runtime: &[u8]) -> Result<Vec<u8>, AsmError> {
    let mut loader_len = 0usize;
    loop {
        let mut loader = Assembler::new();
        loader.push_u64(runtime.len() as u64);
        loader.dup(0)?;
        loader.push_u64(loader_len as u64);
        loader.push_u64(0);
        loader.op(Opcode::CodeCopy);
        loader.push_u64(0);
        loader.op(Opcode::Return);
        let code = loader.finalize()?;
        if code.len() == loader_len {
            let mut out = code;
            out.extend_from_slice(runtime);
            return Ok(out);
        }
        loader_len = code.len();
    }
}

// ─── Disassembly ───────────────────────────────────────────────────

/// Render encoded code one instruction per line as `offset  MNEMONIC [imm]`.
///
/// Bytes outside the known opcode set print as `0x..`; a push whose
/// immediate runs past the end shows the bytes that are present.
pub fn disassemble(code: &[u8]) -> Vec<String> {
    let mut lines = Vec::new();
    let mut pc = 0;
    while pc < code.len() {
        let byte = code[pc];
        let n = opcode::immediate_len(byte);
        let text = if n > 0 {
            let end = (pc + 1 + n).min(code.len());
            format!("PUSH{} 0x{}", n, hex::encode(&code[pc + 1..end]))
        } else if byte == opcode::PUSH0 {
            "PUSH0".to_string()
        } else if (DUP1..=opcode::DUP16).contains(&byte) {
            format!("DUP{}", byte - DUP1 + 1)
        } else if (SWAP1..=opcode::SWAP16).contains(&byte) {
            format!("SWAP{}", byte - SWAP1 + 1)
        } else {
            match Opcode::from_byte(byte) {
                Some(op) => op.mnemonic().to_string(),
                None => format!("0x{:02x}", byte),
            }
        };
        lines.push(format!("{:04x}  {}", pc, text));
        pc += 1 + n;
    }
    lines
}

#[cfg(test)]
mod tests;
