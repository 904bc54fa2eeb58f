//! Minimal EVM interpreter for running generated programs.
//!
//! Covers the opcode subset the generator and the creation loader emit,
//! plus the common arithmetic and comparison opcodes around them. Words are
//! 256-bit unsigned integers; arithmetic wraps modulo 2^256 except for
//! ADDMOD/MULMOD, which reduce by their third operand without overflow.
//! There is no gas: the host budget is a step limit.

use num_bigint::BigUint;
use num_traits::{One, ToPrimitive, Zero};
use tracing::debug;

use crate::asm::opcode::{self, Opcode, DUP1, DUP16, PUSH0, PUSH1, PUSH32, SWAP1, SWAP16};
use crate::error::RuntimeAbort;
use crate::field::Word;

/// EVM operand stack limit.
pub const STACK_LIMIT: usize = 1024;
/// Largest memory the harness will allocate.
pub const MEMORY_LIMIT: usize = 1 << 20;

#[derive(Clone, Debug)]
pub struct VmConfig {
    /// Maximum number of executed instructions before giving up.
    pub step_limit: u64,
}

impl Default for VmConfig {
    fn default() -> Self {
        VmConfig {
            step_limit: 10_000_000,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum VmError {
    #[error("stack underflow at pc {pc} ({op})")]
    StackUnderflow { pc: usize, op: String },

    #[error("stack overflow at pc {pc}")]
    StackOverflow { pc: usize },

    #[error("jump at pc {pc} to {target}, which is not a JUMPDEST")]
    BadJump { pc: usize, target: String },

    #[error("unsupported opcode 0x{byte:02x} at pc {pc}")]
    UnsupportedOpcode { pc: usize, byte: u8 },

    #[error("memory access at {0} exceeds the harness limit")]
    MemoryOutOfRange(String),

    #[error("step limit of {0} exceeded")]
    StepLimit(u64),

    #[error("creation code did not return runtime code: {0}")]
    NotDeployed(String),
}

/// How an execution ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Returned(Vec<u8>),
    Reverted(Vec<u8>),
    Stopped,
    /// `INVALID`: everything is discarded, no return data.
    Aborted,
}

#[derive(Clone, Debug)]
pub struct Execution {
    pub outcome: Outcome,
    pub steps: u64,
}

/// Failure to obtain a result word from a generated program.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum InvokeError {
    #[error("program aborted: {0}")]
    Abort(#[from] RuntimeAbort),

    #[error(transparent)]
    Vm(#[from] VmError),

    #[error("program finished without returning one word: {0}")]
    NoResult(String),
}

// ─── Interpreter ───────────────────────────────────────────────────

/// Offsets of valid jump destinations (JUMPDESTs outside push data).
fn analyze_jumpdests(code: &[u8]) -> Vec<bool> {
    let mut valid = vec![false; code.len()];
    let mut pc = 0;
    while pc < code.len() {
        let byte = code[pc];
        if byte == Opcode::JumpDest.byte() {
            valid[pc] = true;
        }
        pc += 1 + opcode::immediate_len(byte);
    }
    valid
}

fn word_bytes(value: &BigUint) -> Word {
    let bytes = value.to_bytes_be();
    let mut out = [0u8; 32];
    out[32 - bytes.len()..].copy_from_slice(&bytes);
    out
}

fn bool_word(b: bool) -> BigUint {
    if b {
        BigUint::one()
    } else {
        BigUint::zero()
    }
}

struct Machine<'a> {
    code: &'a [u8],
    calldata: &'a [u8],
    jumpdests: Vec<bool>,
    stack: Vec<BigUint>,
    memory: Vec<u8>,
    modulus: BigUint,
    pc: usize,
}

impl<'a> Machine<'a> {
    fn new(code: &'a [u8], calldata: &'a [u8]) -> Self {
        Machine {
            code,
            calldata,
            jumpdests: analyze_jumpdests(code),
            stack: Vec::new(),
            memory: Vec::new(),
            modulus: BigUint::one() << 256,
            pc: 0,
        }
    }

    fn pop(&mut self, op: &str) -> Result<BigUint, VmError> {
        self.stack.pop().ok_or_else(|| VmError::StackUnderflow {
            pc: self.pc,
            op: op.to_string(),
        })
    }

    fn push(&mut self, value: BigUint) -> Result<(), VmError> {
        if self.stack.len() >= STACK_LIMIT {
            return Err(VmError::StackOverflow { pc: self.pc });
        }
        self.stack.push(value);
        Ok(())
    }

    fn offset(&self, value: &BigUint) -> Result<usize, VmError> {
        value
            .to_usize()
            .filter(|&o| o <= MEMORY_LIMIT)
            .ok_or_else(|| VmError::MemoryOutOfRange(value.to_string()))
    }

    /// Grow memory (in whole words) to cover `[offset, offset + len)`.
    fn touch(&mut self, offset: usize, len: usize) -> Result<(), VmError> {
        if len == 0 {
            return Ok(());
        }
        let end = offset + len;
        if end > MEMORY_LIMIT {
            return Err(VmError::MemoryOutOfRange(end.to_string()));
        }
        let rounded = end.div_ceil(32) * 32;
        if rounded > self.memory.len() {
            self.memory.resize(rounded, 0);
        }
        Ok(())
    }

    fn region(&mut self, offset: &BigUint, len: &BigUint) -> Result<Vec<u8>, VmError> {
        let len = self.offset(len)?;
        if len == 0 {
            return Ok(Vec::new());
        }
        let offset = self.offset(offset)?;
        self.touch(offset, len)?;
        Ok(self.memory[offset..offset + len].to_vec())
    }

    fn jump_to(&mut self, target: &BigUint) -> Result<(), VmError> {
        match target.to_usize() {
            Some(dest) if self.jumpdests.get(dest).copied().unwrap_or(false) => {
                self.pc = dest;
                Ok(())
            }
            _ => Err(VmError::BadJump {
                pc: self.pc,
                target: target.to_string(),
            }),
        }
    }

    fn binary(
        &mut self,
        op: Opcode,
        f: impl FnOnce(&BigUint, &BigUint, &BigUint) -> BigUint,
    ) -> Result<(), VmError> {
        let a = self.pop(op.mnemonic())?;
        let b = self.pop(op.mnemonic())?;
        let r = f(&a, &b, &self.modulus);
        self.push(r)
    }

    fn modular(&mut self, op: Opcode) -> Result<(), VmError> {
        let a = self.pop(op.mnemonic())?;
        let b = self.pop(op.mnemonic())?;
        let n = self.pop(op.mnemonic())?;
        let r = if n.is_zero() {
            BigUint::zero()
        } else if op == Opcode::AddMod {
            (a + b) % n
        } else {
            (a * b) % n
        };
        self.push(r)
    }

    fn run(&mut self, config: &VmConfig) -> Result<Execution, VmError> {
        let mut steps = 0u64;
        loop {
            if self.pc >= self.code.len() {
                return Ok(Execution {
                    outcome: Outcome::Stopped,
                    steps,
                });
            }
            steps += 1;
            if steps > config.step_limit {
                return Err(VmError::StepLimit(config.step_limit));
            }

            let byte = self.code[self.pc];

            if byte == PUSH0 || (PUSH1..=PUSH32).contains(&byte) {
                let n = opcode::immediate_len(byte);
                let start = (self.pc + 1).min(self.code.len());
                let end = (self.pc + 1 + n).min(self.code.len());
                let mut imm = self.code[start..end].to_vec();
                imm.resize(n, 0);
                self.push(BigUint::from_bytes_be(&imm))?;
                self.pc += 1 + n;
                continue;
            }
            if (DUP1..=DUP16).contains(&byte) {
                let n = (byte - DUP1 + 1) as usize;
                if self.stack.len() < n {
                    return Err(VmError::StackUnderflow {
                        pc: self.pc,
                        op: format!("DUP{}", n),
                    });
                }
                let v = self.stack[self.stack.len() - n].clone();
                self.push(v)?;
                self.pc += 1;
                continue;
            }
            if (SWAP1..=SWAP16).contains(&byte) {
                let n = (byte - SWAP1 + 1) as usize;
                let len = self.stack.len();
                if len < n + 1 {
                    return Err(VmError::StackUnderflow {
                        pc: self.pc,
                        op: format!("SWAP{}", n),
                    });
                }
                self.stack.swap(len - 1, len - 1 - n);
                self.pc += 1;
                continue;
            }

            let op = Opcode::from_byte(byte).ok_or(VmError::UnsupportedOpcode { pc: self.pc, byte })?;
            match op {
                Opcode::Stop => {
                    return Ok(Execution {
                        outcome: Outcome::Stopped,
                        steps,
                    })
                }
                Opcode::Add => self.binary(op, |a, b, m| (a + b) % m)?,
                Opcode::Mul => self.binary(op, |a, b, m| (a * b) % m)?,
                Opcode::Sub => self.binary(op, |a, b, m| (a + m - b) % m)?,
                Opcode::Div => self.binary(op, |a, b, _| {
                    if b.is_zero() {
                        BigUint::zero()
                    } else {
                        a / b
                    }
                })?,
                Opcode::AddMod | Opcode::MulMod => self.modular(op)?,
                Opcode::Lt => self.binary(op, |a, b, _| bool_word(a < b))?,
                Opcode::Gt => self.binary(op, |a, b, _| bool_word(a > b))?,
                Opcode::Eq => self.binary(op, |a, b, _| bool_word(a == b))?,
                Opcode::And => self.binary(op, |a, b, _| a & b)?,
                Opcode::Or => self.binary(op, |a, b, _| a | b)?,
                Opcode::IsZero => {
                    let a = self.pop(op.mnemonic())?;
                    self.push(bool_word(a.is_zero()))?;
                }
                Opcode::CallDataLoad => {
                    let offset = self.pop(op.mnemonic())?;
                    let mut word = [0u8; 32];
                    if let Some(start) = offset.to_usize() {
                        for (i, slot) in word.iter_mut().enumerate() {
                            if let Some(b) = start.checked_add(i).and_then(|j| self.calldata.get(j)) {
                                *slot = *b;
                            }
                        }
                    }
                    self.push(BigUint::from_bytes_be(&word))?;
                }
                Opcode::CallDataSize => self.push(BigUint::from(self.calldata.len()))?,
                Opcode::CodeSize => self.push(BigUint::from(self.code.len()))?,
                Opcode::CodeCopy => {
                    let dest = self.pop(op.mnemonic())?;
                    let src = self.pop(op.mnemonic())?;
                    let len = self.pop(op.mnemonic())?;
                    let len = self.offset(&len)?;
                    if len > 0 {
                        let dest = self.offset(&dest)?;
                        self.touch(dest, len)?;
                        let src = src.to_usize().unwrap_or(usize::MAX);
                        for i in 0..len {
                            self.memory[dest + i] = src
                                .checked_add(i)
                                .and_then(|j| self.code.get(j))
                                .copied()
                                .unwrap_or(0);
                        }
                    }
                }
                Opcode::Pop => {
                    self.pop(op.mnemonic())?;
                }
                Opcode::MLoad => {
                    let offset = self.pop(op.mnemonic())?;
                    let bytes = self.region(&offset, &BigUint::from(32u32))?;
                    self.push(BigUint::from_bytes_be(&bytes))?;
                }
                Opcode::MStore => {
                    let offset = self.pop(op.mnemonic())?;
                    let value = self.pop(op.mnemonic())?;
                    let offset = self.offset(&offset)?;
                    self.touch(offset, 32)?;
                    self.memory[offset..offset + 32].copy_from_slice(&word_bytes(&value));
                }
                Opcode::Jump => {
                    let target = self.pop(op.mnemonic())?;
                    self.jump_to(&target)?;
                    continue;
                }
                Opcode::JumpI => {
                    let target = self.pop(op.mnemonic())?;
                    let cond = self.pop(op.mnemonic())?;
                    if !cond.is_zero() {
                        self.jump_to(&target)?;
                        continue;
                    }
                }
                Opcode::JumpDest => {}
                Opcode::Return | Opcode::Revert => {
                    let offset = self.pop(op.mnemonic())?;
                    let len = self.pop(op.mnemonic())?;
                    let data = self.region(&offset, &len)?;
                    let outcome = if op == Opcode::Return {
                        Outcome::Returned(data)
                    } else {
                        Outcome::Reverted(data)
                    };
                    return Ok(Execution { outcome, steps });
                }
                Opcode::Invalid => {
                    return Ok(Execution {
                        outcome: Outcome::Aborted,
                        steps,
                    })
                }
            }
            self.pc += 1;
        }
    }
}

/// Run `code` against `calldata`.
pub fn execute(code: &[u8], calldata: &[u8], config: &VmConfig) -> Result<Execution, VmError> {
    let result = Machine::new(code, calldata).run(config);
    if let Ok(exec) = &result {
        debug!(steps = exec.steps, code_len = code.len(), "execution finished");
    }
    result
}

/// Run creation code and return the runtime code it deploys.
pub fn deploy(creation: &[u8]) -> Result<Vec<u8>, VmError> {
    match execute(creation, &[], &VmConfig::default())?.outcome {
        Outcome::Returned(runtime) => Ok(runtime),
        other => Err(VmError::NotDeployed(format!("{:?}", other))),
    }
}

/// Call a deployed permutation program and return its output word.
pub fn invoke(runtime: &[u8], calldata: &[u8]) -> Result<Word, InvokeError> {
    match execute(runtime, calldata, &VmConfig::default())?.outcome {
        Outcome::Returned(data) if data.len() == 32 => {
            let mut word = [0u8; 32];
            word.copy_from_slice(&data);
            Ok(word)
        }
        Outcome::Aborted => Err(RuntimeAbort::SelectorMismatch.into()),
        Outcome::Returned(data) => Err(InvokeError::NoResult(format!("{} bytes returned", data.len()))),
        other => Err(InvokeError::NoResult(format!("{:?}", other))),
    }
}

#[cfg(test)]
mod tests;
