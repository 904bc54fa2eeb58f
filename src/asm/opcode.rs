/// EVM opcodes used by the generator, the creation loader and the harness.
///
/// PUSH, DUP and SWAP are families and live in `Instruction`; their base
/// bytes are the constants below.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Opcode {
    Stop = 0x00,
    Add = 0x01,
    Mul = 0x02,
    Sub = 0x03,
    Div = 0x04,
    AddMod = 0x08,
    MulMod = 0x09,
    Lt = 0x10,
    Gt = 0x11,
    Eq = 0x14,
    IsZero = 0x15,
    And = 0x16,
    Or = 0x17,
    CallDataLoad = 0x35,
    CallDataSize = 0x36,
    CodeSize = 0x38,
    CodeCopy = 0x39,
    Pop = 0x50,
    MLoad = 0x51,
    MStore = 0x52,
    Jump = 0x56,
    JumpI = 0x57,
    JumpDest = 0x5b,
    Return = 0xf3,
    Revert = 0xfd,
    Invalid = 0xfe,
}

pub const PUSH0: u8 = 0x5f;
pub const PUSH1: u8 = 0x60;
pub const PUSH32: u8 = 0x7f;
pub const DUP1: u8 = 0x80;
pub const DUP16: u8 = 0x8f;
pub const SWAP1: u8 = 0x90;
pub const SWAP16: u8 = 0x9f;

impl Opcode {
    pub fn byte(self) -> u8 {
        self as u8
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Stop => "STOP",
            Opcode::Add => "ADD",
            Opcode::Mul => "MUL",
            Opcode::Sub => "SUB",
            Opcode::Div => "DIV",
            Opcode::AddMod => "ADDMOD",
            Opcode::MulMod => "MULMOD",
            Opcode::Lt => "LT",
            Opcode::Gt => "GT",
            Opcode::Eq => "EQ",
            Opcode::IsZero => "ISZERO",
            Opcode::And => "AND",
            Opcode::Or => "OR",
            Opcode::CallDataLoad => "CALLDATALOAD",
            Opcode::CallDataSize => "CALLDATASIZE",
            Opcode::CodeSize => "CODESIZE",
            Opcode::CodeCopy => "CODECOPY",
            Opcode::Pop => "POP",
            Opcode::MLoad => "MLOAD",
            Opcode::MStore => "MSTORE",
            Opcode::Jump => "JUMP",
            Opcode::JumpI => "JUMPI",
            Opcode::JumpDest => "JUMPDEST",
            Opcode::Return => "RETURN",
            Opcode::Revert => "REVERT",
            Opcode::Invalid => "INVALID",
        }
    }

    pub fn from_byte(byte: u8) -> Option<Self> {
        let op = match byte {
            0x00 => Opcode::Stop,
            0x01 => Opcode::Add,
            0x02 => Opcode::Mul,
            0x03 => Opcode::Sub,
            0x04 => Opcode::Div,
            0x08 => Opcode::AddMod,
            0x09 => Opcode::MulMod,
            0x10 => Opcode::Lt,
            0x11 => Opcode::Gt,
            0x14 => Opcode::Eq,
            0x15 => Opcode::IsZero,
            0x16 => Opcode::And,
            0x17 => Opcode::Or,
            0x35 => Opcode::CallDataLoad,
            0x36 => Opcode::CallDataSize,
            0x38 => Opcode::CodeSize,
            0x39 => Opcode::CodeCopy,
            0x50 => Opcode::Pop,
            0x51 => Opcode::MLoad,
            0x52 => Opcode::MStore,
            0x56 => Opcode::Jump,
            0x57 => Opcode::JumpI,
            0x5b => Opcode::JumpDest,
            0xf3 => Opcode::Return,
            0xfd => Opcode::Revert,
            0xfe => Opcode::Invalid,
            _ => return None,
        };
        Some(op)
    }
}

/// Number of immediate bytes following `byte` in the code stream.
pub fn immediate_len(byte: u8) -> usize {
    if (PUSH1..=PUSH32).contains(&byte) {
        (byte - PUSH1 + 1) as usize
    } else {
        0
    }
}
