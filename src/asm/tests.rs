use super::*;

#[test]
fn test_push_is_minimal() {
    let mut asm = Assembler::new();
    asm.push_u64(0);
    asm.push_u64(0x20);
    asm.push_u64(0x1234);
    let mut word = [0u8; 32];
    word[0] = 0xff;
    asm.push_word(&word);
    let code = asm.finalize().unwrap();
    assert_eq!(&code[..6], &[0x60, 0x00, 0x60, 0x20, 0x61, 0x12]);
    assert_eq!(code[6], 0x34);
    assert_eq!(code[7], 0x7f); // PUSH32
    assert_eq!(code.len(), 8 + 32);
}

#[test]
fn test_push_bytes_rejects_wide_literal() {
    let mut asm = Assembler::new();
    assert_eq!(asm.push_bytes(&[1u8; 33]), Err(AsmError::LiteralTooWide(33)));
    // Leading zeros do not count against the width.
    let mut padded = vec![0u8; 8];
    padded.extend_from_slice(&[7u8; 32]);
    assert!(asm.push_bytes(&padded).is_ok());
}

#[test]
fn test_dup_and_swap_encoding() {
    let mut asm = Assembler::new();
    asm.dup(0).unwrap();
    asm.dup(15).unwrap();
    asm.swap(1).unwrap();
    asm.swap(16).unwrap();
    assert_eq!(asm.finalize().unwrap(), vec![0x80, 0x8f, 0x90, 0x9f]);
}

#[test]
fn test_depth_window_is_enforced() {
    let mut asm = Assembler::new();
    assert_eq!(asm.dup(16), Err(AsmError::DupOutOfReach(16)));
    assert_eq!(asm.swap(0), Err(AsmError::SwapOutOfReach(0)));
    assert_eq!(asm.swap(17), Err(AsmError::SwapOutOfReach(17)));
    assert!(asm.is_empty(), "rejected instructions must not be recorded");
}

#[test]
fn test_forward_label_resolution() {
    let mut asm = Assembler::new();
    let target = Label::new("target");
    asm.jump(&target); // PUSH3 + JUMP = 5 bytes
    asm.abort(); // 1 byte
    asm.label(&target).unwrap(); // offset 6
    asm.op(Opcode::Stop);
    let code = asm.finalize().unwrap();
    assert_eq!(code, vec![0x62, 0x00, 0x00, 0x06, 0x56, 0xfe, 0x5b, 0x00]);
}

#[test]
fn test_undefined_label_fails_finalize() {
    let mut asm = Assembler::new();
    asm.jump(&Label::new("nowhere"));
    assert_eq!(asm.finalize(), Err(AsmError::UndefinedLabel("nowhere".to_string())));
}

#[test]
fn test_duplicate_label_rejected() {
    let mut asm = Assembler::new();
    let l = Label::new("twice");
    asm.label(&l).unwrap();
    assert_eq!(asm.label(&l), Err(AsmError::DuplicateLabel("twice".to_string())));
}

#[test]
fn test_listing_lines() {
    let mut asm = Assembler::new();
    let mix = Label::new("mix");
    asm.label(&mix).unwrap();
    asm.dup(2).unwrap();
    asm.push_u64(0x40);
    asm.swap(2).unwrap();
    asm.push_label(&mix);
    asm.mulmod();
    let lines: Vec<String> = asm.instructions().iter().map(|i| i.to_string()).collect();
    assert_eq!(lines, vec!["mix:", "DUP3", "PUSH1 0x40", "SWAP2", "PUSH3 @mix", "MULMOD"]);
}

#[test]
fn test_return_region_order() {
    let mut asm = Assembler::new();
    asm.return_region(0, 0x20);
    assert_eq!(asm.finalize().unwrap(), vec![0x60, 0x20, 0x60, 0x00, 0xf3]);
}

#[test]
fn test_creation_code_prefix() {
    let runtime = vec![0x60, 0x01, 0x00];
    let code = creation_code(&runtime).unwrap();
    // PUSH1 3, DUP1, PUSH1 11, PUSH1 0, CODECOPY, PUSH1 0, RETURN
    assert_eq!(
        &code[..11],
        &[0x60, 0x03, 0x80, 0x60, 0x0b, 0x60, 0x00, 0x39, 0x60, 0x00, 0xf3]
    );
    assert_eq!(&code[11..], runtime.as_slice());
}

#[test]
fn test_creation_code_wide_length() {
    let runtime = vec![0u8; 0x1234];
    let code = creation_code(&runtime).unwrap();
    // PUSH2 len grows the loader by one byte.
    assert_eq!(&code[..3], &[0x61, 0x12, 0x34]);
    assert_eq!(code[5], 12);
    assert_eq!(code.len(), 12 + runtime.len());
}

#[test]
fn test_disassemble_round_trip_listing() {
    let mut asm = Assembler::new();
    let start = Label::new("start");
    asm.push_u64(0x20);
    asm.dup(1).unwrap();
    asm.jumpi(&start);
    asm.abort();
    asm.label(&start).unwrap();
    asm.swap(3).unwrap();
    let lines = disassemble(&asm.finalize().unwrap());
    assert_eq!(
        lines,
        vec![
            "0000  PUSH1 0x20",
            "0002  DUP2",
            "0003  PUSH3 0x000009",
            "0007  JUMPI",
            "0008  INVALID",
            "0009  JUMPDEST",
            "000a  SWAP3",
        ]
    );
}

#[test]
fn test_disassemble_unknown_and_truncated() {
    assert_eq!(disassemble(&[0x0c, 0x61, 0xab]), vec!["0000  0x0c", "0001  PUSH2 0xab"]);
}
