use super::*;
use crate::asm::{self, Assembler, Label};
use crate::field::word_from_u64;

fn run(asm: &Assembler, calldata: &[u8]) -> Execution {
    let code = asm.finalize().unwrap();
    execute(&code, calldata, &VmConfig::default()).unwrap()
}

fn returned_word(exec: &Execution) -> BigUint {
    match &exec.outcome {
        Outcome::Returned(data) => BigUint::from_bytes_be(data),
        other => panic!("expected return, got {:?}", other),
    }
}

/// Compute with `body`, store the top at 0 and return it.
fn eval(body: impl FnOnce(&mut Assembler)) -> BigUint {
    let mut asm = Assembler::new();
    body(&mut asm);
    asm.push_u64(0);
    asm.mstore();
    asm.return_region(0, 32);
    returned_word(&run(&asm, &[]))
}

#[test]
fn test_empty_code_stops() {
    let exec = execute(&[], &[], &VmConfig::default()).unwrap();
    assert_eq!(exec.outcome, Outcome::Stopped);
    assert_eq!(exec.steps, 0);
}

#[test]
fn test_addmod_mulmod_use_third_operand() {
    // (5 + 4) mod 7
    let r = eval(|a| {
        a.push_u64(7);
        a.push_u64(4);
        a.push_u64(5);
        a.addmod();
    });
    assert_eq!(r, BigUint::from(2u32));
    // (5 · 4) mod 7
    let r = eval(|a| {
        a.push_u64(7);
        a.push_u64(4);
        a.push_u64(5);
        a.mulmod();
    });
    assert_eq!(r, BigUint::from(6u32));
}

#[test]
fn test_mulmod_does_not_overflow() {
    let q = crate::field::modulus_word();
    let mut big = [0xffu8; 32];
    big[0] = 0x30;
    let expected = {
        let b = BigUint::from_bytes_be(&big);
        (&b * &b) % BigUint::from_bytes_be(&q)
    };
    let r = eval(|a| {
        a.push_word(&q);
        a.push_word(&big);
        a.push_word(&big);
        a.mulmod();
    });
    assert_eq!(r, expected);
}

#[test]
fn test_div_shifts_out_selector() {
    let calldata = [0xde, 0xad, 0xbe, 0xef, 0x11, 0x22];
    let mut asm = Assembler::new();
    asm.push_word(&crate::codegen::layout::selector_shift());
    asm.push_u64(0);
    asm.calldataload();
    asm.div();
    asm.push_u64(0);
    asm.mstore();
    asm.return_region(0, 32);
    let r = returned_word(&run(&asm, &calldata));
    assert_eq!(r, BigUint::from(0xdeadbeef_u32));
}

#[test]
fn test_calldataload_pads_with_zero() {
    let calldata = [0, 0, 0, 0, 0x01];
    let mut asm = Assembler::new();
    asm.push_u64(4);
    asm.calldataload();
    asm.push_u64(0);
    asm.mstore();
    asm.return_region(0, 32);
    assert_eq!(
        returned_word(&run(&asm, &calldata)),
        BigUint::one() << 248
    );
}

#[test]
fn test_dup_swap_semantics() {
    // [1, 2, 3] top 3: SWAP2 → [3, 2, 1], DUP3 → copies 3.
    let r = eval(|a| {
        a.push_u64(1);
        a.push_u64(2);
        a.push_u64(3);
        a.swap(2).unwrap();
        a.dup(2).unwrap();
    });
    assert_eq!(r, BigUint::from(3u32));
}

#[test]
fn test_indirect_jump_through_memory() {
    let mut asm = Assembler::new();
    let back = Label::new("back");
    let sub = Label::new("sub");
    asm.push_label(&back);
    asm.push_u64(0);
    asm.mstore();
    asm.jump(&sub);
    asm.label(&back).unwrap();
    asm.push_u64(0x20);
    asm.mload();
    asm.push_u64(0);
    asm.mstore();
    asm.return_region(0, 32);
    asm.label(&sub).unwrap();
    asm.push_u64(77);
    asm.push_u64(0x20);
    asm.mstore();
    asm.push_u64(0);
    asm.mload();
    asm.jump_indirect();
    assert_eq!(returned_word(&run(&asm, &[])), BigUint::from(77u32));
}

#[test]
fn test_jump_into_push_data_rejected() {
    // PUSH1 0x5b; PUSH1 1; JUMP: offset 1 is push data, not a JUMPDEST.
    let code = [0x60, 0x5b, 0x60, 0x01, 0x56];
    let err = execute(&code, &[], &VmConfig::default()).unwrap_err();
    assert!(matches!(err, VmError::BadJump { .. }));
}

#[test]
fn test_invalid_aborts() {
    let mut asm = Assembler::new();
    asm.push_u64(1);
    asm.abort();
    assert_eq!(run(&asm, &[]).outcome, Outcome::Aborted);
}

#[test]
fn test_stack_underflow() {
    let err = execute(&[Opcode::AddMod.byte()], &[], &VmConfig::default()).unwrap_err();
    assert_eq!(
        err,
        VmError::StackUnderflow {
            pc: 0,
            op: "ADDMOD".to_string()
        }
    );
}

#[test]
fn test_unsupported_opcode() {
    let err = execute(&[0x0c], &[], &VmConfig::default()).unwrap_err();
    assert_eq!(err, VmError::UnsupportedOpcode { pc: 0, byte: 0x0c });
}

#[test]
fn test_step_limit() {
    // loop: JUMPDEST; PUSH1 0; JUMP
    let code = [0x5b, 0x60, 0x00, 0x56];
    let config = VmConfig { step_limit: 100 };
    assert_eq!(
        execute(&code, &[], &config).unwrap_err(),
        VmError::StepLimit(100)
    );
}

#[test]
fn test_deploy_returns_runtime() {
    let runtime = vec![0x60, 0x2a, 0x60, 0x00, 0x52, 0x60, 0x20, 0x60, 0x00, 0xf3];
    let creation = asm::creation_code(&runtime).unwrap();
    assert_eq!(deploy(&creation).unwrap(), runtime);
    let word = invoke(&runtime, &[]).unwrap();
    assert_eq!(word, word_from_u64(42));
}

#[test]
fn test_deploy_requires_return() {
    assert!(matches!(deploy(&[0x00]), Err(VmError::NotDeployed(_))));
}

#[test]
fn test_invoke_maps_abort_to_selector_mismatch() {
    assert_eq!(
        invoke(&[Opcode::Invalid.byte()], &[]),
        Err(InvokeError::Abort(RuntimeAbort::SelectorMismatch))
    );
}
