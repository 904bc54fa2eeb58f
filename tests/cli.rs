use std::process::Command;

fn bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_poseidon-codegen"))
}

fn stdout_of(args: &[&str]) -> String {
    let out = bin().args(args).output().expect("run binary");
    assert!(
        out.status.success(),
        "{:?} failed: {}",
        args,
        String::from_utf8_lossy(&out.stderr)
    );
    String::from_utf8(out.stdout).unwrap()
}

#[test]
fn test_generate_hex_matches_library() {
    let text = stdout_of(&["generate", "--arity", "2"]);
    let expected = poseidon_codegen::generate(2).unwrap();
    assert_eq!(text.trim(), format!("0x{}", hex::encode(expected)));
}

#[test]
fn test_generate_runtime_bin_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("p3.bin");
    stdout_of(&[
        "generate",
        "--arity",
        "3",
        "--runtime",
        "--format",
        "bin",
        "-o",
        path.to_str().unwrap(),
    ]);
    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(bytes, poseidon_codegen::generate_program(3).unwrap().runtime);
}

#[test]
fn test_generate_all_into_directory() {
    let dir = tempfile::tempdir().unwrap();
    let out = bin()
        .args(["generate", "--all", "-o"])
        .arg(dir.path())
        .output()
        .unwrap();
    assert!(out.status.success());
    for arity in 1..=8 {
        let path = dir.path().join(format!("poseidon{}.hex", arity));
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("0x"), "{}", path.display());
    }
}

#[test]
fn test_invalid_arity_exits_with_error() {
    let out = bin().args(["generate", "--arity", "9"]).output().unwrap();
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("error: invalid number of inputs 9"), "{}", stderr);
}

#[test]
fn test_abi_output() {
    let text = stdout_of(&["abi", "--arity", "4"]);
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json[0]["inputs"][1]["type"], "bytes32[4]");
    assert_eq!(json[1]["inputs"][1]["type"], "uint256[4]");
}

#[test]
fn test_hash_prints_circomlib_vector() {
    let text = stdout_of(&["hash", "1", "2"]);
    assert_eq!(
        text.trim(),
        "7853200120776062878684798364095072458815029376092732009249414926327459813530"
    );
    let text = stdout_of(&["hash", "--entry", "bytes32", "0x1", "0x2"]);
    assert_eq!(
        text.trim(),
        "7853200120776062878684798364095072458815029376092732009249414926327459813530"
    );
}

#[test]
fn test_hash_rejects_arity_mismatch() {
    let out = bin().args(["hash", "--arity", "3", "1", "2"]).output().unwrap();
    assert!(!out.status.success());
}

#[test]
fn test_disasm_symbolic_contains_mix() {
    let text = stdout_of(&["disasm", "--arity", "1", "--symbolic"]);
    assert!(text.lines().any(|l| l == "mix:"));
    assert!(text.lines().any(|l| l == "PUSH3 @mix"));
    let text = stdout_of(&["disasm", "--arity", "1", "--runtime"]);
    assert!(text.starts_with("0000  PUSH29 0x01"));
}
