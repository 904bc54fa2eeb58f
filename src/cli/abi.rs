use std::path::PathBuf;
use std::process;

use super::write_output;
use poseidon_codegen::{GenerationError, MAX_ARITY, MIN_ARITY};

pub fn cmd_abi(arity: usize, output: Option<PathBuf>) {
    if !(MIN_ARITY..=MAX_ARITY).contains(&arity) {
        eprintln!("error: {}", GenerationError::InvalidArity(arity));
        process::exit(1);
    }
    match poseidon_codegen::abi::abi_json(arity) {
        Ok(json) => write_output(output.as_deref(), format!("{}\n", json).as_bytes()),
        Err(e) => {
            eprintln!("error: cannot serialize interface: {}", e);
            process::exit(1);
        }
    }
}
