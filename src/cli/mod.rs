pub mod abi;
pub mod disasm;
pub mod generate;
pub mod hash;

use std::path::Path;
use std::process;

use poseidon_codegen::Program;

/// Generate the program for `arity` or exit with the error.
pub fn load_program(arity: usize) -> Program {
    match poseidon_codegen::generate_program(arity) {
        Ok(program) => program,
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    }
}

/// Write `bytes` to `path`, or to stdout if there is none.
pub fn write_output(path: Option<&Path>, bytes: &[u8]) {
    use std::io::Write;

    let result = match path {
        Some(path) => std::fs::write(path, bytes)
            .map_err(|e| format!("cannot write '{}': {}", path.display(), e)),
        None => std::io::stdout()
            .write_all(bytes)
            .map_err(|e| format!("cannot write to stdout: {}", e)),
    };
    if let Err(msg) = result {
        eprintln!("error: {}", msg);
        process::exit(1);
    }
}
