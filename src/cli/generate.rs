use std::path::PathBuf;
use std::process;

use rayon::prelude::*;
use tracing::info;

use super::{load_program, write_output};
use crate::OutputFormat;
use poseidon_codegen::{generate_program, Program, MAX_ARITY, MIN_ARITY};

fn encode(program: &Program, runtime: bool, format: OutputFormat) -> Vec<u8> {
    let code = if runtime {
        &program.runtime
    } else {
        &program.creation
    };
    match format {
        OutputFormat::Hex => format!("0x{}\n", hex::encode(code)).into_bytes(),
        OutputFormat::Bin => code.clone(),
    }
}

fn file_name(arity: usize, format: OutputFormat) -> String {
    let ext = match format {
        OutputFormat::Hex => "hex",
        OutputFormat::Bin => "bin",
    };
    format!("poseidon{}.{}", arity, ext)
}

pub fn cmd_generate(
    arity: Option<usize>,
    runtime: bool,
    format: OutputFormat,
    output: Option<PathBuf>,
) {
    let Some(arity) = arity else {
        eprintln!("error: --arity is required unless --all is given");
        process::exit(1);
    };
    let program = load_program(arity);
    write_output(output.as_deref(), &encode(&program, runtime, format));
}

/// Generate every arity in parallel. With `-o DIR` each program goes to
/// `DIR/poseidon<n>.<ext>`; otherwise hex lines `<n> 0x…` go to stdout.
pub fn cmd_generate_all(runtime: bool, format: OutputFormat, output: Option<PathBuf>) {
    let results: Vec<_> = (MIN_ARITY..=MAX_ARITY)
        .into_par_iter()
        .map(|arity| (arity, generate_program(arity)))
        .collect();

    let mut programs = Vec::with_capacity(results.len());
    for (arity, result) in results {
        match result {
            Ok(program) => programs.push(program),
            Err(e) => {
                eprintln!("error: arity {}: {}", arity, e);
                process::exit(1);
            }
        }
    }

    match output {
        Some(dir) => {
            if let Err(e) = std::fs::create_dir_all(&dir) {
                eprintln!("error: cannot create '{}': {}", dir.display(), e);
                process::exit(1);
            }
            for program in &programs {
                let path = dir.join(file_name(program.arity, format));
                write_output(Some(&path), &encode(program, runtime, format));
                info!(path = %path.display(), "wrote program");
            }
            eprintln!("Wrote {} programs to {}", programs.len(), dir.display());
        }
        None => {
            if matches!(format, OutputFormat::Bin) {
                eprintln!("error: --format bin with --all needs an output directory");
                process::exit(1);
            }
            for program in &programs {
                let code = if runtime {
                    &program.runtime
                } else {
                    &program.creation
                };
                println!("{} 0x{}", program.arity, hex::encode(code));
            }
        }
    }
}
