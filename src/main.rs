mod cli;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "poseidon-codegen",
    version,
    about = "Generate EVM bytecode for the circom-compatible Poseidon permutation"
)]
struct Cli {
    /// Log generation details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Emit bytecode for one arity, or every arity with --all
    Generate {
        /// Number of inputs (1..=8)
        #[arg(long, required_unless_present = "all", conflicts_with = "all")]
        arity: Option<usize>,
        /// Generate every supported arity; -o names a directory
        #[arg(long)]
        all: bool,
        /// Emit the runtime program instead of creation code
        #[arg(long)]
        runtime: bool,
        /// Output encoding
        #[arg(long, value_enum, default_value = "hex")]
        format: OutputFormat,
        /// Output file (or directory with --all); stdout if omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the JSON interface description
    Abi {
        /// Number of inputs (1..=8)
        #[arg(long)]
        arity: usize,
        /// Output file; stdout if omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Disassemble the generated code
    Disasm {
        /// Number of inputs (1..=8)
        #[arg(long)]
        arity: usize,
        /// Disassemble the runtime program instead of creation code
        #[arg(long)]
        runtime: bool,
        /// Print the symbolic listing with labels instead of offsets
        #[arg(long)]
        symbolic: bool,
    },
    /// Deploy and call the generated program, checking it against the reference
    Hash {
        /// Number of inputs (defaults to the number of INPUT values)
        #[arg(long)]
        arity: Option<usize>,
        /// Initial capacity element
        #[arg(long, default_value = "0")]
        capacity: String,
        /// Entry signature to call
        #[arg(long, value_enum, default_value = "uint")]
        entry: Entry,
        /// Input values, decimal or 0x-prefixed hex
        #[arg(required = true)]
        inputs: Vec<String>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    /// 0x-prefixed hex text
    Hex,
    /// Raw bytes
    Bin,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Entry {
    /// poseidonExt(uint256,uint256[n])
    Uint,
    /// poseidonExt(uint256,bytes32[n])
    Bytes32,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Generate {
            arity,
            all,
            runtime,
            format,
            output,
        } => {
            if all {
                cli::generate::cmd_generate_all(runtime, format, output)
            } else {
                cli::generate::cmd_generate(arity, runtime, format, output)
            }
        }
        Command::Abi { arity, output } => cli::abi::cmd_abi(arity, output),
        Command::Disasm {
            arity,
            runtime,
            symbolic,
        } => cli::disasm::cmd_disasm(arity, runtime, symbolic),
        Command::Hash {
            arity,
            capacity,
            entry,
            inputs,
        } => cli::hash::cmd_hash(arity, &capacity, entry, &inputs),
    }
}
