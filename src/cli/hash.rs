use std::process;

use tracing::debug;

use super::load_program;
use crate::Entry;
use poseidon_codegen::abi::{encode_call, EntrySignature};
use poseidon_codegen::field::{from_word, parse_word, to_word, word_to_decimal, Word};
use poseidon_codegen::{reference, vm};

fn parse_or_exit(text: &str) -> Word {
    match parse_word(text) {
        Ok(word) => word,
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    }
}

/// Run the generated program on the inputs and print the result in decimal.
///
/// The result is cross-checked against the reference permutation; a
/// mismatch is reported as an error.
pub fn cmd_hash(arity: Option<usize>, capacity: &str, entry: Entry, inputs: &[String]) {
    let arity = arity.unwrap_or(inputs.len());
    if arity != inputs.len() {
        eprintln!(
            "error: arity {} needs {} inputs, got {}",
            arity,
            arity,
            inputs.len()
        );
        process::exit(1);
    }

    let capacity = parse_or_exit(capacity);
    let words: Vec<Word> = inputs.iter().map(|s| parse_or_exit(s)).collect();

    let program = load_program(arity);
    let runtime = match vm::deploy(&program.creation) {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    };

    let signature = match entry {
        Entry::Uint => EntrySignature::UintArray,
        Entry::Bytes32 => EntrySignature::Bytes32Array,
    };
    let calldata = encode_call(signature.selector(arity), &capacity, &words);
    debug!(signature = %signature.signature(arity), calldata_len = calldata.len(), "calling");

    let result = match vm::invoke(&runtime, &calldata) {
        Ok(word) => word,
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    };

    let elements: Vec<_> = words.iter().map(from_word).collect();
    match reference::poseidon_ext(from_word(&capacity), &elements) {
        Ok(expected) if to_word(&expected) == result => {
            println!("{}", word_to_decimal(&result));
        }
        Ok(expected) => {
            eprintln!(
                "error: bytecode returned {} but the reference permutation gives {}",
                word_to_decimal(&result),
                word_to_decimal(&to_word(&expected))
            );
            process::exit(1);
        }
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    }
}
