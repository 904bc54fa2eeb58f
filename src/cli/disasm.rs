use super::load_program;
use poseidon_codegen::asm::disassemble;

pub fn cmd_disasm(arity: usize, runtime: bool, symbolic: bool) {
    let program = load_program(arity);
    if symbolic {
        println!("{}", program.listing());
        return;
    }
    let code = if runtime {
        &program.runtime
    } else {
        &program.creation
    };
    for line in disassemble(code) {
        println!("{}", line);
    }
    eprintln!(
        "{} bytes ({} runtime, {} instructions)",
        code.len(),
        program.runtime.len(),
        program.instructions.len()
    );
}
