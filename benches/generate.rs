//! Generation throughput per arity, and one deployed call through the harness.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use poseidon_codegen::abi::{encode_call, EntrySignature};
use poseidon_codegen::field::word_from_u64;
use poseidon_codegen::{generate_program, vm};

fn bench_generate(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate");
    for arity in [1usize, 4, 8] {
        group.bench_with_input(BenchmarkId::from_parameter(arity), &arity, |b, &arity| {
            b.iter(|| generate_program(black_box(arity)).unwrap())
        });
    }
    group.finish();
}

fn bench_execute(c: &mut Criterion) {
    let program = generate_program(2).unwrap();
    let calldata = encode_call(
        EntrySignature::UintArray.selector(2),
        &word_from_u64(0),
        &[word_from_u64(1), word_from_u64(2)],
    );
    c.bench_function("invoke_arity_2", |b| {
        b.iter(|| vm::invoke(black_box(&program.runtime), black_box(&calldata)).unwrap())
    });
}

criterion_group!(benches, bench_generate, bench_execute);
criterion_main!(benches);
