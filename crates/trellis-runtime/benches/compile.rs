//! Compilation benchmarks
//!
//! Measures the full pipeline (parse, resolve, invoke) on canonical
//! expression shapes: flat calls, chains, nesting, and variadic packing.

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use trellis_runtime::{patterns, PatternCompiler};

fn compiler() -> PatternCompiler {
    PatternCompiler::new(Arc::new(patterns::standard_registry()))
}

fn bench_flat_call(c: &mut Criterion) {
    let compiler = compiler();
    c.bench_function("compile_flat", |b| {
        b.iter(|| compiler.compile(black_box("string()")).unwrap())
    });
}

fn bench_chain(c: &mut Criterion) {
    let compiler = compiler();
    let expr = r#"string().startsWith("a").contains("bc").endsWith("d")"#;
    c.bench_function("compile_chain", |b| {
        b.iter(|| compiler.compile(black_box(expr)).unwrap())
    });
}

fn bench_nested(c: &mut Criterion) {
    let compiler = compiler();
    let expr = r#"anyOf(not(string().contains("x")), string().oneOf("a", "b", "c"))"#;
    c.bench_function("compile_nested", |b| {
        b.iter(|| compiler.compile(black_box(expr)).unwrap())
    });
}

fn bench_deep_nesting(c: &mut Criterion) {
    let compiler = compiler();
    let expr = format!("{}string(){}", "not(".repeat(30), ")".repeat(30));
    c.bench_function("compile_deep_nesting", |b| {
        b.iter(|| compiler.compile(black_box(&expr)).unwrap())
    });
}

criterion_group!(
    benches,
    bench_flat_call,
    bench_chain,
    bench_nested,
    bench_deep_nesting
);
criterion_main!(benches);
