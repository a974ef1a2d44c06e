//! Benchmark template compilation and rendering time.

use std::io;

use criterion::{criterion_group, criterion_main, Criterion};

use benches::{context, templates};

criterion_main! { benches }
criterion_group! { benches, bench_compile, bench_render }

/// Benchmarks the time taken to compile a template into Rust source.
fn bench_compile(c: &mut Criterion) {
    let mut g = c.benchmark_group("compile");

    let compiler = hewn::Compiler::new();
    g.bench_function("single", |b| {
        b.iter(|| compiler.compile("users.html", benches::USERS, "templates"));
    });

    let source = benches::repeat(50);
    g.bench_function("repeated", |b| {
        b.iter(|| compiler.compile("users.html", &source, "templates"));
    });
}

/// Benchmarks the time taken to render the generated code.
fn bench_render(c: &mut Criterion) {
    let mut g = c.benchmark_group("render");

    let ctx = context::random(150);

    g.bench_function("string", |b| {
        b.iter(|| templates::users(&ctx));
    });

    g.bench_function("writer", |b| {
        b.iter(|| templates::users_to_writer(&ctx, &mut io::sink()));
    });

    g.bench_function("writer_with_result", |b| {
        b.iter(|| templates::users_to_writer_with_result(&ctx, &mut io::sink()));
    });
}
