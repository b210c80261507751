use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use cpu8::{artifact::hex, assembler, calc};

fn long_source() -> String {
    let mut src = String::new();
    for i in 0..100 {
        src.push_str(&format!("l{}:\nLDI R{}, {}\nBRZ l{}\n", i, i % 8, i, (i + 50) % 100));
    }
    src
}

fn bench_assemble(c: &mut Criterion) {
    let mul_src = calc::generate(37, 200, "*").unwrap();
    let long_src = long_source();

    c.bench_function("assemble mul", |b| {
        b.iter(|| assembler::assemble(black_box(&mul_src)).unwrap())
    });

    c.bench_function("assemble 100 labels", |b| {
        b.iter(|| assembler::assemble(black_box(&long_src)).unwrap())
    });

    c.bench_function("serialize hex", |b| {
        b.iter_batched(
            || assembler::assemble(&long_src).unwrap(),
            |program| hex::serialize(&program),
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_assemble);
criterion_main!(benches);
