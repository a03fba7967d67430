//! Parse and format throughput on synthetic programs of growing size.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

use lea::{format_program, format_source, parse_source, FormatConfig};

/// A program of `n` bindings mixing the constructs the formatter lays out.
fn synthetic_program(n: usize) -> String {
    let mut src = String::new();
    for i in 0..n {
        match i % 5 {
            0 => src.push_str(&format!(
                "let v{i} = xs /> map((x) -> x * {i}) /> filter((x) -> x > 2) /> sum\n"
            )),
            1 => src.push_str(&format!(
                "let f{i} = (a, b = {i}) -> {{ let c = a + b; c * 2 }} :: (Int, Int) :> Int\n"
            )),
            2 => src.push_str(&format!(
                "let m{i} = match v{} | 0 -> \"zero\" | if v{} > 3 -> `big ${{v{}}}` | \"small\"\n",
                i - 2,
                i - 2,
                i - 2
            )),
            3 => src.push_str(&format!(
                "let r{i} = {{ name: \"item{i}\", tags: [\"a\", \"b\", \"c\"], weight: {i}.5 }}\n"
            )),
            _ => src.push_str(&format!("let p{i} = v{} \\> inc \\> dec /> combine\n", i - 4)),
        }
    }
    src
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    for n in [100, 1000] {
        let src = synthetic_program(n);
        group.throughput(Throughput::Bytes(src.len() as u64));
        group.bench_function(format!("{}_bindings", n), |b| {
            b.iter(|| parse_source(black_box(&src), 0))
        });
    }
    group.finish();
}

fn bench_format(c: &mut Criterion) {
    let config = FormatConfig::default();
    let mut group = c.benchmark_group("format");
    for n in [100, 1000] {
        let src = synthetic_program(n);
        let program = match parse_source(&src, 0) {
            Ok(program) => program,
            Err(e) => panic!("synthetic program should parse: {}", e),
        };
        group.throughput(Throughput::Bytes(src.len() as u64));
        group.bench_function(format!("{}_bindings", n), |b| {
            b.iter(|| format_program(black_box(&program), &config))
        });
    }
    group.finish();
}

/// Benchmark: source text to canonical text, the `lea fmt` hot path.
fn bench_round_trip(c: &mut Criterion) {
    let config = FormatConfig::default();
    let src = synthetic_program(1000);
    c.bench_function("format_source_1000_bindings", |b| {
        b.iter(|| format_source(black_box(&src), &config))
    });
}

criterion_group!(benches, bench_parse, bench_format, bench_round_trip);
criterion_main!(benches);
