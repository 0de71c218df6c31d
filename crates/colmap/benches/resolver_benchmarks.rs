//! Resolution and conversion performance benchmarks.
//!
//! Measures lexical resolution on wide schemas, where every target is scored
//! against every unclaimed source, and projection of large uploads.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use colmap::{
    AiSuggestions, DataTable, MockProvider, SourceSchema, SuggestionAdapter, TargetSchema,
    normalize, project, resolve,
};

const WORDS: &[&str] = &[
    "customer", "order", "ship", "billing", "contact", "product", "unit", "total", "tax", "region",
];
const SUFFIXES: &[&str] = &["name", "id", "date", "amount", "code", "email", "phone", "address"];

/// Generate distinct template-style names like `Customer Name 3`.
fn generate_target_names(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| {
            format!(
                "{} {} {}",
                capitalize(WORDS[i % WORDS.len()]),
                capitalize(SUFFIXES[(i / WORDS.len()) % SUFFIXES.len()]),
                i
            )
        })
        .collect()
}

/// Generate upload-style names: snake case, some bilingual, some shuffled.
fn generate_source_names(count: usize) -> Vec<String> {
    (0..count)
        .rev()
        .map(|i| {
            let base = format!(
                "{}_{}_{}",
                WORDS[i % WORDS.len()],
                SUFFIXES[(i / WORDS.len()) % SUFFIXES.len()],
                i
            );
            if i % 4 == 0 {
                format!("{} (字段{})", base, i)
            } else {
                base
            }
        })
        .collect()
}

fn generate_rows(headers: &[String], rows: usize) -> Vec<Vec<String>> {
    (0..rows)
        .map(|r| headers.iter().map(|h| format!("{}:{}", h, r)).collect())
        .collect()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Benchmark normalization of messy headers.
fn bench_normalize(c: &mut Criterion) {
    let names = generate_source_names(200);

    c.bench_function("normalize_200_headers", |b| {
        b.iter(|| {
            for name in &names {
                black_box(normalize(name));
            }
        })
    });
}

/// Benchmark lexical resolution as schemas widen.
fn bench_resolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve_lexical");

    for width in [10, 50, 100, 250].iter() {
        let target = TargetSchema::new(generate_target_names(*width)).unwrap();
        let source = SourceSchema::new(generate_source_names(*width)).unwrap();
        let ai = AiSuggestions::disabled();

        group.throughput(Throughput::Elements((*width * *width) as u64));
        group.bench_with_input(BenchmarkId::new("columns", width), &width, |b, _| {
            b.iter(|| black_box(resolve(&target, &source, &ai, 70).unwrap()))
        });
    }

    group.finish();
}

/// Benchmark resolution with echoed AI suggestions.
fn bench_resolve_with_ai(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve_with_ai");

    for width in [10, 100].iter() {
        let names = generate_target_names(*width);
        let target = TargetSchema::new(names.clone()).unwrap();
        let source = SourceSchema::new(names).unwrap();
        let ai = SuggestionAdapter::new(MockProvider::new())
            .suggest(&target, &source)
            .unwrap();

        group.bench_with_input(BenchmarkId::new("columns", width), &width, |b, _| {
            b.iter(|| black_box(resolve(&target, &source, &ai, 70).unwrap()))
        });
    }

    group.finish();
}

/// Benchmark projection of source rows into template order.
fn bench_project(c: &mut Criterion) {
    let mut group = c.benchmark_group("project");

    let names = generate_target_names(20);
    let target = TargetSchema::new(names.clone()).unwrap();
    let source = SourceSchema::new(names.clone()).unwrap();
    let table = resolve(&target, &source, &AiSuggestions::disabled(), 70).unwrap();

    for rows in [100, 1_000, 10_000].iter() {
        let data = DataTable::new(names.clone(), generate_rows(&names, *rows), b',');

        group.throughput(Throughput::Elements(*rows as u64));
        group.bench_with_input(BenchmarkId::new("rows", rows), &data, |b, data| {
            b.iter(|| black_box(project(&table, data)))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_normalize,
    bench_resolve,
    bench_resolve_with_ai,
    bench_project,
);
criterion_main!(benches);
