//! Hot-path benchmarks for the federation domain: key normalization runs
//! on every keystroke of the search box, and consolidation on every record
//! open.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use sc_03_record_federation::{consolidate, domain::record_fields, normalize_name, PersonKey, Source};
use shared_types::Document;

fn bench_normalize_name(c: &mut Criterion) {
    c.bench_function("normalize_name_accented", |b| {
        b.iter(|| normalize_name(black_box("  JOÃO  Müller   da Conceição ")))
    });
}

fn bench_consolidate(c: &mut Criterion) {
    let key = PersonKey::derive("Ana Silva", None);
    let present: Vec<(Source, Document)> = Source::PRECEDENCE
        .iter()
        .map(|source| {
            (
                *source,
                Document::new("k")
                    .with(record_fields::NAME, "Ana Silva")
                    .with(record_fields::SEX, "F")
                    .with(record_fields::WEIGHT_KG, 40.0)
                    .with(record_fields::HEIGHT, 145.0),
            )
        })
        .collect();

    c.bench_function("consolidate_four_sources", |b| {
        b.iter(|| consolidate(black_box(&key), black_box(&present), vec![], None))
    });
}

criterion_group!(benches, bench_normalize_name, bench_consolidate);
criterion_main!(benches);
