//! Benchmarks for identifier normalization.
//!
//! Run with: cargo bench -p biomap --bench normalizer_benchmarks

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use serde_json::json;

use biomap::annotate::AssignedIds;
use biomap::normalize::{NormalizeOptions, clean_field_name};
use biomap::{Dataset, Entity, Normalizer};

/// Field names seen in real metabolomics and proteomics exports.
const FIELD_NAMES: &[&str] = &[
    "hmdb",
    "HMDB ID",
    "kegg",
    "KEGG.COMPOUND-codes",
    "pubchem_cid",
    "chebi",
    "uniprot",
    "lipidmaps",
    "refmet_id",
    "not_a_vocabulary",
];

/// (local id, candidate vocabulary keys) pairs.
const LOCAL_IDS: &[(&str, &[&str])] = &[
    ("HMDB0000062", &["hmdb"]),
    ("HMDB00062", &["hmdb"]),
    ("C00487", &["kegg.compound"]),
    ("CHEBI:17126", &["chebi"]),
    ("10917", &["pubchem.compound"]),
    ("P12345", &["uniprotkb"]),
    ("not an id", &["hmdb", "chebi"]),
];

fn bench_determine_vocab(c: &mut Criterion) {
    let mut group = c.benchmark_group("determine_vocab");

    for name in FIELD_NAMES {
        group.bench_with_input(BenchmarkId::new("cold", name), name, |b, name| {
            b.iter(|| {
                let normalizer = Normalizer::new();
                black_box(normalizer.determine_vocab(name))
            })
        });
    }

    let normalizer = Normalizer::new();
    for name in FIELD_NAMES {
        group.bench_with_input(BenchmarkId::new("cached", name), name, |b, name| {
            b.iter(|| black_box(normalizer.determine_vocab(name)))
        });
    }

    group.finish();
}

fn bench_clean_field_name(c: &mut Criterion) {
    c.bench_function("clean_field_name_all", |b| {
        b.iter(|| {
            for name in FIELD_NAMES {
                black_box(clean_field_name(name));
            }
        })
    });
}

fn bench_construct_curie(c: &mut Criterion) {
    let mut group = c.benchmark_group("construct_curie");
    let normalizer = Normalizer::new();

    for (local_id, candidates) in LOCAL_IDS {
        group.bench_with_input(
            BenchmarkId::from_parameter(local_id),
            &(local_id, candidates),
            |b, (local_id, candidates)| {
                b.iter(|| black_box(normalizer.construct_curie(local_id, candidates.iter())))
            },
        );
    }

    group.finish();
}

/// Normalize datasets of increasing size.
fn bench_normalize_dataset(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize_dataset");
    let normalizer = Normalizer::new();
    let options = NormalizeOptions {
        provided_id_fields: vec!["hmdb".to_string(), "kegg".to_string(), "pubchem".to_string()],
        ..Default::default()
    };

    for rows in [10, 100, 1000] {
        let dataset = Dataset::new(
            (0..rows)
                .map(|i| {
                    Entity::new()
                        .with("name", format!("metabolite {}", i))
                        .with("hmdb", format!("HMDB{:07}", i + 1))
                        .with("kegg", json!(["C00487", "C00031"]))
                        .with("pubchem", format!("{};-", i + 1))
                })
                .collect(),
        );
        let assigned = vec![AssignedIds::new(); rows];

        group.bench_with_input(BenchmarkId::from_parameter(rows), &dataset, |b, dataset| {
            b.iter(|| black_box(normalizer.normalize_dataset(dataset, &assigned, &options)))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_determine_vocab,
    bench_clean_field_name,
    bench_construct_curie,
    bench_normalize_dataset,
);
criterion_main!(benches);
