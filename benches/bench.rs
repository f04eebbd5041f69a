// Criterion benchmarks for Shelter Match

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use shelter_match::core::{
    breeds::{canonical_breed_key, default_feature_names},
    distance::distance,
    BreedTable, Matcher, RangeModel,
};
use shelter_match::models::{AnimalRecord, Gender, PreferenceQuery, Size, WeightVector};
use std::sync::Arc;

const BREEDS: [&str; 6] = ["Beagle", "Golden Retriever", "Poodle", "Pug", "Siberian Husky", "Shiba Inu"];

fn create_table() -> BreedTable {
    let entries = BREEDS.iter().enumerate().map(|(i, name)| {
        let base = i as f64 / BREEDS.len() as f64;
        (*name, vec![base, 1.0 - base, base * 0.5, 0.3, 0.7])
    });
    BreedTable::from_vectors(default_feature_names(), entries)
}

fn create_candidate(id: usize) -> AnimalRecord {
    AnimalRecord::new(
        format!("Dog {}", id),
        BREEDS[id % BREEDS.len()],
        (1 + id % 15) as f64,
        if id % 2 == 0 { Gender::Female } else { Gender::Male },
        match id % 3 {
            0 => Size::Small,
            1 => Size::Medium,
            _ => Size::Large,
        },
    )
}

fn create_preferences() -> PreferenceQuery {
    PreferenceQuery {
        age: 4.0,
        gender: Gender::Female,
        size: Size::Medium,
        breed: "golden_retriever".to_string(),
    }
}

fn bench_canonical_key(c: &mut Criterion) {
    c.bench_function("canonical_breed_key", |b| {
        b.iter(|| canonical_breed_key(black_box("  Golden_Retriever-Mix ")));
    });
}

fn bench_distance(c: &mut Criterion) {
    let table = create_table();
    let ranges = RangeModel::default();
    let preferences = create_preferences();
    let weights = WeightVector::default();
    let candidate = create_candidate(7);

    c.bench_function("distance", |b| {
        b.iter(|| {
            distance(
                black_box(&preferences),
                black_box(&candidate),
                &weights,
                &ranges,
                &table,
            )
        });
    });
}

fn bench_matching(c: &mut Criterion) {
    let matcher = Matcher::with_defaults(Arc::new(create_table()));
    let preferences = create_preferences();
    let weights = WeightVector::default();

    let mut group = c.benchmark_group("matching");

    for candidate_count in [10, 100, 1000, 10_000].iter() {
        let candidates: Vec<AnimalRecord> = (0..*candidate_count).map(create_candidate).collect();

        group.bench_with_input(
            BenchmarkId::new("find_matches", candidate_count),
            candidate_count,
            |b, _| {
                b.iter(|| {
                    matcher.find_matches(
                        black_box(&preferences),
                        black_box(&weights),
                        black_box(&candidates),
                    )
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_canonical_key, bench_distance, bench_matching);

criterion_main!(benches);
