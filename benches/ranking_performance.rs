//! Performance benchmarks for ranking computations

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use h2h_ranker::ranking::{normalize, parse_matrix};
use h2h_ranker::types::{Algorithm, Cell};
use h2h_ranker::RankingEngine;

/// Reciprocal league of `n` competitors with deterministic small records
fn league(n: usize) -> Vec<Vec<Cell>> {
    (0..n)
        .map(|i| {
            (0..n)
                .map(|j| {
                    let (wins, losses) = if i == j {
                        (0, 0)
                    } else {
                        let (a, b) = (i.min(j), i.max(j));
                        let forward = ((a * 7 + b * 3) % 5, (a * 3 + b * 11) % 4);
                        if i < j {
                            forward
                        } else {
                            (forward.1, forward.0)
                        }
                    };
                    Cell::from(format!("{} -- {}", wins, losses))
                })
                .collect()
        })
        .collect()
}

fn bench_rankers(c: &mut Criterion) {
    let engine = RankingEngine::default();
    let mut group = c.benchmark_group("rank");

    for size in [8usize, 32, 128] {
        let table = league(size);
        for algorithm in Algorithm::ALL {
            group.bench_with_input(
                BenchmarkId::new(algorithm.as_str(), size),
                &table,
                |b, table| {
                    b.iter(|| {
                        let outcome = engine
                            .compute_with(black_box(table), algorithm)
                            .expect("ranking failed");
                        black_box(outcome);
                    });
                },
            );
        }
    }

    group.finish();
}

fn bench_parsing(c: &mut Criterion) {
    let table = league(128);

    c.bench_function("parse_matrix_128", |b| {
        b.iter(|| black_box(parse_matrix(black_box(&table))));
    });
}

fn bench_normalize(c: &mut Criterion) {
    let scores: Vec<f64> = (0..1024).map(|i| ((i * 37) % 101) as f64).collect();

    c.bench_function("normalize_1024", |b| {
        b.iter(|| black_box(normalize(black_box(&scores))));
    });
}

criterion_group!(benches, bench_rankers, bench_parsing, bench_normalize);
criterion_main!(benches);
