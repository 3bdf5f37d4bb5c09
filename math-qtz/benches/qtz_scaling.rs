//! Benchmark: QTZ factorization and solve scaling
//!
//! Measures factorization cost for square and rank-deficient matrices and
//! the cost of a matrix right-hand side once factored.
//!
//! Run with:
//!   cargo bench -p math-audio-qtz --bench qtz_scaling
//!
//! Column-parallel solves:
//!   cargo bench -p math-audio-qtz --bench qtz_scaling --features rayon

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use math_audio_qtz::QtzFactorization;
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;

fn random_matrix(rng: &mut StdRng, rows: usize, cols: usize) -> Array2<f64> {
    Array2::from_shape_fn((rows, cols), |_| rng.random_range(-1.0..1.0))
}

fn bench_factor(c: &mut Criterion) {
    let mut group = c.benchmark_group("qtz_factor");
    group.warm_up_time(Duration::from_secs(1));
    group.measurement_time(Duration::from_secs(3));

    let mut rng = StdRng::seed_from_u64(1);
    for &n in &[16, 64, 128] {
        let full = random_matrix(&mut rng, n, n);
        group.bench_with_input(BenchmarkId::new("full_rank", n), &full, |b, a| {
            b.iter(|| black_box(QtzFactorization::new(a).expect("factor")));
        });

        // half the columns duplicated, so the trailing stage runs
        let mut deficient = random_matrix(&mut rng, n, n);
        for j in n / 2..n {
            let src = deficient.column(j - n / 2).to_owned();
            deficient.column_mut(j).assign(&src);
        }
        group.bench_with_input(BenchmarkId::new("rank_deficient", n), &deficient, |b, a| {
            b.iter(|| black_box(QtzFactorization::new(a).expect("factor")));
        });
    }

    group.finish();
}

fn bench_solve_matrix(c: &mut Criterion) {
    let mut group = c.benchmark_group("qtz_solve_matrix");

    let mut rng = StdRng::seed_from_u64(2);
    for &n in &[64, 128] {
        let a = random_matrix(&mut rng, n, n);
        let rhs = random_matrix(&mut rng, n, 32);
        let qtz = QtzFactorization::new(&a).expect("factor");
        group.bench_with_input(BenchmarkId::new("rhs32", n), &rhs, |b, rhs| {
            b.iter(|| black_box(qtz.solve_matrix(rhs).expect("solve")));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_factor, bench_solve_matrix);
criterion_main!(benches);
