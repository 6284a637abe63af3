//! Performance benchmarks for the metrics module.
//!
//! Validates that per-epoch CSV appends stay cheap relative to an epoch of
//! training.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use experimento::{append_metric, read_metric, Experiment};

/// Benchmark append_metric throughput
fn bench_append_metric(c: &mut Criterion) {
    let mut group = c.benchmark_group("AppendMetric");

    for size in [100, 1_000, 10_000].iter() {
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::new("append", size), size, |b, &size| {
            b.iter(|| {
                let tmp = tempfile::tempdir().unwrap();
                let exp = Experiment::with_root("bench", tmp.path());
                for epoch in 0..size {
                    append_metric(&exp, "loss", epoch, 1.0 / (epoch as f64 + 1.0)).unwrap();
                }
                black_box(exp)
            });
        });
    }
    group.finish();
}

/// Benchmark reading a series back and summarizing it
fn bench_read_and_stats(c: &mut Criterion) {
    let mut group = c.benchmark_group("ReadMetric");

    // Pre-populate a series
    let tmp = tempfile::tempdir().unwrap();
    let exp = Experiment::with_root("bench-read", tmp.path());
    for epoch in 0..10_000usize {
        append_metric(&exp, "loss", epoch, 1.0 / (epoch as f64 + 1.0)).unwrap();
    }

    group.bench_function("read_10k", |b| {
        b.iter(|| black_box(read_metric(&exp, "loss").unwrap()));
    });

    let series = read_metric(&exp, "loss").unwrap();
    group.bench_function("stats_10k", |b| {
        b.iter(|| black_box(series.stats()));
    });
    group.bench_function("sparkline_10k", |b| {
        b.iter(|| black_box(series.sparkline()));
    });
    group.finish();
}

criterion_group!(benches, bench_append_metric, bench_read_and_stats);
criterion_main!(benches);
