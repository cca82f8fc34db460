//! Criterion benchmarks for the enrichment and window hot paths.
//!
//! Benchmarks:
//! 1. Indicator enrichment (full default stack)
//! 2. Training window construction (fit scaler + slide)
//! 3. Inference window + score with a trained model

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use trendcast_core::data::series_from_closes;
use trendcast_core::domain::{PriceSeries, Timeframe};
use trendcast_core::features::{build_inference_window, build_training_set};
use trendcast_core::model::{train_from_series, TrainOptions};
use trendcast_core::{enrich, score, PipelineConfig};

// ── Helpers ──────────────────────────────────────────────────────────

fn make_series(n: usize) -> PriceSeries {
    let closes: Vec<f64> = (0..n)
        .map(|i| 30_000.0 + (i as f64 * 0.1).sin() * 1_000.0 + i as f64)
        .collect();
    series_from_closes("BENCH/USDT", Timeframe::H1, &closes)
}

fn bench_enrich(c: &mut Criterion) {
    let mut group = c.benchmark_group("enrich");
    let config = PipelineConfig::default();

    for &bar_count in &[365, 1000, 5000] {
        let series = make_series(bar_count);
        group.bench_with_input(
            BenchmarkId::new("default_stack", bar_count),
            &bar_count,
            |b, _| {
                b.iter(|| enrich(black_box(series.clone()), black_box(&config.indicators)));
            },
        );
    }

    group.finish();
}

fn bench_windows(c: &mut Criterion) {
    let mut group = c.benchmark_group("windows");
    let config = PipelineConfig::default();

    for &bar_count in &[365, 1000, 5000] {
        let enriched = enrich(make_series(bar_count), &config.indicators);
        group.bench_with_input(
            BenchmarkId::new("training_set", bar_count),
            &bar_count,
            |b, _| {
                b.iter(|| build_training_set(black_box(&enriched), black_box(&config)));
            },
        );

        let scaler = match build_training_set(&enriched, &config) {
            Ok(set) => set.scaler,
            Err(_) => continue,
        };
        group.bench_with_input(
            BenchmarkId::new("inference_window", bar_count),
            &bar_count,
            |b, _| {
                b.iter(|| {
                    build_inference_window(black_box(&enriched), black_box(&config), &scaler)
                });
            },
        );
    }

    group.finish();
}

fn bench_score(c: &mut Criterion) {
    let mut group = c.benchmark_group("score");
    let config = PipelineConfig::default();
    let series = make_series(1000);
    let Ok((artifact, _)) = train_from_series(series.clone(), &config, &TrainOptions::default())
    else {
        return;
    };
    let enriched = enrich(series, &config.indicators);

    group.bench_function("model_1000_bars", |b| {
        b.iter(|| score(black_box(&enriched), Some(&artifact), black_box(&config)));
    });
    group.bench_function("heuristic_1000_bars", |b| {
        b.iter(|| score(black_box(&enriched), None, black_box(&config)));
    });

    group.finish();
}

criterion_group!(benches, bench_enrich, bench_windows, bench_score);
criterion_main!(benches);
