//! Training and inference must see identical feature rows.
//!
//! Method: build training windows on a full series, then build the inference
//! window on the same series minus its last bar using the training scaler. The
//! inference window must equal the last training window bit for bit.

use trendcast_core::data::series_from_closes;
use trendcast_core::domain::{PriceSeries, Timeframe};
use trendcast_core::features::{
    build_inference_window, build_training_set, FeatureColumn, FeatureMatrix,
};
use trendcast_core::model::{train_from_series, ModelArtifact, SequenceModel, TrainOptions};
use trendcast_core::{enrich, score, PipelineConfig};

/// Deterministic pseudo-random walk using a simple LCG.
fn walk(n: usize) -> Vec<f64> {
    let mut price = 30_000.0;
    (0..n)
        .map(|i| {
            let seed = (i as u64).wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let change = ((seed >> 33) % 200) as f64 - 100.0;
            price = (price + change * 3.0).max(1_000.0);
            price
        })
        .collect()
}

fn series(n: usize) -> PriceSeries {
    series_from_closes("BTC/USDT", Timeframe::D1, &walk(n))
}

fn assert_bit_equal(a: &ndarray::Array2<f64>, b: &ndarray::Array2<f64>) {
    assert_eq!(a.dim(), b.dim());
    for (x, y) in a.iter().zip(b.iter()) {
        assert_eq!(x.to_bits(), y.to_bits(), "{x} != {y}");
    }
}

fn check_last_window_matches(config: &PipelineConfig, n: usize) {
    let full_series = series(n);
    let full = enrich(full_series.clone(), &config.indicators);
    let set = build_training_set(&full, config).unwrap();
    assert!(!set.is_empty());

    let prefix = enrich(full_series.truncated(n - 1), &config.indicators);
    let window = build_inference_window(&prefix, config, &set.scaler).unwrap();

    assert_bit_equal(&window, &set.window(set.len() - 1));
}

#[test]
fn inference_window_matches_last_training_window() {
    check_last_window_matches(&PipelineConfig::default(), 200);
}

#[test]
fn consistency_holds_for_wider_feature_sets() {
    let config = PipelineConfig {
        window_size: 10,
        feature_columns: vec![
            FeatureColumn::Volume,
            FeatureColumn::Close,
            FeatureColumn::BollingerHigh,
            FeatureColumn::BollingerLow,
            FeatureColumn::SmaShort,
            FeatureColumn::SmaLong,
            FeatureColumn::Rsi,
        ],
        ..PipelineConfig::default()
    };
    check_last_window_matches(&config, 120);
}

#[test]
fn training_targets_are_next_row_scaled_close() {
    let config = PipelineConfig::default();
    let enriched = enrich(series(120), &config.indicators);
    let set = build_training_set(&enriched, &config).unwrap();

    // MACD(12, 26) is the longest warm-up: first clean row is 25.
    assert_eq!(set.len(), 120 - 25 - config.window_size);
    let matrix = FeatureMatrix::build(&enriched, &config.feature_columns);
    let target_rows = &matrix.source_rows()[config.window_size..];
    assert_eq!(target_rows[0], 25 + config.window_size);
    for (i, &row) in target_rows.iter().enumerate() {
        let close = enriched.bars()[row].close;
        let scaled = set.scaler.transform_value(0, close);
        assert_eq!(set.targets[i].to_bits(), scaled.to_bits());
    }
}

#[test]
fn saved_model_scores_like_in_memory_model() {
    let config = PipelineConfig::default();
    let (artifact, _) = train_from_series(series(300), &config, &TrainOptions::default()).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.json");
    artifact.save(&path).unwrap();
    let loaded = ModelArtifact::load(&path).unwrap();
    assert_eq!(loaded.model.input_shape(), (20, 3));

    let enriched = enrich(series(300), &config.indicators);
    let a = score(&enriched, Some(&artifact), &config).unwrap();
    let b = score(&enriched, Some(&loaded), &config).unwrap();
    assert!(a.is_model());
    assert_eq!(a, b);
}

#[test]
fn edited_config_invalidates_model() {
    let config = PipelineConfig::default();
    let (artifact, _) = train_from_series(series(200), &config, &TrainOptions::default()).unwrap();

    let edited = PipelineConfig::from_toml("[indicators]\nrsi_period = 10\n").unwrap();
    assert!(!artifact.matches(&edited));

    let enriched = enrich(series(200), &edited.indicators);
    let verdict = score(&enriched, Some(&artifact), &edited).unwrap();
    assert!(!verdict.is_model());
}
