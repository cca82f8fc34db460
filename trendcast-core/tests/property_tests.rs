//! Property tests for the enrichment and feature pipeline.
//!
//! Uses proptest to verify:
//! 1. Enrichment preserves row count and the original bars
//! 2. Indicators never look ahead
//! 3. Scaler inverse undoes transform
//! 4. Training window count is `clean_rows - window_size`

use ndarray::Array2;
use proptest::prelude::*;
use trendcast_core::data::series_from_closes;
use trendcast_core::domain::Timeframe;
use trendcast_core::features::{build_training_set, FeatureColumn, MinMaxScaler, WindowError};
use trendcast_core::indicators::{Bollinger, BollingerBand, Indicator, Macd, Rsi, Sma};
use trendcast_core::{enrich, IndicatorConfig, PipelineConfig};

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_closes(max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(1.0..100_000.0_f64, 0..max_len)
}

fn indicators() -> Vec<Box<dyn Indicator>> {
    vec![
        Box::new(Sma::new(20)),
        Box::new(Rsi::new(14)),
        Box::new(Macd::new(12, 26)),
        Box::new(Bollinger::new(20, 2.0, BollingerBand::Upper)),
        Box::new(Bollinger::new(20, 2.0, BollingerBand::Lower)),
    ]
}

proptest! {
    #[test]
    fn enrich_preserves_rows(closes in arb_closes(120)) {
        let series = series_from_closes("P/Q", Timeframe::H1, &closes);
        let enriched = enrich(series.clone(), &IndicatorConfig::default());
        prop_assert_eq!(enriched.len(), closes.len());
        prop_assert_eq!(enriched.bars(), series.bars());
        for col in FeatureColumn::ALL {
            prop_assert_eq!(enriched.column(col).len(), closes.len());
        }
    }

    #[test]
    fn indicators_do_not_look_ahead(closes in arb_closes(120), cut in 0usize..120) {
        let cut = cut.min(closes.len());
        for indicator in indicators() {
            let full = indicator.compute(&closes);
            let prefix = indicator.compute(&closes[..cut]);
            for i in 0..cut {
                prop_assert_eq!(
                    full[i].to_bits(),
                    prefix[i].to_bits(),
                    "{} differs at {}",
                    indicator.name(),
                    i
                );
            }
        }
    }

    #[test]
    fn scaler_roundtrip(
        rows in prop::collection::vec(prop::collection::vec(-1.0e6..1.0e6_f64, 3), 1..40)
    ) {
        let flat: Vec<f64> = rows.iter().flatten().copied().collect();
        let data = Array2::from_shape_vec((rows.len(), 3), flat).unwrap();
        let scaler = MinMaxScaler::fit(data.view());
        let back = scaler.inverse_transform(scaler.transform(data.view()).view());
        for ((r, c), &original) in data.indexed_iter() {
            let (lo, hi) = (scaler.mins()[c], scaler.maxs()[c]);
            if hi == lo {
                prop_assert_eq!(back[[r, c]], lo);
            } else {
                let scale = lo.abs().max(hi.abs()).max(1.0);
                prop_assert!((back[[r, c]] - original).abs() <= 1e-9 * scale);
            }
        }
    }

    #[test]
    fn training_window_count(closes in arb_closes(80), window in 1usize..12) {
        let config = PipelineConfig {
            window_size: window,
            feature_columns: vec![FeatureColumn::Close],
            ..PipelineConfig::default()
        };
        let enriched = enrich(series_from_closes("P/Q", Timeframe::D1, &closes), &config.indicators);
        match build_training_set(&enriched, &config) {
            Ok(set) => {
                prop_assert_eq!(set.len(), closes.len() - window);
                prop_assert_eq!(set.windows.dim(), (closes.len() - window, window, 1));
            }
            Err(WindowError::EmptyInput) => prop_assert!(closes.is_empty()),
            Err(WindowError::InsufficientHistory { available, required }) => {
                prop_assert_eq!(available, closes.len());
                prop_assert_eq!(required, window);
                prop_assert!(closes.len() < window);
            }
            Err(e) => prop_assert!(false, "unexpected error {e}"),
        }
    }
}
