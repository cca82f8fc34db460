//! Sliding windows for training and the single trailing window for inference.

use super::matrix::FeatureMatrix;
use super::scaler::MinMaxScaler;
use crate::config::PipelineConfig;
use crate::enrich::EnrichedSeries;
use ndarray::{s, Array1, Array2, Array3};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum WindowError {
    #[error("empty input series")]
    EmptyInput,

    #[error("insufficient history: {available} clean rows, need {required}")]
    InsufficientHistory { available: usize, required: usize },

    #[error("scaler fitted on {found} features, pipeline has {expected}")]
    ScalerMismatch { expected: usize, found: usize },

    #[error("invalid pipeline config: {0}")]
    InvalidConfig(String),
}

/// Model-ready training data.
///
/// `windows` has shape `(samples, window_size, n_features)`; `targets[i]` is
/// the scaled close of the row right after window `i`.
#[derive(Debug, Clone)]
pub struct TrainingSet {
    pub windows: Array3<f64>,
    pub targets: Array1<f64>,
    pub scaler: MinMaxScaler,
}

impl TrainingSet {
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Window `i` as a `(window_size, n_features)` matrix.
    pub fn window(&self, i: usize) -> Array2<f64> {
        self.windows.slice(s![i, .., ..]).to_owned()
    }
}

/// Fit a scaler on the cleaned matrix and slide a stride-1 window over it.
///
/// Produces `clean_rows - window_size` samples; zero when they are equal.
pub fn build_training_set(
    enriched: &EnrichedSeries,
    config: &PipelineConfig,
) -> Result<TrainingSet, WindowError> {
    if enriched.is_empty() {
        return Err(WindowError::EmptyInput);
    }
    check_config(config)?;
    let target_col = config
        .target_index()
        .ok_or_else(|| WindowError::InvalidConfig("no close column".into()))?;
    let matrix = FeatureMatrix::build(enriched, &config.feature_columns);
    let w = config.window_size;
    let rows = matrix.n_rows();
    if rows < w {
        return Err(WindowError::InsufficientHistory {
            available: rows,
            required: w,
        });
    }

    let scaler = MinMaxScaler::fit(matrix.values().view());
    let scaled = scaler.transform(matrix.values().view());

    let samples = rows - w;
    let mut windows = Array3::zeros((samples, w, config.n_features()));
    let mut targets = Array1::zeros(samples);
    for i in 0..samples {
        windows
            .slice_mut(s![i, .., ..])
            .assign(&scaled.slice(s![i..i + w, ..]));
        targets[i] = scaled[[i + w, target_col]];
    }

    tracing::debug!(samples, window = w, clean_rows = rows, "built training windows");
    Ok(TrainingSet {
        windows,
        targets,
        scaler,
    })
}

/// The most recent `window_size` cleaned rows, scaled with an existing scaler.
///
/// The scaler is never refit here: inference values must land in the same
/// coordinates the model was trained on.
pub fn build_inference_window(
    enriched: &EnrichedSeries,
    config: &PipelineConfig,
    scaler: &MinMaxScaler,
) -> Result<Array2<f64>, WindowError> {
    if enriched.is_empty() {
        return Err(WindowError::EmptyInput);
    }
    check_config(config)?;
    if scaler.n_features() != config.n_features() {
        return Err(WindowError::ScalerMismatch {
            expected: config.n_features(),
            found: scaler.n_features(),
        });
    }
    let matrix = FeatureMatrix::build(enriched, &config.feature_columns);
    let w = config.window_size;
    let rows = matrix.n_rows();
    if rows < w {
        return Err(WindowError::InsufficientHistory {
            available: rows,
            required: w,
        });
    }
    Ok(scaler.transform(matrix.values().slice(s![rows - w.., ..])))
}

fn check_config(config: &PipelineConfig) -> Result<(), WindowError> {
    config
        .validate()
        .map_err(|e| WindowError::InvalidConfig(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::make_series;
    use crate::enrich::enrich;
    use crate::features::FeatureColumn;

    fn close_only(window_size: usize) -> PipelineConfig {
        PipelineConfig {
            window_size,
            feature_columns: vec![FeatureColumn::Close],
            ..PipelineConfig::default()
        }
    }

    fn enriched(closes: &[f64], config: &PipelineConfig) -> EnrichedSeries {
        enrich(make_series(closes), &config.indicators)
    }

    #[test]
    fn window_count_and_targets() {
        let config = close_only(3);
        let closes = [10.0, 12.0, 14.0, 16.0, 18.0, 20.0];
        let set = build_training_set(&enriched(&closes, &config), &config).unwrap();

        assert_eq!(set.len(), 3);
        assert_eq!(set.windows.dim(), (3, 3, 1));
        // scaled close = (c - 10) / 10
        assert_eq!(set.window(0).column(0).to_vec(), vec![0.0, 0.2, 0.4]);
        assert_eq!(set.targets.to_vec(), vec![0.6, 0.8, 1.0]);
    }

    #[test]
    fn exact_window_length_yields_zero_samples() {
        let config = close_only(4);
        let set = build_training_set(&enriched(&[1.0, 2.0, 3.0, 4.0], &config), &config).unwrap();
        assert!(set.is_empty());
        assert_eq!(set.windows.dim(), (0, 4, 1));
    }

    #[test]
    fn training_rejects_short_and_empty_input() {
        let config = close_only(5);
        assert_eq!(
            build_training_set(&enriched(&[1.0, 2.0], &config), &config).unwrap_err(),
            WindowError::InsufficientHistory {
                available: 2,
                required: 5
            }
        );
        assert_eq!(
            build_training_set(&enriched(&[], &config), &config).unwrap_err(),
            WindowError::EmptyInput
        );
    }

    #[test]
    fn invalid_config_is_rejected_before_windowing() {
        let config = PipelineConfig {
            window_size: 0,
            ..close_only(3)
        };
        let series = enriched(&[1.0, 2.0, 3.0], &close_only(3));
        assert!(matches!(
            build_training_set(&series, &config),
            Err(WindowError::InvalidConfig(_))
        ));
        let no_close = PipelineConfig {
            feature_columns: vec![FeatureColumn::Rsi],
            ..close_only(3)
        };
        let scaler = MinMaxScaler::from_bounds(vec![0.0], vec![1.0]);
        assert!(matches!(
            build_inference_window(&series, &no_close, &scaler),
            Err(WindowError::InvalidConfig(_))
        ));
    }

    #[test]
    fn inference_takes_tail_with_given_scaler() {
        let config = close_only(2);
        let scaler = MinMaxScaler::from_bounds(vec![0.0], vec![100.0]);
        let window =
            build_inference_window(&enriched(&[10.0, 20.0, 30.0, 40.0], &config), &config, &scaler)
                .unwrap();
        assert_eq!(window.dim(), (2, 1));
        assert_eq!(window.column(0).to_vec(), vec![0.3, 0.4]);
    }

    #[test]
    fn inference_signals_insufficient_history() {
        let config = PipelineConfig::default();
        let scaler = MinMaxScaler::from_bounds(vec![0.0; 3], vec![1.0; 3]);
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        // Rows 25..30 are clean: 5 < 20.
        assert_eq!(
            build_inference_window(&enriched(&closes, &config), &config, &scaler).unwrap_err(),
            WindowError::InsufficientHistory {
                available: 5,
                required: 20
            }
        );
    }

    #[test]
    fn inference_rejects_scaler_of_wrong_width() {
        let config = PipelineConfig::default();
        let scaler = MinMaxScaler::from_bounds(vec![0.0], vec![1.0]);
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + i as f64).collect();
        assert_eq!(
            build_inference_window(&enriched(&closes, &config), &config, &scaler).unwrap_err(),
            WindowError::ScalerMismatch {
                expected: 3,
                found: 1
            }
        );
    }
}
