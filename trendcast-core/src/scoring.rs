//! Trend scoring: model prediction when a compatible model and enough history
//! are available, the moving-average heuristic otherwise.

use crate::config::PipelineConfig;
use crate::domain::{FallbackReason, Provenance, TrendLabel, TrendVerdict};
use crate::enrich::EnrichedSeries;
use crate::features::{build_inference_window, WindowError};
use crate::model::ModelArtifact;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ScoreError {
    #[error("cannot score an empty series")]
    EmptyInput,

    #[error("invalid pipeline config: {0}")]
    InvalidConfig(String),
}

/// Score the latest bar of `enriched`.
///
/// Only an empty series or a config failing [`PipelineConfig::validate`] is an
/// error. Every model-side problem downgrades to a heuristic verdict carrying
/// the reason.
pub fn score(
    enriched: &EnrichedSeries,
    model: Option<&ModelArtifact>,
    config: &PipelineConfig,
) -> Result<TrendVerdict, ScoreError> {
    let last_close = enriched.last_close().ok_or(ScoreError::EmptyInput)?;
    config
        .validate()
        .map_err(|e| ScoreError::InvalidConfig(e.to_string()))?;

    let Some(artifact) = model else {
        return Ok(heuristic_verdict(enriched, FallbackReason::NoModel));
    };

    if !artifact.matches(config) {
        let reason = FallbackReason::ContractMismatch {
            expected: config.short_hash(),
            found: artifact.contract.short_hash(),
        };
        tracing::warn!(%reason, "model contract mismatch; using heuristic");
        return Ok(heuristic_verdict(enriched, reason));
    }

    let window = match build_inference_window(enriched, &artifact.contract, &artifact.scaler) {
        Ok(window) => window,
        Err(WindowError::InsufficientHistory {
            available,
            required,
        }) => {
            tracing::debug!(available, required, "not enough history for model");
            return Ok(heuristic_verdict(
                enriched,
                FallbackReason::InsufficientHistory {
                    available,
                    required,
                },
            ));
        }
        Err(e) => return Ok(model_failed(enriched, e.to_string())),
    };

    match artifact.predict_close(window.view()) {
        Ok(predicted) => Ok(model_verdict(predicted, last_close)),
        Err(e) => Ok(model_failed(enriched, e.to_string())),
    }
}

fn model_failed(enriched: &EnrichedSeries, message: String) -> TrendVerdict {
    tracing::warn!(error = %message, "model prediction failed; using heuristic");
    heuristic_verdict(enriched, FallbackReason::ModelFailed { message })
}

/// Uptrend when the prediction is strictly above the last close.
pub fn model_verdict(predicted_close: f64, last_close: f64) -> TrendVerdict {
    let label = if predicted_close > last_close {
        TrendLabel::Uptrend
    } else {
        TrendLabel::Downtrend
    };
    TrendVerdict {
        label,
        provenance: Provenance::Model,
        last_close,
        predicted_close: Some(predicted_close),
        short_ma: None,
        long_ma: None,
    }
}

/// Short vs long SMA of close at the last row. Undefined averages give Neutral.
pub fn heuristic_verdict(enriched: &EnrichedSeries, reason: FallbackReason) -> TrendVerdict {
    let last = enriched.len().saturating_sub(1);
    let short = enriched.sma_short.get(last).copied().filter(|v| !v.is_nan());
    let long = enriched.sma_long.get(last).copied().filter(|v| !v.is_nan());

    let (label, short_ma, long_ma) = match (short, long) {
        (Some(s), Some(l)) => {
            let label = if s > l {
                TrendLabel::Uptrend
            } else if s < l {
                TrendLabel::Downtrend
            } else {
                TrendLabel::Neutral
            };
            (label, Some(s), Some(l))
        }
        _ => (TrendLabel::Neutral, None, None),
    };

    TrendVerdict {
        label,
        provenance: Provenance::Heuristic(reason),
        last_close: enriched.last_close().unwrap_or(f64::NAN),
        predicted_close: None,
        short_ma,
        long_ma,
    }
}
