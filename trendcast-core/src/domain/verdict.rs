//! TrendVerdict: the scored outcome shown to the user.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendLabel {
    Uptrend,
    Downtrend,
    Neutral,
}

impl fmt::Display for TrendLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TrendLabel::Uptrend => "Uptrend",
            TrendLabel::Downtrend => "Downtrend",
            TrendLabel::Neutral => "Neutral",
        })
    }
}

/// Why the scorer used the moving-average heuristic instead of the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FallbackReason {
    /// No model was supplied or it could not be loaded.
    NoModel,
    /// Fewer clean feature rows than the model's window.
    InsufficientHistory { available: usize, required: usize },
    /// The model was trained under a different feature contract.
    ContractMismatch { expected: String, found: String },
    /// The prediction call itself failed.
    ModelFailed { message: String },
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackReason::NoModel => write!(f, "no model loaded"),
            FallbackReason::InsufficientHistory {
                available,
                required,
            } => write!(
                f,
                "insufficient history ({available} clean rows, model needs {required})"
            ),
            FallbackReason::ContractMismatch { expected, found } => write!(
                f,
                "model feature contract {found} does not match pipeline {expected}"
            ),
            FallbackReason::ModelFailed { message } => write!(f, "prediction failed: {message}"),
        }
    }
}

/// Where a verdict came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Provenance {
    Model,
    Heuristic(FallbackReason),
}

/// A trend label plus the numbers behind it.
///
/// For model verdicts `predicted_close` holds the de-scaled prediction. For
/// heuristic verdicts `short_ma`/`long_ma` hold the compared averages, `None`
/// when the series was too short to define them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendVerdict {
    pub label: TrendLabel,
    pub provenance: Provenance,
    pub last_close: f64,
    pub predicted_close: Option<f64>,
    pub short_ma: Option<f64>,
    pub long_ma: Option<f64>,
}

impl TrendVerdict {
    pub fn is_model(&self) -> bool {
        matches!(self.provenance, Provenance::Model)
    }

    pub fn fallback_reason(&self) -> Option<&FallbackReason> {
        match &self.provenance {
            Provenance::Model => None,
            Provenance::Heuristic(reason) => Some(reason),
        }
    }
}

impl fmt::Display for TrendVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.provenance, self.predicted_close) {
            (Provenance::Model, Some(value)) => {
                write!(f, "AI trend prediction: {} (Value: {value:.2})", self.label)
            }
            (Provenance::Model, None) => write!(f, "AI trend prediction: {}", self.label),
            (Provenance::Heuristic(FallbackReason::ModelFailed { message }), _) => write!(
                f,
                "AI model prediction failed ({message}); showing heuristic: {}",
                self.label
            ),
            (Provenance::Heuristic(reason), _) => {
                write!(f, "{} (heuristic: {reason})", self.label)
            }
        }
    }
}
