//! Sequence models over feature windows, their offline trainer and the
//! on-disk artifact that ties a model to its feature contract.

pub mod artifact;
pub mod linear;
pub mod trainer;

pub use artifact::{ModelArtifact, ARTIFACT_FORMAT_VERSION};
pub use linear::LinearSequenceModel;
pub use trainer::{fit, train_from_series, TrainError, TrainOptions, TrainReport};

use ndarray::ArrayView2;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("input shape {found:?} does not match model shape {expected:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },

    #[error("model produced a non-finite prediction")]
    NonFinite,

    #[error("model file I/O: {0}")]
    Io(#[from] std::io::Error),

    #[error("model file format: {0}")]
    Format(#[from] serde_json::Error),

    #[error("model file unsupported format version {found} (expected {expected})")]
    UnsupportedVersion { expected: u32, found: u32 },

    #[error("model file corrupt: {0}")]
    Corrupt(String),
}

/// A model that maps one scaled window to one scaled close prediction.
pub trait SequenceModel: Send + Sync {
    fn name(&self) -> &str;

    /// `(window_size, n_features)` the model accepts.
    fn input_shape(&self) -> (usize, usize);

    fn predict(&self, window: ArrayView2<'_, f64>) -> Result<f64, ModelError>;
}
