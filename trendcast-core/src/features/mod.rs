//! Feature extraction, scaling and windowing.

pub mod column;
pub mod matrix;
pub mod scaler;
pub mod window;

pub use column::FeatureColumn;
pub use matrix::{forward_fill, FeatureMatrix};
pub use scaler::MinMaxScaler;
pub use window::{build_inference_window, build_training_set, TrainingSet, WindowError};
