//! Linear model over a flattened window: one weight per (timestep, feature).

use super::{ModelError, SequenceModel};
use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearSequenceModel {
    weights: Array2<f64>,
    bias: f64,
}

impl LinearSequenceModel {
    pub fn zeros(window_size: usize, n_features: usize) -> Self {
        Self {
            weights: Array2::zeros((window_size, n_features)),
            bias: 0.0,
        }
    }

    pub fn from_parts(weights: Array2<f64>, bias: f64) -> Self {
        Self { weights, bias }
    }

    pub fn weights(&self) -> &Array2<f64> {
        &self.weights
    }

    pub fn weights_mut(&mut self) -> &mut Array2<f64> {
        &mut self.weights
    }

    pub fn bias(&self) -> f64 {
        self.bias
    }

    pub fn set_bias(&mut self, bias: f64) {
        self.bias = bias;
    }

    /// Raw output without shape or finiteness checks; callers guarantee the shape.
    pub(crate) fn forward(&self, window: ArrayView2<'_, f64>) -> f64 {
        (&self.weights * &window).sum() + self.bias
    }
}

impl SequenceModel for LinearSequenceModel {
    fn name(&self) -> &str {
        "linear_sequence"
    }

    fn input_shape(&self) -> (usize, usize) {
        self.weights.dim()
    }

    fn predict(&self, window: ArrayView2<'_, f64>) -> Result<f64, ModelError> {
        if window.dim() != self.input_shape() {
            return Err(ModelError::ShapeMismatch {
                expected: self.input_shape(),
                found: window.dim(),
            });
        }
        let y = self.forward(window);
        if y.is_finite() {
            Ok(y)
        } else {
            Err(ModelError::NonFinite)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn predict_is_weighted_sum_plus_bias() {
        let model = LinearSequenceModel::from_parts(array![[1.0, 0.0], [0.5, 2.0]], 0.25);
        let y = model.predict(array![[0.2, 9.0], [0.4, 0.1]].view()).unwrap();
        assert!((y - (0.2 + 0.2 + 0.2 + 0.25)).abs() < 1e-12);
    }

    #[test]
    fn predict_rejects_wrong_shape() {
        let model = LinearSequenceModel::zeros(20, 3);
        let err = model.predict(Array2::zeros((19, 3)).view()).unwrap_err();
        assert!(matches!(
            err,
            ModelError::ShapeMismatch {
                expected: (20, 3),
                found: (19, 3)
            }
        ));
    }

    #[test]
    fn predict_rejects_non_finite_output() {
        let model = LinearSequenceModel::from_parts(array![[1.0]], 0.0);
        assert!(matches!(
            model.predict(array![[f64::INFINITY]].view()),
            Err(ModelError::NonFinite)
        ));
    }
}
