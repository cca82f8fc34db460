//! Per-column min-max scaling to [0, 1].

use ndarray::{Array2, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

/// Min/max per feature column, fitted once on training data and reused as-is
/// for every inference window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinMaxScaler {
    mins: Vec<f64>,
    maxs: Vec<f64>,
}

impl MinMaxScaler {
    /// Fit on a `(rows, features)` matrix. NaN values are ignored; a column with
    /// no finite values fits to `[0, 0]`.
    pub fn fit(data: ArrayView2<'_, f64>) -> Self {
        let (mins, maxs): (Vec<f64>, Vec<f64>) = data
            .axis_iter(Axis(1))
            .map(|col| {
                let finite = col.iter().copied().filter(|v| v.is_finite());
                let (lo, hi) = finite.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                    (lo.min(v), hi.max(v))
                });
                if lo > hi {
                    (0.0, 0.0)
                } else {
                    (lo, hi)
                }
            })
            .unzip();
        Self { mins, maxs }
    }

    pub fn from_bounds(mins: Vec<f64>, maxs: Vec<f64>) -> Self {
        assert_eq!(mins.len(), maxs.len(), "scaler bounds length mismatch");
        Self { mins, maxs }
    }

    pub fn n_features(&self) -> usize {
        self.mins.len()
    }

    pub fn mins(&self) -> &[f64] {
        &self.mins
    }

    pub fn maxs(&self) -> &[f64] {
        &self.maxs
    }

    /// Scale one value of column `col`. A zero-range column maps to 0.
    pub fn transform_value(&self, col: usize, value: f64) -> f64 {
        let range = self.maxs[col] - self.mins[col];
        if range == 0.0 {
            0.0
        } else {
            (value - self.mins[col]) / range
        }
    }

    /// Undo [`transform_value`](Self::transform_value). A zero-range column maps back to its min.
    pub fn inverse_value(&self, col: usize, scaled: f64) -> f64 {
        let range = self.maxs[col] - self.mins[col];
        scaled * range + self.mins[col]
    }

    /// Scale every row. Values outside the fitted range are not clipped.
    pub fn transform(&self, data: ArrayView2<'_, f64>) -> Array2<f64> {
        assert_eq!(data.ncols(), self.n_features(), "scaler width mismatch");
        let mut out = data.to_owned();
        for (col, mut column) in out.axis_iter_mut(Axis(1)).enumerate() {
            column.mapv_inplace(|v| self.transform_value(col, v));
        }
        out
    }

    pub fn inverse_transform(&self, data: ArrayView2<'_, f64>) -> Array2<f64> {
        assert_eq!(data.ncols(), self.n_features(), "scaler width mismatch");
        let mut out = data.to_owned();
        for (col, mut column) in out.axis_iter_mut(Axis(1)).enumerate() {
            column.mapv_inplace(|v| self.inverse_value(col, v));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn fit_transform_maps_to_unit_interval() {
        let data = array![[10.0, 0.0], [20.0, 5.0], [15.0, 10.0]];
        let scaler = MinMaxScaler::fit(data.view());
        assert_eq!(scaler.mins(), &[10.0, 0.0]);
        assert_eq!(scaler.maxs(), &[20.0, 10.0]);
        let scaled = scaler.transform(data.view());
        assert_eq!(scaled, array![[0.0, 0.0], [1.0, 0.5], [0.5, 1.0]]);
    }

    #[test]
    fn inverse_restores_original() {
        let data = array![[42_000.5, 61.2], [43_900.25, 44.8], [41_234.0, 70.1]];
        let scaler = MinMaxScaler::fit(data.view());
        let back = scaler.inverse_transform(scaler.transform(data.view()).view());
        for (a, b) in data.iter().zip(back.iter()) {
            assert!((a - b).abs() < 1e-9, "{a} vs {b}");
        }
    }

    #[test]
    fn constant_column_maps_to_zero_and_back() {
        let data = array![[5.0], [5.0], [5.0]];
        let scaler = MinMaxScaler::fit(data.view());
        assert_eq!(scaler.transform_value(0, 5.0), 0.0);
        assert_eq!(scaler.inverse_value(0, 0.0), 5.0);
    }

    #[test]
    fn out_of_range_values_are_not_clipped() {
        let data = array![[0.0], [10.0]];
        let scaler = MinMaxScaler::fit(data.view());
        assert_eq!(scaler.transform_value(0, 15.0), 1.5);
        assert_eq!(scaler.transform_value(0, -5.0), -0.5);
    }

    #[test]
    fn fit_ignores_nan() {
        let data = array![[1.0], [f64::NAN], [3.0]];
        let scaler = MinMaxScaler::fit(data.view());
        assert_eq!(scaler.mins(), &[1.0]);
        assert_eq!(scaler.maxs(), &[3.0]);
    }

    #[test]
    fn serde_roundtrip_preserves_bounds() {
        let scaler = MinMaxScaler::from_bounds(vec![1.5, -2.0], vec![9.25, 4.0]);
        let json = serde_json::to_string(&scaler).unwrap();
        let back: MinMaxScaler = serde_json::from_str(&json).unwrap();
        assert_eq!(scaler, back);
    }
}
