//! Cleaned feature matrix: configured columns, forward-filled, warm-up dropped.

use crate::enrich::EnrichedSeries;
use crate::features::FeatureColumn;
use ndarray::Array2;

/// Rows of the configured feature columns with no missing values left.
///
/// Both the training and the inference path build their windows from this
/// type, so column order and cleaning rules are identical on both sides.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    columns: Vec<FeatureColumn>,
    values: Array2<f64>,
    source_rows: Vec<usize>,
}

impl FeatureMatrix {
    /// Extract `columns` in order, forward-fill each column, then drop every row
    /// that still holds a NaN (in practice the leading warm-up span).
    pub fn build(enriched: &EnrichedSeries, columns: &[FeatureColumn]) -> Self {
        let mut filled: Vec<Vec<f64>> = columns.iter().map(|c| enriched.column(*c)).collect();
        for column in &mut filled {
            forward_fill(column);
        }

        let n_rows = enriched.len();
        let source_rows: Vec<usize> = (0..n_rows)
            .filter(|&row| filled.iter().all(|col| !col[row].is_nan()))
            .collect();

        let mut values = Array2::zeros((source_rows.len(), columns.len()));
        for (out_row, &row) in source_rows.iter().enumerate() {
            for (col_idx, column) in filled.iter().enumerate() {
                values[[out_row, col_idx]] = column[row];
            }
        }

        Self {
            columns: columns.to_vec(),
            values,
            source_rows,
        }
    }

    pub fn columns(&self) -> &[FeatureColumn] {
        &self.columns
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// Index into the enriched series of each kept row.
    pub fn source_rows(&self) -> &[usize] {
        &self.source_rows
    }

    pub fn n_rows(&self) -> usize {
        self.values.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.n_rows() == 0
    }
}

/// Replace each NaN with the last non-NaN value before it. Leading NaNs stay.
pub fn forward_fill(values: &mut [f64]) {
    let mut last = f64::NAN;
    for v in values.iter_mut() {
        if v.is_nan() {
            *v = last;
        } else {
            last = *v;
        }
    }
}
