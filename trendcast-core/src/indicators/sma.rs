//! Simple Moving Average.
//!
//! First valid value at index period-1. Any NaN inside the window yields NaN.

use super::Indicator;

#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    name: String,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "SMA period must be >= 1");
        Self {
            period,
            name: format!("sma_{period}"),
        }
    }
}

impl Indicator for Sma {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, closes: &[f64]) -> Vec<f64> {
        (0..closes.len())
            .map(|i| {
                if i + 1 < self.period {
                    return f64::NAN;
                }
                // Summed per window so a NaN only taints the windows containing it.
                let window = &closes[i + 1 - self.period..=i];
                window.iter().sum::<f64>() / self.period as f64
            })
            .collect()
    }
}
