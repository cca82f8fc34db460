//! Close-price indicators.
//!
//! Every indicator is a pure function of the close column and a fixed
//! lookback: a series in, a same-length series out, with `f64::NAN` for the
//! warm-up span. No value at index t depends on closes after t.

pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;

pub use bollinger::{Bollinger, BollingerBand};
pub use ema::{ema_of_series, Ema};
pub use macd::Macd;
pub use rsi::Rsi;
pub use sma::Sma;

/// A derived numeric column computed from closes.
pub trait Indicator: Send + Sync {
    /// Column name, e.g. "rsi_14".
    fn name(&self) -> &str;

    /// Number of leading NaN values on a NaN-free input.
    fn lookback(&self) -> usize;

    /// Compute over the full history. Output length equals input length.
    fn compute(&self, closes: &[f64]) -> Vec<f64>;
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
