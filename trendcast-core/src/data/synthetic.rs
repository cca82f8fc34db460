//! Synthetic bars for offline runs, demos and tests.
//!
//! A random walk seeded from the symbol and timeframe, so the same request
//! always yields the same series. The data is clearly fake and tagged
//! [`DataSource::Synthetic`].

use super::provider::{DataError, DataProvider, DataSource, FetchRequest};
use crate::domain::{Bar, PriceSeries, Timeframe};
use chrono::{DateTime, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Open time of the first synthetic bar: 2024-01-01T00:00:00Z.
const ANCHOR_MS: i64 = 1_704_067_200_000;

#[derive(Debug, Clone)]
pub struct SyntheticProvider {
    start_price: f64,
    max_step: f64,
}

impl Default for SyntheticProvider {
    fn default() -> Self {
        Self {
            start_price: 100.0,
            max_step: 0.03,
        }
    }
}

impl SyntheticProvider {
    pub fn new(start_price: f64, max_step: f64) -> Self {
        Self {
            start_price,
            max_step,
        }
    }

    pub fn generate(&self, request: &FetchRequest) -> PriceSeries {
        let seed = blake3::hash(format!("{}|{}", request.symbol, request.timeframe).as_bytes());
        let mut rng = StdRng::from_seed(*seed.as_bytes());
        let step_ms = request.timeframe.duration_ms();

        let mut price = self.start_price;
        let mut bars = Vec::with_capacity(request.limit);
        for i in 0..request.limit {
            let change: f64 = rng.gen_range(-self.max_step..self.max_step);
            let open = price;
            let close = price * (1.0 + change);
            let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
            let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
            let volume = rng.gen_range(10.0..1_000.0);
            bars.push(Bar {
                timestamp: open_time(ANCHOR_MS + i as i64 * step_ms),
                open,
                high,
                low,
                close,
                volume,
            });
            price = close;
        }
        PriceSeries::canonicalize(request.symbol.clone(), request.timeframe, bars)
    }
}

fn open_time(ms: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(ms).single().unwrap_or_default()
}

/// Build a series from closes alone: open is the previous close, high/low sit
/// one unit beyond the body, volume is 1000. Bars are one `timeframe` apart.
pub fn series_from_closes(symbol: &str, timeframe: Timeframe, closes: &[f64]) -> PriceSeries {
    let step_ms = timeframe.duration_ms();
    let bars = closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar {
                timestamp: open_time(ANCHOR_MS + i as i64 * step_ms),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume: 1000.0,
            }
        })
        .collect();
    PriceSeries::canonicalize(symbol, timeframe, bars)
}

impl DataProvider for SyntheticProvider {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn source(&self) -> DataSource {
        DataSource::Synthetic
    }

    fn fetch(&self, request: &FetchRequest) -> Result<PriceSeries, DataError> {
        tracing::warn!(
            symbol = %request.symbol,
            bars = request.limit,
            "using SYNTHETIC data"
        );
        Ok(self.generate(request))
    }
}
