//! Domain types: bars, series, timeframes, verdicts.

pub mod bar;
pub mod series;
pub mod timeframe;
pub mod verdict;

pub use bar::Bar;
pub use series::{PriceSeries, SeriesError};
pub use timeframe::{Timeframe, TimeframeParseError};
pub use verdict::{FallbackReason, Provenance, TrendLabel, TrendVerdict};

/// Create synthetic daily bars from close prices for testing.
///
/// open = previous close (or close for the first bar), high/low = body ± 1.0,
/// volume = 1000.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<Bar> {
    use chrono::TimeZone;
    let base = chrono::Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar {
                timestamp: base + chrono::Duration::days(i as i64),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume: 1000.0,
            }
        })
        .collect()
}

#[cfg(test)]
pub fn make_series(closes: &[f64]) -> PriceSeries {
    PriceSeries::new("TEST/USDT", Timeframe::D1, make_bars(closes)).unwrap()
}
