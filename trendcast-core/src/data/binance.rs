//! Binance spot klines provider.
//!
//! Uses the public `GET /api/v3/klines` endpoint; no key is needed. Each kline
//! is a JSON array `[open_time_ms, "open", "high", "low", "close", "volume", ...]`
//! with prices as decimal strings.

use super::provider::{
    finish_series, get_json, http_client, DataError, DataProvider, DataSource, FetchRequest,
};
use crate::domain::{Bar, PriceSeries};
use chrono::DateTime;
use serde_json::Value;

const BASE_URL: &str = "https://api.binance.com";

/// Most klines one request may return.
pub const MAX_LIMIT: usize = 1000;

pub struct BinanceProvider {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl BinanceProvider {
    pub fn new() -> Result<Self, DataError> {
        Self::with_base_url(BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, DataError> {
        Ok(Self {
            client: http_client()?,
            base_url: base_url.into(),
        })
    }

    /// `BTC/USDT` -> `BTCUSDT`.
    pub fn market_id(symbol: &str) -> String {
        symbol.replace('/', "").to_uppercase()
    }

    fn klines_url(&self, request: &FetchRequest) -> String {
        format!(
            "{}/api/v3/klines?symbol={}&interval={}&limit={}",
            self.base_url,
            Self::market_id(&request.symbol),
            request.timeframe.as_str(),
            request.limit.clamp(1, MAX_LIMIT)
        )
    }
}

/// Parse a klines payload into bars.
pub(crate) fn parse_klines(rows: &[Vec<Value>]) -> Result<Vec<Bar>, DataError> {
    rows.iter()
        .enumerate()
        .map(|(i, row)| {
            if row.len() < 6 {
                return Err(DataError::ResponseFormat(format!(
                    "kline {i} has {} fields, expected at least 6",
                    row.len()
                )));
            }
            let open_time = row[0].as_i64().ok_or_else(|| {
                DataError::ResponseFormat(format!("kline {i}: open time is not an integer"))
            })?;
            let timestamp = DateTime::from_timestamp_millis(open_time).ok_or_else(|| {
                DataError::ResponseFormat(format!("kline {i}: invalid open time {open_time}"))
            })?;
            let field = |idx: usize| decimal(&row[idx]).ok_or_else(|| {
                DataError::ResponseFormat(format!("kline {i}: field {idx} is not a number"))
            });
            Ok(Bar {
                timestamp,
                open: field(1)?,
                high: field(2)?,
                low: field(3)?,
                close: field(4)?,
                volume: field(5)?,
            })
        })
        .collect()
}

/// Binance sends decimals as strings; accept bare numbers too.
fn decimal(value: &Value) -> Option<f64> {
    match value {
        Value::String(s) => s.parse().ok(),
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}

impl DataProvider for BinanceProvider {
    fn name(&self) -> &str {
        "binance"
    }

    fn source(&self) -> DataSource {
        DataSource::Binance
    }

    fn fetch(&self, request: &FetchRequest) -> Result<PriceSeries, DataError> {
        if request.limit > MAX_LIMIT {
            tracing::warn!(
                requested = request.limit,
                max = MAX_LIMIT,
                "binance limit capped"
            );
        }
        let url = self.klines_url(request);
        let rows: Vec<Vec<Value>> = get_json(&self.client, self.name(), &url, &request.symbol)?;
        let series = finish_series(request, parse_klines(&rows)?)?;
        tracing::info!(
            provider = self.name(),
            symbol = %request.symbol,
            timeframe = %request.timeframe,
            bars = series.len(),
            "fetched bars"
        );
        Ok(series)
    }
}
