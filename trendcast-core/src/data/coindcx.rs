//! CoinDCX public candles provider, used for INR-quoted pairs.
//!
//! `GET /market_data/candles?pair=I-BTC_INR&interval=1d&limit=365` returns
//! objects `{open, high, low, volume, close, time}`, newest first.

use super::provider::{
    finish_series, get_json, http_client, DataError, DataProvider, DataSource, FetchRequest,
};
use crate::domain::{Bar, PriceSeries};
use chrono::DateTime;
use serde::Deserialize;

const BASE_URL: &str = "https://public.coindcx.com";

pub const MAX_LIMIT: usize = 1000;

#[derive(Debug, Deserialize)]
struct Candle {
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
    time: i64,
}

pub struct CoinDcxProvider {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl CoinDcxProvider {
    pub fn new() -> Result<Self, DataError> {
        Self::with_base_url(BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, DataError> {
        Ok(Self {
            client: http_client()?,
            base_url: base_url.into(),
        })
    }

    /// `BTC/INR` -> `I-BTC_INR`; other quotes use the `B-` (Binance-backed) books.
    pub fn pair_id(request: &FetchRequest) -> Result<String, DataError> {
        let (base, quote) = request.pair().ok_or_else(|| DataError::SymbolNotFound {
            symbol: request.symbol.clone(),
        })?;
        let (base, quote) = (base.to_uppercase(), quote.to_uppercase());
        let prefix = if quote == "INR" { "I" } else { "B" };
        Ok(format!("{prefix}-{base}_{quote}"))
    }

    fn candles_url(&self, request: &FetchRequest) -> Result<String, DataError> {
        Ok(format!(
            "{}/market_data/candles?pair={}&interval={}&limit={}",
            self.base_url,
            Self::pair_id(request)?,
            request.timeframe.as_str(),
            request.limit.clamp(1, MAX_LIMIT)
        ))
    }
}

fn candles_to_bars(candles: Vec<Candle>) -> Result<Vec<Bar>, DataError> {
    candles
        .into_iter()
        .map(|c| {
            let timestamp = DateTime::from_timestamp_millis(c.time).ok_or_else(|| {
                DataError::ResponseFormat(format!("invalid candle time {}", c.time))
            })?;
            Ok(Bar {
                timestamp,
                open: c.open,
                high: c.high,
                low: c.low,
                close: c.close,
                volume: c.volume,
            })
        })
        .collect()
}

impl DataProvider for CoinDcxProvider {
    fn name(&self) -> &str {
        "coindcx"
    }

    fn source(&self) -> DataSource {
        DataSource::CoinDcx
    }

    fn fetch(&self, request: &FetchRequest) -> Result<PriceSeries, DataError> {
        let url = self.candles_url(request)?;
        let candles: Vec<Candle> = get_json(&self.client, self.name(), &url, &request.symbol)?;
        let series = finish_series(request, candles_to_bars(candles)?)?;
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
