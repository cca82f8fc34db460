//! Data provider trait and structured error types.
//!
//! The DataProvider trait abstracts over bar sources (exchanges, CSV files,
//! synthetic data) so the pipeline can swap them and tests can run offline.

use crate::domain::{PriceSeries, SeriesError, Timeframe};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Bars requested when the caller does not say.
pub const DEFAULT_LIMIT: usize = 365;

/// What to fetch: the most recent `limit` bars of `symbol` at `timeframe`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FetchRequest {
    /// Pair in `BASE/QUOTE` form, e.g. `BTC/USDT`.
    pub symbol: String,
    pub timeframe: Timeframe,
    pub limit: usize,
}

impl FetchRequest {
    pub fn new(symbol: impl Into<String>, timeframe: Timeframe, limit: usize) -> Self {
        Self {
            symbol: symbol.into(),
            timeframe,
            limit,
        }
    }

    /// `(base, quote)` when the symbol has the `BASE/QUOTE` form.
    pub fn pair(&self) -> Option<(&str, &str)> {
        let (base, quote) = self.symbol.split_once('/')?;
        if base.is_empty() || quote.is_empty() {
            return None;
        }
        Some((base, quote))
    }
}

/// Structured error types for data operations.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("HTTP {status} from {provider}")]
    Http { provider: String, status: u16 },

    #[error("response format changed: {0}")]
    ResponseFormat(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("parquet I/O error: {0}")]
    Parquet(String),

    #[error("no cached data for {symbol} {timeframe}; run `trendcast fetch` first")]
    NoCachedData { symbol: String, timeframe: Timeframe },

    #[error(transparent)]
    Series(#[from] SeriesError),

    #[error("data error: {0}")]
    Other(String),
}

/// Where a series came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataSource {
    Binance,
    CoinDcx,
    CsvImport,
    Cache,
    Synthetic,
}

/// A source of OHLCV bars.
///
/// Implementations return a canonical series (ascending, unique timestamps)
/// of at most `request.limit` bars.
pub trait DataProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    fn source(&self) -> DataSource;

    fn fetch(&self, request: &FetchRequest) -> Result<PriceSeries, DataError>;

    /// Source that serves `request`. Routing providers override this.
    fn source_for(&self, _request: &FetchRequest) -> DataSource {
        self.source()
    }

    /// Whether the provider can currently serve requests.
    fn is_available(&self) -> bool {
        true
    }
}

/// Fetch, logging any failure and returning an empty series in its place.
///
/// An unavailable provider is not asked at all.
pub fn fetch_or_empty(provider: &dyn DataProvider, request: &FetchRequest) -> PriceSeries {
    if !provider.is_available() {
        tracing::warn!(
            provider = provider.name(),
            symbol = %request.symbol,
            "data source unavailable; continuing with an empty series"
        );
        return PriceSeries::empty(request.symbol.clone(), request.timeframe);
    }
    match provider.fetch(request) {
        Ok(series) => series,
        Err(e) => {
            tracing::warn!(
                provider = provider.name(),
                symbol = %request.symbol,
                timeframe = %request.timeframe,
                error = %e,
                "fetch failed; continuing with an empty series"
            );
            PriceSeries::empty(request.symbol.clone(), request.timeframe)
        }
    }
}

pub(crate) fn http_client() -> Result<reqwest::blocking::Client, DataError> {
    reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(30))
        .user_agent(concat!("trendcast/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| DataError::Other(format!("failed to build HTTP client: {e}")))
}

/// GET `url` once and decode the JSON body.
///
/// 400 and 404 are reported as an unknown symbol; both exchanges answer a bad
/// pair that way.
pub(crate) fn get_json<T: DeserializeOwned>(
    client: &reqwest::blocking::Client,
    provider: &str,
    url: &str,
    symbol: &str,
) -> Result<T, DataError> {
    tracing::debug!(provider, url, "GET");
    let resp = client
        .get(url)
        .send()
        .map_err(|e| DataError::NetworkUnreachable(e.to_string()))?;

    let status = resp.status();
    if status == reqwest::StatusCode::BAD_REQUEST || status == reqwest::StatusCode::NOT_FOUND {
        return Err(DataError::SymbolNotFound {
            symbol: symbol.to_string(),
        });
    }
    if !status.is_success() {
        return Err(DataError::Http {
            provider: provider.to_string(),
            status: status.as_u16(),
        });
    }

    resp.json().map_err(|e| {
        DataError::ResponseFormat(format!("failed to parse {provider} response for {symbol}: {e}"))
    })
}

/// Sort, dedup and keep the most recent `limit` bars.
pub(crate) fn finish_series(
    request: &FetchRequest,
    bars: Vec<crate::domain::Bar>,
) -> Result<PriceSeries, DataError> {
    if bars.is_empty() {
        return Err(DataError::SymbolNotFound {
            symbol: request.symbol.clone(),
        });
    }
    let series = PriceSeries::canonicalize(request.symbol.clone(), request.timeframe, bars);
    Ok(series.tail(request.limit))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingProvider;

    impl DataProvider for FailingProvider {
        fn name(&self) -> &str {
            "failing"
        }

        fn source(&self) -> DataSource {
            DataSource::Synthetic
        }

        fn fetch(&self, request: &FetchRequest) -> Result<PriceSeries, DataError> {
            Err(DataError::SymbolNotFound {
                symbol: request.symbol.clone(),
            })
        }
    }

    #[test]
    fn fetch_failure_becomes_empty_series() {
        let request = FetchRequest::new("NOPE/USDT", Timeframe::H1, 10);
        let series = fetch_or_empty(&FailingProvider, &request);
        assert!(series.is_empty());
        assert_eq!(series.symbol(), "NOPE/USDT");
        assert_eq!(series.timeframe(), Timeframe::H1);
    }

    struct Unavailable;

    impl DataProvider for Unavailable {
        fn name(&self) -> &str {
            "unavailable"
        }

        fn source(&self) -> DataSource {
            DataSource::CsvImport
        }

        fn fetch(&self, _request: &FetchRequest) -> Result<PriceSeries, DataError> {
            panic!("fetch called on an unavailable provider");
        }

        fn is_available(&self) -> bool {
            false
        }
    }

    #[test]
    fn unavailable_provider_is_skipped() {
        let request = FetchRequest::new("BTC/USDT", Timeframe::D1, 10);
        let series = fetch_or_empty(&Unavailable, &request);
        assert!(series.is_empty());
        assert_eq!(series.symbol(), "BTC/USDT");
    }

    #[test]
    fn pair_splits_base_and_quote() {
        let request = FetchRequest::new("BTC/INR", Timeframe::D1, DEFAULT_LIMIT);
        assert_eq!(request.pair(), Some(("BTC", "INR")));
        assert_eq!(FetchRequest::new("BTCUSDT", Timeframe::D1, 1).pair(), None);
        assert_eq!(FetchRequest::new("/USDT", Timeframe::D1, 1).pair(), None);
    }

    #[test]
    fn finish_series_keeps_latest_bars() {
        let mut bars = crate::domain::make_bars(&[1.0, 2.0, 3.0, 4.0]);
        bars.reverse();
        let request = FetchRequest::new("TEST/USDT", Timeframe::D1, 2);
        let series = finish_series(&request, bars).unwrap();
        assert_eq!(series.closes(), vec![3.0, 4.0]);
    }

    #[test]
    fn data_error_display() {
        let err = DataError::NoCachedData {
            symbol: "BTC/USDT".into(),
            timeframe: Timeframe::D1,
        };
        assert!(err.to_string().contains("BTC/USDT 1d"));
    }
}
