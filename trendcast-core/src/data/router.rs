//! Routes a request to an exchange by quote currency: INR pairs go to
//! CoinDCX, everything else to Binance.

use super::binance::BinanceProvider;
use super::coindcx::CoinDcxProvider;
use super::provider::{DataError, DataProvider, DataSource, FetchRequest};
use crate::domain::PriceSeries;

pub struct ExchangeRouter {
    default: Box<dyn DataProvider>,
    inr: Box<dyn DataProvider>,
}

impl ExchangeRouter {
    pub fn new() -> Result<Self, DataError> {
        Ok(Self::with_providers(
            Box::new(BinanceProvider::new()?),
            Box::new(CoinDcxProvider::new()?),
        ))
    }

    pub fn with_providers(default: Box<dyn DataProvider>, inr: Box<dyn DataProvider>) -> Self {
        Self { default, inr }
    }

    /// Provider that serves `request`.
    pub fn route(&self, request: &FetchRequest) -> &dyn DataProvider {
        match request.pair() {
            Some((_, quote)) if quote.eq_ignore_ascii_case("INR") => self.inr.as_ref(),
            _ => self.default.as_ref(),
        }
    }
}

impl DataProvider for ExchangeRouter {
    fn name(&self) -> &str {
        "exchange"
    }

    fn source(&self) -> DataSource {
        self.default.source()
    }

    fn source_for(&self, request: &FetchRequest) -> DataSource {
        self.route(request).source()
    }

    fn fetch(&self, request: &FetchRequest) -> Result<PriceSeries, DataError> {
        let provider = self.route(request);
        tracing::debug!(provider = provider.name(), symbol = %request.symbol, "routed");
        provider.fetch(request)
    }

    fn is_available(&self) -> bool {
        self.default.is_available() || self.inr.is_available()
    }
}
