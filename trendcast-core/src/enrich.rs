//! Indicator enrichment: a price series plus derived close-price columns.

use crate::config::IndicatorConfig;
use crate::domain::{Bar, PriceSeries};
use crate::features::FeatureColumn;
use crate::indicators::{Bollinger, BollingerBand, Indicator, Macd, Rsi, Sma};
use serde::{Deserialize, Serialize};

/// A [`PriceSeries`] with one derived value per bar for each indicator.
///
/// Derived columns hold `f64::NAN` during their warm-up span. The wrapped bars
/// are never modified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedSeries {
    series: PriceSeries,
    pub rsi: Vec<f64>,
    pub macd: Vec<f64>,
    pub bollinger_high: Vec<f64>,
    pub bollinger_low: Vec<f64>,
    pub sma_short: Vec<f64>,
    pub sma_long: Vec<f64>,
}

impl EnrichedSeries {
    pub fn series(&self) -> &PriceSeries {
        &self.series
    }

    pub fn bars(&self) -> &[Bar] {
        self.series.bars()
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn last_close(&self) -> Option<f64> {
        self.series.last().map(|b| b.close)
    }

    /// Full column by name, bar fields included.
    pub fn column(&self, column: FeatureColumn) -> Vec<f64> {
        let bars = self.bars();
        let from_bars = |f: fn(&Bar) -> f64| -> Vec<f64> { bars.iter().map(f).collect() };
        match column {
            FeatureColumn::Open => from_bars(|b| b.open),
            FeatureColumn::High => from_bars(|b| b.high),
            FeatureColumn::Low => from_bars(|b| b.low),
            FeatureColumn::Close => from_bars(|b| b.close),
            FeatureColumn::Volume => from_bars(|b| b.volume),
            FeatureColumn::Rsi => self.rsi.clone(),
            FeatureColumn::Macd => self.macd.clone(),
            FeatureColumn::BollingerHigh => self.bollinger_high.clone(),
            FeatureColumn::BollingerLow => self.bollinger_low.clone(),
            FeatureColumn::SmaShort => self.sma_short.clone(),
            FeatureColumn::SmaLong => self.sma_long.clone(),
        }
    }

    /// Single value; `None` when the row is out of range.
    pub fn value(&self, column: FeatureColumn, row: usize) -> Option<f64> {
        let bar = self.bars().get(row)?;
        Some(match column {
            FeatureColumn::Open => bar.open,
            FeatureColumn::High => bar.high,
            FeatureColumn::Low => bar.low,
            FeatureColumn::Close => bar.close,
            FeatureColumn::Volume => bar.volume,
            FeatureColumn::Rsi => self.rsi[row],
            FeatureColumn::Macd => self.macd[row],
            FeatureColumn::BollingerHigh => self.bollinger_high[row],
            FeatureColumn::BollingerLow => self.bollinger_low[row],
            FeatureColumn::SmaShort => self.sma_short[row],
            FeatureColumn::SmaLong => self.sma_long[row],
        })
    }

    /// The most recent `rows` rows, for tabular display.
    pub fn tail(&self, rows: usize) -> EnrichedSeries {
        let start = self.len().saturating_sub(rows);
        let cut = |v: &Vec<f64>| v[start..].to_vec();
        EnrichedSeries {
            series: self.series.tail(rows),
            rsi: cut(&self.rsi),
            macd: cut(&self.macd),
            bollinger_high: cut(&self.bollinger_high),
            bollinger_low: cut(&self.bollinger_low),
            sma_short: cut(&self.sma_short),
            sma_long: cut(&self.sma_long),
        }
    }
}

/// Append RSI, MACD, Bollinger bands and both SMAs to a series.
///
/// Empty input yields an empty result. Never fails: a bar too early for an
/// indicator gets a NaN, not an error. A config that fails
/// [`IndicatorConfig::validate`] leaves every derived column NaN.
pub fn enrich(series: PriceSeries, config: &IndicatorConfig) -> EnrichedSeries {
    if let Err(e) = config.validate() {
        tracing::warn!(error = %e, "indicator config rejected; derived columns left empty");
        return unenriched(series);
    }
    let closes = series.closes();
    let c = config;

    let enriched = EnrichedSeries {
        rsi: Rsi::new(c.rsi_period).compute(&closes),
        macd: Macd::new(c.macd_fast, c.macd_slow).compute(&closes),
        bollinger_high: Bollinger::new(c.bollinger_period, c.bollinger_multiplier, BollingerBand::Upper)
            .compute(&closes),
        bollinger_low: Bollinger::new(c.bollinger_period, c.bollinger_multiplier, BollingerBand::Lower)
            .compute(&closes),
        sma_short: Sma::new(c.sma_short).compute(&closes),
        sma_long: Sma::new(c.sma_long).compute(&closes),
        series,
    };
    tracing::debug!(
        symbol = enriched.series.symbol(),
        rows = enriched.len(),
        "enriched series"
    );
    enriched
}

fn unenriched(series: PriceSeries) -> EnrichedSeries {
    let nan = vec![f64::NAN; series.len()];
    EnrichedSeries {
        rsi: nan.clone(),
        macd: nan.clone(),
        bollinger_high: nan.clone(),
        bollinger_low: nan.clone(),
        sma_short: nan.clone(),
        sma_long: nan,
        series,
    }
}
