//! Trendcast Core: indicator enrichment, feature windows and trend scoring
//! for crypto OHLCV series.
//!
//! - Domain types (bars, series, timeframes, verdicts)
//! - Close-price indicators (RSI, MACD, Bollinger bands, SMA)
//! - Feature/window builder shared by training and inference
//! - Sequence model, offline trainer and model artifact
//! - Trend scorer with moving-average fallback
//! - Data providers (Binance, CoinDCX, CSV, synthetic) and caches

pub mod config;
pub mod data;
pub mod domain;
pub mod enrich;
pub mod features;
pub mod indicators;
pub mod model;
pub mod scoring;

pub use config::{ConfigError, IndicatorConfig, PipelineConfig};
pub use enrich::{enrich, EnrichedSeries};
pub use scoring::{score, ScoreError};
