//! Pipeline configuration: the feature contract shared by training and inference.
//!
//! A model is only meaningful for the exact window size, column order and
//! indicator lookbacks it was trained under. `PipelineConfig` is that contract;
//! the trainer embeds it in the model artifact and the scorer refuses to run a
//! model whose `contract_hash` differs from the active config.

use crate::features::FeatureColumn;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Indicator lookbacks used by the enricher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorConfig {
    pub rsi_period: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub bollinger_period: usize,
    pub bollinger_multiplier: f64,
    pub sma_short: usize,
    pub sma_long: usize,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            macd_fast: 12,
            macd_slow: 26,
            bollinger_period: 20,
            bollinger_multiplier: 2.0,
            sma_short: 20,
            sma_long: 50,
        }
    }
}

impl IndicatorConfig {
    /// Every lookback at least one bar, MACD and SMA pairs ordered.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));

        for (name, value) in [
            ("rsi_period", self.rsi_period),
            ("macd_fast", self.macd_fast),
            ("bollinger_period", self.bollinger_period),
            ("sma_short", self.sma_short),
        ] {
            if value == 0 {
                return invalid(format!("{name} must be >= 1"));
            }
        }
        if self.macd_fast >= self.macd_slow {
            return invalid(format!(
                "macd_fast ({}) must be below macd_slow ({})",
                self.macd_fast, self.macd_slow
            ));
        }
        if self.sma_short >= self.sma_long {
            return invalid(format!(
                "sma_short ({}) must be below sma_long ({})",
                self.sma_short, self.sma_long
            ));
        }
        if !(self.bollinger_multiplier.is_finite() && self.bollinger_multiplier > 0.0) {
            return invalid("bollinger_multiplier must be a positive number".into());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Rows per model input window.
    pub window_size: usize,
    /// Feature columns in window order. Must contain `close`.
    pub feature_columns: Vec<FeatureColumn>,
    pub indicators: IndicatorConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            window_size: 20,
            feature_columns: vec![FeatureColumn::Close, FeatureColumn::Rsi, FeatureColumn::Macd],
            indicators: IndicatorConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Load and validate a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a config from a TOML string. Missing keys take defaults.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));

        if self.window_size == 0 {
            return invalid("window_size must be >= 1".into());
        }
        if self.feature_columns.is_empty() {
            return invalid("feature_columns must not be empty".into());
        }
        let mut seen = HashSet::new();
        for col in &self.feature_columns {
            if !seen.insert(col) {
                return invalid(format!("feature column '{col}' listed twice"));
            }
        }
        if self.target_index().is_none() {
            return invalid("feature_columns must include 'close' (the prediction target)".into());
        }

        self.indicators.validate()
    }

    /// Position of the close column within a feature row.
    pub fn target_index(&self) -> Option<usize> {
        self.feature_columns
            .iter()
            .position(|c| *c == FeatureColumn::Close)
    }

    pub fn n_features(&self) -> usize {
        self.feature_columns.len()
    }

    /// BLAKE3 over the canonical JSON of the whole contract.
    ///
    /// Struct fields serialize in declaration order, so the JSON (and the hash)
    /// is stable for equal configs.
    pub fn contract_hash(&self) -> String {
        let json = serde_json::to_vec(self).unwrap_or_default();
        blake3::hash(&json).to_hex().to_string()
    }

    /// First 12 hex chars of the contract hash, for display.
    pub fn short_hash(&self) -> String {
        self.contract_hash()[..12].to_string()
    }
}
