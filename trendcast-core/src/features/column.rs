//! Names of the columns a feature window can draw from.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureColumn {
    Open,
    High,
    Low,
    Close,
    Volume,
    Rsi,
    Macd,
    BollingerHigh,
    BollingerLow,
    SmaShort,
    SmaLong,
}

impl FeatureColumn {
    pub const ALL: [FeatureColumn; 11] = [
        FeatureColumn::Open,
        FeatureColumn::High,
        FeatureColumn::Low,
        FeatureColumn::Close,
        FeatureColumn::Volume,
        FeatureColumn::Rsi,
        FeatureColumn::Macd,
        FeatureColumn::BollingerHigh,
        FeatureColumn::BollingerLow,
        FeatureColumn::SmaShort,
        FeatureColumn::SmaLong,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureColumn::Open => "open",
            FeatureColumn::High => "high",
            FeatureColumn::Low => "low",
            FeatureColumn::Close => "close",
            FeatureColumn::Volume => "volume",
            FeatureColumn::Rsi => "rsi",
            FeatureColumn::Macd => "macd",
            FeatureColumn::BollingerHigh => "bollinger_high",
            FeatureColumn::BollingerLow => "bollinger_low",
            FeatureColumn::SmaShort => "sma_short",
            FeatureColumn::SmaLong => "sma_long",
        }
    }
}

impl fmt::Display for FeatureColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeatureColumn {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FeatureColumn::ALL
            .into_iter()
            .find(|c| c.as_str() == s.trim())
            .ok_or_else(|| format!("unknown feature column '{s}'"))
    }
}
