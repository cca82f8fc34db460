//! Bollinger Bands: SMA(period) ± multiplier × population stddev(period).

use super::Indicator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BollingerBand {
    Upper,
    Lower,
}

/// One band of the Bollinger envelope. Each band is its own single-series
/// indicator so the `Indicator` trait stays one-column.
#[derive(Debug, Clone)]
pub struct Bollinger {
    period: usize,
    multiplier: f64,
    band: BollingerBand,
    name: String,
}

impl Bollinger {
    pub fn new(period: usize, multiplier: f64, band: BollingerBand) -> Self {
        assert!(period >= 1, "Bollinger period must be >= 1");
        let tag = match band {
            BollingerBand::Upper => "upper",
            BollingerBand::Lower => "lower",
        };
        Self {
            period,
            multiplier,
            band,
            name: format!("bollinger_{tag}_{period}_{multiplier}"),
        }
    }
}

impl Indicator for Bollinger {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, closes: &[f64]) -> Vec<f64> {
        let p = self.period as f64;
        (0..closes.len())
            .map(|i| {
                if i + 1 < self.period {
                    return f64::NAN;
                }
                let window = &closes[i + 1 - self.period..=i];
                let mean = window.iter().sum::<f64>() / p;
                let variance = window.iter().map(|c| (c - mean).powi(2)).sum::<f64>() / p;
                let width = self.multiplier * variance.sqrt();
                match self.band {
                    BollingerBand::Upper => mean + width,
                    BollingerBand::Lower => mean - width,
                }
            })
            .collect()
    }
}
