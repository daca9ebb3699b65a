//! Bollinger Bands: moving average +/- standard deviation multiplier.
//!
//! Five outputs (separate Indicator instances):
//! - Middle: SMA(close, period)
//! - Upper: middle + mult * stddev(close, period)
//! - Lower: middle - mult * stddev(close, period)
//! - Width: (upper - lower) / middle
//! - Position: (close - lower) / (upper - lower)
//!
//! Uses sample stddev (divide by N - 1). Position is not clamped: a close
//! outside the bands gives a value outside [0, 1]. Zero band width leaves
//! position undefined; a zero middle leaves width undefined.
//! Lookback: period - 1.

use crate::components::indicator::Indicator;
use crate::domain::Bar;

use super::series::{extract, rolling_mean, rolling_std};

/// Which Bollinger output to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BollingerBand {
    Upper,
    Middle,
    Lower,
    Width,
    Position,
}

#[derive(Debug, Clone)]
pub struct Bollinger {
    period: usize,
    multiplier: f64,
    band: BollingerBand,
    name: String,
}

impl Bollinger {
    fn build(period: usize, multiplier: f64, band: BollingerBand) -> Self {
        assert!(period >= 2, "Bollinger period must be >= 2");
        let prefix = match band {
            BollingerBand::Upper => "bb_upper",
            BollingerBand::Middle => "bb_middle",
            BollingerBand::Lower => "bb_lower",
            BollingerBand::Width => "bb_width",
            BollingerBand::Position => "bb_position",
        };
        Self {
            period,
            multiplier,
            band,
            name: format!("{prefix}_{period}_{multiplier}"),
        }
    }

    pub fn upper(period: usize, multiplier: f64) -> Self {
        Self::build(period, multiplier, BollingerBand::Upper)
    }

    pub fn middle(period: usize, multiplier: f64) -> Self {
        Self::build(period, multiplier, BollingerBand::Middle)
    }

    pub fn lower(period: usize, multiplier: f64) -> Self {
        Self::build(period, multiplier, BollingerBand::Lower)
    }

    pub fn width(period: usize, multiplier: f64) -> Self {
        Self::build(period, multiplier, BollingerBand::Width)
    }

    pub fn position(period: usize, multiplier: f64) -> Self {
        Self::build(period, multiplier, BollingerBand::Position)
    }
}

impl Indicator for Bollinger {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let closes = extract(bars, |b| b.close);
        let middle = rolling_mean(&closes, self.period);
        let std = rolling_std(&closes, self.period);

        (0..closes.len())
            .map(|i| {
                let mid = middle[i];
                let upper = mid + self.multiplier * std[i];
                let lower = mid - self.multiplier * std[i];
                match self.band {
                    BollingerBand::Middle => mid,
                    BollingerBand::Upper => upper,
                    BollingerBand::Lower => lower,
                    BollingerBand::Width => {
                        if mid == 0.0 {
                            f64::NAN
                        } else {
                            (upper - lower) / mid
                        }
                    }
                    BollingerBand::Position => {
                        let range = upper - lower;
                        if range == 0.0 {
                            f64::NAN
                        } else {
                            (closes[i] - lower) / range
                        }
                    }
                }
            })
            .collect()
    }
}
