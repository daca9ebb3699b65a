//! Stochastic oscillator (%K).
//!
//! %K = 100 * (close - lowest_low) / (highest_high - lowest_low)
//! over the last `period` bars, clamped into [0, 100].
//! Lookback: period - 1.
//! Edge case: highest_high == lowest_low → undefined (NaN).

use crate::components::indicator::Indicator;
use crate::domain::Bar;

use super::series::{extract, rolling_max, rolling_min};

#[derive(Debug, Clone)]
pub struct Stochastic {
    period: usize,
    name: String,
}

impl Stochastic {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "Stochastic period must be >= 1");
        Self {
            period,
            name: format!("stochastic_{period}"),
        }
    }
}

impl Indicator for Stochastic {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let lowest = rolling_min(&extract(bars, |b| b.low), self.period);
        let highest = rolling_max(&extract(bars, |b| b.high), self.period);

        bars.iter()
            .enumerate()
            .map(|(i, bar)| {
                let range = highest[i] - lowest[i];
                if range.is_nan() || bar.close.is_nan() || range == 0.0 {
                    f64::NAN
                } else {
                    (100.0 * (bar.close - lowest[i]) / range).clamp(0.0, 100.0)
                }
            })
            .collect()
    }
}
