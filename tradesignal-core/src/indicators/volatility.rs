//! Volatility: rolling sample standard deviation of one-bar returns.
//!
//! vol[t] = stddev(return[t-period+1..=t]), return[t] = close[t]/close[t-1] - 1
//! Lookback: period (the first bar has no return).

use crate::components::indicator::Indicator;
use crate::domain::Bar;

use super::series::{extract, pct_change, rolling_std};

#[derive(Debug, Clone)]
pub struct Volatility {
    period: usize,
    name: String,
}

impl Volatility {
    pub fn new(period: usize) -> Self {
        assert!(period >= 2, "Volatility period must be >= 2");
        Self {
            period,
            name: format!("volatility_{period}"),
        }
    }
}

impl Indicator for Volatility {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let returns = pct_change(&extract(bars, |b| b.close), 1);
        rolling_std(&returns, self.period)
    }
}
