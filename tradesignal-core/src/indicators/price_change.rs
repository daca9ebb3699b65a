//! Price change (momentum): fractional return over a horizon.
//!
//! change[t] = (close[t] - close[t-horizon]) / close[t-horizon]
//! Expressed as a fraction (0.01 = 1%), the unit classifiers are trained on.
//! Lookback: horizon.

use crate::components::indicator::Indicator;
use crate::domain::Bar;

use super::series::{extract, pct_change};

#[derive(Debug, Clone)]
pub struct PriceChange {
    horizon: usize,
    name: String,
}

impl PriceChange {
    pub fn new(horizon: usize) -> Self {
        assert!(horizon >= 1, "Price change horizon must be >= 1");
        Self {
            horizon,
            name: format!("price_change_{horizon}"),
        }
    }
}

impl Indicator for PriceChange {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.horizon
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        pct_change(&extract(bars, |b| b.close), self.horizon)
    }
}
