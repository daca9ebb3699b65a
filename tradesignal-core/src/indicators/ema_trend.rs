//! EMA trend flag.
//!
//! 1.0 when EMA(close, fast) > EMA(close, slow), else 0.0.
//! Both EMAs recurse from the first bar; the flag is reported once the
//! slower one is past its warmup.
//! Lookback: max(fast, slow) - 1.

use crate::components::indicator::Indicator;
use crate::domain::Bar;

use super::ema::{ema_recursive, mask_warmup};
use super::series::extract;

#[derive(Debug, Clone)]
pub struct EmaTrend {
    fast: usize,
    slow: usize,
    name: String,
}

impl EmaTrend {
    pub fn new(fast: usize, slow: usize) -> Self {
        assert!(fast >= 1 && slow >= 1, "EMA trend periods must be >= 1");
        Self {
            fast,
            slow,
            name: format!("ema_trend_{fast}_{slow}"),
        }
    }
}

impl Indicator for EmaTrend {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.fast.max(self.slow) - 1
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let closes = extract(bars, |b| b.close);
        let fast = ema_recursive(&closes, self.fast);
        let slow = ema_recursive(&closes, self.slow);
        let flags = fast
            .iter()
            .zip(&slow)
            .map(|(f, s)| {
                if f.is_nan() || s.is_nan() {
                    f64::NAN
                } else if f > s {
                    1.0
                } else {
                    0.0
                }
            })
            .collect();
        mask_warmup(flags, self.lookback())
    }
}
