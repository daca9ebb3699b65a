//! Exponential Moving Average (EMA).
//!
//! Recursive: EMA[t] = alpha * close[t] + (1 - alpha) * EMA[t-1],
//! alpha = 2 / (period + 1), seeded with the first observation.
//! Output before index period-1 is reported as NaN (warmup); values from
//! there on are identical to an unmasked recursion.
//! Lookback: period - 1.

use crate::components::indicator::Indicator;
use crate::domain::Bar;

use super::series::extract;

#[derive(Debug, Clone)]
pub struct Ema {
    period: usize,
    name: String,
}

impl Ema {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "EMA period must be >= 1");
        Self {
            period,
            name: format!("ema_{period}"),
        }
    }
}

impl Indicator for Ema {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        ema_of_series(&extract(bars, |b| b.close), self.period)
    }
}

/// Unmasked recursive EMA seeded with the first value.
///
/// Composed indicators (MACD, EMA trend) run on this so their own recursion
/// starts from the first bar. A NaN input taints every later value.
pub fn ema_recursive(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if n == 0 || period == 0 {
        return result;
    }

    let alpha = 2.0 / (period as f64 + 1.0);
    let mut prev = values[0];
    if prev.is_nan() {
        return result;
    }
    result[0] = prev;

    for i in 1..n {
        if values[i].is_nan() {
            return result;
        }
        let ema = alpha * values[i] + (1.0 - alpha) * prev;
        result[i] = ema;
        prev = ema;
    }

    result
}

/// Mask the first `warmup` positions of a series with NaN.
pub(crate) fn mask_warmup(mut values: Vec<f64>, warmup: usize) -> Vec<f64> {
    for v in values.iter_mut().take(warmup) {
        *v = f64::NAN;
    }
    values
}

/// Compute EMA values from a pre-extracted f64 slice, masking the warmup.
pub fn ema_of_series(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 {
        return vec![f64::NAN; values.len()];
    }
    mask_warmup(ema_recursive(values, period), period - 1)
}
