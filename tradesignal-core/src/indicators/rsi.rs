//! Relative Strength Index (RSI).
//!
//! Simple rolling means of gains and losses over `period` price changes.
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss)
//! The first bar has no predecessor and counts as a zero change, so the
//! first value appears at index period-1, as in the training pipeline.
//! Lookback: period - 1.
//! Edge cases: avg_loss == 0 → RSI = 100; no movement at all → RSI = 50.

use crate::components::indicator::Indicator;
use crate::domain::Bar;

use super::series::rolling_mean;

#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
    name: String,
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "RSI period must be >= 1");
        Self {
            period,
            name: format!("rsi_{period}"),
        }
    }
}

impl Indicator for Rsi {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let n = bars.len();
        let mut gains = vec![0.0; n];
        let mut losses = vec![0.0; n];

        for i in 1..n {
            let change = bars[i].close - bars[i - 1].close;
            if change.is_nan() {
                gains[i] = f64::NAN;
                losses[i] = f64::NAN;
            } else if change > 0.0 {
                gains[i] = change;
            } else {
                losses[i] = -change;
            }
        }

        let avg_gain = rolling_mean(&gains, self.period);
        let avg_loss = rolling_mean(&losses, self.period);

        avg_gain
            .iter()
            .zip(&avg_loss)
            .map(|(&g, &l)| {
                if g.is_nan() || l.is_nan() {
                    f64::NAN
                } else {
                    compute_rsi(g, l)
                }
            })
            .collect()
    }
}

fn compute_rsi(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 && avg_gain == 0.0 {
        50.0 // no movement
    } else if avg_loss == 0.0 {
        100.0
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars};

    #[test]
    fn rsi_all_gains() {
        let bars = make_bars(&[100.0, 101.0, 102.0, 103.0, 104.0, 105.0]);
        let result = Rsi::new(3).compute(&bars);
        assert_approx(result[3], 100.0, 1e-9);
        assert_approx(result[5], 100.0, 1e-9);
    }

    #[test]
    fn rsi_all_losses() {
        let bars = make_bars(&[105.0, 104.0, 103.0, 102.0, 101.0, 100.0]);
        let result = Rsi::new(3).compute(&bars);
        assert_approx(result[3], 0.0, 1e-9);
    }

    #[test]
    fn rsi_flat_is_neutral() {
        let bars = make_bars(&[100.0; 6]);
        let result = Rsi::new(3).compute(&bars);
        assert_approx(result[5], 50.0, 1e-9);
    }

    #[test]
    fn rsi_mixed() {
        // Closes: 44, 44.34, 44.09, 43.61, 44.33
        // Changes at 2..=4: -0.25, -0.48, +0.72
        // period=3 at index 4: gains = 0.72, losses = 0.73
        // RSI = 100 - 100 / (1 + 0.72 / 0.73)
        let bars = make_bars(&[44.0, 44.34, 44.09, 43.61, 44.33]);
        let result = Rsi::new(3).compute(&bars);

        assert!(result[0].is_nan());
        assert!(result[1].is_nan());
        let expected = 100.0 - 100.0 / (1.0 + 0.72 / 0.73);
        assert_approx(result[4], expected, 1e-6);
    }

    #[test]
    fn rsi_first_window_counts_first_bar_as_zero_change() {
        // period=3 at index 2: changes [0, +1, +1] → gain avg 2/3, loss 0 → 100
        let bars = make_bars(&[10.0, 11.0, 12.0]);
        let result = Rsi::new(3).compute(&bars);
        assert_approx(result[2], 100.0, 1e-9);
    }

    #[test]
    fn rsi_bounds() {
        let bars = make_bars(&[100.0, 105.0, 98.0, 110.0, 95.0, 115.0, 90.0, 120.0]);
        let result = Rsi::new(3).compute(&bars);
        for (i, &v) in result.iter().enumerate() {
            if !v.is_nan() {
                assert!(
                    (0.0..=100.0).contains(&v),
                    "RSI out of bounds at bar {i}: {v}"
                );
            }
        }
    }

    #[test]
    fn rsi_nan_propagation() {
        let mut bars = make_bars(&[100.0, 101.0, 102.0, 103.0, 104.0, 105.0, 106.0]);
        bars[2].close = f64::NAN;
        let result = Rsi::new(3).compute(&bars);
        // changes 2 and 3 are NaN → windows ending at 2..=5 are NaN
        assert!(result[2].is_nan());
        assert!(result[5].is_nan());
        assert_approx(result[6], 100.0, 1e-9);
    }

    #[test]
    fn rsi_lookback() {
        assert_eq!(Rsi::new(14).lookback(), 13);
    }
}
