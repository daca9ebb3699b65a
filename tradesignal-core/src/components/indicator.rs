//! Indicator trait and precomputed indicator values container.
//!
//! Indicators are pure functions: bar history in, numeric series out.
//! They run once per symbol over that symbol's bars only; nothing is shared
//! between symbols.

use crate::domain::Bar;
use std::collections::HashMap;

/// Trait for indicators.
///
/// Indicators take a full bar series and produce a numeric output series of
/// the same length. The first `lookback()` values are `f64::NAN` (warmup),
/// as is any value whose computation is undefined (zero range, zero mean).
///
/// # Look-ahead contamination guard
/// No indicator value at bar t may depend on price data from bar t+1 or later.
/// Every indicator must pass the truncated-vs-full series test.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "rsi_14", "bb_position_20_2").
    fn name(&self) -> &str;

    /// Number of bars needed before the indicator produces valid output.
    fn lookback(&self) -> usize;

    /// Compute the indicator for the entire bar series.
    ///
    /// Returns a `Vec<f64>` of the same length as `bars`.
    fn compute(&self, bars: &[Bar]) -> Vec<f64>;
}

/// Container for precomputed indicator values of one symbol.
#[derive(Debug, Clone, Default)]
pub struct IndicatorValues {
    series: HashMap<String, Vec<f64>>,
}

impl IndicatorValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a named indicator series.
    pub fn insert(&mut self, name: impl Into<String>, values: Vec<f64>) {
        self.series.insert(name.into(), values);
    }

    /// Get the indicator value at a specific bar index.
    pub fn get(&self, name: &str, bar_index: usize) -> Option<f64> {
        self.series
            .get(name)
            .and_then(|v| v.get(bar_index).copied())
    }

    /// Number of indicator series stored.
    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

/// Run every indicator over one symbol's bars.
pub fn compute_indicator_values(bars: &[Bar], indicators: &[Box<dyn Indicator>]) -> IndicatorValues {
    let mut iv = IndicatorValues::new();
    for indicator in indicators {
        let series = indicator.compute(bars);
        debug_assert_eq!(
            series.len(),
            bars.len(),
            "indicator '{}' produced {} values for {} bars",
            indicator.name(),
            series.len(),
            bars.len(),
        );
        iv.insert(indicator.name(), series);
    }
    iv
}

/// The warmup length of a set of indicators: the maximum lookback.
pub fn compute_warmup(indicators: &[Box<dyn Indicator>]) -> usize {
    indicators.iter().map(|i| i.lookback()).max().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{make_bars, Ema, Macd, Rsi, VolumeRatio};

    #[test]
    fn indicator_values_insert_and_get() {
        let mut iv = IndicatorValues::new();
        iv.insert(
            "ema_20",
            vec![f64::NAN; 19]
                .into_iter()
                .chain(vec![100.0, 101.0])
                .collect(),
        );
        assert!(iv.get("ema_20", 0).unwrap().is_nan());
        assert_eq!(iv.get("ema_20", 19), Some(100.0));
        assert_eq!(iv.get("ema_20", 20), Some(101.0));
        assert_eq!(iv.get("ema_20", 21), None);
    }

    #[test]
    fn indicator_values_missing_name() {
        let iv = IndicatorValues::new();
        assert_eq!(iv.get("nonexistent", 0), None);
    }

    #[test]
    fn compute_values_for_symbol() {
        let bars = make_bars(&[10.0, 11.0, 12.0, 13.0, 14.0]);
        let indicators: Vec<Box<dyn Indicator>> =
            vec![Box::new(Ema::new(3)), Box::new(VolumeRatio::new(3))];
        let iv = compute_indicator_values(&bars, &indicators);
        assert_eq!(iv.len(), 2);
        assert!((iv.get("ema_3", 2).unwrap() - 11.25).abs() < 1e-10);
        assert!(iv.get("ema_3", 1).unwrap().is_nan());
        assert!((iv.get("volume_ratio_3", 4).unwrap() - 1.0).abs() < 1e-10);
    }

    #[test]
    fn symbols_do_not_share_state() {
        let low = make_bars(&[100.0, 101.0, 102.0, 103.0]);
        let high = make_bars(&[200.0, 201.0, 202.0, 203.0]);
        let indicators: Vec<Box<dyn Indicator>> = vec![Box::new(Ema::new(1))];
        let a = compute_indicator_values(&low, &indicators);
        let b = compute_indicator_values(&high, &indicators);
        assert_eq!(a.get("ema_1", 3), Some(103.0));
        assert_eq!(b.get("ema_1", 3), Some(203.0));
    }

    #[test]
    fn compute_warmup_max_lookback() {
        let indicators: Vec<Box<dyn Indicator>> = vec![
            Box::new(Rsi::new(14)),             // lookback 13
            Box::new(Ema::new(20)),             // lookback 19
            Box::new(Macd::histogram(12, 26, 9)), // lookback 33
        ];
        assert_eq!(compute_warmup(&indicators), 33);
        assert_eq!(compute_warmup(&[]), 0);
    }
}
