//! Per-symbol feature assembly.
//!
//! Each qualifying symbol gets every indicator computed over its own bars
//! only; the last element of each series becomes a column of the record.
//! Histories shorter than `min_bars` are skipped, not defaulted.

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::components::indicator::{
    compute_indicator_values, compute_warmup, Indicator, IndicatorValues,
};
use crate::config::ConfigError;
use crate::domain::{FeatureRecord, FeatureValues, SymbolHistory};
use crate::indicators::{
    Bollinger, EmaTrend, Macd, PriceChange, Rsi, Stochastic, Volatility, VolumeRatio,
};

/// Indicator periods and the minimum history length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssemblerConfig {
    /// Symbols with fewer bars are excluded from the output.
    pub min_bars: usize,
    pub rsi_period: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub bb_period: usize,
    pub bb_std: f64,
    pub ema_fast: usize,
    pub ema_slow: usize,
    pub volume_period: usize,
    pub stochastic_period: usize,
    pub volatility_period: usize,
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        Self {
            min_bars: 50,
            rsi_period: 14,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            bb_period: 20,
            bb_std: 2.0,
            ema_fast: 20,
            ema_slow: 50,
            volume_period: 20,
            stochastic_period: 14,
            volatility_period: 20,
        }
    }
}

impl AssemblerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let periods = [
            ("min_bars", self.min_bars, 1),
            ("rsi_period", self.rsi_period, 1),
            ("macd_fast", self.macd_fast, 1),
            ("macd_slow", self.macd_slow, 1),
            ("macd_signal", self.macd_signal, 1),
            ("bb_period", self.bb_period, 2),
            ("ema_fast", self.ema_fast, 1),
            ("ema_slow", self.ema_slow, 1),
            ("volume_period", self.volume_period, 1),
            ("stochastic_period", self.stochastic_period, 1),
            ("volatility_period", self.volatility_period, 2),
        ];
        for (field, value, min) in periods {
            if value < min {
                return Err(ConfigError::Invalid {
                    field: format!("assembler.{field}"),
                    reason: format!("must be >= {min}, got {value}"),
                });
            }
        }
        if !(self.bb_std.is_finite() && self.bb_std > 0.0) {
            return Err(ConfigError::Invalid {
                field: "assembler.bb_std".into(),
                reason: format!("must be a positive number, got {}", self.bb_std),
            });
        }
        Ok(())
    }
}

/// Writes one indicator value into its feature column.
type Setter = fn(&mut FeatureValues, f64);

fn bind(indicator: impl Indicator + 'static, set: Setter) -> (Box<dyn Indicator>, Setter) {
    (Box::new(indicator), set)
}

/// One un-defaulted feature row per bar (training path).
///
/// Values are `NaN` wherever the indicator is still warming up or
/// undefined, so callers can drop incomplete rows instead of defaulting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawFeatureRow {
    pub symbol: String,
    pub timestamp: DateTime<Utc>,
    pub price: f64,
    pub values: FeatureValues,
}

/// Builds feature records from per-symbol bar histories.
///
/// Immutable after construction; safe to share across threads.
pub struct FeatureAssembler {
    config: AssemblerConfig,
    indicators: Vec<Box<dyn Indicator>>,
    setters: Vec<Setter>,
}

impl fmt::Debug for FeatureAssembler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeatureAssembler")
            .field("config", &self.config)
            .field(
                "indicators",
                &self.indicators.iter().map(|i| i.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl Default for FeatureAssembler {
    fn default() -> Self {
        Self::new(AssemblerConfig::default())
    }
}

impl FeatureAssembler {
    pub fn new(config: AssemblerConfig) -> Self {
        let c = &config;
        let (macd_f, macd_s, macd_sig) = (c.macd_fast, c.macd_slow, c.macd_signal);
        let plan = vec![
            bind(Rsi::new(c.rsi_period), |v, x| v.rsi = x),
            bind(Macd::line(macd_f, macd_s, macd_sig), |v, x| v.macd = x),
            bind(Macd::signal(macd_f, macd_s, macd_sig), |v, x| v.macd_signal = x),
            bind(Macd::histogram(macd_f, macd_s, macd_sig), |v, x| {
                v.macd_histogram = x
            }),
            bind(Bollinger::width(c.bb_period, c.bb_std), |v, x| v.bb_width = x),
            bind(Bollinger::position(c.bb_period, c.bb_std), |v, x| {
                v.bb_position = x
            }),
            bind(EmaTrend::new(c.ema_fast, c.ema_slow), |v, x| v.ema_trend = x),
            bind(VolumeRatio::new(c.volume_period), |v, x| v.volume_ratio = x),
            bind(Stochastic::new(c.stochastic_period), |v, x| v.stochastic = x),
            bind(PriceChange::new(1), |v, x| v.price_change_1d = x),
            bind(PriceChange::new(5), |v, x| v.price_change_5d = x),
            bind(PriceChange::new(10), |v, x| v.price_change_10d = x),
            bind(Volatility::new(c.volatility_period), |v, x| v.volatility_20 = x),
        ];
        let (indicators, setters) = plan.into_iter().unzip();
        Self {
            config,
            indicators,
            setters,
        }
    }

    pub fn config(&self) -> &AssemblerConfig {
        &self.config
    }

    /// The indicators run for every symbol, in column order.
    pub fn indicators(&self) -> &[Box<dyn Indicator>] {
        &self.indicators
    }

    /// Bars needed before every column is defined.
    pub fn warmup(&self) -> usize {
        compute_warmup(&self.indicators)
    }

    /// Raw values at `bar_index`; `news_sentiment` is always 0.0.
    fn values_at(&self, iv: &IndicatorValues, bar_index: usize) -> FeatureValues {
        let mut values = FeatureValues::UNDEFINED;
        for (indicator, set) in self.indicators.iter().zip(&self.setters) {
            let x = iv.get(indicator.name(), bar_index).unwrap_or(f64::NAN);
            set(&mut values, x);
        }
        values.news_sentiment = 0.0;
        values
    }

    /// Feature record for the latest bar, or `None` below `min_bars`.
    pub fn assemble(&self, history: &SymbolHistory) -> Option<FeatureRecord> {
        if history.len() < self.config.min_bars {
            debug!(
                symbol = %history.symbol,
                bars = history.len(),
                min_bars = self.config.min_bars,
                "skipping symbol with insufficient history"
            );
            return None;
        }
        let last = history.last()?;
        let iv = compute_indicator_values(&history.bars, &self.indicators);
        let values = self.values_at(&iv, history.len() - 1);
        Some(FeatureRecord::new(
            history.symbol.clone(),
            last.timestamp,
            last.close,
            values,
        ))
    }

    /// Assemble every symbol in parallel; output keeps input order and
    /// omits skipped symbols.
    pub fn assemble_batch(&self, histories: &[SymbolHistory]) -> Vec<FeatureRecord> {
        let records: Vec<FeatureRecord> = histories
            .par_iter()
            .filter_map(|h| self.assemble(h))
            .collect();
        debug!(
            requested = histories.len(),
            assembled = records.len(),
            "assembled feature batch"
        );
        records
    }

    /// One raw row per bar, for label attachment at training time.
    ///
    /// No minimum-history floor: warm-up rows simply carry `NaN`.
    pub fn feature_history(&self, history: &SymbolHistory) -> Vec<RawFeatureRow> {
        let iv = compute_indicator_values(&history.bars, &self.indicators);
        history
            .bars
            .iter()
            .enumerate()
            .map(|(i, bar)| RawFeatureRow {
                symbol: history.symbol.clone(),
                timestamp: bar.timestamp,
                price: bar.close,
                values: self.values_at(&iv, i),
            })
            .collect()
    }
}
