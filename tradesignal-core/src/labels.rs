//! Label Generator: training-time only.
//!
//! A label describes what the price did *after* a bar, which is exactly what
//! a live feature record cannot know. Labels never appear on live records.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::ConfigError;
use crate::domain::{Bar, Label, SymbolHistory};
use crate::features::{AssemblerConfig, FeatureAssembler, RawFeatureRow};

/// Forward horizon and return thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelConfig {
    pub forward_bars: usize,
    /// Forward return strictly above this is a buy.
    pub buy_threshold: f64,
    /// Forward return strictly below this is a sell.
    pub sell_threshold: f64,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            forward_bars: 1,
            buy_threshold: 0.02,
            sell_threshold: -0.02,
        }
    }
}

impl LabelConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.forward_bars == 0 {
            return Err(ConfigError::Invalid {
                field: "labels.forward_bars".into(),
                reason: "must be >= 1".into(),
            });
        }
        if self.sell_threshold.is_nan()
            || self.buy_threshold.is_nan()
            || self.sell_threshold >= self.buy_threshold
        {
            return Err(ConfigError::Invalid {
                field: "labels.sell_threshold".into(),
                reason: format!(
                    "must be below buy_threshold ({} >= {})",
                    self.sell_threshold, self.buy_threshold
                ),
            });
        }
        Ok(())
    }
}

/// Fractional return from each bar's close to the close `forward_bars` later.
///
/// The last `forward_bars` entries have no future and are `NaN`.
pub fn forward_returns(bars: &[Bar], forward_bars: usize) -> Vec<f64> {
    let n = bars.len();
    let mut result = vec![f64::NAN; n];
    if forward_bars == 0 {
        return result;
    }
    for i in 0..n.saturating_sub(forward_bars) {
        let now = bars[i].close;
        let later = bars[i + forward_bars].close;
        if now != 0.0 && now.is_finite() && later.is_finite() {
            result[i] = (later - now) / now;
        }
    }
    result
}

/// Classify a single forward return.
pub fn label_for_return(forward_return: f64, config: &LabelConfig) -> Option<Label> {
    if forward_return.is_nan() {
        None
    } else if forward_return > config.buy_threshold {
        Some(Label::Buy)
    } else if forward_return < config.sell_threshold {
        Some(Label::Sell)
    } else {
        Some(Label::Hold)
    }
}

/// One label per bar; `None` where the future is unknown.
pub fn generate_labels(bars: &[Bar], config: &LabelConfig) -> Vec<Option<Label>> {
    forward_returns(bars, config.forward_bars)
        .into_iter()
        .map(|r| label_for_return(r, config))
        .collect()
}

/// A complete feature row with its label, ready for a training matrix.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabeledRow {
    #[serde(flatten)]
    pub features: RawFeatureRow,
    pub forward_return: f64,
    pub label: Label,
}

impl LabeledRow {
    /// Feature vector in the given column order.
    ///
    /// Unknown column names yield `None`.
    pub fn to_vector<S: AsRef<str>>(&self, columns: &[S]) -> Option<Vec<f64>> {
        columns
            .iter()
            .map(|c| self.features.values.column(c.as_ref()))
            .collect()
    }
}

/// Join raw feature rows with labels for one symbol.
///
/// Rows with any undefined feature or an unknown future are dropped.
pub fn build_training_rows(
    history: &SymbolHistory,
    assembler_config: &AssemblerConfig,
    label_config: &LabelConfig,
) -> Vec<LabeledRow> {
    let assembler = FeatureAssembler::new(assembler_config.clone());
    let rows = assembler.feature_history(history);
    let returns = forward_returns(&history.bars, label_config.forward_bars);

    rows.into_iter()
        .zip(returns)
        .filter_map(|(features, forward_return)| {
            let label = label_for_return(forward_return, label_config)?;
            features.values.is_complete().then_some(LabeledRow {
                features,
                forward_return,
                label,
            })
        })
        .collect()
}

/// Per-class label counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LabelDistribution {
    pub sell: usize,
    pub hold: usize,
    pub buy: usize,
}

impl LabelDistribution {
    pub fn from_labels<'a>(labels: impl IntoIterator<Item = &'a Label>) -> Self {
        let mut dist = Self::default();
        for label in labels {
            dist.add(*label);
        }
        dist
    }

    pub fn add(&mut self, label: Label) {
        match label {
            Label::Sell => self.sell += 1,
            Label::Hold => self.hold += 1,
            Label::Buy => self.buy += 1,
        }
    }

    pub fn merge(&mut self, other: &LabelDistribution) {
        self.sell += other.sell;
        self.hold += other.hold;
        self.buy += other.buy;
    }

    pub fn total(&self) -> usize {
        self.sell + self.hold + self.buy
    }

    pub fn count(&self, label: Label) -> usize {
        match label {
            Label::Sell => self.sell,
            Label::Hold => self.hold,
            Label::Buy => self.buy,
        }
    }

    /// Share of `label` in percent; 0.0 for an empty distribution.
    pub fn percent(&self, label: Label) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            self.count(label) as f64 / total as f64 * 100.0
        }
    }

    /// Emit the distribution as a single info event.
    pub fn log(&self, scope: &str) {
        info!(
            scope,
            total = self.total(),
            sell = self.sell,
            hold = self.hold,
            buy = self.buy,
            sell_pct = %format!("{:.1}", self.percent(Label::Sell)),
            hold_pct = %format!("{:.1}", self.percent(Label::Hold)),
            buy_pct = %format!("{:.1}", self.percent(Label::Buy)),
            "label distribution"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FEATURE_COLUMNS;
    use crate::indicators::make_bars;

    #[test]
    fn forward_returns_look_ahead_only() {
        let bars = make_bars(&[100.0, 103.0, 100.94, 101.0]);
        let r = forward_returns(&bars, 1);
        assert!((r[0] - 0.03).abs() < 1e-12);
        assert!((r[1] - (100.94 - 103.0) / 103.0).abs() < 1e-12);
        assert!(r[3].is_nan());
    }

    #[test]
    fn thresholds_are_strict() {
        let config = LabelConfig::default();
        assert_eq!(label_for_return(0.02, &config), Some(Label::Hold));
        assert_eq!(label_for_return(0.0201, &config), Some(Label::Buy));
        assert_eq!(label_for_return(-0.02, &config), Some(Label::Hold));
        assert_eq!(label_for_return(-0.0201, &config), Some(Label::Sell));
        assert_eq!(label_for_return(f64::NAN, &config), None);
    }

    #[test]
    fn labels_end_with_unknown_future() {
        let bars = make_bars(&[100.0, 103.0, 100.0, 100.5]);
        let labels = generate_labels(&bars, &LabelConfig::default());
        assert_eq!(
            labels,
            vec![Some(Label::Buy), Some(Label::Sell), Some(Label::Hold), None]
        );
    }

    #[test]
    fn longer_horizon_leaves_more_unknown() {
        let bars = make_bars(&[100.0, 101.0, 102.0, 103.0, 104.0]);
        let config = LabelConfig {
            forward_bars: 3,
            ..LabelConfig::default()
        };
        let labels = generate_labels(&bars, &config);
        assert!(labels[1].is_some());
        assert!(labels[2..].iter().all(|l| l.is_none()));
    }

    #[test]
    fn training_rows_are_complete() {
        let closes: Vec<f64> = (0..120)
            .map(|i| 100.0 + (i as f64 * 0.7).sin() * 4.0)
            .collect();
        let history = SymbolHistory::new("TEST", make_bars(&closes));
        let rows = build_training_rows(
            &history,
            &AssemblerConfig::default(),
            &LabelConfig::default(),
        );
        assert!(!rows.is_empty());
        // warm-up rows and the final unknown-future row are dropped
        assert!(rows.len() < 120);
        assert!(rows.iter().all(|r| r.features.values.is_complete()));
        assert_ne!(rows.last().unwrap().features.timestamp, history.last().unwrap().timestamp);

        let vector = rows[0].to_vector(&FEATURE_COLUMNS).unwrap();
        assert_eq!(vector.len(), 13);
        assert_eq!(vector[0], rows[0].features.values.rsi);
        assert!(rows[0].to_vector(&["rsi", "bogus"]).is_none());
    }

    #[test]
    fn distribution_percentages() {
        let labels = [Label::Buy, Label::Hold, Label::Hold, Label::Sell];
        let dist = LabelDistribution::from_labels(&labels);
        assert_eq!(dist.total(), 4);
        assert_eq!(dist.hold, 2);
        assert!((dist.percent(Label::Hold) - 50.0).abs() < 1e-12);
        assert_eq!(LabelDistribution::default().percent(Label::Buy), 0.0);

        let mut merged = dist;
        merged.merge(&dist);
        assert_eq!(merged.buy, 2);
    }

    #[test]
    fn config_validation() {
        assert!(LabelConfig::default().validate().is_ok());
        let inverted = LabelConfig {
            buy_threshold: -0.05,
            ..LabelConfig::default()
        };
        assert!(inverted.validate().is_err());
    }
}
