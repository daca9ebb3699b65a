//! Trading actions, training labels and the emitted trading signal.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::feature::FeatureValues;

/// Discrete trading action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Buy,
    Sell,
    Hold,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Buy => "buy",
            Action::Sell => "sell",
            Action::Hold => "hold",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Three-class training label derived from forward returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "i64", try_from = "i64")]
pub enum Label {
    Sell,
    Hold,
    Buy,
}

impl Label {
    pub const ALL: [Label; 3] = [Label::Sell, Label::Hold, Label::Buy];

    /// Class value as seen by a classifier: -1, 0 or 1.
    pub fn value(self) -> i64 {
        match self {
            Label::Sell => -1,
            Label::Hold => 0,
            Label::Buy => 1,
        }
    }

    pub fn from_value(value: i64) -> Option<Self> {
        match value {
            -1 => Some(Label::Sell),
            0 => Some(Label::Hold),
            1 => Some(Label::Buy),
            _ => None,
        }
    }

    pub fn action(self) -> Action {
        match self {
            Label::Sell => Action::Sell,
            Label::Hold => Action::Hold,
            Label::Buy => Action::Buy,
        }
    }
}

impl From<Label> for i64 {
    fn from(label: Label) -> Self {
        label.value()
    }
}

impl TryFrom<i64> for Label {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Label::from_value(value).ok_or_else(|| format!("invalid label value: {value}"))
    }
}

/// Round to a fixed number of decimal places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Rounded subset of the feature record carried on every signal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub rsi: f64,
    pub macd: f64,
    pub bb_position: f64,
    pub volume_ratio: f64,
    pub stochastic: f64,
}

impl IndicatorSnapshot {
    pub fn from_values(values: &FeatureValues) -> Self {
        Self {
            rsi: round_to(values.rsi, 2),
            macd: round_to(values.macd, 4),
            bb_position: round_to(values.bb_position, 2),
            volume_ratio: round_to(values.volume_ratio, 2),
            stochastic: round_to(values.stochastic, 2),
        }
    }
}

/// A scored, explained trading decision for one symbol.
///
/// Built fresh per evaluation and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradingSignal {
    pub symbol: String,
    pub action: Action,
    /// Confidence in [0, 1].
    pub confidence: f64,
    pub price: f64,
    pub reasoning: String,
    pub indicators: IndicatorSnapshot,
    /// Per-action probability, keyed by action name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probabilities: Option<BTreeMap<String, f64>>,
    /// ISO-8601 evaluation instant shared by a whole batch.
    pub timestamp: String,
}

/// Render an evaluation instant the way signals carry it.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}
