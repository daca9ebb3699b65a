//! Rule-based scorer.
//!
//! Accumulates a signed score from fixed indicator thresholds, then maps
//! it to an action. Pure and deterministic.
//!
//! Default rules (in evaluation order):
//! - RSI > 70 → -2, RSI < 30 → +2
//! - MACD histogram > 0 → +1, < 0 → -1
//! - bb_position > 0.8 → -1, < 0.2 → +1
//! - volume_ratio > 1.5 → +0.5, < 0.5 → -0.5
//! - stochastic >= 80 → -1, <= 20 → +1 (bounds inclusive)
//! - EMA trend up → +0.5, else -0.5
//!
//! score >= 2 → buy, score <= -2 → sell, else hold.
//! Buy/sell confidence = min(0.9, 0.6 + 0.1 * (|score| - 2)); hold = 0.6.

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::domain::{Action, FeatureRecord};

use super::{RuleContribution, Score, ScoreError, SignalScorer};

/// Thresholds, weights and the confidence curve of the rule scorer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleConfig {
    pub rsi_overbought: f64,
    pub rsi_oversold: f64,
    pub rsi_weight: f64,
    pub macd_weight: f64,
    pub bb_upper: f64,
    pub bb_lower: f64,
    pub bb_weight: f64,
    pub volume_high: f64,
    pub volume_low: f64,
    pub volume_weight: f64,
    pub stochastic_overbought: f64,
    pub stochastic_oversold: f64,
    pub stochastic_weight: f64,
    pub ema_trend_weight: f64,
    /// Score at or above which the action is buy.
    pub buy_score: f64,
    /// Score at or below which the action is sell.
    pub sell_score: f64,
    pub base_confidence: f64,
    /// Confidence added per unit of score beyond the action threshold.
    pub confidence_step: f64,
    pub max_confidence: f64,
    pub hold_confidence: f64,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            rsi_overbought: 70.0,
            rsi_oversold: 30.0,
            rsi_weight: 2.0,
            macd_weight: 1.0,
            bb_upper: 0.8,
            bb_lower: 0.2,
            bb_weight: 1.0,
            volume_high: 1.5,
            volume_low: 0.5,
            volume_weight: 0.5,
            stochastic_overbought: 80.0,
            stochastic_oversold: 20.0,
            stochastic_weight: 1.0,
            ema_trend_weight: 0.5,
            buy_score: 2.0,
            sell_score: -2.0,
            base_confidence: 0.6,
            confidence_step: 0.1,
            max_confidence: 0.9,
            hold_confidence: 0.6,
        }
    }
}

impl RuleConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field: &str, reason: String| {
            Err(ConfigError::Invalid {
                field: format!("rules.{field}"),
                reason,
            })
        };
        if self.rsi_oversold >= self.rsi_overbought {
            return invalid("rsi_oversold", "must be below rsi_overbought".into());
        }
        if self.bb_lower >= self.bb_upper {
            return invalid("bb_lower", "must be below bb_upper".into());
        }
        if self.volume_low >= self.volume_high {
            return invalid("volume_low", "must be below volume_high".into());
        }
        if self.stochastic_oversold >= self.stochastic_overbought {
            return invalid(
                "stochastic_oversold",
                "must be below stochastic_overbought".into(),
            );
        }
        if self.sell_score >= self.buy_score {
            return invalid("sell_score", "must be below buy_score".into());
        }
        for (field, value) in [
            ("base_confidence", self.base_confidence),
            ("max_confidence", self.max_confidence),
            ("hold_confidence", self.hold_confidence),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return invalid(field, format!("must be within [0, 1], got {value}"));
            }
        }
        Ok(())
    }
}

/// Deterministic weighted-threshold scorer.
#[derive(Debug, Clone, Default)]
pub struct RuleScorer {
    config: RuleConfig,
}

impl RuleScorer {
    pub fn new(config: RuleConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RuleConfig {
        &self.config
    }

    /// Per-rule contributions in evaluation order, zeros included.
    pub fn contributions(&self, record: &FeatureRecord) -> Vec<RuleContribution> {
        let c = &self.config;
        let v = &record.values;
        let band = |value: f64, high: f64, low: f64, weight: f64, high_sign: f64| {
            if value > high {
                high_sign * weight
            } else if value < low {
                -high_sign * weight
            } else {
                0.0
            }
        };

        vec![
            RuleContribution {
                rule: "RSI",
                weight: band(v.rsi, c.rsi_overbought, c.rsi_oversold, c.rsi_weight, -1.0),
            },
            RuleContribution {
                rule: "MACD",
                weight: band(v.macd_histogram, 0.0, 0.0, c.macd_weight, 1.0),
            },
            RuleContribution {
                rule: "Bollinger",
                weight: band(v.bb_position, c.bb_upper, c.bb_lower, c.bb_weight, -1.0),
            },
            RuleContribution {
                rule: "Volume",
                weight: band(
                    v.volume_ratio,
                    c.volume_high,
                    c.volume_low,
                    c.volume_weight,
                    1.0,
                ),
            },
            RuleContribution {
                rule: "Stochastic",
                weight: if v.stochastic >= c.stochastic_overbought {
                    -c.stochastic_weight
                } else if v.stochastic <= c.stochastic_oversold {
                    c.stochastic_weight
                } else {
                    0.0
                },
            },
            RuleContribution {
                rule: "EMA trend",
                weight: if v.trend_up() {
                    c.ema_trend_weight
                } else {
                    -c.ema_trend_weight
                },
            },
        ]
    }

    /// Map a total score to an action and confidence.
    pub fn decide(&self, score: f64) -> (Action, f64) {
        let c = &self.config;
        let confidence = |excess: f64| {
            (c.base_confidence + c.confidence_step * excess).min(c.max_confidence)
        };
        if score >= c.buy_score {
            (Action::Buy, confidence(score - c.buy_score))
        } else if score <= c.sell_score {
            (Action::Sell, confidence(c.sell_score - score))
        } else {
            (Action::Hold, c.hold_confidence)
        }
    }
}

impl SignalScorer for RuleScorer {
    fn name(&self) -> &str {
        "rule"
    }

    fn score(&self, record: &FeatureRecord) -> Result<Score, ScoreError> {
        let contributions = self.contributions(record);
        let total: f64 = contributions.iter().map(|c| c.weight).sum();
        let (action, confidence) = self.decide(total);
        Ok(Score {
            action,
            confidence,
            probabilities: None,
            contributions: contributions
                .into_iter()
                .filter(|c| c.weight != 0.0)
                .collect(),
        })
    }
}
