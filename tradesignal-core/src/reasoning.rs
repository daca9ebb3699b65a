//! Reasoning Composer: renders a score into ordered, human-readable text.
//!
//! Checklist order is fixed: RSI extreme, MACD/EMA alignment, Bollinger
//! position, volume, stochastic. A clause is appended only when its
//! condition holds; clauses are joined with "; ". Values are rounded before
//! they are compared, so the text always agrees with the numbers it shows.
//! Rounded values print in shortest form with at least one decimal
//! ("RSI 25.0", "1.35x average").
//! Identical inputs always render byte-identical text.

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::domain::{round_to, FeatureRecord};
use crate::scoring::Score;

const SEPARATOR: &str = "; ";

/// Clause thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReasoningConfig {
    pub rsi_overbought: f64,
    pub rsi_oversold: f64,
    pub bb_upper: f64,
    pub bb_lower: f64,
    pub bb_mid_low: f64,
    pub bb_mid_high: f64,
    pub volume_high: f64,
    pub volume_low: f64,
    pub volume_normal_low: f64,
    pub volume_normal_high: f64,
    pub stochastic_overbought: f64,
    pub stochastic_oversold: f64,
    /// Append the per-rule score breakdown for rule-based scores.
    pub rule_breakdown: bool,
}

impl Default for ReasoningConfig {
    fn default() -> Self {
        Self {
            rsi_overbought: 70.0,
            rsi_oversold: 30.0,
            bb_upper: 0.9,
            bb_lower: 0.1,
            bb_mid_low: 0.4,
            bb_mid_high: 0.6,
            volume_high: 2.0,
            volume_low: 0.5,
            volume_normal_low: 0.8,
            volume_normal_high: 1.2,
            stochastic_overbought: 80.0,
            stochastic_oversold: 20.0,
            rule_breakdown: true,
        }
    }
}

impl ReasoningConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ordered = [
            ("rsi_oversold", self.rsi_oversold, self.rsi_overbought),
            ("bb_lower", self.bb_lower, self.bb_upper),
            ("bb_mid_low", self.bb_mid_low, self.bb_mid_high),
            ("volume_low", self.volume_low, self.volume_high),
            ("volume_normal_low", self.volume_normal_low, self.volume_normal_high),
            (
                "stochastic_oversold",
                self.stochastic_oversold,
                self.stochastic_overbought,
            ),
        ];
        for (field, low, high) in ordered {
            if low > high {
                return Err(ConfigError::Invalid {
                    field: format!("reasoning.{field}"),
                    reason: format!("lower bound {low} exceeds upper bound {high}"),
                });
            }
        }
        Ok(())
    }
}

/// Builds the reasoning string carried on every trading signal.
#[derive(Debug, Clone, Default)]
pub struct ReasoningComposer {
    config: ReasoningConfig,
}

impl ReasoningComposer {
    pub fn new(config: ReasoningConfig) -> Self {
        Self { config }
    }

    /// Checklist clauses that fired, in declared order.
    pub fn clauses(&self, record: &FeatureRecord) -> Vec<String> {
        let c = &self.config;
        let v = &record.values;
        let rsi = round_to(v.rsi, 2);
        let macd = round_to(v.macd, 4);
        let hist = round_to(v.macd_histogram, 4);
        let bb = round_to(v.bb_position, 3);
        let volume = round_to(v.volume_ratio, 2);
        let stoch = round_to(v.stochastic, 2);
        let trend_up = v.trend_up();

        let mut clauses = Vec::new();

        if rsi > c.rsi_overbought {
            clauses.push(format!("Overbought conditions (RSI {rsi:?})"));
        } else if rsi < c.rsi_oversold {
            clauses.push(format!("Oversold conditions (RSI {rsi:?})"));
        }

        if hist > 0.0 && trend_up {
            clauses.push(format!("Bullish momentum (MACD {macd:?}, EMA trend up)"));
        } else if hist < 0.0 && !trend_up {
            clauses.push(format!("Bearish momentum (MACD {macd:?}, EMA trend down)"));
        }

        let bb_pct = bb * 100.0;
        if bb > c.bb_upper {
            clauses.push(format!("Near upper Bollinger Band ({bb_pct:.1}%)"));
        } else if bb < c.bb_lower {
            clauses.push(format!("Near lower Bollinger Band ({bb_pct:.1}%)"));
        } else if (c.bb_mid_low..=c.bb_mid_high).contains(&bb) {
            clauses.push(format!("Mid-range Bollinger position ({bb_pct:.1}%)"));
        }

        if volume > c.volume_high {
            clauses.push(format!("High volume ({volume:?}x average)"));
        } else if volume < c.volume_low {
            clauses.push(format!("Low volume ({volume:?}x average)"));
        } else if (c.volume_normal_low..=c.volume_normal_high).contains(&volume) {
            clauses.push(format!("Normal volume ({volume:?}x average)"));
        }

        if stoch > c.stochastic_overbought {
            clauses.push(format!("Overbought stochastic ({stoch:?})"));
        } else if stoch < c.stochastic_oversold {
            clauses.push(format!("Oversold stochastic ({stoch:?})"));
        }

        clauses
    }

    /// Full reasoning text for a scored record.
    ///
    /// Falls back to a generic line when no checklist clause fired. Rule
    /// scores get their non-zero contributions appended last.
    pub fn compose(&self, record: &FeatureRecord, score: &Score) -> String {
        let mut parts = self.clauses(record);
        if parts.is_empty() {
            parts.push(format!(
                "ML {} signal (confidence: {:.1}%)",
                score.action,
                score.confidence * 100.0
            ));
        }
        if self.config.rule_breakdown && !score.contributions.is_empty() {
            let terms: Vec<String> = score
                .contributions
                .iter()
                .map(|c| format!("{} {:+.1}", c.rule, c.weight))
                .collect();
            parts.push(format!(
                "Rule score {:+.1} ({})",
                score.rule_total(),
                terms.join(", ")
            ));
        }
        parts.join(SEPARATOR)
    }
}
