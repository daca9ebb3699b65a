//! Signal Scorer: feature record in, action and confidence out.
//!
//! Two interchangeable strategies share one output contract:
//! - [`RuleScorer`]: weighted indicator thresholds, no trained model needed
//! - [`ClassifierScorer`]: delegates to an externally trained classifier
//!
//! The strategy is an explicit configuration value. Asking for the
//! classifier without one loaded is an error, never a silent fallback.

pub mod classifier;
pub mod rule;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::domain::{round_to, Action, FeatureRecord};

pub use classifier::{
    ClassMap, ClassifierError, ClassifierScorer, FeatureSchema, ModelArtifact, ModelInfo,
    ProbabilisticClassifier,
};
pub use rule::{RuleConfig, RuleScorer};

/// Signed contribution of one rule to the rule-based score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RuleContribution {
    /// Display name of the rule (e.g. "RSI", "EMA trend").
    pub rule: &'static str,
    pub weight: f64,
}

/// Per-action probabilities reported by a classifier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClassProbabilities {
    pub sell: f64,
    pub hold: f64,
    pub buy: f64,
}

impl ClassProbabilities {
    pub fn get(&self, action: Action) -> f64 {
        match action {
            Action::Sell => self.sell,
            Action::Hold => self.hold,
            Action::Buy => self.buy,
        }
    }

    /// Mapping keyed by action name, rounded to 4 decimals.
    pub fn to_map(&self) -> BTreeMap<String, f64> {
        [Action::Sell, Action::Hold, Action::Buy]
            .into_iter()
            .map(|a| (a.as_str().to_string(), round_to(self.get(a), 4)))
            .collect()
    }
}

/// Output shared by every scoring strategy.
#[derive(Debug, Clone, PartialEq)]
pub struct Score {
    pub action: Action,
    /// Confidence in [0, 1].
    pub confidence: f64,
    /// Present for classifier-backed scores.
    pub probabilities: Option<ClassProbabilities>,
    /// Non-empty only for rule-based scores, in rule order.
    pub contributions: Vec<RuleContribution>,
}

impl Score {
    /// Sum of rule contributions (0.0 for classifier scores).
    pub fn rule_total(&self) -> f64 {
        self.contributions.iter().map(|c| c.weight).sum()
    }
}

/// Errors raised while building a scorer or scoring a record.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScoreError {
    #[error("classifier-backed scoring requested but no classifier is loaded")]
    ClassifierUnavailable,

    #[error("unknown feature column: {0}")]
    UnknownColumn(String),

    #[error("duplicate feature column: {0}")]
    DuplicateColumn(String),

    #[error("feature row for {symbol} is missing column {column}")]
    MissingColumn { symbol: String, column: String },

    #[error("classifier does not predict class {0}")]
    MissingClass(i64),

    #[error("classifier predicts unexpected class {0}")]
    UnexpectedClass(i64),

    #[error("classifier returned {actual} probabilities for {expected} classes")]
    ProbabilityShape { expected: usize, actual: usize },

    #[error("classifier returned probability {value} for class {class}")]
    InvalidProbability { class: i64, value: f64 },

    #[error("non-finite value {value} in column {column} for {symbol}")]
    NonFiniteFeature {
        symbol: String,
        column: String,
        value: f64,
    },

    #[error("classifier failed: {0}")]
    Classifier(#[from] ClassifierError),
}

/// Trait for signal scorers.
///
/// Implementations are immutable after construction and shared across
/// threads; `score` must be deterministic for a given scorer.
pub trait SignalScorer: Send + Sync {
    /// Human-readable name (e.g., "rule", "classifier").
    fn name(&self) -> &str;

    fn score(&self, record: &FeatureRecord) -> Result<Score, ScoreError>;
}

/// Which scoring strategy to run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoringStrategy {
    #[default]
    Rule,
    Classifier,
}

impl fmt::Display for ScoringStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoringStrategy::Rule => f.write_str("rule"),
            ScoringStrategy::Classifier => f.write_str("classifier"),
        }
    }
}

impl std::str::FromStr for ScoringStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rule" => Ok(ScoringStrategy::Rule),
            "classifier" => Ok(ScoringStrategy::Classifier),
            other => Err(format!("unknown scoring strategy: {other}")),
        }
    }
}

/// Create a scorer for `strategy`.
///
/// `Classifier` without an artifact fails with
/// [`ScoreError::ClassifierUnavailable`].
pub fn create_scorer(
    strategy: ScoringStrategy,
    rules: &RuleConfig,
    artifact: Option<Arc<ModelArtifact>>,
) -> Result<Box<dyn SignalScorer>, ScoreError> {
    let scorer: Box<dyn SignalScorer> = match strategy {
        ScoringStrategy::Rule => Box::new(RuleScorer::new(rules.clone())),
        ScoringStrategy::Classifier => {
            let artifact = artifact.ok_or(ScoreError::ClassifierUnavailable)?;
            Box::new(ClassifierScorer::new(artifact)?)
        }
    };
    debug!(strategy = %strategy, scorer = scorer.name(), "created signal scorer");
    Ok(scorer)
}
