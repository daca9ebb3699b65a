//! Classifier-backed scorer.
//!
//! The classifier itself is trained and loaded elsewhere; this module only
//! adapts it to the scorer contract. Column order and class layout are
//! validated once, when the scorer is built, so a mismatched artifact fails
//! loudly instead of producing corrupted predictions.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::domain::{Action, FeatureRecord, FeatureValues, Label};

use super::{ClassProbabilities, Score, ScoreError, SignalScorer};

/// Failure inside a classifier implementation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClassifierError {
    #[error("expected {expected} features, got {actual}")]
    FeatureCount { expected: usize, actual: usize },

    #[error("prediction failed: {0}")]
    Prediction(String),
}

/// A trained multi-class classifier producing class probabilities.
///
/// Implementations are read-only once loaded and may be called from many
/// threads at once.
pub trait ProbabilisticClassifier: Send + Sync {
    /// Class values in the order `predict_proba` reports them.
    fn classes(&self) -> &[i64];

    /// Probability per class for one feature row, in `classes()` order.
    fn predict_proba(&self, features: &[f64]) -> Result<Vec<f64>, ClassifierError>;

    /// Predicted class value; defaults to the most probable class.
    ///
    /// Ties resolve to the first class in `classes()` order.
    fn predict(&self, features: &[f64]) -> Result<i64, ClassifierError> {
        let proba = self.predict_proba(features)?;
        let classes = self.classes();
        let mut best: Option<(usize, f64)> = None;
        for (i, &p) in proba.iter().enumerate().take(classes.len()) {
            if best.map_or(true, |(_, bp)| p > bp) {
                best = Some((i, p));
            }
        }
        best.map(|(i, _)| classes[i])
            .ok_or_else(|| ClassifierError::Prediction("empty probability vector".into()))
    }
}

/// Validated, ordered list of feature columns a classifier was trained on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureSchema {
    columns: Vec<String>,
    fingerprint: String,
}

impl FeatureSchema {
    /// Fails on a column the feature record cannot provide or a repeated one.
    pub fn new<S: AsRef<str>>(columns: &[S]) -> Result<Self, ScoreError> {
        let mut seen = HashSet::new();
        let mut owned = Vec::with_capacity(columns.len());
        for column in columns {
            let name = column.as_ref();
            if !FeatureValues::has_column(name) {
                return Err(ScoreError::UnknownColumn(name.to_string()));
            }
            if !seen.insert(name) {
                return Err(ScoreError::DuplicateColumn(name.to_string()));
            }
            owned.push(name.to_string());
        }
        let fingerprint = blake3::hash(owned.join("\n").as_bytes())
            .to_hex()
            .to_string();
        Ok(Self {
            columns: owned,
            fingerprint,
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// BLAKE3 hex digest of the ordered column list.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Build one row in schema order from a column lookup.
    ///
    /// Missing or non-finite values are errors; nothing is zero-filled.
    pub fn row(
        &self,
        symbol: &str,
        lookup: impl Fn(&str) -> Option<f64>,
    ) -> Result<Vec<f64>, ScoreError> {
        self.columns
            .iter()
            .map(|column| {
                let value = lookup(column).ok_or_else(|| ScoreError::MissingColumn {
                    symbol: symbol.to_string(),
                    column: column.clone(),
                })?;
                if !value.is_finite() {
                    return Err(ScoreError::NonFiniteFeature {
                        symbol: symbol.to_string(),
                        column: column.clone(),
                        value,
                    });
                }
                Ok(value)
            })
            .collect()
    }
}

/// Validated mapping from class value to action and probability index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassMap {
    /// Probability index per label, indexed Sell, Hold, Buy.
    index: [usize; 3],
    classes: Vec<i64>,
}

impl ClassMap {
    /// Requires exactly the classes -1, 0 and 1, in any order.
    pub fn new(classes: &[i64]) -> Result<Self, ScoreError> {
        let mut index = [None; 3];
        for (i, &value) in classes.iter().enumerate() {
            let label = Label::from_value(value).ok_or(ScoreError::UnexpectedClass(value))?;
            let slot = &mut index[Self::slot(label)];
            if slot.is_some() {
                return Err(ScoreError::UnexpectedClass(value));
            }
            *slot = Some(i);
        }
        let mut resolved = [0; 3];
        for label in Label::ALL {
            resolved[Self::slot(label)] =
                index[Self::slot(label)].ok_or(ScoreError::MissingClass(label.value()))?;
        }
        Ok(Self {
            index: resolved,
            classes: classes.to_vec(),
        })
    }

    fn slot(label: Label) -> usize {
        match label {
            Label::Sell => 0,
            Label::Hold => 1,
            Label::Buy => 2,
        }
    }

    /// Position of `label` in the classifier's probability vector.
    pub fn index_of(&self, label: Label) -> usize {
        self.index[Self::slot(label)]
    }

    /// Action for a predicted class value.
    pub fn action_for(&self, class: i64) -> Result<Action, ScoreError> {
        Label::from_value(class)
            .map(Label::action)
            .ok_or(ScoreError::UnexpectedClass(class))
    }

    pub fn classes(&self) -> &[i64] {
        &self.classes
    }

    /// Split a probability vector into per-action probabilities.
    ///
    /// Every entry must be a finite value in [0, 1].
    pub fn probabilities(&self, proba: &[f64]) -> Result<ClassProbabilities, ScoreError> {
        if proba.len() != self.classes.len() {
            return Err(ScoreError::ProbabilityShape {
                expected: self.classes.len(),
                actual: proba.len(),
            });
        }
        if let Some((&class, &value)) = self
            .classes
            .iter()
            .zip(proba)
            .find(|(_, p)| !(0.0..=1.0).contains(*p))
        {
            return Err(ScoreError::InvalidProbability { class, value });
        }
        Ok(ClassProbabilities {
            sell: proba[self.index_of(Label::Sell)],
            hold: proba[self.index_of(Label::Hold)],
            buy: proba[self.index_of(Label::Buy)],
        })
    }
}

/// A loaded classifier with the column list it was trained on.
#[derive(Clone)]
pub struct ModelArtifact {
    pub classifier: Arc<dyn ProbabilisticClassifier>,
    pub feature_columns: Vec<String>,
    pub version: String,
    pub trained_at: Option<DateTime<Utc>>,
}

impl fmt::Debug for ModelArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelArtifact")
            .field("feature_columns", &self.feature_columns)
            .field("version", &self.version)
            .field("trained_at", &self.trained_at)
            .field("classes", &self.classifier.classes())
            .finish()
    }
}

impl ModelArtifact {
    pub fn new(
        classifier: Arc<dyn ProbabilisticClassifier>,
        feature_columns: Vec<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            classifier,
            feature_columns,
            version: version.into(),
            trained_at: None,
        }
    }

    pub fn with_trained_at(mut self, trained_at: DateTime<Utc>) -> Self {
        self.trained_at = Some(trained_at);
        self
    }

    /// Descriptive metadata; fails if the column list is invalid.
    pub fn info(&self) -> Result<ModelInfo, ScoreError> {
        let schema = FeatureSchema::new(&self.feature_columns)?;
        Ok(ModelInfo {
            version: self.version.clone(),
            trained_at: self.trained_at,
            feature_columns: self.feature_columns.clone(),
            classes: self.classifier.classes().to_vec(),
            schema_fingerprint: schema.fingerprint().to_string(),
        })
    }
}

/// Serializable description of a loaded model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelInfo {
    pub version: String,
    pub trained_at: Option<DateTime<Utc>>,
    pub feature_columns: Vec<String>,
    pub classes: Vec<i64>,
    pub schema_fingerprint: String,
}

/// Scores records by delegating to a trained classifier.
///
/// Confidence is the probability of the predicted class, which need not be
/// the largest probability if the classifier's `predict` disagrees with
/// its own arg-max.
#[derive(Debug, Clone)]
pub struct ClassifierScorer {
    artifact: Arc<ModelArtifact>,
    schema: FeatureSchema,
    class_map: ClassMap,
}

impl ClassifierScorer {
    pub fn new(artifact: Arc<ModelArtifact>) -> Result<Self, ScoreError> {
        let schema = FeatureSchema::new(&artifact.feature_columns)?;
        let class_map = ClassMap::new(artifact.classifier.classes())?;
        Ok(Self {
            artifact,
            schema,
            class_map,
        })
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn class_map(&self) -> &ClassMap {
        &self.class_map
    }

    pub fn artifact(&self) -> &ModelArtifact {
        &self.artifact
    }
}

impl SignalScorer for ClassifierScorer {
    fn name(&self) -> &str {
        "classifier"
    }

    fn score(&self, record: &FeatureRecord) -> Result<Score, ScoreError> {
        let row = self.schema.row(&record.symbol, |c| record.column(c))?;
        let classifier = &self.artifact.classifier;
        let proba = classifier.predict_proba(&row)?;
        let probabilities = self.class_map.probabilities(&proba)?;
        let action = self.class_map.action_for(classifier.predict(&row)?)?;
        Ok(Score {
            action,
            confidence: probabilities.get(action),
            probabilities: Some(probabilities),
            contributions: Vec::new(),
        })
    }
}
