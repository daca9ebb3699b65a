//! Batch evaluation: bars or feature records in, trading signals out.
//!
//! The engine is immutable and shared by reference; every symbol is
//! evaluated independently on the rayon pool and results come back in
//! input order. One evaluation instant is stamped on the whole batch.

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::EngineConfig;
use crate::domain::{
    format_timestamp, Action, FeatureRecord, IndicatorSnapshot, SymbolHistory, TradingSignal,
};
use crate::features::FeatureAssembler;
use crate::reasoning::ReasoningComposer;
use crate::scoring::{create_scorer, ModelArtifact, ScoreError, SignalScorer};

/// Per-action signal counts of one batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ActionCounts {
    pub buy: usize,
    pub sell: usize,
    pub hold: usize,
}

impl ActionCounts {
    pub fn from_signals(signals: &[TradingSignal]) -> Self {
        let mut counts = Self::default();
        for signal in signals {
            match signal.action {
                Action::Buy => counts.buy += 1,
                Action::Sell => counts.sell += 1,
                Action::Hold => counts.hold += 1,
            }
        }
        counts
    }

    pub fn total(&self) -> usize {
        self.buy + self.sell + self.hold
    }

    /// True for a non-empty batch where nothing but hold came out.
    pub fn all_hold(&self) -> bool {
        self.total() > 0 && self.hold == self.total()
    }
}

/// Assembler, scorer and composer wired together.
pub struct SignalEngine {
    assembler: FeatureAssembler,
    scorer: Box<dyn SignalScorer>,
    composer: ReasoningComposer,
    include_probabilities: bool,
}

impl SignalEngine {
    pub fn new(
        assembler: FeatureAssembler,
        scorer: Box<dyn SignalScorer>,
        composer: ReasoningComposer,
    ) -> Self {
        Self {
            assembler,
            scorer,
            composer,
            include_probabilities: false,
        }
    }

    /// Attach per-action probabilities when the scorer reports them.
    pub fn with_probabilities(mut self, include: bool) -> Self {
        self.include_probabilities = include;
        self
    }

    /// Build an engine from configuration.
    ///
    /// Fails with [`ScoreError::ClassifierUnavailable`] when the classifier
    /// strategy is configured without an artifact.
    pub fn from_config(
        config: &EngineConfig,
        artifact: Option<Arc<ModelArtifact>>,
    ) -> Result<Self, ScoreError> {
        let scorer = create_scorer(config.scoring.strategy, &config.rules, artifact)?;
        Ok(Self::new(
            FeatureAssembler::new(config.assembler.clone()),
            scorer,
            ReasoningComposer::new(config.reasoning.clone()),
        )
        .with_probabilities(config.scoring.include_probabilities))
    }

    pub fn assembler(&self) -> &FeatureAssembler {
        &self.assembler
    }

    pub fn scorer(&self) -> &dyn SignalScorer {
        self.scorer.as_ref()
    }

    /// Score and explain one record.
    pub fn evaluate_record(
        &self,
        record: &FeatureRecord,
        timestamp: &str,
    ) -> Result<TradingSignal, ScoreError> {
        let score = self.scorer.score(record)?;
        let reasoning = self.composer.compose(record, &score);
        let probabilities = if self.include_probabilities {
            score.probabilities.map(|p| p.to_map())
        } else {
            None
        };
        Ok(TradingSignal {
            symbol: record.symbol.clone(),
            action: score.action,
            confidence: score.confidence,
            price: record.price,
            reasoning,
            indicators: IndicatorSnapshot::from_values(&record.values),
            probabilities,
            timestamp: timestamp.to_string(),
        })
    }

    /// Evaluate pre-assembled records at the current instant.
    pub fn evaluate_records(
        &self,
        records: &[FeatureRecord],
    ) -> Result<Vec<TradingSignal>, ScoreError> {
        self.evaluate_records_at(records, Utc::now())
    }

    /// Evaluate pre-assembled records, stamping every signal with `at`.
    ///
    /// The first scoring error fails the whole batch.
    pub fn evaluate_records_at(
        &self,
        records: &[FeatureRecord],
        at: DateTime<Utc>,
    ) -> Result<Vec<TradingSignal>, ScoreError> {
        let timestamp = format_timestamp(at);
        let signals = records
            .par_iter()
            .map(|record| self.evaluate_record(record, &timestamp))
            .collect::<Result<Vec<_>, _>>()?;
        log_batch(self.scorer.name(), records.len(), &signals);
        Ok(signals)
    }

    /// Assemble features from bars and evaluate them at the current instant.
    pub fn evaluate_bars(
        &self,
        histories: &[SymbolHistory],
    ) -> Result<Vec<TradingSignal>, ScoreError> {
        self.evaluate_bars_at(histories, Utc::now())
    }

    /// Assemble features from bars and evaluate them, stamping with `at`.
    ///
    /// Symbols below the minimum history are omitted from the output.
    pub fn evaluate_bars_at(
        &self,
        histories: &[SymbolHistory],
        at: DateTime<Utc>,
    ) -> Result<Vec<TradingSignal>, ScoreError> {
        let records = self.assembler.assemble_batch(histories);
        self.evaluate_records_at(&records, at)
    }
}

fn log_batch(scorer: &str, requested: usize, signals: &[TradingSignal]) {
    let counts = ActionCounts::from_signals(signals);
    info!(
        scorer,
        requested,
        signals = counts.total(),
        buy = counts.buy,
        sell = counts.sell,
        hold = counts.hold,
        "evaluated signal batch"
    );
    if counts.all_hold() {
        warn!(
            scorer,
            signals = counts.total(),
            "every signal in the batch is hold"
        );
    }
}
