//! Subcommand implementations. Each returns a serializable report; `main`
//! prints it as JSON.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;
use tradesignal_core::domain::{FeatureRecord, SymbolHistory, TradingSignal};
use tradesignal_core::labels::{build_training_rows, LabelDistribution, LabeledRow};
use tradesignal_core::{EngineConfig, FeatureAssembler, ScoringStrategy, SignalEngine};

use crate::data::{load_csv, synthetic_history};

/// Where bars come from.
#[derive(Debug, Clone)]
pub enum BarSource {
    Csv(PathBuf),
    Synthetic { symbols: Vec<String>, bars: usize },
}

impl BarSource {
    pub fn load(&self) -> Result<Vec<SymbolHistory>> {
        let histories = match self {
            BarSource::Csv(path) => load_csv(path)?,
            BarSource::Synthetic { symbols, bars } => {
                if symbols.is_empty() {
                    bail!("no synthetic symbols given");
                }
                symbols.iter().map(|s| synthetic_history(s, *bars)).collect()
            }
        };
        info!(
            symbols = histories.len(),
            bars = histories.iter().map(SymbolHistory::len).sum::<usize>(),
            "loaded bar histories"
        );
        Ok(histories)
    }
}

/// Load the engine configuration, or defaults when no file is given.
pub fn load_config(path: Option<&PathBuf>) -> Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(EngineConfig::default()),
    }
}

/// Latest feature record per symbol with enough history.
pub fn features(config: &EngineConfig, histories: &[SymbolHistory]) -> Vec<FeatureRecord> {
    FeatureAssembler::new(config.assembler.clone()).assemble_batch(histories)
}

/// Options for the `signals` command.
#[derive(Debug, Clone, Default)]
pub struct SignalOptions {
    pub strategy: Option<ScoringStrategy>,
    pub probabilities: bool,
    pub at: Option<DateTime<Utc>>,
}

/// Trading signals for every symbol with enough history.
///
/// No model loader is wired into the CLI, so the classifier strategy
/// reports that no classifier is available.
pub fn signals(
    config: &EngineConfig,
    histories: &[SymbolHistory],
    options: &SignalOptions,
) -> Result<Vec<TradingSignal>> {
    let mut config = config.clone();
    if let Some(strategy) = options.strategy {
        config.scoring.strategy = strategy;
    }
    config.scoring.include_probabilities |= options.probabilities;

    let engine = SignalEngine::from_config(&config, None)
        .with_context(|| format!("cannot build {} scorer", config.scoring.strategy))?;
    let at = options.at.unwrap_or_else(Utc::now);
    Ok(engine.evaluate_bars_at(histories, at)?)
}

/// Class balance of one symbol's training rows.
#[derive(Debug, Clone, Serialize)]
pub struct SymbolLabels {
    pub symbol: String,
    #[serde(flatten)]
    pub distribution: LabelDistribution,
}

/// Labeled training rows plus their class balance.
#[derive(Debug, Clone, Serialize)]
pub struct LabelReport {
    pub distribution: LabelDistribution,
    pub symbols: Vec<SymbolLabels>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rows: Vec<LabeledRow>,
}

pub fn labels(
    config: &EngineConfig,
    histories: &[SymbolHistory],
    summary_only: bool,
) -> LabelReport {
    let mut distribution = LabelDistribution::default();
    let mut symbols = Vec::with_capacity(histories.len());
    let mut rows = Vec::new();

    for history in histories {
        let symbol_rows = build_training_rows(history, &config.assembler, &config.labels);
        let dist = LabelDistribution::from_labels(symbol_rows.iter().map(|r| &r.label));
        dist.log(&history.symbol);
        distribution.merge(&dist);
        symbols.push(SymbolLabels {
            symbol: history.symbol.clone(),
            distribution: dist,
        });
        if !summary_only {
            rows.extend(symbol_rows);
        }
    }

    distribution.log("all");
    LabelReport {
        distribution,
        symbols,
        rows,
    }
}
