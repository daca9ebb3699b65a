//! TradeSignal Core: indicators, feature assembly and signal scoring.
//!
//! This crate turns OHLCV bar histories into explained trading signals:
//! - Domain types (bars, feature records, actions, labels, signals)
//! - Indicator Calculator behind the `Indicator` trait
//! - Feature Assembler with a minimum-history floor and neutral defaults
//! - Rule-based and classifier-backed scorers sharing one output contract
//! - Reasoning Composer with a fixed clause order
//! - Label Generator for the offline training path
//!
//! Everything here is synchronous and pure. Fetching bars and loading
//! trained models happen outside, before the core is called.

pub mod components;
pub mod config;
pub mod domain;
pub mod engine;
pub mod features;
pub mod indicators;
pub mod labels;
pub mod reasoning;
pub mod scoring;

pub use config::{ConfigError, EngineConfig, ScoringConfig};
pub use engine::{ActionCounts, SignalEngine};
pub use features::{AssemblerConfig, FeatureAssembler};
pub use scoring::{create_scorer, ScoreError, ScoringStrategy, SignalScorer};
