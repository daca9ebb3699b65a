//! Property tests for pipeline invariants.
//!
//! Uses proptest to verify:
//! 1. Bounds: RSI and stochastic stay in [0, 100]; volume ratio, band
//!    width and volatility are non-negative
//! 2. Finiteness: assembled feature records never carry NaN or infinity
//! 3. Determinism: the rule scorer and reasoning are pure functions
//! 4. Batch order: output order follows input order for every permutation

use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use tradesignal_core::components::indicator::Indicator;
use tradesignal_core::domain::{Action, Bar, FeatureRecord, FeatureValues, SymbolHistory};
use tradesignal_core::indicators::{Bollinger, Rsi, Stochastic, Volatility, VolumeRatio};
use tradesignal_core::reasoning::ReasoningComposer;
use tradesignal_core::scoring::{RuleScorer, SignalScorer};
use tradesignal_core::{FeatureAssembler, SignalEngine};

// ── Strategies (proptest) ────────────────────────────────────────────

/// Per-bar (return, range fraction, volume) triples.
fn arb_steps(min: usize, max: usize) -> impl Strategy<Value = Vec<(f64, f64, f64)>> {
    prop::collection::vec((-0.08..0.08_f64, 0.0..0.05_f64, 0.0..1e6_f64), min..max)
}

fn bars_from_steps(symbol: &str, steps: &[(f64, f64, f64)]) -> Vec<Bar> {
    let base = Utc.with_ymd_and_hms(2023, 1, 2, 0, 0, 0).unwrap();
    let mut close = 100.0;
    steps
        .iter()
        .enumerate()
        .map(|(i, &(ret, range, volume))| {
            let open = close;
            close = (close * (1.0 + ret)).max(0.01);
            Bar {
                symbol: symbol.to_string(),
                timestamp: base + chrono::Duration::days(i as i64),
                open,
                high: open.max(close) * (1.0 + range),
                low: open.min(close) * (1.0 - range),
                close,
                volume,
            }
        })
        .collect()
}

fn arb_values() -> impl Strategy<Value = FeatureValues> {
    (
        0.0..100.0_f64,
        -2.0..2.0_f64,
        -1.0..2.0_f64,
        0.0..4.0_f64,
        0.0..100.0_f64,
        prop::bool::ANY,
    )
        .prop_map(|(rsi, hist, bb, vol, stoch, up)| FeatureValues {
            rsi,
            macd_histogram: hist,
            bb_position: bb,
            volume_ratio: vol,
            stochastic: stoch,
            ema_trend: if up { 1.0 } else { 0.0 },
            ..FeatureValues::DEFAULTS
        })
}

fn record(values: FeatureValues) -> FeatureRecord {
    let ts = Utc.with_ymd_and_hms(2024, 6, 3, 0, 0, 0).unwrap();
    FeatureRecord::new("PROP", ts, 100.0, values)
}

// ── 1. Bounds ────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn oscillators_are_bounded(steps in arb_steps(1, 120)) {
        let bars = bars_from_steps("X", &steps);
        for v in Rsi::new(14).compute(&bars).into_iter().filter(|v| !v.is_nan()) {
            prop_assert!((0.0..=100.0).contains(&v), "rsi {}", v);
        }
        for v in Stochastic::new(14).compute(&bars).into_iter().filter(|v| !v.is_nan()) {
            prop_assert!((0.0..=100.0).contains(&v), "stochastic {}", v);
        }
    }

    #[test]
    fn magnitudes_are_non_negative(steps in arb_steps(1, 120)) {
        let bars = bars_from_steps("X", &steps);
        let series = [
            VolumeRatio::new(20).compute(&bars),
            Bollinger::width(20, 2.0).compute(&bars),
            Volatility::new(20).compute(&bars),
        ];
        for s in &series {
            for &v in s.iter().filter(|v| !v.is_nan()) {
                prop_assert!(v >= 0.0, "negative value {}", v);
            }
        }
    }

    #[test]
    fn bb_position_is_finite_when_defined(steps in arb_steps(20, 120)) {
        let bars = bars_from_steps("X", &steps);
        for v in Bollinger::position(20, 2.0).compute(&bars).into_iter().filter(|v| !v.is_nan()) {
            prop_assert!(v.is_finite());
        }
    }
}

// ── 2. Finiteness ────────────────────────────────────────────────────

proptest! {
    #[test]
    fn assembled_records_are_finite(steps in arb_steps(0, 150)) {
        let history = SymbolHistory::new("X", bars_from_steps("X", &steps));
        match FeatureAssembler::default().assemble(&history) {
            Some(record) => {
                prop_assert!(steps.len() >= 50);
                prop_assert!(record.values.is_complete());
                prop_assert!((0.0..=100.0).contains(&record.values.rsi));
                prop_assert!((0.0..=100.0).contains(&record.values.stochastic));
            }
            None => prop_assert!(steps.len() < 50),
        }
    }
}

// ── 3. Determinism ───────────────────────────────────────────────────

proptest! {
    #[test]
    fn rule_scoring_is_pure(values in arb_values()) {
        let scorer = RuleScorer::default();
        let composer = ReasoningComposer::default();
        let r = record(values);
        let first = scorer.score(&r).unwrap();
        let text = composer.compose(&r, &first);
        for _ in 0..3 {
            let again = scorer.score(&r).unwrap();
            prop_assert_eq!(&again, &first);
            prop_assert_eq!(composer.compose(&r, &again), text.clone());
        }
        prop_assert!((0.0..=1.0).contains(&first.confidence));
        if first.action == Action::Hold {
            prop_assert_eq!(first.confidence, 0.6);
        } else {
            prop_assert!(first.confidence >= 0.6 && first.confidence <= 0.9);
        }
    }
}

// ── 4. Batch order ───────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn batch_preserves_input_order(
        lengths in prop::collection::vec(0usize..90, 1..8),
        seed in any::<u64>(),
    ) {
        let histories: Vec<SymbolHistory> = lengths
            .iter()
            .enumerate()
            .map(|(i, &len)| {
                let symbol = format!("S{i}");
                let steps: Vec<(f64, f64, f64)> = (0..len)
                    .map(|j| {
                        let x = ((seed as f64) + (i * 97 + j) as f64).sin();
                        (x * 0.03, 0.01, 1000.0 + j as f64)
                    })
                    .collect();
                SymbolHistory::new(symbol.clone(), bars_from_steps(&symbol, &steps))
            })
            .collect();

        let engine = SignalEngine::from_config(&Default::default(), None).unwrap();
        let at = Utc.with_ymd_and_hms(2024, 6, 3, 0, 0, 0).unwrap();
        let signals = engine.evaluate_bars_at(&histories, at).unwrap();

        let expected: Vec<String> = histories
            .iter()
            .filter(|h| h.len() >= 50)
            .map(|h| h.symbol.clone())
            .collect();
        let actual: Vec<String> = signals.iter().map(|s| s.symbol.clone()).collect();
        prop_assert_eq!(actual, expected);
        let first_ts = signals.first().map(|s| s.timestamp.clone());
        prop_assert!(signals.iter().all(|s| Some(&s.timestamp) == first_ts.as_ref()));
    }
}
