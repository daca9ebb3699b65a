//! Domain types: bars, feature records, labels and trading signals.

pub mod bar;
pub mod feature;
pub mod signal;

pub use bar::{Bar, SymbolHistory};
pub use feature::{FeatureRecord, FeatureValues, FEATURE_COLUMNS};
pub use signal::{
    format_timestamp, round_to, Action, IndicatorSnapshot, Label, TradingSignal,
};
