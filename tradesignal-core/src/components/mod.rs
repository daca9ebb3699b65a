//! Shared component traits.

pub mod indicator;

pub use indicator::{compute_indicator_values, compute_warmup, Indicator, IndicatorValues};
