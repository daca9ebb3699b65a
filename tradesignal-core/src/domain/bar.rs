//! Bar: the fundamental market data unit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// OHLCV bar for a single symbol over one trading period.
///
/// Bars are produced by the data-acquisition side and handed to the core
/// read-only. Volume is fractional so crypto venues fit the same type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub symbol: String,
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Chronological bar history for one symbol.
///
/// A batch is a slice of these; the slice order is the order every
/// downstream output preserves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolHistory {
    pub symbol: String,
    pub bars: Vec<Bar>,
}

impl SymbolHistory {
    pub fn new(symbol: impl Into<String>, bars: Vec<Bar>) -> Self {
        Self {
            symbol: symbol.into(),
            bars,
        }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// The most recent bar, if any.
    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    /// Close prices in chronological order.
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_bar() -> Bar {
        Bar {
            symbol: "AAPL".into(),
            timestamp: Utc.with_ymd_and_hms(2024, 1, 2, 21, 0, 0).unwrap(),
            open: 100.0,
            high: 105.0,
            low: 98.0,
            close: 103.0,
            volume: 50_000.0,
        }
    }

    #[test]
    fn history_accessors() {
        let history = SymbolHistory::new("AAPL", vec![sample_bar(), sample_bar()]);
        assert_eq!(history.len(), 2);
        assert!(!history.is_empty());
        assert_eq!(history.closes(), vec![103.0, 103.0]);
        assert_eq!(history.last().map(|b| b.close), Some(103.0));
    }

    #[test]
    fn bar_timestamp_serializes_as_iso8601() {
        let json = serde_json::to_string(&sample_bar()).unwrap();
        assert!(json.contains("2024-01-02T21:00:00Z"));
    }
}
