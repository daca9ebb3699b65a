//! Feature record: the flat numeric snapshot fed to a scorer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default classifier column order.
///
/// A trained classifier carries its own ordered list; this is the order the
/// training pipeline produces when no other list is given.
pub const FEATURE_COLUMNS: [&str; 13] = [
    "rsi",
    "macd",
    "macd_histogram",
    "bb_width",
    "bb_position",
    "ema_trend",
    "volume_ratio",
    "stochastic",
    "price_change_1d",
    "price_change_5d",
    "price_change_10d",
    "volatility_20",
    "news_sentiment",
];

/// Indicator values at one evaluation instant.
///
/// Raw rows (training path) may hold `NaN`; rows inside a [`FeatureRecord`]
/// never do, see [`FeatureValues::with_defaults`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureValues {
    pub rsi: f64,
    pub macd: f64,
    pub macd_signal: f64,
    pub macd_histogram: f64,
    pub bb_width: f64,
    pub bb_position: f64,
    /// 1.0 when the fast EMA is above the slow EMA, else 0.0.
    pub ema_trend: f64,
    pub volume_ratio: f64,
    pub stochastic: f64,
    pub price_change_1d: f64,
    pub price_change_5d: f64,
    pub price_change_10d: f64,
    pub volatility_20: f64,
    /// Placeholder column, always 0.0 from the assembler.
    pub news_sentiment: f64,
}

impl FeatureValues {
    /// Neutral values substituted for anything undefined.
    pub const DEFAULTS: FeatureValues = FeatureValues {
        rsi: 50.0,
        macd: 0.0,
        macd_signal: 0.0,
        macd_histogram: 0.0,
        bb_width: 0.02,
        bb_position: 0.5,
        ema_trend: 0.0,
        volume_ratio: 1.0,
        stochastic: 50.0,
        price_change_1d: 0.0,
        price_change_5d: 0.0,
        price_change_10d: 0.0,
        volatility_20: 0.02,
        news_sentiment: 0.0,
    };

    /// All-`NaN` row, the starting point for raw extraction.
    pub const UNDEFINED: FeatureValues = FeatureValues {
        rsi: f64::NAN,
        macd: f64::NAN,
        macd_signal: f64::NAN,
        macd_histogram: f64::NAN,
        bb_width: f64::NAN,
        bb_position: f64::NAN,
        ema_trend: f64::NAN,
        volume_ratio: f64::NAN,
        stochastic: f64::NAN,
        price_change_1d: f64::NAN,
        price_change_5d: f64::NAN,
        price_change_10d: f64::NAN,
        volatility_20: f64::NAN,
        news_sentiment: f64::NAN,
    };

    /// Look up a value by column name.
    pub fn column(&self, name: &str) -> Option<f64> {
        let value = match name {
            "rsi" => self.rsi,
            "macd" => self.macd,
            "macd_signal" => self.macd_signal,
            "macd_histogram" => self.macd_histogram,
            "bb_width" => self.bb_width,
            "bb_position" => self.bb_position,
            "ema_trend" => self.ema_trend,
            "volume_ratio" => self.volume_ratio,
            "stochastic" => self.stochastic,
            "price_change_1d" => self.price_change_1d,
            "price_change_5d" => self.price_change_5d,
            "price_change_10d" => self.price_change_10d,
            "volatility_20" => self.volatility_20,
            "news_sentiment" => self.news_sentiment,
            _ => return None,
        };
        Some(value)
    }

    /// Whether `name` is a column this type can provide.
    pub fn has_column(name: &str) -> bool {
        Self::DEFAULTS.column(name).is_some()
    }

    /// Replace every non-finite value with its documented default.
    pub fn with_defaults(self) -> Self {
        let d = Self::DEFAULTS;
        let pick = |v: f64, default: f64| if v.is_finite() { v } else { default };
        Self {
            rsi: pick(self.rsi, d.rsi),
            macd: pick(self.macd, d.macd),
            macd_signal: pick(self.macd_signal, d.macd_signal),
            macd_histogram: pick(self.macd_histogram, d.macd_histogram),
            bb_width: pick(self.bb_width, d.bb_width),
            bb_position: pick(self.bb_position, d.bb_position),
            ema_trend: pick(self.ema_trend, d.ema_trend),
            volume_ratio: pick(self.volume_ratio, d.volume_ratio),
            stochastic: pick(self.stochastic, d.stochastic),
            price_change_1d: pick(self.price_change_1d, d.price_change_1d),
            price_change_5d: pick(self.price_change_5d, d.price_change_5d),
            price_change_10d: pick(self.price_change_10d, d.price_change_10d),
            volatility_20: pick(self.volatility_20, d.volatility_20),
            news_sentiment: pick(self.news_sentiment, d.news_sentiment),
        }
    }

    /// True when every value is finite.
    pub fn is_complete(&self) -> bool {
        self.as_array().iter().all(|v| v.is_finite())
    }

    fn as_array(&self) -> [f64; 14] {
        [
            self.rsi,
            self.macd,
            self.macd_signal,
            self.macd_histogram,
            self.bb_width,
            self.bb_position,
            self.ema_trend,
            self.volume_ratio,
            self.stochastic,
            self.price_change_1d,
            self.price_change_5d,
            self.price_change_10d,
            self.volatility_20,
            self.news_sentiment,
        ]
    }

    /// Whether the fast EMA sits above the slow EMA.
    pub fn trend_up(&self) -> bool {
        self.ema_trend >= 0.5
    }
}

/// One symbol's features at one evaluation instant.
///
/// Every value is finite: the assembler substitutes defaults before
/// emitting a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    pub symbol: String,
    pub timestamp: DateTime<Utc>,
    pub price: f64,
    #[serde(flatten)]
    pub values: FeatureValues,
}

impl FeatureRecord {
    /// Build a record, applying defaults to any non-finite value.
    pub fn new(
        symbol: impl Into<String>,
        timestamp: DateTime<Utc>,
        price: f64,
        values: FeatureValues,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            timestamp,
            price,
            values: values.with_defaults(),
        }
    }

    pub fn column(&self, name: &str) -> Option<f64> {
        self.values.column(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn every_default_column_is_resolvable() {
        for name in FEATURE_COLUMNS {
            assert!(FeatureValues::has_column(name), "missing column {name}");
        }
        assert!(FeatureValues::has_column("macd_signal"));
        assert!(!FeatureValues::has_column("price"));
        assert!(!FeatureValues::has_column("RSI"));
    }

    #[test]
    fn with_defaults_replaces_only_non_finite() {
        let mut raw = FeatureValues::UNDEFINED;
        raw.rsi = 71.5;
        raw.volume_ratio = f64::INFINITY;
        let filled = raw.with_defaults();
        assert_eq!(filled.rsi, 71.5);
        assert_eq!(filled.volume_ratio, 1.0);
        assert_eq!(filled.stochastic, 50.0);
        assert_eq!(filled.bb_width, 0.02);
        assert_eq!(filled.bb_position, 0.5);
        assert_eq!(filled.volatility_20, 0.02);
        assert_eq!(filled.ema_trend, 0.0);
        assert!(filled.is_complete());
        assert!(!raw.is_complete());
    }

    #[test]
    fn record_is_always_finite() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let record = FeatureRecord::new("TSLA", ts, 180.0, FeatureValues::UNDEFINED);
        assert!(record.values.is_complete());
        assert_eq!(record.values, FeatureValues::DEFAULTS);
    }

    #[test]
    fn record_serializes_flat() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let record = FeatureRecord::new("TSLA", ts, 180.0, FeatureValues::DEFAULTS);
        let json: serde_json::Value = serde_json::to_value(&record).unwrap();
        assert_eq!(json["symbol"], "TSLA");
        assert_eq!(json["rsi"], 50.0);
        assert_eq!(json["bb_width"], 0.02);
    }
}
