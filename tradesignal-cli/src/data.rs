//! Bar inputs for the CLI: CSV files and deterministic synthetic series.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tradesignal_core::domain::{Bar, SymbolHistory};

/// One CSV row: `symbol,timestamp,open,high,low,close,volume`.
#[derive(Debug, Deserialize)]
struct CsvBar {
    symbol: String,
    timestamp: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

/// Parse an RFC 3339 instant or a plain `YYYY-MM-DD` date (midnight UTC).
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .with_context(|| format!("invalid timestamp '{raw}'"))?;
    Ok(Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)))
}

/// Load bars from CSV.
///
/// Symbols keep their order of first appearance; each symbol's bars are
/// sorted by timestamp. A repeated timestamp within one symbol is an error.
pub fn load_csv(path: &Path) -> Result<Vec<SymbolHistory>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;

    let mut histories: Vec<SymbolHistory> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for (line, row) in reader.deserialize::<CsvBar>().enumerate() {
        // header is line 1
        let row = row.with_context(|| format!("{}: bad row {}", path.display(), line + 2))?;
        let bar = Bar {
            timestamp: parse_timestamp(&row.timestamp)
                .with_context(|| format!("{}: row {}", path.display(), line + 2))?,
            symbol: row.symbol,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume: row.volume,
        };
        let slot = *index.entry(bar.symbol.clone()).or_insert_with(|| {
            histories.push(SymbolHistory::new(bar.symbol.clone(), Vec::new()));
            histories.len() - 1
        });
        histories[slot].bars.push(bar);
    }

    for history in &mut histories {
        history.bars.sort_by_key(|b| b.timestamp);
        if let Some(pair) = history
            .bars
            .windows(2)
            .find(|w| w[0].timestamp == w[1].timestamp)
        {
            bail!(
                "{}: duplicate timestamp {} for {}",
                path.display(),
                pair[0].timestamp,
                history.symbol
            );
        }
    }

    Ok(histories)
}

/// Deterministic random-walk bars for `symbol`.
///
/// Seeded from the BLAKE3 hash of the symbol, so the same symbol always
/// yields the same series. Weekends are skipped.
pub fn synthetic_history(symbol: &str, count: usize) -> SymbolHistory {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    let seed: [u8; 32] = *blake3::hash(symbol.as_bytes()).as_bytes();
    let mut rng = StdRng::from_seed(seed);

    let mut bars = Vec::with_capacity(count);
    let mut price = 100.0_f64;
    let mut day = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap_or(NaiveDate::MIN);

    while bars.len() < count {
        if matches!(day.weekday(), chrono::Weekday::Sat | chrono::Weekday::Sun) {
            day += Duration::days(1);
            continue;
        }

        let daily_return: f64 = rng.gen_range(-0.03..0.03);
        let open = price;
        let close = price * (1.0 + daily_return);
        let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
        let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
        let volume = rng.gen_range(500_000..5_000_000u64) as f64;

        // 21:00 UTC, the US session close
        let timestamp = Utc.from_utc_datetime(&day.and_time(NaiveTime::MIN)) + Duration::hours(21);

        bars.push(Bar {
            symbol: symbol.to_string(),
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        });

        price = close;
        day += Duration::days(1);
    }

    SymbolHistory::new(symbol, bars)
}
