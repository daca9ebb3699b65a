//! CSV loading against real files on disk.

use chrono::{TimeZone, Utc};
use std::io::Write;
use tempfile::NamedTempFile;
use tradesignal_cli::commands::{self, BarSource};
use tradesignal_cli::data::load_csv;
use tradesignal_core::EngineConfig;

fn write_csv(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn groups_by_first_appearance_and_sorts_bars() {
    let file = write_csv(
        "symbol,timestamp,open,high,low,close,volume\n\
         MSFT,2024-01-03,10,11,9,10.5,1000\n\
         AAPL,2024-01-02,20,21,19,20.5,2000\n\
         MSFT,2024-01-02,9,10,8,9.5,1500\n\
         AAPL,2024-01-03T21:00:00Z,21,22,20,21.5,2500\n",
    );

    let histories = load_csv(file.path()).unwrap();
    let symbols: Vec<_> = histories.iter().map(|h| h.symbol.as_str()).collect();
    assert_eq!(symbols, vec!["MSFT", "AAPL"]);

    let msft = &histories[0];
    assert_eq!(msft.closes(), vec![9.5, 10.5]);
    assert_eq!(
        msft.bars[0].timestamp,
        Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap()
    );
    assert_eq!(
        histories[1].bars[1].timestamp,
        Utc.with_ymd_and_hms(2024, 1, 3, 21, 0, 0).unwrap()
    );
    assert_eq!(histories[1].bars[1].volume, 2500.0);
}

#[test]
fn duplicate_timestamp_is_rejected() {
    let file = write_csv(
        "symbol,timestamp,open,high,low,close,volume\n\
         SPY,2024-01-02,1,1,1,1,1\n\
         SPY,2024-01-02,2,2,2,2,2\n",
    );
    let err = load_csv(file.path()).unwrap_err();
    assert!(err.to_string().contains("duplicate timestamp"), "{err}");
}

#[test]
fn malformed_rows_report_their_line() {
    let file = write_csv(
        "symbol,timestamp,open,high,low,close,volume\n\
         SPY,2024-01-02,1,1,1,1,1\n\
         SPY,not-a-date,1,1,1,1,1\n",
    );
    let err = load_csv(file.path()).unwrap_err();
    assert!(format!("{err:#}").contains("row 3"), "{err:#}");
}

#[test]
fn missing_file_is_an_error() {
    assert!(load_csv(std::path::Path::new("/nonexistent/bars.csv")).is_err());
}

#[test]
fn csv_source_feeds_the_feature_command() {
    let mut content = String::from("symbol,timestamp,open,high,low,close,volume\n");
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    for i in 0..60 {
        let ts = start + chrono::Duration::days(i);
        let close = 100.0 + (i as f64 * 0.2).sin() * 3.0;
        content.push_str(&format!(
            "QQQ,{},{close},{},{},{close},{}\n",
            ts.to_rfc3339(),
            close + 1.0,
            close - 1.0,
            1_000_000 + i * 1000
        ));
    }
    let file = write_csv(&content);

    let histories = BarSource::Csv(file.path().to_path_buf()).load().unwrap();
    let records = commands::features(&EngineConfig::default(), &histories);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].symbol, "QQQ");
    assert!(records[0].values.is_complete());
}

#[test]
fn config_file_overrides_defaults() {
    let file = write_csv("[assembler]\nmin_bars = 80\n\n[labels]\nforward_bars = 5\n");
    let config = commands::load_config(Some(&file.path().to_path_buf())).unwrap();
    assert_eq!(config.assembler.min_bars, 80);
    assert_eq!(config.labels.forward_bars, 5);

    let bad = write_csv("[assembler]\nmin_bars = \"many\"\n");
    assert!(commands::load_config(Some(&bad.path().to_path_buf())).is_err());
}
