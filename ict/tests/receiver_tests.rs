use std::fs;
use std::path::PathBuf;

use chrono::{TimeZone, Utc};

use ict::receiver::parse_datetime;
use ict::{load_candles_csv, AnalysisEngine, Candle, DataError, DataReceiver, Timeframe};

fn temp_file(name: &str, content: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("ict-receiver-{name}-{}.csv", std::process::id()));
    fs::write(&path, content).expect("write csv");
    path
}

#[test]
fn csv_with_datetime_strings() {
    let path = temp_file(
        "datetime",
        "datetime,open,high,low,close,volume\n\
         2024-01-01 00:00:00,1.1000,1.1010,1.0990,1.1005,120\n\
         2024-01-01 01:00:00,1.1005,1.1015,1.1000,1.1012,95\n",
    );

    let candles = load_candles_csv(&path).expect("candles");
    assert_eq!(candles.len(), 2);
    assert_eq!(candles[0].time, 1_704_067_200);
    assert_eq!(candles[1].time, 1_704_070_800);
    assert_eq!(candles[0].close, 1.1005);
    assert_eq!(candles[0].volume, Some(120.0));

    let _ = fs::remove_file(&path);
}

#[test]
fn csv_with_unix_seconds_and_long_names() {
    let path = temp_file(
        "unix",
        "time,open_price,high_price,low_price,close_price\n\
         1704067200,1.1000,1.1010,1.0990,1.1005\n",
    );

    let candles = load_candles_csv(&path).expect("candles");
    assert_eq!(candles[0].time, 1_704_067_200);
    assert_eq!(candles[0].high, 1.1010);
    assert_eq!(candles[0].volume, None);

    let _ = fs::remove_file(&path);
}

#[test]
fn bad_datetime_is_reported() {
    assert!(matches!(parse_datetime("yesterday"), Err(DataError::InvalidDatetime(_))));
    let parsed = parse_datetime("2024-01-01T00:00:00Z").expect("rfc3339");
    assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
}

#[test]
fn forming_bar_is_replaced_and_stale_bars_dropped() {
    let mut receiver = DataReceiver::new("EURUSD");

    assert!(receiver.ingest_candle(Timeframe::H1, Candle::new(3600, 1.0, 1.1, 0.9, 1.0)));
    assert!(receiver.ingest_candle(Timeframe::H1, Candle::new(7200, 1.0, 1.1, 0.9, 1.0)));
    assert!(receiver.ingest_candle(Timeframe::H1, Candle::new(7200, 1.0, 1.2, 0.9, 1.15)));
    assert!(!receiver.ingest_candle(Timeframe::H1, Candle::new(3600, 1.0, 1.1, 0.9, 1.0)));

    let rows = receiver.candles(Timeframe::H1);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1].close, 1.15);
    assert!(receiver.candles(Timeframe::H4).is_empty());
}

#[test]
fn capacity_limit_evicts_oldest() {
    let mut receiver = DataReceiver::new("EURUSD").with_capacity_limit(3);
    let count = receiver.ingest_batch(
        Timeframe::H1,
        (0..5).map(|i| Candle::new(i * 3600, 1.0, 1.1, 0.9, 1.0)),
    );
    assert_eq!(count, 5);

    let rows = receiver.candles(Timeframe::H1);
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].time, 2 * 3600);
}

#[test]
fn receiver_feeds_engine() {
    let mut receiver = DataReceiver::new("XAUUSD");
    receiver.ingest_batch(
        Timeframe::H1,
        (0..30).map(|i| Candle::new(i * 3600, 2000.0, 2001.0, 1999.0, 2000.5)),
    );

    let now = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
    let analysis = receiver.analyze(&AnalysisEngine::default(), now);
    assert_eq!(analysis.symbol, "XAUUSD");
    assert!(analysis.swing_points.is_empty());
    assert_eq!(analysis.kill_zones.len(), 4);
}
