use std::path::Path;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::bar::Candle;
use crate::constant::{DataError, Timeframe};
use crate::engine::{AnalysisEngine, CandleSeries, IctAnalysis};

/// Per-symbol candle store fed bar by bar or from CSV files.
///
/// A candle with the same time as the last stored one replaces it (the
/// forming bar); older candles are dropped. Series therefore stay strictly
/// increasing in time.
#[derive(Debug, Clone)]
pub struct DataReceiver {
    symbol: String,
    series: CandleSeries,
    max_candles: Option<usize>,
}

impl DataReceiver {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            series: CandleSeries::new(),
            max_candles: None,
        }
    }

    /// Keeps at most `max_candles` per timeframe, oldest evicted first.
    pub fn with_capacity_limit(mut self, max_candles: usize) -> Self {
        self.max_candles = Some(max_candles);
        self
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn ingest_candle(&mut self, timeframe: Timeframe, candle: Candle) -> bool {
        let rows = self.series.entry(timeframe).or_default();
        match rows.last_mut() {
            Some(last) if last.time == candle.time => *last = candle,
            Some(last) if last.time > candle.time => {
                warn!(
                    symbol = self.symbol.as_str(),
                    timeframe = timeframe.as_str(),
                    last = last.time,
                    time = candle.time,
                    "stale candle dropped"
                );
                return false;
            }
            _ => rows.push(candle),
        }

        if let Some(max) = self.max_candles {
            if rows.len() > max {
                let excess = rows.len() - max;
                rows.drain(..excess);
            }
        }
        true
    }

    pub fn ingest_batch(&mut self, timeframe: Timeframe, candles: impl IntoIterator<Item = Candle>) -> usize {
        candles
            .into_iter()
            .filter(|x| self.ingest_candle(timeframe, *x))
            .count()
    }

    pub fn ingest_csv(&mut self, file_path: impl AsRef<Path>, timeframe: Timeframe) -> Result<usize, DataError> {
        let candles = load_candles_csv(file_path)?;
        let count = self.ingest_batch(timeframe, candles);
        debug!(symbol = self.symbol.as_str(), timeframe = timeframe.as_str(), count, "csv ingested");
        Ok(count)
    }

    pub fn candles(&self, timeframe: Timeframe) -> &[Candle] {
        self.series.get(&timeframe).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn series(&self) -> &CandleSeries {
        &self.series
    }

    pub fn analyze(&self, engine: &AnalysisEngine, now: DateTime<Utc>) -> IctAnalysis {
        engine.analyze(&self.series, &self.symbol, now)
    }
}

#[derive(Debug, Deserialize)]
struct CsvCandleRow {
    #[serde(alias = "time", alias = "timestamp")]
    datetime: String,
    #[serde(alias = "open_price")]
    open: f64,
    #[serde(alias = "high_price")]
    high: f64,
    #[serde(alias = "low_price")]
    low: f64,
    #[serde(alias = "close_price")]
    close: f64,
    #[serde(default)]
    volume: Option<f64>,
}

/// Reads `datetime,open,high,low,close[,volume]` rows. The time column may
/// be Unix seconds or a date string.
pub fn load_candles_csv(file_path: impl AsRef<Path>) -> Result<Vec<Candle>, DataError> {
    let mut reader = csv::Reader::from_path(file_path)?;
    let mut out = Vec::new();

    for row in reader.deserialize::<CsvCandleRow>() {
        let row = row?;
        let time = parse_time(&row.datetime)?;
        out.push(Candle {
            time,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume: row.volume,
        });
    }

    Ok(out)
}

fn parse_time(value: &str) -> Result<i64, DataError> {
    let value = value.trim();
    if let Ok(seconds) = value.parse::<i64>() {
        return Ok(seconds);
    }
    parse_datetime(value).map(|x| x.timestamp())
}

pub fn parse_datetime(value: &str) -> Result<DateTime<Utc>, DataError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }

    let patterns = [
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y/%m/%d %H:%M:%S%.f",
        "%Y%m%d%H%M%S%.f",
    ];

    for pattern in patterns {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, pattern) {
            return Ok(DateTime::<Utc>::from_naive_utc_and_offset(dt, Utc));
        }
    }

    Err(DataError::InvalidDatetime(value.to_string()))
}
