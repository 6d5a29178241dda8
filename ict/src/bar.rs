use serde::{Deserialize, Serialize};

use crate::constant::DataError;

/// One OHLC candle. `time` is Unix seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candle {
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
}

impl Candle {
    pub fn new(time: i64, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            time,
            open,
            high,
            low,
            close,
            volume: None,
        }
    }

    pub fn body(&self) -> f64 {
        (self.close - self.open).abs()
    }

    pub fn upper_shadow(&self) -> f64 {
        self.high - self.close.max(self.open)
    }

    pub fn lower_shadow(&self) -> f64 {
        self.close.min(self.open) - self.low
    }

    pub fn total_range(&self) -> f64 {
        self.high - self.low
    }

    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }

    /// Body as a fraction of the full range, 0 for a flat candle.
    pub fn body_ratio(&self) -> f64 {
        let range = self.total_range();
        if range <= 0.0 {
            0.0
        } else {
            self.body() / range
        }
    }
}

/// Rejects series the algorithms must never see: non-finite prices,
/// inverted ranges, bodies outside the wick range and non-increasing time.
pub fn validate_candles(candles: &[Candle]) -> Result<(), DataError> {
    let mut previous: Option<i64> = None;
    for (index, candle) in candles.iter().enumerate() {
        let prices = [candle.open, candle.high, candle.low, candle.close];
        if prices.iter().any(|x| !x.is_finite()) {
            return Err(DataError::InvalidCandle {
                index,
                reason: "non-finite price".to_string(),
            });
        }
        if candle.volume.is_some_and(|v| !v.is_finite() || v < 0.0) {
            return Err(DataError::InvalidCandle {
                index,
                reason: "invalid volume".to_string(),
            });
        }
        if candle.high < candle.low {
            return Err(DataError::InvalidCandle {
                index,
                reason: format!("high {} below low {}", candle.high, candle.low),
            });
        }
        if candle.low > candle.open.min(candle.close) || candle.high < candle.open.max(candle.close) {
            return Err(DataError::InvalidCandle {
                index,
                reason: "open/close outside high-low range".to_string(),
            });
        }
        if let Some(prev) = previous {
            if candle.time <= prev {
                return Err(DataError::NonMonotonicTime {
                    index,
                    previous: prev,
                    current: candle.time,
                });
            }
        }
        previous = Some(candle.time);
    }
    Ok(())
}
