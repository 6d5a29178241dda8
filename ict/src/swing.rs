use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::bar::Candle;
use crate::constant::SwingKind;

pub const DEFAULT_SWING_LENGTH: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwingPoint {
    pub index: usize,
    pub time: i64,
    pub price: f64,
    #[serde(rename = "type")]
    pub kind: SwingKind,
    pub strength: f64,
}

impl SwingPoint {
    pub fn is_high(&self) -> bool {
        self.kind == SwingKind::High
    }

    pub fn is_low(&self) -> bool {
        self.kind == SwingKind::Low
    }
}

/// Pivot highs and lows over a symmetric window of `swing_length` candles.
///
/// A pivot must strictly exceed every neighbour; an equal neighbour
/// disqualifies it. Output is ordered by index, with a high emitted before
/// a low when one candle is both.
pub fn detect_swing_points(candles: &[Candle], swing_length: usize) -> Vec<SwingPoint> {
    let mut rows = Vec::new();
    if swing_length == 0 || candles.len() < swing_length.saturating_mul(2).saturating_add(1) {
        return rows;
    }

    for i in swing_length..candles.len() - swing_length {
        let current = &candles[i];

        let is_high = (1..=swing_length).all(|j| {
            current.high > candles[i - j].high && current.high > candles[i + j].high
        });
        if is_high {
            let strength = swing_strength(candles, i, SwingKind::High, swing_length);
            trace!(index = i, price = current.high, strength, "swing high");
            rows.push(SwingPoint {
                index: i,
                time: current.time,
                price: current.high,
                kind: SwingKind::High,
                strength,
            });
        }

        let is_low = (1..=swing_length)
            .all(|j| current.low < candles[i - j].low && current.low < candles[i + j].low);
        if is_low {
            let strength = swing_strength(candles, i, SwingKind::Low, swing_length);
            trace!(index = i, price = current.low, strength, "swing low");
            rows.push(SwingPoint {
                index: i,
                time: current.time,
                price: current.low,
                kind: SwingKind::Low,
                strength,
            });
        }
    }

    rows
}

/// Average excess over the neighbours, as a percent of price, scaled by 10
/// and clamped to 1..=100.
fn swing_strength(candles: &[Candle], index: usize, kind: SwingKind, swing_length: usize) -> f64 {
    let current = &candles[index];
    let mut total_diff = 0.0;
    for j in 1..=swing_length {
        let (left, right) = (&candles[index - j], &candles[index + j]);
        total_diff += match kind {
            SwingKind::High => current.high - left.high.max(right.high),
            SwingKind::Low => left.low.min(right.low) - current.low,
        };
    }

    let avg_diff = total_diff / (swing_length * 2) as f64;
    let price = match kind {
        SwingKind::High => current.high,
        SwingKind::Low => current.low,
    };
    if price == 0.0 {
        return 1.0;
    }
    let strength_percent = (avg_diff / price.abs()) * 100.0;
    (strength_percent * 10.0).clamp(1.0, 100.0)
}

pub fn swing_highs(points: &[SwingPoint]) -> Vec<&SwingPoint> {
    points.iter().filter(|x| x.is_high()).collect()
}

pub fn swing_lows(points: &[SwingPoint]) -> Vec<&SwingPoint> {
    points.iter().filter(|x| x.is_low()).collect()
}
