use serde::{Deserialize, Serialize};

use crate::bar::Candle;
use crate::constant::{Bias, StructureBreakKind, SwingKind, TrendDirection};
use crate::swing::SwingPoint;

const CONSISTENCY_EPSILON: f64 = 0.01;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureBreak {
    #[serde(rename = "type")]
    pub kind: StructureBreakKind,
    pub direction: Bias,
    pub price: f64,
    pub time: i64,
}

/// Single-timeframe trend read, before higher/lower timeframes are combined.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendSummary {
    pub direction: TrendDirection,
    pub strength: f64,
    pub structure_breaks: Vec<StructureBreak>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendAnalysis {
    pub direction: TrendDirection,
    pub strength: f64,
    pub higher_timeframe: TrendDirection,
    pub lower_timeframe: TrendDirection,
    pub structure_breaks: Vec<StructureBreak>,
}

impl TrendAnalysis {
    pub fn ranging() -> Self {
        Self {
            direction: TrendDirection::Ranging,
            strength: 0.0,
            higher_timeframe: TrendDirection::Ranging,
            lower_timeframe: TrendDirection::Ranging,
            structure_breaks: Vec::new(),
        }
    }

    /// The lower timeframe drives direction, strength and breaks.
    pub fn combine(higher: &TrendSummary, lower: TrendSummary) -> Self {
        Self {
            direction: lower.direction,
            strength: lower.strength,
            higher_timeframe: higher.direction,
            lower_timeframe: lower.direction,
            structure_breaks: lower.structure_breaks,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SwingSequence {
    pub higher_highs: usize,
    pub lower_highs: usize,
    pub higher_lows: usize,
    pub lower_lows: usize,
}

impl SwingSequence {
    pub fn from_points(points: &[SwingPoint]) -> Self {
        let highs: Vec<f64> = points.iter().filter(|x| x.is_high()).map(|x| x.price).collect();
        let lows: Vec<f64> = points.iter().filter(|x| x.is_low()).map(|x| x.price).collect();

        Self {
            higher_highs: count_pairs(&highs, |prev, next| next > prev),
            lower_highs: count_pairs(&highs, |prev, next| next < prev),
            higher_lows: count_pairs(&lows, |prev, next| next > prev),
            lower_lows: count_pairs(&lows, |prev, next| next < prev),
        }
    }

    pub fn direction(&self) -> TrendDirection {
        if self.higher_highs >= 2 && self.higher_lows >= 2 {
            TrendDirection::Bullish
        } else if self.lower_lows >= 2 && self.lower_highs >= 2 {
            TrendDirection::Bearish
        } else {
            TrendDirection::Ranging
        }
    }

    pub fn strength(&self, direction: TrendDirection) -> f64 {
        let bullish = (self.higher_highs + self.higher_lows) as f64;
        let bearish = (self.lower_highs + self.lower_lows) as f64;
        let (with, against) = match direction {
            TrendDirection::Ranging => return 0.0,
            TrendDirection::Bullish => (bullish, bearish),
            TrendDirection::Bearish => (bearish, bullish),
        };
        let consistency = with / (with + against + CONSISTENCY_EPSILON);
        (consistency * 100.0).min(100.0)
    }
}

fn count_pairs(prices: &[f64], hit: impl Fn(f64, f64) -> bool) -> usize {
    prices.windows(2).filter(|w| hit(w[0], w[1])).count()
}

pub fn analyze_trend(candles: &[Candle], swing_points: &[SwingPoint]) -> TrendSummary {
    let sequence = SwingSequence::from_points(swing_points);
    let direction = sequence.direction();

    TrendSummary {
        direction,
        strength: sequence.strength(direction),
        structure_breaks: detect_structure_breaks(candles, swing_points),
    }
}

/// Every close beyond the most recent prior swing of the relevant kind is a
/// break. Consecutive candles re-breaking the same swing are all reported.
pub fn detect_structure_breaks(candles: &[Candle], swing_points: &[SwingPoint]) -> Vec<StructureBreak> {
    let mut highs: Vec<&SwingPoint> = swing_points.iter().filter(|x| x.is_high()).collect();
    let mut lows: Vec<&SwingPoint> = swing_points.iter().filter(|x| x.is_low()).collect();
    highs.sort_by_key(|x| x.index);
    lows.sort_by_key(|x| x.index);

    let mut breaks = Vec::new();
    let mut high_cursor = 0usize;
    let mut low_cursor = 0usize;

    for (i, candle) in candles.iter().enumerate() {
        while high_cursor < highs.len() && highs[high_cursor].index < i {
            high_cursor += 1;
        }
        while low_cursor < lows.len() && lows[low_cursor].index < i {
            low_cursor += 1;
        }

        let recent_high = high_cursor.checked_sub(1).map(|x| highs[x]);
        if let Some(high) = recent_high {
            if candle.close > high.price {
                breaks.push(StructureBreak {
                    kind: StructureBreakKind::Bos,
                    direction: Bias::Bullish,
                    price: candle.close,
                    time: candle.time,
                });
            }
        }

        let recent_low = low_cursor.checked_sub(1).map(|x| lows[x]);
        if let Some(low) = recent_low {
            if candle.close < low.price {
                breaks.push(StructureBreak {
                    kind: StructureBreakKind::Bos,
                    direction: Bias::Bearish,
                    price: candle.close,
                    time: candle.time,
                });
            }
        }
    }

    breaks
}

pub(crate) fn most_recent(points: &[SwingPoint], kind: SwingKind) -> Option<&SwingPoint> {
    points.iter().filter(|x| x.kind == kind).max_by_key(|x| x.index)
}
