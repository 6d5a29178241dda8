use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::bar::Candle;
use crate::constant::{Bias, FvgStatus, PriceZone};
use crate::fibonacci::{price_zone, FibonacciZone};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FairValueGap {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: Bias,
    pub top: f64,
    pub bottom: f64,
    pub start_time: i64,
    pub status: FvgStatus,
    pub fill_percentage: f64,
    pub in_premium: bool,
    pub in_discount: bool,
}

impl FairValueGap {
    pub fn size(&self) -> f64 {
        self.top - self.bottom
    }

    pub fn midpoint(&self) -> f64 {
        (self.top + self.bottom) / 2.0
    }
}

/// Three-candle imbalances where the outer candles leave a gap the middle
/// candle never closes.
pub fn detect_fair_value_gaps(candles: &[Candle], fibonacci: Option<&FibonacciZone>) -> Vec<FairValueGap> {
    let mut rows = Vec::new();
    if candles.len() < 3 {
        return rows;
    }

    for i in 2..candles.len() {
        let first = &candles[i - 2];
        let third = &candles[i];

        if first.high < third.low {
            rows.push(new_gap(i, Bias::Bullish, third.low, first.high, third.time, fibonacci));
        }
        if first.low > third.high {
            rows.push(new_gap(i, Bias::Bearish, first.low, third.high, third.time, fibonacci));
        }
    }

    rows
}

fn new_gap(
    index: usize,
    kind: Bias,
    top: f64,
    bottom: f64,
    start_time: i64,
    fibonacci: Option<&FibonacciZone>,
) -> FairValueGap {
    let zone = fibonacci.map(|fib| price_zone((top + bottom) / 2.0, fib));
    trace!(index, ?kind, top, bottom, "fair value gap");
    FairValueGap {
        id: format!("fvg-{index}-{}", kind.as_str()),
        kind,
        top,
        bottom,
        start_time,
        status: FvgStatus::Unfilled,
        fill_percentage: 0.0,
        in_premium: zone == Some(PriceZone::Premium),
        in_discount: zone == Some(PriceZone::Discount),
    }
}

/// Applies one candle to a gap. Fill only grows; a wick through the whole
/// gap counts as fully filled. `Invalidated` is terminal.
pub fn update_fvg_status(gap: &FairValueGap, candle: &Candle) -> FairValueGap {
    let mut updated = gap.clone();
    if gap.status == FvgStatus::Invalidated {
        return updated;
    }

    let size = gap.size();
    let (entered, depth, broken) = match gap.kind {
        Bias::Bullish => (candle.low <= gap.top, gap.top - candle.low, candle.close < gap.bottom),
        Bias::Bearish => (candle.high >= gap.bottom, candle.high - gap.bottom, candle.close > gap.top),
    };

    if entered && size > 0.0 {
        let fill = (depth / size * 100.0).clamp(0.0, 100.0);
        updated.fill_percentage = gap.fill_percentage.max(fill);
        if updated.fill_percentage >= 100.0 {
            updated.status = FvgStatus::Filled;
        } else if updated.fill_percentage > 0.0 {
            updated.status = FvgStatus::PartiallyFilled;
        }
    }

    if broken {
        updated.status = FvgStatus::Invalidated;
    }
    updated
}
