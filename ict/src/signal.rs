use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::bar::Candle;
use crate::confluence::ConfluenceZone;
use crate::constant::{Bias, EntryDirection, EntrySignalKind, OrderBlockStatus, SlSource, SwingKind, TpSource};
use crate::fibonacci::PriceRange;
use crate::order_block::OrderBlock;
use crate::pips::{calculate_pips, pips_to_price, round_to};
use crate::swing::SwingPoint;

const FALLBACK_REWARD_RATIO: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepConfig {
    /// Candles at the end of the series searched for a sweep.
    pub window: usize,
    /// Swing points further back than this many candles are ignored.
    pub max_swing_distance: usize,
    /// Candles after the sweep searched for the shift.
    pub shift_search: usize,
    pub min_body_ratio: f64,
    pub min_candles: usize,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            window: 20,
            max_swing_distance: 20,
            shift_search: 5,
            min_body_ratio: 0.6,
            min_candles: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepShiftPattern {
    pub sweep_index: usize,
    pub sweep_price: f64,
    pub sweep_time: i64,
    pub swing_point: SwingPoint,
    pub shift_index: usize,
    pub shift_candle: Candle,
    pub direction: Bias,
    pub strength: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntrySignal {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: EntrySignalKind,
    pub direction: EntryDirection,
    pub sweep_time: Option<i64>,
    pub shift_time: Option<i64>,
    pub entry_zone: PriceRange,
    pub suggested_entry: f64,
    #[serde(rename = "suggestedSL")]
    pub suggested_sl: f64,
    #[serde(rename = "suggestedTP1")]
    pub suggested_tp1: f64,
    #[serde(rename = "suggestedTP2")]
    pub suggested_tp2: Option<f64>,
    pub risk_reward_ratio: f64,
    pub confidence: f64,
    pub sl_source: SlSource,
    pub tp_source: TpSource,
    pub sl_distance_pips: f64,
}

/// Finds the most recent liquidity sweep that is followed by a strong
/// reversal candle.
///
/// Candles are scanned newest first, so a later sweep always wins over an
/// earlier one. When one candle sweeps more than one level, the strongest
/// pattern is kept and `trend` breaks ties.
pub fn detect_sweep_and_shift(
    candles: &[Candle],
    swing_points: &[SwingPoint],
    trend: Bias,
    config: &SweepConfig,
) -> Option<SweepShiftPattern> {
    if candles.len() < config.min_candles.max(2) || swing_points.is_empty() {
        return None;
    }

    let start = candles.len().saturating_sub(config.window);
    for index in (start..candles.len() - 1).rev() {
        let candle = &candles[index];
        let mut best: Option<SweepShiftPattern> = None;

        for swing in swing_points
            .iter()
            .filter(|x| x.index < index && index - x.index < config.max_swing_distance)
        {
            let Some(direction) = sweep_direction(candle, swing) else {
                continue;
            };
            let Some(shift_index) = find_shift_candle(candles, index + 1, direction, config) else {
                continue;
            };

            let shift_candle = candles[shift_index];
            let pattern = SweepShiftPattern {
                sweep_index: index,
                sweep_price: match direction {
                    Bias::Bullish => candle.low,
                    Bias::Bearish => candle.high,
                },
                sweep_time: candle.time,
                swing_point: swing.clone(),
                shift_index,
                shift_candle,
                direction,
                strength: pattern_strength(&shift_candle),
            };

            if best.as_ref().is_none_or(|x| outranks(&pattern, x, trend)) {
                best = Some(pattern);
            }
        }

        if let Some(pattern) = best {
            debug!(
                sweep_index = pattern.sweep_index,
                shift_index = pattern.shift_index,
                direction = pattern.direction.as_str(),
                strength = pattern.strength,
                "sweep and shift"
            );
            return Some(pattern);
        }
    }

    None
}

/// A wick through a swing low that closes back above it is a bullish
/// sweep; the mirror at a swing high is bearish.
fn sweep_direction(candle: &Candle, swing: &SwingPoint) -> Option<Bias> {
    match swing.kind {
        SwingKind::Low if candle.low < swing.price && candle.close > swing.price => Some(Bias::Bullish),
        SwingKind::High if candle.high > swing.price && candle.close < swing.price => Some(Bias::Bearish),
        _ => None,
    }
}

fn find_shift_candle(candles: &[Candle], from: usize, direction: Bias, config: &SweepConfig) -> Option<usize> {
    let end = from.saturating_add(config.shift_search).min(candles.len());
    (from..end).find(|&i| {
        let candle = &candles[i];
        if candle.body_ratio() <= config.min_body_ratio {
            return false;
        }
        match direction {
            Bias::Bullish => candle.is_bullish(),
            Bias::Bearish => candle.is_bearish(),
        }
    })
}

fn pattern_strength(shift: &Candle) -> f64 {
    let shift_percent = if shift.open != 0.0 {
        shift.body() / shift.open.abs() * 100.0
    } else {
        0.0
    };
    (shift.body_ratio() * 40.0 + shift_percent * 10.0).clamp(20.0, 100.0)
}

fn outranks(candidate: &SweepShiftPattern, current: &SweepShiftPattern, trend: Bias) -> bool {
    if candidate.strength != current.strength {
        return candidate.strength > current.strength;
    }
    candidate.direction == trend && current.direction != trend
}

/// Turns a detected pattern into an entry, stop and targets.
///
/// Stop priority is confluence zone, then the nearest valid order block on
/// the pattern side of both `current_price` and the entry, then the sweep
/// extreme; each is
/// pushed out by `buffer_pips`. The first target is the latest opposite
/// swing before the sweep that lies beyond the entry, else a 2:1 target.
#[allow(clippy::too_many_arguments)]
pub fn generate_entry_signal(
    pattern: &SweepShiftPattern,
    confluence: Option<&ConfluenceZone>,
    current_price: f64,
    swing_points: &[SwingPoint],
    order_blocks: &[OrderBlock],
    symbol: &str,
    buffer_pips: f64,
) -> EntrySignal {
    let direction = pattern.direction.entry_direction();
    let buffer = pips_to_price(buffer_pips, symbol);
    let shift = &pattern.shift_candle;

    let entry_zone = match confluence {
        Some(zone) => PriceRange {
            top: zone.overlap_top,
            bottom: zone.overlap_bottom,
        },
        None => PriceRange {
            top: shift.high,
            bottom: shift.low,
        },
    };

    let (suggested_entry, suggested_sl, sl_source) = match direction {
        EntryDirection::Long => {
            let entry = confluence.map_or(shift.close, |x| x.overlap_bottom);
            let (level, source) = match confluence {
                Some(zone) => (zone.overlap_bottom, SlSource::ConfluenceZone),
                None => nearest_order_block_bottom(order_blocks, current_price, entry + buffer)
                    .map(|x| (x, SlSource::OrderBlock))
                    .unwrap_or((pattern.sweep_price, SlSource::SweepPrice)),
            };
            (entry, level - buffer, source)
        }
        EntryDirection::Short => {
            let entry = confluence.map_or(shift.close, |x| x.overlap_top);
            let (level, source) = match confluence {
                Some(zone) => (zone.overlap_top, SlSource::ConfluenceZone),
                None => nearest_order_block_top(order_blocks, current_price, entry - buffer)
                    .map(|x| (x, SlSource::OrderBlock))
                    .unwrap_or((pattern.sweep_price, SlSource::SweepPrice)),
            };
            (entry, level + buffer, source)
        }
    };

    let risk = (suggested_entry - suggested_sl).abs();
    let (suggested_tp1, tp_source) =
        match previous_target(swing_points, pattern.sweep_index, direction, suggested_entry) {
            Some(price) => (price, TpSource::SwingPoint),
            None => {
                let reward = risk * FALLBACK_REWARD_RATIO;
                let price = match direction {
                    EntryDirection::Long => suggested_entry + reward,
                    EntryDirection::Short => suggested_entry - reward,
                };
                (price, TpSource::FixedRatio)
            }
        };
    let suggested_tp2 = next_target(swing_points, direction, suggested_tp1);

    let risk_reward_ratio = if risk > 0.0 {
        round_to((suggested_tp1 - suggested_entry).abs() / risk, 2)
    } else {
        FALLBACK_REWARD_RATIO
    };
    let confidence = (pattern.strength + confluence.map_or(0.0, |x| x.strength * 0.5)).min(100.0);

    trace!(
        direction = direction.as_str(),
        entry = suggested_entry,
        sl = suggested_sl,
        tp1 = suggested_tp1,
        ?sl_source,
        ?tp_source,
        "entry signal"
    );

    EntrySignal {
        id: format!("signal-{}", pattern.sweep_time),
        kind: EntrySignalKind::SweepAndShift,
        direction,
        sweep_time: Some(pattern.sweep_time),
        shift_time: Some(shift.time),
        entry_zone,
        suggested_entry,
        suggested_sl,
        suggested_tp1,
        suggested_tp2,
        risk_reward_ratio,
        confidence,
        sl_source,
        tp_source,
        sl_distance_pips: calculate_pips(suggested_entry, suggested_sl, symbol),
    }
}

/// Highest bottom among valid bullish blocks fully below price whose
/// buffered bottom stays under the entry.
fn nearest_order_block_bottom(order_blocks: &[OrderBlock], price: f64, max_bottom: f64) -> Option<f64> {
    order_blocks
        .iter()
        .filter(|x| x.kind == Bias::Bullish && x.status == OrderBlockStatus::Valid && x.top < price)
        .filter(|x| x.bottom < max_bottom)
        .map(|x| x.bottom)
        .max_by(f64::total_cmp)
}

/// Lowest top among valid bearish blocks fully above price whose
/// buffered top stays over the entry.
fn nearest_order_block_top(order_blocks: &[OrderBlock], price: f64, min_top: f64) -> Option<f64> {
    order_blocks
        .iter()
        .filter(|x| x.kind == Bias::Bearish && x.status == OrderBlockStatus::Valid && x.bottom > price)
        .filter(|x| x.top > min_top)
        .map(|x| x.top)
        .min_by(f64::total_cmp)
}

fn previous_target(
    swing_points: &[SwingPoint],
    before_index: usize,
    direction: EntryDirection,
    entry: f64,
) -> Option<f64> {
    swing_points
        .iter()
        .filter(|x| x.index < before_index)
        .filter(|x| match direction {
            EntryDirection::Long => x.is_high() && x.price > entry,
            EntryDirection::Short => x.is_low() && x.price < entry,
        })
        .max_by_key(|x| x.index)
        .map(|x| x.price)
}

/// Closest swing of the target side strictly beyond the first target.
fn next_target(swing_points: &[SwingPoint], direction: EntryDirection, tp1: f64) -> Option<f64> {
    match direction {
        EntryDirection::Long => swing_points
            .iter()
            .filter(|x| x.is_high() && x.price > tp1)
            .map(|x| x.price)
            .min_by(f64::total_cmp),
        EntryDirection::Short => swing_points
            .iter()
            .filter(|x| x.is_low() && x.price < tp1)
            .map(|x| x.price)
            .max_by(f64::total_cmp),
    }
}
