use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::bar::Candle;
use crate::constant::{Bias, OrderBlockStatus};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrderBlockConfig {
    /// Minimum displacement body as a fraction of its open.
    pub min_displacement: f64,
    pub lookback: usize,
    pub max_kept: usize,
}

impl Default for OrderBlockConfig {
    fn default() -> Self {
        Self {
            min_displacement: 0.002,
            lookback: 50,
            max_kept: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderBlock {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: Bias,
    pub top: f64,
    pub bottom: f64,
    pub start_time: i64,
    pub status: OrderBlockStatus,
    pub strength: f64,
    pub retest_count: u32,
}

impl OrderBlock {
    pub fn contains(&self, price: f64) -> bool {
        self.bottom <= price && price <= self.top
    }
}

/// Raw candidates: a setup candle followed by an opposite displacement
/// candle with at least twice its body.
pub fn scan_order_blocks(candles: &[Candle], config: &OrderBlockConfig) -> Vec<OrderBlock> {
    let mut rows = Vec::new();
    if candles.len() < 2 {
        return rows;
    }

    let start = candles.len().saturating_sub(config.lookback);
    for i in start..candles.len() - 1 {
        let setup = &candles[i];
        let displacement = &candles[i + 1];

        let setup_body = setup.body();
        let displacement_body = displacement.body();
        if displacement_body <= setup_body * 2.0 || displacement.open == 0.0 {
            continue;
        }
        if displacement_body / displacement.open.abs() <= config.min_displacement {
            continue;
        }

        let kind = if setup.is_bearish() && displacement.is_bullish() {
            Bias::Bullish
        } else if setup.is_bullish() && displacement.is_bearish() {
            Bias::Bearish
        } else {
            continue;
        };

        let strength = order_block_strength(setup, displacement);
        trace!(index = i, ?kind, strength, "order block candidate");
        rows.push(OrderBlock {
            id: format!("ob-{i}-{}", kind.as_str()),
            kind,
            top: setup.high,
            bottom: setup.low,
            start_time: setup.time,
            status: OrderBlockStatus::Valid,
            strength,
            retest_count: 0,
        });
    }

    rows
}

/// Detects candidates and keeps the trend-side blocks only.
pub fn detect_order_blocks(candles: &[Candle], trend: Bias, config: &OrderBlockConfig) -> Vec<OrderBlock> {
    let rows = scan_order_blocks(candles, config);
    filter_order_blocks(rows, trend, config.max_kept)
}

/// Keeps valid blocks on the trend side: the lowest bullish blocks in an
/// uptrend, the highest bearish blocks in a downtrend. Counter-trend
/// blocks are dropped whatever their strength.
pub fn filter_order_blocks(rows: Vec<OrderBlock>, trend: Bias, max_kept: usize) -> Vec<OrderBlock> {
    let mut kept: Vec<OrderBlock> = rows
        .into_iter()
        .filter(|x| x.status == OrderBlockStatus::Valid && x.kind == trend)
        .collect();

    match trend {
        Bias::Bullish => kept.sort_by(|a, b| a.bottom.total_cmp(&b.bottom)),
        Bias::Bearish => kept.sort_by(|a, b| b.top.total_cmp(&a.top)),
    }
    kept.truncate(max_kept);
    kept
}

/// Applies one candle to a block. `Invalidated` is terminal; a block never
/// returns to `Valid`.
pub fn update_order_block_status(block: &OrderBlock, candle: &Candle) -> OrderBlock {
    let mut updated = block.clone();
    if block.status == OrderBlockStatus::Invalidated {
        return updated;
    }

    let (retested, broken) = match block.kind {
        Bias::Bullish => (block.contains(candle.low), candle.close < block.bottom),
        Bias::Bearish => (block.contains(candle.high), candle.close > block.top),
    };

    if retested {
        updated.retest_count += 1;
        updated.status = OrderBlockStatus::Mitigated;
    }
    if broken {
        updated.status = OrderBlockStatus::Invalidated;
    }
    updated
}

/// Rewards a large displacement after a small, indecisive setup candle.
fn order_block_strength(setup: &Candle, displacement: &Candle) -> f64 {
    let displacement_percent = displacement.body() / displacement.open.abs() * 100.0;
    let setup_ratio = setup.body_ratio();
    (displacement_percent * 20.0 * (1.0 - setup_ratio * 0.5)).clamp(1.0, 100.0)
}
