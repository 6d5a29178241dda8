//! Symbol-aware pip conversion and position sizing.

use serde::{Deserialize, Serialize};

use crate::constant::EntryDirection;

const DEFAULT_PIP_VALUE: f64 = 10.0;
const MIN_LOT: f64 = 0.01;

/// Uppercase letters only, so `xau/usd` and `XAUUSD` compare equal.
pub fn normalize_symbol(symbol: &str) -> String {
    symbol
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// Price units per pip, inverted: gold 10, yen pairs 100, other forex 10000.
pub fn pip_multiplier(symbol: &str) -> f64 {
    let normalized = normalize_symbol(symbol);
    if normalized == "XAUUSD" {
        10.0
    } else if normalized.contains("JPY") {
        100.0
    } else {
        10_000.0
    }
}

/// Distance between two prices in pips, rounded to one decimal.
pub fn calculate_pips(price_a: f64, price_b: f64, symbol: &str) -> f64 {
    round_to((price_a - price_b).abs() * pip_multiplier(symbol), 1)
}

pub fn pips_to_price(pips: f64, symbol: &str) -> f64 {
    pips / pip_multiplier(symbol)
}

/// Account-currency value of one pip for one standard lot.
pub fn pip_value(symbol: &str) -> f64 {
    match normalize_symbol(symbol).as_str() {
        "EURUSD" | "XAUUSD" | "GBPUSD" | "USDJPY" | "USDCHF" | "AUDUSD" | "NZDUSD" => 10.0,
        _ => DEFAULT_PIP_VALUE,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LotSizeParams {
    pub account_balance: f64,
    pub risk_percentage: f64,
    pub stop_loss_pips: f64,
    pub symbol: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LotSizeResult {
    pub lot_size: f64,
    pub risk_amount: f64,
    pub pip_value: f64,
    pub max_loss: f64,
}

/// Lots that risk `risk_percentage` of the balance over the stop distance,
/// rounded to 0.01 and never below the minimum lot.
pub fn calculate_lot_size(params: &LotSizeParams) -> LotSizeResult {
    let pip_value = pip_value(&params.symbol);
    if params.stop_loss_pips <= 0.0 || params.account_balance <= 0.0 || params.risk_percentage <= 0.0 {
        return LotSizeResult {
            lot_size: MIN_LOT,
            risk_amount: 0.0,
            pip_value,
            max_loss: 0.0,
        };
    }

    let risk_amount = params.account_balance * params.risk_percentage / 100.0;
    let raw = risk_amount / (params.stop_loss_pips * pip_value);
    let lot_size = round_to(raw, 2).max(MIN_LOT);

    LotSizeResult {
        lot_size,
        risk_amount,
        pip_value,
        max_loss: lot_size * params.stop_loss_pips * pip_value,
    }
}

/// Reward over risk, two decimals; zero when entry equals the stop.
pub fn calculate_risk_reward(entry: f64, stop_loss: f64, take_profit: f64) -> f64 {
    let risk = (entry - stop_loss).abs();
    if risk == 0.0 {
        return 0.0;
    }
    round_to((take_profit - entry).abs() / risk, 2)
}

/// Target at `ratio` times the risk, on the side away from the stop.
pub fn calculate_take_profit(entry: f64, stop_loss: f64, ratio: f64) -> f64 {
    let reward = (entry - stop_loss).abs() * ratio;
    let target = if entry > stop_loss {
        entry + reward
    } else {
        entry - reward
    };
    round_to(target, 5)
}

pub fn calculate_breakeven(entry: f64, direction: EntryDirection, spread_pips: f64, symbol: &str) -> f64 {
    let spread = pips_to_price(spread_pips, symbol);
    match direction {
        EntryDirection::Long => entry + spread,
        EntryDirection::Short => entry - spread,
    }
}

/// Notional of a position: 100 oz per gold lot, 100k units per forex lot.
pub fn position_value(lots: f64, symbol: &str, price: f64) -> f64 {
    if normalize_symbol(symbol) == "XAUUSD" {
        lots * 100.0 * price
    } else {
        lots * 100_000.0
    }
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}
