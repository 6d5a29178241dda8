use serde::{Deserialize, Serialize};

use crate::constant::{EntryDirection, PriceZone, SwingKind};
use crate::swing::SwingPoint;
use crate::trend::most_recent;

pub const FIB_RATIOS: [f64; 7] = [0.0, 0.236, 0.382, 0.5, 0.618, 0.786, 1.0];

/// Retracement bands, measured down from the swing high.
pub const LONG_OPTIMAL_RETRACEMENT: (f64, f64) = (0.618, 0.786);
pub const SHORT_OPTIMAL_RETRACEMENT: (f64, f64) = (0.236, 0.382);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub top: f64,
    pub bottom: f64,
}

impl PriceRange {
    pub fn contains(&self, price: f64) -> bool {
        self.bottom <= price && price <= self.top
    }

    pub fn size(&self) -> f64 {
        self.top - self.bottom
    }

    pub fn midpoint(&self) -> f64 {
        (self.top + self.bottom) / 2.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FibonacciLevel {
    pub level: f64,
    pub price: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FibonacciZone {
    pub swing_low: SwingPoint,
    pub swing_high: SwingPoint,
    pub levels: Vec<FibonacciLevel>,
    pub premium_zone: PriceRange,
    pub discount_zone: PriceRange,
}

impl FibonacciZone {
    pub fn range(&self) -> f64 {
        self.swing_high.price - self.swing_low.price
    }

    pub fn level_price(&self, ratio: f64) -> f64 {
        self.swing_low.price + self.range() * ratio
    }

    pub fn equilibrium(&self) -> f64 {
        self.level_price(0.5)
    }

    pub fn retracement_price(&self, retracement: f64) -> f64 {
        self.swing_high.price - self.range() * retracement
    }
}

/// Builds the zone from the latest swing high and the latest swing low,
/// taken independently of each other.
pub fn calculate_fibonacci(swing_points: &[SwingPoint]) -> Option<FibonacciZone> {
    let swing_high = most_recent(swing_points, SwingKind::High)?.clone();
    let swing_low = most_recent(swing_points, SwingKind::Low)?.clone();

    let range = swing_high.price - swing_low.price;
    let levels = FIB_RATIOS
        .iter()
        .map(|&level| FibonacciLevel {
            level,
            price: if level == 1.0 {
                swing_high.price
            } else {
                swing_low.price + range * level
            },
            label: fib_label(level),
        })
        .collect();

    let level50 = swing_low.price + range * 0.5;
    Some(FibonacciZone {
        premium_zone: PriceRange {
            top: swing_high.price,
            bottom: level50,
        },
        discount_zone: PriceRange {
            top: level50,
            bottom: swing_low.price,
        },
        swing_low,
        swing_high,
        levels,
    })
}

fn fib_label(level: f64) -> String {
    if level == 0.0 || level == 1.0 {
        format!("{level:.1}")
    } else {
        format!("{level}")
    }
}

/// Longs want a deep discount retracement, shorts a shallow premium one.
pub fn is_price_in_optimal_zone(price: f64, fib: &FibonacciZone, direction: EntryDirection) -> bool {
    let (near, far) = match direction {
        EntryDirection::Long => LONG_OPTIMAL_RETRACEMENT,
        EntryDirection::Short => SHORT_OPTIMAL_RETRACEMENT,
    };
    let a = fib.retracement_price(near);
    let b = fib.retracement_price(far);
    a.min(b) <= price && price <= a.max(b)
}

pub fn price_zone(price: f64, fib: &FibonacciZone) -> PriceZone {
    let level50 = fib.equilibrium();
    if price > level50 {
        PriceZone::Premium
    } else if price < level50 {
        PriceZone::Discount
    } else {
        PriceZone::Equilibrium
    }
}
