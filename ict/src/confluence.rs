use serde::{Deserialize, Serialize};

use crate::constant::{Bias, FvgStatus};
use crate::fibonacci::{is_price_in_optimal_zone, FibonacciZone};
use crate::fvg::FairValueGap;
use crate::order_block::OrderBlock;

const MAX_OVERLAP_POINTS: f64 = 40.0;
const ORDER_BLOCK_POINTS: f64 = 25.0;
const UNFILLED_BONUS: f64 = 15.0;
const PARTIAL_FILL_BONUS: f64 = 7.0;
const OPTIMAL_ZONE_BONUS: f64 = 20.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfluenceZone {
    pub id: String,
    pub order_block: OrderBlock,
    pub fair_value_gap: FairValueGap,
    #[serde(rename = "type")]
    pub kind: Bias,
    pub overlap_top: f64,
    pub overlap_bottom: f64,
    pub in_optimal_zone: bool,
    pub strength: f64,
}

impl ConfluenceZone {
    pub fn midpoint(&self) -> f64 {
        (self.overlap_top + self.overlap_bottom) / 2.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Overlap {
    pub top: f64,
    pub bottom: f64,
    /// Overlap size over the mean of both zone sizes, in percent.
    pub percentage: f64,
}

/// Intersection of `[bottom1, top1]` and `[bottom2, top2]`; touching edges
/// do not count.
pub fn calculate_overlap(top1: f64, bottom1: f64, top2: f64, bottom2: f64) -> Option<Overlap> {
    let top = top1.min(top2);
    let bottom = bottom1.max(bottom2);
    if bottom >= top {
        return None;
    }

    let avg_size = ((top1 - bottom1) + (top2 - bottom2)) / 2.0;
    let percentage = if avg_size > 0.0 {
        (top - bottom) / avg_size * 100.0
    } else {
        0.0
    };
    Some(Overlap {
        top,
        bottom,
        percentage,
    })
}

/// Same-direction order block x fair value gap overlaps, strongest first.
pub fn find_confluence_zones(
    order_blocks: &[OrderBlock],
    fvgs: &[FairValueGap],
    fibonacci: Option<&FibonacciZone>,
) -> Vec<ConfluenceZone> {
    let mut zones = Vec::new();

    for ob in order_blocks {
        for fvg in fvgs.iter().filter(|x| x.kind == ob.kind) {
            let Some(overlap) = calculate_overlap(ob.top, ob.bottom, fvg.top, fvg.bottom) else {
                continue;
            };

            let midpoint = (overlap.top + overlap.bottom) / 2.0;
            let in_optimal_zone = fibonacci
                .map(|fib| is_price_in_optimal_zone(midpoint, fib, ob.kind.entry_direction()))
                .unwrap_or(false);

            zones.push(ConfluenceZone {
                id: format!("confluence-{}-{}", ob.id, fvg.id),
                kind: ob.kind,
                overlap_top: overlap.top,
                overlap_bottom: overlap.bottom,
                in_optimal_zone,
                strength: confluence_strength(ob, fvg, overlap.percentage, in_optimal_zone),
                order_block: ob.clone(),
                fair_value_gap: fvg.clone(),
            });
        }
    }

    zones.sort_by(|a, b| b.strength.total_cmp(&a.strength));
    zones
}

fn confluence_strength(ob: &OrderBlock, fvg: &FairValueGap, overlap_percentage: f64, in_optimal_zone: bool) -> f64 {
    let fill_bonus = match fvg.status {
        FvgStatus::Unfilled => UNFILLED_BONUS,
        FvgStatus::PartiallyFilled => PARTIAL_FILL_BONUS,
        FvgStatus::Filled | FvgStatus::Invalidated => 0.0,
    };
    let optimal_bonus = if in_optimal_zone { OPTIMAL_ZONE_BONUS } else { 0.0 };

    let strength = overlap_percentage.min(MAX_OVERLAP_POINTS)
        + (ob.strength / 100.0) * ORDER_BLOCK_POINTS
        + fill_bonus
        + optimal_bonus;
    strength.min(100.0)
}

/// Strongest zone of the given direction.
pub fn best_zone_for(zones: &[ConfluenceZone], bias: Bias) -> Option<&ConfluenceZone> {
    zones.iter().find(|x| x.kind == bias)
}
