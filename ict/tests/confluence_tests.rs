use ict::confluence::best_zone_for;
use ict::{
    calculate_fibonacci, calculate_overlap, find_confluence_zones, Bias, FairValueGap, FvgStatus,
    OrderBlock, OrderBlockStatus, SwingKind, SwingPoint,
};

fn order_block(id: &str, kind: Bias, top: f64, bottom: f64, strength: f64) -> OrderBlock {
    OrderBlock {
        id: id.to_string(),
        kind,
        top,
        bottom,
        start_time: 0,
        status: OrderBlockStatus::Valid,
        strength,
        retest_count: 0,
    }
}

fn gap(id: &str, kind: Bias, top: f64, bottom: f64, status: FvgStatus) -> FairValueGap {
    FairValueGap {
        id: id.to_string(),
        kind,
        top,
        bottom,
        start_time: 0,
        status,
        fill_percentage: 0.0,
        in_premium: false,
        in_discount: false,
    }
}

#[test]
fn overlapping_ranges_intersect() {
    let overlap = calculate_overlap(20.0, 10.0, 25.0, 15.0).expect("overlap");
    assert_eq!(overlap.top, 20.0);
    assert_eq!(overlap.bottom, 15.0);
    assert_eq!(overlap.percentage, 50.0);
}

#[test]
fn disjoint_or_touching_ranges_do_not_overlap() {
    assert!(calculate_overlap(20.0, 10.0, 30.0, 21.0).is_none());
    assert!(calculate_overlap(20.0, 10.0, 30.0, 20.0).is_none());
}

#[test]
fn matching_block_and_gap_form_a_zone() {
    let obs = vec![order_block("ob-1-bullish", Bias::Bullish, 20.0, 10.0, 50.0)];
    let fvgs = vec![
        gap("fvg-3-bullish", Bias::Bullish, 25.0, 15.0, FvgStatus::Unfilled),
        gap("fvg-4-bearish", Bias::Bearish, 25.0, 15.0, FvgStatus::Unfilled),
    ];

    let zones = find_confluence_zones(&obs, &fvgs, None);
    assert_eq!(zones.len(), 1);
    let zone = &zones[0];
    assert_eq!(zone.id, "confluence-ob-1-bullish-fvg-3-bullish");
    assert_eq!(zone.kind, Bias::Bullish);
    assert_eq!(zone.overlap_top, 20.0);
    assert_eq!(zone.overlap_bottom, 15.0);
    assert!(!zone.in_optimal_zone);
    // 40 (overlap, capped) + 12.5 (block) + 15 (unfilled)
    assert_eq!(zone.strength, 67.5);
}

#[test]
fn optimal_zone_adds_bonus() {
    let swings = vec![
        SwingPoint {
            index: 1,
            time: 0,
            price: 10.0,
            kind: SwingKind::Low,
            strength: 1.0,
        },
        SwingPoint {
            index: 2,
            time: 0,
            price: 30.0,
            kind: SwingKind::High,
            strength: 1.0,
        },
    ];
    let fib = calculate_fibonacci(&swings).expect("zone");
    let obs = vec![order_block("ob", Bias::Bullish, 20.0, 10.0, 50.0)];
    let fvgs = vec![gap("fvg", Bias::Bullish, 25.0, 15.0, FvgStatus::Unfilled)];

    let zones = find_confluence_zones(&obs, &fvgs, Some(&fib));
    assert!(zones[0].in_optimal_zone);
    assert_eq!(zones[0].strength, 87.5);
}

#[test]
fn zones_are_sorted_strongest_first() {
    let obs = vec![
        order_block("weak", Bias::Bullish, 20.0, 10.0, 10.0),
        order_block("strong", Bias::Bearish, 50.0, 40.0, 90.0),
    ];
    let fvgs = vec![
        gap("g1", Bias::Bullish, 22.0, 19.0, FvgStatus::PartiallyFilled),
        gap("g2", Bias::Bearish, 55.0, 45.0, FvgStatus::Unfilled),
    ];

    let zones = find_confluence_zones(&obs, &fvgs, None);
    assert_eq!(zones.len(), 2);
    assert!(zones[0].strength >= zones[1].strength);
    assert_eq!(zones[0].order_block.id, "strong");
    assert!(zones.iter().all(|x| x.strength <= 100.0));

    assert_eq!(best_zone_for(&zones, Bias::Bullish).map(|x| x.order_block.id.as_str()), Some("weak"));
    assert_eq!(best_zone_for(&zones, Bias::Bearish).map(|x| x.order_block.id.as_str()), Some("strong"));
}
