use ict::{
    calculate_fibonacci, detect_fair_value_gaps, update_fvg_status, Bias, Candle, FairValueGap,
    FvgStatus, SwingKind, SwingPoint,
};

fn candle(index: usize, open: f64, high: f64, low: f64, close: f64) -> Candle {
    Candle::new(1_700_000_000 + index as i64 * 3600, open, high, low, close)
}

fn bullish_gap_candles() -> Vec<Candle> {
    vec![
        candle(0, 1.095, 1.100, 1.090, 1.098),
        candle(1, 1.098, 1.125, 1.097, 1.123),
        candle(2, 1.123, 1.130, 1.120, 1.128),
    ]
}

fn gap() -> FairValueGap {
    detect_fair_value_gaps(&bullish_gap_candles(), None)
        .into_iter()
        .next()
        .expect("gap")
}

#[test]
fn three_candle_bullish_gap() {
    let candles = bullish_gap_candles();
    let gaps = detect_fair_value_gaps(&candles, None);

    assert_eq!(gaps.len(), 1);
    let fvg = &gaps[0];
    assert_eq!(fvg.id, "fvg-2-bullish");
    assert_eq!(fvg.kind, Bias::Bullish);
    assert_eq!(fvg.top, 1.120);
    assert_eq!(fvg.bottom, 1.100);
    assert_eq!(fvg.start_time, candles[2].time);
    assert_eq!(fvg.status, FvgStatus::Unfilled);
    assert_eq!(fvg.fill_percentage, 0.0);
    assert!(!fvg.in_premium && !fvg.in_discount);
}

#[test]
fn bearish_gap_is_mirrored() {
    let candles = vec![
        candle(0, 1.128, 1.130, 1.120, 1.123),
        candle(1, 1.123, 1.124, 1.097, 1.098),
        candle(2, 1.098, 1.100, 1.090, 1.095),
    ];
    let gaps = detect_fair_value_gaps(&candles, None);
    assert_eq!(gaps.len(), 1);
    assert_eq!(gaps[0].kind, Bias::Bearish);
    assert_eq!(gaps[0].top, 1.120);
    assert_eq!(gaps[0].bottom, 1.100);
}

#[test]
fn premium_flag_follows_fibonacci_midpoint() {
    let swings = vec![
        SwingPoint {
            index: 0,
            time: 0,
            price: 1.0,
            kind: SwingKind::Low,
            strength: 1.0,
        },
        SwingPoint {
            index: 1,
            time: 1,
            price: 1.2,
            kind: SwingKind::High,
            strength: 1.0,
        },
    ];
    let fib = calculate_fibonacci(&swings).expect("zone");
    let gaps = detect_fair_value_gaps(&bullish_gap_candles(), Some(&fib));
    assert!(gaps[0].in_premium);
    assert!(!gaps[0].in_discount);
}

#[test]
fn fewer_than_three_candles_yield_nothing() {
    let candles = bullish_gap_candles();
    assert!(detect_fair_value_gaps(&candles[..2], None).is_empty());
    assert!(detect_fair_value_gaps(&[], None).is_empty());
}

#[test]
fn untouched_gap_stays_unfilled() {
    let updated = update_fvg_status(&gap(), &candle(3, 1.128, 1.135, 1.125, 1.130));
    assert_eq!(updated.status, FvgStatus::Unfilled);
    assert_eq!(updated.fill_percentage, 0.0);
}

#[test]
fn fill_is_monotonic_until_invalidated() {
    let fvg = gap();

    let partial = update_fvg_status(&fvg, &candle(3, 1.128, 1.130, 1.115, 1.125));
    assert_eq!(partial.status, FvgStatus::PartiallyFilled);
    assert!((partial.fill_percentage - 25.0).abs() < 1e-6);

    let shallower = update_fvg_status(&partial, &candle(4, 1.125, 1.127, 1.118, 1.122));
    assert_eq!(shallower.status, FvgStatus::PartiallyFilled);
    assert_eq!(shallower.fill_percentage, partial.fill_percentage);

    let filled = update_fvg_status(&shallower, &candle(5, 1.110, 1.112, 1.099, 1.105));
    assert_eq!(filled.status, FvgStatus::Filled);
    assert_eq!(filled.fill_percentage, 100.0);

    let broken = update_fvg_status(&filled, &candle(6, 1.105, 1.106, 1.090, 1.095));
    assert_eq!(broken.status, FvgStatus::Invalidated);

    let recovered = update_fvg_status(&broken, &candle(7, 1.095, 1.130, 1.094, 1.125));
    assert_eq!(recovered.status, FvgStatus::Invalidated);
    assert_eq!(recovered.fill_percentage, broken.fill_percentage);
}
