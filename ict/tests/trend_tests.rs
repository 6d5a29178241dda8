use ict::trend::{detect_structure_breaks, SwingSequence};
use ict::{
    analyze_trend, Bias, Candle, StructureBreakKind, SwingKind, SwingPoint, TrendAnalysis,
    TrendDirection,
};

fn point(index: usize, kind: SwingKind, price: f64) -> SwingPoint {
    SwingPoint {
        index,
        time: index as i64 * 3600,
        price,
        kind,
        strength: 10.0,
    }
}

fn close(index: usize, close: f64) -> Candle {
    Candle::new(index as i64 * 3600, close, close + 0.1, close - 0.1, close)
}

fn rising_points() -> Vec<SwingPoint> {
    vec![
        point(1, SwingKind::High, 10.0),
        point(2, SwingKind::Low, 8.0),
        point(3, SwingKind::High, 12.0),
        point(4, SwingKind::Low, 9.0),
        point(5, SwingKind::High, 14.0),
        point(6, SwingKind::Low, 11.0),
    ]
}

#[test]
fn higher_highs_and_lows_read_bullish() {
    let sequence = SwingSequence::from_points(&rising_points());
    assert_eq!(sequence.higher_highs, 2);
    assert_eq!(sequence.higher_lows, 2);
    assert_eq!(sequence.direction(), TrendDirection::Bullish);

    let strength = sequence.strength(TrendDirection::Bullish);
    assert!(strength > 99.0 && strength <= 100.0);
}

#[test]
fn lower_highs_and_lows_read_bearish() {
    let points = vec![
        point(1, SwingKind::High, 14.0),
        point(2, SwingKind::Low, 11.0),
        point(3, SwingKind::High, 12.0),
        point(4, SwingKind::Low, 9.0),
        point(5, SwingKind::High, 10.0),
        point(6, SwingKind::Low, 8.0),
    ];
    let summary = analyze_trend(&[], &points);
    assert_eq!(summary.direction, TrendDirection::Bearish);
    assert!(summary.strength > 99.0);
}

#[test]
fn mixed_swings_are_ranging_with_zero_strength() {
    let points = vec![
        point(1, SwingKind::High, 10.0),
        point(2, SwingKind::Low, 8.0),
        point(3, SwingKind::High, 12.0),
        point(4, SwingKind::Low, 7.0),
    ];
    let summary = analyze_trend(&[], &points);
    assert_eq!(summary.direction, TrendDirection::Ranging);
    assert_eq!(summary.strength, 0.0);
}

#[test]
fn empty_input_is_ranging() {
    let summary = analyze_trend(&[], &[]);
    assert_eq!(summary.direction, TrendDirection::Ranging);
    assert!(summary.structure_breaks.is_empty());
}

#[test]
fn every_close_beyond_prior_swing_is_a_break() {
    let candles = vec![close(0, 9.0), close(1, 9.5), close(2, 10.5), close(3, 11.0)];
    let points = vec![point(1, SwingKind::High, 10.0)];

    let breaks = detect_structure_breaks(&candles, &points);
    assert_eq!(breaks.len(), 2);
    assert!(breaks.iter().all(|x| x.kind == StructureBreakKind::Bos));
    assert!(breaks.iter().all(|x| x.direction == Bias::Bullish));
    assert_eq!(breaks[0].time, candles[2].time);
    assert_eq!(breaks[0].price, 10.5);
}

#[test]
fn swing_must_precede_breaking_candle() {
    let candles = vec![close(0, 12.0), close(1, 9.0), close(2, 9.0)];
    let points = vec![point(1, SwingKind::High, 10.0), point(1, SwingKind::Low, 8.0)];
    assert!(detect_structure_breaks(&candles, &points).is_empty());
}

#[test]
fn combine_takes_direction_from_lower_timeframe() {
    let higher = analyze_trend(&[], &rising_points());
    let lower = analyze_trend(&[], &[]);

    let combined = TrendAnalysis::combine(&higher, lower);
    assert_eq!(combined.direction, TrendDirection::Ranging);
    assert_eq!(combined.higher_timeframe, TrendDirection::Bullish);
    assert_eq!(combined.lower_timeframe, TrendDirection::Ranging);
    assert_eq!(combined.direction.effective_bias(), Bias::Bullish);
}
