use chrono::{DateTime, TimeZone, Utc};

use ict::{
    kill_zone_status, kill_zone_status_with, should_trade_now, time_until_next_kill_zone,
    KillZoneName, KillZoneWindow, Volatility, DEFAULT_KILL_ZONES,
};

fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 5, hour, minute, 0).unwrap()
}

fn active(now: DateTime<Utc>) -> Vec<KillZoneName> {
    kill_zone_status(now)
        .into_iter()
        .filter(|x| x.is_active)
        .map(|x| x.name)
        .collect()
}

#[test]
fn london_open_is_active_with_remaining_time() {
    let zones = kill_zone_status(at(8, 0));
    assert_eq!(zones.len(), 4);

    let london = zones.iter().find(|x| x.name == KillZoneName::London).expect("london");
    assert!(london.is_active);
    assert_eq!(london.time_remaining, Some(2 * 3600));
    assert_eq!(london.start_utc, "07:00");
    assert_eq!(london.end_utc, "10:00");
    assert!(zones.iter().filter(|x| x.name != KillZoneName::London).all(|x| !x.is_active));
    assert!(zones.iter().filter(|x| !x.is_active).all(|x| x.time_remaining.is_none()));

    assert!(should_trade_now(&DEFAULT_KILL_ZONES, at(8, 0)));
}

#[test]
fn window_edges_are_half_open() {
    assert_eq!(active(at(7, 0)), vec![KillZoneName::London]);
    assert!(active(at(10, 0)).is_empty());
    assert_eq!(active(at(0, 0)), vec![KillZoneName::Asian]);
}

#[test]
fn medium_session_does_not_allow_trading() {
    assert_eq!(active(at(19, 0)), vec![KillZoneName::NewYorkPm]);
    assert!(!should_trade_now(&DEFAULT_KILL_ZONES, at(19, 0)));
    assert!(!should_trade_now(&DEFAULT_KILL_ZONES, at(1, 0)));
}

#[test]
fn next_high_volatility_window() {
    let next = time_until_next_kill_zone(&DEFAULT_KILL_ZONES, at(4, 0)).expect("next");
    assert_eq!(next.name, KillZoneName::London);
    assert_eq!(next.seconds, 3 * 3600);

    let next = time_until_next_kill_zone(&DEFAULT_KILL_ZONES, at(10, 30)).expect("next");
    assert_eq!(next.name, KillZoneName::NewYorkAm);
    assert_eq!(next.seconds, 90 * 60);

    let next = time_until_next_kill_zone(&DEFAULT_KILL_ZONES, at(16, 0)).expect("next");
    assert_eq!(next.name, KillZoneName::London);
    assert_eq!(next.seconds, 15 * 3600);
}

#[test]
fn window_wrapping_midnight() {
    let windows = [KillZoneWindow::new(KillZoneName::Asian, (23, 0), (2, 0), Volatility::High)];

    let late = kill_zone_status_with(&windows, at(23, 30));
    assert!(late[0].is_active);
    assert_eq!(late[0].time_remaining, Some(150 * 60));

    let early = kill_zone_status_with(&windows, at(0, 30));
    assert!(early[0].is_active);
    assert_eq!(early[0].time_remaining, Some(90 * 60));

    let noon = kill_zone_status_with(&windows, at(12, 0));
    assert!(!noon[0].is_active);
    assert!(!should_trade_now(&windows, at(12, 0)));
}

#[test]
fn serializes_with_wire_names() {
    let zones = kill_zone_status(at(13, 0));
    let json = serde_json::to_value(&zones[2]).expect("json");
    assert_eq!(json["name"], "new_york_am");
    assert_eq!(json["startUTC"], "12:00");
    assert_eq!(json["endUTC"], "15:00");
    assert_eq!(json["isActive"], true);
    assert_eq!(json["volatilityExpected"], "high");
    assert_eq!(json["timeRemaining"], 7200);
}

#[test]
fn out_of_range_clock_does_not_overflow() {
    let broken = KillZoneWindow::new(KillZoneName::London, (5_000_000, 0), (7, 0), Volatility::High);
    assert!(!broken.is_valid());
    assert!(DEFAULT_KILL_ZONES.iter().all(KillZoneWindow::is_valid));

    let status = kill_zone_status_with(&[broken], at(8, 0));
    assert_eq!(status.len(), 1);
    assert!(time_until_next_kill_zone(&[broken], at(8, 0)).is_some());
}
