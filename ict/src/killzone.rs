//! Fixed UTC session windows. Everything here is a function of the clock
//! passed in; nothing reads the system time.

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::constant::{KillZoneName, Volatility};

const SECONDS_PER_DAY: u32 = 24 * 60 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KillZoneWindow {
    pub name: KillZoneName,
    pub start_hour: u32,
    pub start_minute: u32,
    pub end_hour: u32,
    pub end_minute: u32,
    pub volatility: Volatility,
}

impl KillZoneWindow {
    pub const fn new(
        name: KillZoneName,
        start: (u32, u32),
        end: (u32, u32),
        volatility: Volatility,
    ) -> Self {
        Self {
            name,
            start_hour: start.0,
            start_minute: start.1,
            end_hour: end.0,
            end_minute: end.1,
            volatility,
        }
    }

    /// Both ends fall on a real clock time.
    pub fn is_valid(&self) -> bool {
        self.start_hour < 24 && self.end_hour < 24 && self.start_minute < 60 && self.end_minute < 60
    }

    fn start_seconds(&self) -> u32 {
        clock_seconds(self.start_hour, self.start_minute)
    }

    fn end_seconds(&self) -> u32 {
        clock_seconds(self.end_hour, self.end_minute)
    }

    /// Seconds left in the window at `second_of_day`, or `None` when the
    /// window is closed. Windows whose end is not after their start wrap
    /// past midnight.
    pub fn remaining_at(&self, second_of_day: u32) -> Option<u32> {
        let start = self.start_seconds();
        let mut end = self.end_seconds();
        if end <= start {
            end = end.saturating_add(SECONDS_PER_DAY);
        }

        let mut now = second_of_day;
        if now < start {
            now += SECONDS_PER_DAY;
        }
        (now >= start && now < end).then(|| end - now)
    }
}

pub const DEFAULT_KILL_ZONES: [KillZoneWindow; 4] = [
    KillZoneWindow::new(KillZoneName::Asian, (0, 0), (3, 0), Volatility::Low),
    KillZoneWindow::new(KillZoneName::London, (7, 0), (10, 0), Volatility::High),
    KillZoneWindow::new(KillZoneName::NewYorkAm, (12, 0), (15, 0), Volatility::High),
    KillZoneWindow::new(KillZoneName::NewYorkPm, (18, 30), (21, 0), Volatility::Medium),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KillZone {
    pub name: KillZoneName,
    #[serde(rename = "startUTC")]
    pub start_utc: String,
    #[serde(rename = "endUTC")]
    pub end_utc: String,
    pub is_active: bool,
    /// Seconds until the window closes, only while active.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_remaining: Option<u32>,
    pub volatility_expected: Volatility,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextKillZone {
    pub name: KillZoneName,
    pub seconds: u32,
}

pub fn kill_zone_status(now: DateTime<Utc>) -> Vec<KillZone> {
    kill_zone_status_with(&DEFAULT_KILL_ZONES, now)
}

pub fn kill_zone_status_with(windows: &[KillZoneWindow], now: DateTime<Utc>) -> Vec<KillZone> {
    let second_of_day = now.num_seconds_from_midnight();
    windows
        .iter()
        .map(|window| {
            let remaining = window.remaining_at(second_of_day);
            KillZone {
                name: window.name,
                start_utc: format_hm(window.start_hour, window.start_minute),
                end_utc: format_hm(window.end_hour, window.end_minute),
                is_active: remaining.is_some(),
                time_remaining: remaining,
                volatility_expected: window.volatility,
            }
        })
        .collect()
}

/// True while a high-volatility window is open.
pub fn should_trade_now(windows: &[KillZoneWindow], now: DateTime<Utc>) -> bool {
    kill_zone_status_with(windows, now)
        .iter()
        .any(|x| x.is_active && x.volatility_expected == Volatility::High)
}

/// Nearest upcoming start of a high-volatility window, wrapping to the next
/// day. A window starting this very second reports zero.
pub fn time_until_next_kill_zone(windows: &[KillZoneWindow], now: DateTime<Utc>) -> Option<NextKillZone> {
    let second_of_day = now.num_seconds_from_midnight();
    windows
        .iter()
        .filter(|x| x.volatility == Volatility::High)
        .map(|x| {
            let start = x.start_seconds();
            let seconds = if start >= second_of_day {
                start - second_of_day
            } else {
                start + SECONDS_PER_DAY - second_of_day
            };
            NextKillZone {
                name: x.name,
                seconds,
            }
        })
        .min_by_key(|x| x.seconds)
}

fn clock_seconds(hour: u32, minute: u32) -> u32 {
    hour.saturating_mul(60).saturating_add(minute).saturating_mul(60)
}

fn format_hm(hour: u32, minute: u32) -> String {
    format!("{hour:02}:{minute:02}")
}
