//! De-duplicated notifications derived from an analysis pass. The engine
//! only remembers what it already reported; delivery is the caller's job.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::confluence::ConfluenceZone;
use crate::constant::KillZoneName;
use crate::engine::IctAnalysis;
use crate::killzone::KillZone;
use crate::pips::calculate_pips;
use crate::signal::EntrySignal;

const HIGH_PRIORITY_SCORE: f64 = 70.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    Setup,
    Price,
    Killzone,
    Entry,
    Info,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertPriority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub title: String,
    pub message: String,
    pub priority: AlertPriority,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    pub confluence_proximity_pips: f64,
    pub enable_kill_zone_alerts: bool,
    pub enable_setup_alerts: bool,
    pub enable_entry_alerts: bool,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            confluence_proximity_pips: 20.0,
            enable_kill_zone_alerts: true,
            enable_setup_alerts: true,
            enable_entry_alerts: true,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AlertEngine {
    config: AlertConfig,
    last_kill_zone: Option<KillZoneName>,
    alerted_zones: HashSet<String>,
    alerted_signals: HashSet<String>,
}

impl AlertEngine {
    pub fn new(config: AlertConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &AlertConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: AlertConfig) {
        self.config = config;
    }

    /// Fires once when a zone becomes active. The memory resets as soon as
    /// no zone is active, so the next session alerts again.
    pub fn check_kill_zones(&mut self, kill_zones: &[KillZone]) -> Option<Alert> {
        if !self.config.enable_kill_zone_alerts {
            return None;
        }

        let Some(active) = kill_zones.iter().find(|x| x.is_active) else {
            self.last_kill_zone = None;
            return None;
        };
        if self.last_kill_zone == Some(active.name) {
            return None;
        }

        self.last_kill_zone = Some(active.name);
        Some(Alert {
            kind: AlertKind::Killzone,
            title: format!("{} Active", active.name.display_name()),
            message: "Trading session is now active. High volatility expected.".to_string(),
            priority: AlertPriority::Medium,
        })
    }

    /// One alert per zone id once price comes within the proximity band of
    /// either zone edge.
    pub fn check_confluence(&mut self, zones: &[ConfluenceZone], price: f64, symbol: &str) -> Vec<Alert> {
        let mut alerts = Vec::new();
        if !self.config.enable_setup_alerts {
            return alerts;
        }

        for zone in zones {
            if self.alerted_zones.contains(&zone.id) {
                continue;
            }
            let distance = calculate_pips(price, zone.overlap_top, symbol)
                .min(calculate_pips(price, zone.overlap_bottom, symbol));
            if distance > self.config.confluence_proximity_pips {
                continue;
            }

            self.alerted_zones.insert(zone.id.clone());
            alerts.push(Alert {
                kind: AlertKind::Setup,
                title: "Confluence Zone Approaching".to_string(),
                message: format!(
                    "Price is {distance:.1} pips from confluence zone at {:.5}",
                    zone.overlap_top
                ),
                priority: priority_for(zone.strength),
            });
        }
        alerts
    }

    pub fn check_entry_signals(&mut self, signals: &[EntrySignal]) -> Vec<Alert> {
        let mut alerts = Vec::new();
        if !self.config.enable_entry_alerts {
            return alerts;
        }

        for signal in signals {
            if !self.alerted_signals.insert(signal.id.clone()) {
                continue;
            }
            alerts.push(Alert {
                kind: AlertKind::Entry,
                title: format!("Entry Signal: {}", signal.direction.as_str().to_uppercase()),
                message: format!(
                    "Sweep & Shift detected. Entry: {:.5}, SL: {:.5}, R:R: {:.1}",
                    signal.suggested_entry, signal.suggested_sl, signal.risk_reward_ratio
                ),
                priority: priority_for(signal.confidence),
            });
        }
        alerts
    }

    /// Kill zone, confluence and entry checks for one pass, in that order.
    pub fn process(&mut self, analysis: &IctAnalysis, price: f64) -> Vec<Alert> {
        let mut alerts: Vec<Alert> = self.check_kill_zones(&analysis.kill_zones).into_iter().collect();
        alerts.extend(self.check_confluence(&analysis.confluence_zones, price, &analysis.symbol));
        alerts.extend(self.check_entry_signals(&analysis.entry_signals));
        if !alerts.is_empty() {
            debug!(symbol = analysis.symbol.as_str(), count = alerts.len(), "alerts");
        }
        alerts
    }

    pub fn clear_alerted_zones(&mut self) {
        self.alerted_zones.clear();
    }

    pub fn clear_alerted_signals(&mut self) {
        self.alerted_signals.clear();
    }
}

fn priority_for(score: f64) -> AlertPriority {
    if score >= HIGH_PRIORITY_SCORE {
        AlertPriority::High
    } else {
        AlertPriority::Medium
    }
}
