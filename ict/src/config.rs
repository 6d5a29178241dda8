use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::constant::{DataError, Timeframe};
use crate::killzone::{KillZoneWindow, DEFAULT_KILL_ZONES};
use crate::order_block::OrderBlockConfig;
use crate::signal::SweepConfig;
use crate::swing::DEFAULT_SWING_LENGTH;

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub swing_length: usize,
    pub sl_buffer_pips: f64,
    pub order_block: OrderBlockConfig,
    pub sweep: SweepConfig,
    pub primary_timeframe: Timeframe,
    pub higher_timeframe: Timeframe,
    pub kill_zones: Vec<KillZoneWindow>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EngineConfigPatch {
    pub swing_length: Option<usize>,
    pub sl_buffer_pips: Option<f64>,

    pub ob_min_displacement: Option<f64>,
    pub ob_lookback: Option<usize>,
    pub ob_max_kept: Option<usize>,

    pub sweep_window: Option<usize>,
    pub sweep_max_swing_distance: Option<usize>,
    pub sweep_shift_search: Option<usize>,
    pub sweep_min_body_ratio: Option<f64>,
    pub sweep_min_candles: Option<usize>,

    pub primary_timeframe: Option<Timeframe>,
    pub higher_timeframe: Option<Timeframe>,
    pub kill_zones: Option<Vec<KillZoneWindow>>,
}

/// Default patch plus per-symbol overrides, e.g.
///
/// ```yaml
/// default:
///   swing_length: 5
/// symbol:
///   xauusd:
///     sl_buffer_pips: 30
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EngineProfileConfig {
    #[serde(default)]
    pub default: EngineConfigPatch,
    #[serde(default)]
    pub symbol: HashMap<String, EngineConfigPatch>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            swing_length: DEFAULT_SWING_LENGTH,
            sl_buffer_pips: 5.0,
            order_block: OrderBlockConfig::default(),
            sweep: SweepConfig::default(),
            primary_timeframe: Timeframe::H1,
            higher_timeframe: Timeframe::H4,
            kill_zones: DEFAULT_KILL_ZONES.to_vec(),
        }
    }
}

impl EngineConfigPatch {
    /// Rejects kill zone times that are not on a 24h clock.
    pub fn validate(&self) -> Result<(), DataError> {
        let windows = self.kill_zones.as_deref().unwrap_or_default();
        match windows.iter().find(|x| !x.is_valid()) {
            Some(x) => Err(DataError::InvalidConfig(format!(
                "kill zone {} has time {}:{}-{}:{}",
                x.name.as_str(),
                x.start_hour,
                x.start_minute,
                x.end_hour,
                x.end_minute
            ))),
            None => Ok(()),
        }
    }
}

impl EngineConfig {
    pub fn apply_patch(mut self, patch: EngineConfigPatch) -> Self {
        if let Some(v) = patch.swing_length {
            self.swing_length = v;
        }
        if let Some(v) = patch.sl_buffer_pips {
            self.sl_buffer_pips = v;
        }

        if let Some(v) = patch.ob_min_displacement {
            self.order_block.min_displacement = v;
        }
        if let Some(v) = patch.ob_lookback {
            self.order_block.lookback = v;
        }
        if let Some(v) = patch.ob_max_kept {
            self.order_block.max_kept = v;
        }

        if let Some(v) = patch.sweep_window {
            self.sweep.window = v;
        }
        if let Some(v) = patch.sweep_max_swing_distance {
            self.sweep.max_swing_distance = v;
        }
        if let Some(v) = patch.sweep_shift_search {
            self.sweep.shift_search = v;
        }
        if let Some(v) = patch.sweep_min_body_ratio {
            self.sweep.min_body_ratio = v;
        }
        if let Some(v) = patch.sweep_min_candles {
            self.sweep.min_candles = v;
        }

        if let Some(v) = patch.primary_timeframe {
            self.primary_timeframe = v;
        }
        if let Some(v) = patch.higher_timeframe {
            self.higher_timeframe = v;
        }
        if let Some(v) = patch.kill_zones {
            self.kill_zones = v;
        }
        self
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, DataError> {
        let patch: EngineConfigPatch = serde_yaml::from_str(yaml)?;
        patch.validate()?;
        Ok(Self::default().apply_patch(patch))
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, DataError> {
        let raw = fs::read_to_string(path)?;
        Self::from_yaml_str(&raw)
    }
}

impl EngineProfileConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, DataError> {
        let profile: Self = serde_yaml::from_str(yaml)?;
        profile.default.validate()?;
        for patch in profile.symbol.values() {
            patch.validate()?;
        }
        Ok(profile)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, DataError> {
        let raw = fs::read_to_string(path)?;
        Self::from_yaml_str(&raw)
    }

    pub fn resolve_for(&self, symbol: &str) -> EngineConfig {
        let mut config = EngineConfig::default().apply_patch(self.default.clone());
        if let Some(patch) = find_patch(&self.symbol, symbol) {
            config = config.apply_patch(patch.clone());
        }
        config
    }
}

fn normalize_key(value: &str) -> String {
    value.trim().to_ascii_lowercase()
}

fn find_patch<'a>(map: &'a HashMap<String, EngineConfigPatch>, key: &str) -> Option<&'a EngineConfigPatch> {
    let key_norm = normalize_key(key);
    map.iter()
        .find(|(k, _)| normalize_key(k) == key_norm)
        .map(|(_, v)| v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_keys_match_ignoring_case_and_padding() {
        let mut map = HashMap::new();
        map.insert(" XauUsd ".to_string(), EngineConfigPatch {
            sl_buffer_pips: Some(30.0),
            ..EngineConfigPatch::default()
        });

        let patch = find_patch(&map, "xauusd").expect("patch");
        assert_eq!(patch.sl_buffer_pips, Some(30.0));
        assert!(find_patch(&map, "eurusd").is_none());
    }
}
