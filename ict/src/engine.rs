use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::bar::{validate_candles, Candle};
use crate::confluence::{best_zone_for, find_confluence_zones, ConfluenceZone};
use crate::config::EngineConfig;
use crate::constant::{DataError, OrderBlockStatus, Timeframe};
use crate::fibonacci::{calculate_fibonacci, FibonacciZone};
use crate::fvg::{detect_fair_value_gaps, update_fvg_status, FairValueGap};
use crate::killzone::{kill_zone_status_with, KillZone};
use crate::order_block::{detect_order_blocks, update_order_block_status, OrderBlock};
use crate::signal::{detect_sweep_and_shift, generate_entry_signal, EntrySignal};
use crate::swing::{detect_swing_points, SwingPoint};
use crate::trend::{analyze_trend, TrendAnalysis};

pub type CandleSeries = HashMap<Timeframe, Vec<Candle>>;

/// One analysis pass over a symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IctAnalysis {
    pub symbol: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    pub trend: TrendAnalysis,
    pub swing_points: Vec<SwingPoint>,
    pub fibonacci: Option<FibonacciZone>,
    pub order_blocks: Vec<OrderBlock>,
    pub fair_value_gaps: Vec<FairValueGap>,
    pub confluence_zones: Vec<ConfluenceZone>,
    pub kill_zones: Vec<KillZone>,
    pub entry_signals: Vec<EntrySignal>,
}

impl IctAnalysis {
    pub fn empty(symbol: impl Into<String>, kill_zones: Vec<KillZone>, now: DateTime<Utc>) -> Self {
        Self {
            symbol: symbol.into(),
            timestamp: now.timestamp_millis(),
            trend: TrendAnalysis::ranging(),
            swing_points: Vec::new(),
            fibonacci: None,
            order_blocks: Vec::new(),
            fair_value_gaps: Vec::new(),
            confluence_zones: Vec::new(),
            kill_zones,
            entry_signals: Vec::new(),
        }
    }

    pub fn active_signal(&self) -> Option<&EntrySignal> {
        self.entry_signals.first()
    }
}

#[derive(Debug, Clone, Default)]
pub struct AnalysisEngine {
    config: EngineConfig,
}

impl AnalysisEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Runs the full pipeline. Missing or empty timeframes are treated as
    /// no data; only an empty primary series short-circuits.
    pub fn analyze(&self, candles: &CandleSeries, symbol: &str, now: DateTime<Utc>) -> IctAnalysis {
        let config = &self.config;
        let kill_zones = kill_zone_status_with(&config.kill_zones, now);

        let primary = candles
            .get(&config.primary_timeframe)
            .map(Vec::as_slice)
            .unwrap_or_default();
        let higher = candles
            .get(&config.higher_timeframe)
            .map(Vec::as_slice)
            .unwrap_or_default();

        let Some(current) = primary.last() else {
            debug!(symbol, timeframe = config.primary_timeframe.as_str(), "no primary candles");
            return IctAnalysis::empty(symbol, kill_zones, now);
        };

        let higher_swings = detect_swing_points(higher, config.swing_length);
        let higher_trend = analyze_trend(higher, &higher_swings);

        let swing_points = detect_swing_points(primary, config.swing_length);
        let primary_trend = analyze_trend(primary, &swing_points);
        let trend = TrendAnalysis::combine(&higher_trend, primary_trend);
        let bias = trend.direction.effective_bias();
        debug!(
            symbol,
            swings = swing_points.len(),
            direction = ?trend.direction,
            higher = ?trend.higher_timeframe,
            strength = trend.strength,
            "trend"
        );

        let fibonacci = calculate_fibonacci(&swing_points);

        let order_blocks: Vec<OrderBlock> = detect_order_blocks(primary, bias, &config.order_block)
            .iter()
            .map(|x| update_order_block_status(x, current))
            .filter(|x| x.status == OrderBlockStatus::Valid)
            .collect();

        let fair_value_gaps: Vec<FairValueGap> = detect_fair_value_gaps(primary, fibonacci.as_ref())
            .iter()
            .map(|x| update_fvg_status(x, current))
            .filter(|x| x.status.is_open())
            .collect();

        let confluence_zones = find_confluence_zones(&order_blocks, &fair_value_gaps, fibonacci.as_ref());
        debug!(
            symbol,
            order_blocks = order_blocks.len(),
            fvgs = fair_value_gaps.len(),
            confluence = confluence_zones.len(),
            "zones"
        );

        let entry_signals: Vec<EntrySignal> = detect_sweep_and_shift(primary, &swing_points, bias, &config.sweep)
            .map(|pattern| {
                let zone = best_zone_for(&confluence_zones, pattern.direction);
                generate_entry_signal(
                    &pattern,
                    zone,
                    current.close,
                    &swing_points,
                    &order_blocks,
                    symbol,
                    config.sl_buffer_pips,
                )
            })
            .into_iter()
            .collect();

        IctAnalysis {
            symbol: symbol.to_string(),
            timestamp: now.timestamp_millis(),
            trend,
            swing_points,
            fibonacci,
            order_blocks,
            fair_value_gaps,
            confluence_zones,
            kill_zones,
            entry_signals,
        }
    }

    /// Validates every supplied series before running [`Self::analyze`].
    pub fn analyze_checked(
        &self,
        candles: &CandleSeries,
        symbol: &str,
        now: DateTime<Utc>,
    ) -> Result<IctAnalysis, DataError> {
        let mut timeframes: Vec<&Timeframe> = candles.keys().collect();
        timeframes.sort();
        for timeframe in timeframes {
            if let Err(err) = validate_candles(&candles[timeframe]) {
                warn!(symbol, timeframe = timeframe.as_str(), %err, "rejected candles");
                return Err(err);
            }
        }
        Ok(self.analyze(candles, symbol, now))
    }
}

/// Analysis with the default configuration.
pub fn run_ict_analysis(candles: &CandleSeries, symbol: &str, now: DateTime<Utc>) -> IctAnalysis {
    AnalysisEngine::default().analyze(candles, symbol, now)
}
