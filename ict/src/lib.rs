pub mod alerts;
pub mod bar;
pub mod cache;
pub mod config;
pub mod confluence;
pub mod constant;
pub mod engine;
pub mod export;
pub mod fibonacci;
pub mod fvg;
pub mod killzone;
pub mod logging;
pub mod order_block;
pub mod pips;
pub mod receiver;
pub mod signal;
pub mod swing;
pub mod trend;

pub use alerts::{Alert, AlertConfig, AlertEngine, AlertKind, AlertPriority};
pub use bar::{validate_candles, Candle};
pub use cache::{AnalysisCache, CandleCache, TtlCache};
pub use config::{EngineConfig, EngineConfigPatch, EngineProfileConfig};
pub use confluence::{calculate_overlap, find_confluence_zones, ConfluenceZone, Overlap};
pub use constant::{
	Bias, DataError, EntryDirection, EntrySignalKind, FvgStatus, KillZoneName,
	OrderBlockStatus, PriceZone, SlSource, StructureBreakKind, SwingKind, Timeframe,
	TpSource, TrendDirection, Volatility,
};
pub use engine::{run_ict_analysis, AnalysisEngine, CandleSeries, IctAnalysis};
pub use export::write_parquet_snapshot;
pub use fibonacci::{
	calculate_fibonacci, is_price_in_optimal_zone, price_zone, FibonacciLevel,
	FibonacciZone, PriceRange,
};
pub use fvg::{detect_fair_value_gaps, update_fvg_status, FairValueGap};
pub use killzone::{
	kill_zone_status, kill_zone_status_with, should_trade_now, time_until_next_kill_zone,
	KillZone, KillZoneWindow, NextKillZone, DEFAULT_KILL_ZONES,
};
pub use logging::{init_logging, init_logging_with_level};
pub use order_block::{
	detect_order_blocks, filter_order_blocks, update_order_block_status, OrderBlock,
	OrderBlockConfig,
};
pub use pips::{calculate_lot_size, calculate_pips, pips_to_price, LotSizeParams, LotSizeResult};
pub use receiver::{load_candles_csv, DataReceiver};
pub use signal::{
	detect_sweep_and_shift, generate_entry_signal, EntrySignal, SweepConfig, SweepShiftPattern,
};
pub use swing::{detect_swing_points, SwingPoint};
pub use trend::{analyze_trend, StructureBreak, TrendAnalysis, TrendSummary};
