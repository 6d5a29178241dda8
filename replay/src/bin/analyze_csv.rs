use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use ict::receiver::parse_datetime;
use ict::{
    init_logging, init_logging_with_level, Alert, AlertEngine, AnalysisEngine, DataError,
    DataReceiver, EngineConfig, EngineProfileConfig, IctAnalysis,
};
use serde::Serialize;
use tracing::{info, Level};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReplayPayload {
    symbol: String,
    primary_candles: usize,
    higher_candles: usize,
    last_price: Option<f64>,
    alerts: Vec<Alert>,
    analysis: IctAnalysis,
}

fn optional_arg(args: &[String], index: usize) -> Option<&str> {
    args.get(index).map(String::as_str).filter(|x| !x.is_empty() && *x != "-")
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (flags, args): (Vec<String>, Vec<String>) =
        std::env::args().partition(|x| x.starts_with("--"));
    if flags.iter().any(|x| x == "--verbose") {
        init_logging_with_level(Level::DEBUG);
    } else {
        init_logging();
    }

    if args.len() < 3 {
        eprintln!(
            "usage: cargo run -p replay --bin analyze_csv -- [--verbose] <primary_csv> <symbol> [higher_csv|-] [output_json|-] [config_yaml|-] [parquet_dir|-] [at_datetime]"
        );
        std::process::exit(2);
    }

    let primary_path = PathBuf::from(&args[1]);
    let symbol = args[2].to_uppercase();

    let config = match optional_arg(&args, 5) {
        Some(path) => EngineProfileConfig::from_yaml_file(path)?.resolve_for(&symbol),
        None => EngineConfig::default(),
    };

    let mut receiver = DataReceiver::new(symbol.clone());
    let primary = config.primary_timeframe;
    let primary_candles = receiver.ingest_csv(&primary_path, primary)?;
    if primary_candles == 0 {
        return Err(DataError::MissingTimeframe(primary.as_str().to_string()).into());
    }
    let higher_candles = match optional_arg(&args, 3) {
        Some(path) => receiver.ingest_csv(path, config.higher_timeframe)?,
        None => 0,
    };

    // Pinned to the last primary bar unless a time is given.
    let last = receiver.candles(primary).last().copied();
    let now: DateTime<Utc> = match optional_arg(&args, 7) {
        Some(value) => parse_datetime(value)?,
        None => last
            .and_then(|x| DateTime::from_timestamp(x.time, 0))
            .unwrap_or_else(Utc::now),
    };

    let engine = AnalysisEngine::new(config);
    let analysis = engine.analyze_checked(receiver.series(), &symbol, now)?;
    let last_price = last.map(|x| x.close);

    let mut alert_engine = AlertEngine::default();
    let alerts = match last_price {
        Some(price) => alert_engine.process(&analysis, price),
        None => Vec::new(),
    };

    info!(
        symbol = %symbol,
        primary_candles,
        higher_candles,
        swings = analysis.swing_points.len(),
        order_blocks = analysis.order_blocks.len(),
        fair_value_gaps = analysis.fair_value_gaps.len(),
        confluence_zones = analysis.confluence_zones.len(),
        entry_signals = analysis.entry_signals.len(),
        alerts = alerts.len(),
        "replay analysis finished"
    );

    if let Some(dir) = optional_arg(&args, 6) {
        ict::write_parquet_snapshot(&analysis, dir)?;
        info!(dir, "parquet snapshot written");
    }

    let payload = ReplayPayload {
        symbol,
        primary_candles,
        higher_candles,
        last_price,
        alerts,
        analysis,
    };
    let json = serde_json::to_string_pretty(&payload)?;

    match optional_arg(&args, 4) {
        Some(path) => {
            let output = PathBuf::from(path);
            if let Some(parent) = output.parent().filter(|x| !x.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::write(&output, json)?;
            println!("exported analysis to {}", output.display());
        }
        None => println!("{json}"),
    }

    Ok(())
}
