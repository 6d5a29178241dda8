//! Columnar views of an analysis pass, one table per zone type.

use std::fs::{create_dir_all, File};
use std::path::Path;

use polars::df;
use polars::prelude::{DataFrame, ParquetWriter};
use tracing::debug;

use crate::confluence::ConfluenceZone;
use crate::constant::DataError;
use crate::engine::IctAnalysis;
use crate::fvg::FairValueGap;
use crate::order_block::OrderBlock;
use crate::swing::SwingPoint;
use crate::trend::StructureBreak;

pub fn swing_points_dataframe(rows: &[SwingPoint]) -> Result<DataFrame, DataError> {
    let df = df!(
        "index" => rows.iter().map(|x| x.index as i64).collect::<Vec<_>>(),
        "time" => rows.iter().map(|x| x.time).collect::<Vec<_>>(),
        "price" => rows.iter().map(|x| x.price).collect::<Vec<_>>(),
        "type" => rows.iter().map(|x| x.kind.as_str()).collect::<Vec<_>>(),
        "strength" => rows.iter().map(|x| x.strength).collect::<Vec<_>>()
    )?;
    Ok(df)
}

pub fn order_blocks_dataframe(rows: &[OrderBlock]) -> Result<DataFrame, DataError> {
    let df = df!(
        "id" => rows.iter().map(|x| x.id.clone()).collect::<Vec<_>>(),
        "type" => rows.iter().map(|x| x.kind.as_str()).collect::<Vec<_>>(),
        "top" => rows.iter().map(|x| x.top).collect::<Vec<_>>(),
        "bottom" => rows.iter().map(|x| x.bottom).collect::<Vec<_>>(),
        "start_time" => rows.iter().map(|x| x.start_time).collect::<Vec<_>>(),
        "status" => rows.iter().map(|x| x.status.as_str()).collect::<Vec<_>>(),
        "strength" => rows.iter().map(|x| x.strength).collect::<Vec<_>>(),
        "retest_count" => rows.iter().map(|x| x.retest_count).collect::<Vec<_>>()
    )?;
    Ok(df)
}

pub fn fair_value_gaps_dataframe(rows: &[FairValueGap]) -> Result<DataFrame, DataError> {
    let df = df!(
        "id" => rows.iter().map(|x| x.id.clone()).collect::<Vec<_>>(),
        "type" => rows.iter().map(|x| x.kind.as_str()).collect::<Vec<_>>(),
        "top" => rows.iter().map(|x| x.top).collect::<Vec<_>>(),
        "bottom" => rows.iter().map(|x| x.bottom).collect::<Vec<_>>(),
        "start_time" => rows.iter().map(|x| x.start_time).collect::<Vec<_>>(),
        "status" => rows.iter().map(|x| x.status.as_str()).collect::<Vec<_>>(),
        "fill_percentage" => rows.iter().map(|x| x.fill_percentage).collect::<Vec<_>>(),
        "in_premium" => rows.iter().map(|x| x.in_premium).collect::<Vec<_>>(),
        "in_discount" => rows.iter().map(|x| x.in_discount).collect::<Vec<_>>()
    )?;
    Ok(df)
}

pub fn confluence_zones_dataframe(rows: &[ConfluenceZone]) -> Result<DataFrame, DataError> {
    let df = df!(
        "id" => rows.iter().map(|x| x.id.clone()).collect::<Vec<_>>(),
        "type" => rows.iter().map(|x| x.kind.as_str()).collect::<Vec<_>>(),
        "order_block_id" => rows.iter().map(|x| x.order_block.id.clone()).collect::<Vec<_>>(),
        "fvg_id" => rows.iter().map(|x| x.fair_value_gap.id.clone()).collect::<Vec<_>>(),
        "overlap_top" => rows.iter().map(|x| x.overlap_top).collect::<Vec<_>>(),
        "overlap_bottom" => rows.iter().map(|x| x.overlap_bottom).collect::<Vec<_>>(),
        "in_optimal_zone" => rows.iter().map(|x| x.in_optimal_zone).collect::<Vec<_>>(),
        "strength" => rows.iter().map(|x| x.strength).collect::<Vec<_>>()
    )?;
    Ok(df)
}

pub fn structure_breaks_dataframe(rows: &[StructureBreak]) -> Result<DataFrame, DataError> {
    let df = df!(
        "type" => rows.iter().map(|x| x.kind.as_str()).collect::<Vec<_>>(),
        "direction" => rows.iter().map(|x| x.direction.as_str()).collect::<Vec<_>>(),
        "price" => rows.iter().map(|x| x.price).collect::<Vec<_>>(),
        "time" => rows.iter().map(|x| x.time).collect::<Vec<_>>()
    )?;
    Ok(df)
}

/// Writes one parquet file per table into `output_dir`, prefixed with the
/// lowercased symbol.
pub fn write_parquet_snapshot(analysis: &IctAnalysis, output_dir: impl AsRef<Path>) -> Result<(), DataError> {
    let output_dir = output_dir.as_ref();
    create_dir_all(output_dir)?;

    let prefix = analysis.symbol.to_lowercase();
    let tables = [
        ("swing_points", swing_points_dataframe(&analysis.swing_points)?),
        ("order_blocks", order_blocks_dataframe(&analysis.order_blocks)?),
        ("fair_value_gaps", fair_value_gaps_dataframe(&analysis.fair_value_gaps)?),
        ("confluence_zones", confluence_zones_dataframe(&analysis.confluence_zones)?),
        ("structure_breaks", structure_breaks_dataframe(&analysis.trend.structure_breaks)?),
    ];

    for (name, mut df) in tables {
        let path = output_dir.join(format!("{prefix}_{name}.parquet"));
        let mut file = File::create(&path)?;
        ParquetWriter::new(&mut file).finish(&mut df)?;
        debug!(path = %path.display(), rows = df.height(), "parquet written");
    }

    Ok(())
}
