use axum::body::Bytes;
use axum::Json;

use crate::error::AppResult;
use crate::services::csv_parser::{
    parse_holdings_csv, parse_snapshot_csv, HoldingsParseResult, SnapshotParseResult,
};

/// Decode a wide snapshot CSV into raw snapshots.
pub async fn snapshots(body: Bytes) -> AppResult<Json<SnapshotParseResult>> {
    tracing::info!(size = body.len(), "Importing snapshot CSV");
    let result = parse_snapshot_csv(&body)?;
    Ok(Json(result))
}

/// Decode a long-form holdings CSV into holding records.
pub async fn holdings(body: Bytes) -> AppResult<Json<HoldingsParseResult>> {
    tracing::info!(size = body.len(), "Importing holdings CSV");
    let result = parse_holdings_csv(&body)?;
    Ok(Json(result))
}
