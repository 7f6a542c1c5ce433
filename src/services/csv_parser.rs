use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::date_utils::parse_instant;
use crate::error::AppError;
use crate::models::snapshot::is_date_field;
use crate::models::{HoldingRecord, RawSnapshot, SeriesMap};
use crate::number_utils::parse_amount;

#[derive(Debug, Serialize)]
pub struct SnapshotParseResult {
    pub snapshots: Vec<RawSnapshot>,
    pub errors: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct HoldingsParseResult {
    pub records: Vec<HoldingRecord>,
    pub errors: Vec<String>,
}

/// Parse a wide snapshot CSV: a date column followed by one column per series.
///
/// Empty or non-numeric cells become null values.
pub fn parse_snapshot_csv(content: &[u8]) -> Result<SnapshotParseResult, AppError> {
    trace!(content_size = content.len(), "Starting snapshot CSV parsing");

    let mut reader = reader_for(content)?;
    let headers = read_headers(&mut reader)?;

    let date_col = headers
        .iter()
        .position(|h| is_date_field(&h.trim().to_ascii_lowercase()))
        .ok_or_else(|| AppError::CsvParse("No date column found in CSV".into()))?;

    let series_cols: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .filter(|(idx, name)| *idx != date_col && !name.trim().is_empty())
        .map(|(idx, name)| (idx, name.trim().to_string()))
        .collect();

    debug!(series_count = series_cols.len(), "Snapshot CSV headers parsed");

    let mut snapshots = Vec::new();
    let mut errors = Vec::new();

    for (row_idx, result) in reader.records().enumerate() {
        let row_number = row_idx + 2;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                errors.push(format!("Row {}: {}", row_number, e));
                continue;
            }
        };

        let date = record.get(date_col).unwrap_or("").trim().to_string();
        if date.is_empty() {
            errors.push(format!("Row {}: Missing date", row_number));
            continue;
        }

        let values: SeriesMap<Option<f64>> = series_cols
            .iter()
            .map(|(col, name)| (name.as_str(), record.get(*col).and_then(parse_amount)))
            .collect();

        snapshots.push(RawSnapshot { date, values });
    }

    log_completion(snapshots.len(), &errors);

    Ok(SnapshotParseResult { snapshots, errors })
}

/// Parse a long-form holdings CSV with `time`, `platform`, `account` and `amount` columns.
pub fn parse_holdings_csv(content: &[u8]) -> Result<HoldingsParseResult, AppError> {
    trace!(content_size = content.len(), "Starting holdings CSV parsing");

    let mut reader = reader_for(content)?;
    let headers = read_headers(&mut reader)?;

    let time_col = require_column(&headers, "time")?;
    let platform_col = require_column(&headers, "platform")?;
    let account_col = require_column(&headers, "account")?;
    let amount_col = require_column(&headers, "amount")?;

    let mut records = Vec::new();
    let mut errors = Vec::new();

    for (row_idx, result) in reader.records().enumerate() {
        let row_number = row_idx + 2;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                errors.push(format!("Row {}: {}", row_number, e));
                continue;
            }
        };

        let time_raw = record.get(time_col).unwrap_or("").trim();
        let platform = record.get(platform_col).unwrap_or("").trim().to_string();
        let account = record.get(account_col).unwrap_or("").trim().to_string();
        let amount_raw = record.get(amount_col).unwrap_or("").trim();

        if platform.is_empty() || account.is_empty() {
            errors.push(format!("Row {}: Missing platform or account", row_number));
            continue;
        }

        let Some(time) = parse_instant(time_raw) else {
            errors.push(format!("Row {}: Invalid time '{}'", row_number, time_raw));
            continue;
        };

        let Some(amount) = parse_amount(amount_raw) else {
            errors.push(format!("Row {}: Invalid amount '{}'", row_number, amount_raw));
            continue;
        };

        records.push(HoldingRecord {
            time,
            platform,
            account,
            amount,
        });
    }

    log_completion(records.len(), &errors);

    Ok(HoldingsParseResult { records, errors })
}

fn reader_for(content: &[u8]) -> Result<csv::Reader<&[u8]>, AppError> {
    std::str::from_utf8(content).map_err(|e| AppError::CsvParse(e.to_string()))?;

    Ok(csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content))
}

fn read_headers(reader: &mut csv::Reader<&[u8]>) -> Result<csv::StringRecord, AppError> {
    let headers = reader
        .headers()
        .map_err(|e| AppError::CsvParse(e.to_string()))?
        .clone();

    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(AppError::CsvParse("CSV has no header row".into()));
    }
    Ok(headers)
}

fn require_column(headers: &csv::StringRecord, name: &str) -> Result<usize, AppError> {
    find_column(headers, name)
        .ok_or_else(|| AppError::CsvParse(format!("No {} column found in CSV", name)))
}

fn find_column(headers: &csv::StringRecord, name: &str) -> Option<usize> {
    headers
        .iter()
        .position(|header| header.trim().eq_ignore_ascii_case(name))
}

fn log_completion(row_count: usize, errors: &[String]) {
    if !errors.is_empty() {
        warn!(error_count = errors.len(), "CSV parsing completed with errors");
    }
    debug!(row_count, error_count = errors.len(), "CSV parsing completed");
}
