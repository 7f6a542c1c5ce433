use chrono::NaiveDate;
use chrono_tz::Tz;
use tracing::debug;

use crate::date_utils::{dates_between, format_date, LookbackWindow};
use crate::models::{DailyHoldings, HoldingKey, HoldingRecord, RawSnapshot, SeriesMap};

/// Build one snapshot per calendar date of the lookback window ending at `as_of`.
///
/// Each account becomes a series named "platform - account". Days without a reading
/// carry the previous reading forward; days before an account's first reading in the
/// window are null. Accounts with no reading inside the window are left out.
pub fn build_history(
    records: &[HoldingRecord],
    as_of: NaiveDate,
    window: LookbackWindow,
    tz: Tz,
) -> Vec<RawSnapshot> {
    let start = window.start_date(as_of);
    let daily = DailyHoldings::from_records(records, tz);

    let series: Vec<(&HoldingKey, String)> = daily
        .keys()
        .filter(|key| daily.has_readings_between(key, start, as_of))
        .map(|key| (key, key.series_name()))
        .collect();

    let snapshots: Vec<RawSnapshot> = dates_between(start, as_of)
        .into_iter()
        .map(|date| {
            let values: SeriesMap<Option<f64>> = series
                .iter()
                .map(|(key, name)| (name.as_str(), daily.latest_between(key, start, date)))
                .collect();
            RawSnapshot {
                date: format_date(date),
                values,
            }
        })
        .collect();

    debug!(
        records = records.len(),
        series = series.len(),
        days = snapshots.len(),
        %as_of,
        "Built holdings history"
    );

    snapshots
}

/// Convert amounts into cumulative return factors, series by series.
///
/// A series starts at `1.0` on its first non-null value and is multiplied by each
/// day-over-day ratio after that. When the previous value is null or zero the factor
/// is carried unchanged. Null values stay null. Snapshots are processed in the order given.
pub fn to_return_factors(snapshots: &[RawSnapshot]) -> Vec<RawSnapshot> {
    let mut trackers: Vec<(String, FactorTracker)> = Vec::new();
    for key in snapshots.iter().flat_map(|s| s.values.keys()) {
        if !trackers.iter().any(|(k, _)| k == key) {
            trackers.push((key.to_string(), FactorTracker::default()));
        }
    }

    snapshots
        .iter()
        .map(|snapshot| {
            let mut values = SeriesMap::new();
            for (key, tracker) in trackers.iter_mut() {
                match snapshot.values.get(key) {
                    Some(value) => values.insert(key.as_str(), tracker.advance(*value)),
                    None => {
                        tracker.advance(None);
                    }
                }
            }
            RawSnapshot {
                date: snapshot.date.clone(),
                values,
            }
        })
        .collect()
}

#[derive(Debug, Default)]
struct FactorTracker {
    factor: Option<f64>,
    previous: Option<f64>,
}

impl FactorTracker {
    fn advance(&mut self, value: Option<f64>) -> Option<f64> {
        let previous = std::mem::replace(&mut self.previous, value);
        let value = value?;

        let factor = match (self.factor, previous) {
            (Some(factor), Some(prev)) if prev != 0.0 => factor * (value / prev),
            (Some(factor), _) => factor,
            (None, _) => 1.0,
        };
        let factor = if factor.is_finite() { factor } else { 1.0 };

        self.factor = Some(factor);
        Some(factor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date_utils::parse_instant;

    fn record(time: &str, platform: &str, account: &str, amount: f64) -> HoldingRecord {
        HoldingRecord {
            time: parse_instant(time).unwrap(),
            platform: platform.into(),
            account: account.into(),
            amount,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn values(snapshot: &RawSnapshot) -> Vec<(&str, Option<f64>)> {
        snapshot.values.iter().map(|(k, v)| (k, *v)).collect()
    }

    #[test]
    fn test_one_snapshot_per_day_with_forward_fill() {
        let records = vec![
            record("2024-06-02T00:00:00Z", "ASB", "Savings", 100.0),
            record("2024-06-04T00:00:00Z", "ASB", "Savings", 120.0),
        ];

        let history = build_history(
            &records,
            date(2024, 6, 5),
            LookbackWindow::new(0, 0, 4),
            chrono_tz::UTC,
        );

        let dates: Vec<&str> = history.iter().map(|s| s.date.as_str()).collect();
        assert_eq!(
            dates,
            vec!["2024-06-01", "2024-06-02", "2024-06-03", "2024-06-04", "2024-06-05"]
        );
        let amounts: Vec<Option<f64>> = history
            .iter()
            .map(|s| *s.values.get("ASB - Savings").unwrap())
            .collect();
        assert_eq!(
            amounts,
            vec![None, Some(100.0), Some(100.0), Some(120.0), Some(120.0)]
        );
    }

    #[test]
    fn test_readings_before_window_do_not_fill() {
        let records = vec![
            record("2024-01-01T00:00:00Z", "BNZ", "Cheque", 999.0),
            record("2024-06-03T00:00:00Z", "BNZ", "Cheque", 50.0),
        ];

        let history = build_history(
            &records,
            date(2024, 6, 3),
            LookbackWindow::new(0, 0, 2),
            chrono_tz::UTC,
        );

        assert_eq!(values(&history[0]), vec![("BNZ - Cheque", None)]);
        assert_eq!(values(&history[2]), vec![("BNZ - Cheque", Some(50.0))]);
    }

    #[test]
    fn test_accounts_outside_window_are_dropped() {
        let records = vec![
            record("2023-01-01T00:00:00Z", "Old", "Closed", 10.0),
            record("2024-06-03T00:00:00Z", "ASB", "Savings", 50.0),
            record("2024-06-10T00:00:00Z", "Future", "Account", 50.0),
        ];

        let history = build_history(
            &records,
            date(2024, 6, 3),
            LookbackWindow::new(0, 0, 1),
            chrono_tz::UTC,
        );

        let keys: Vec<&str> = history[1].values.keys().collect();
        assert_eq!(keys, vec!["ASB - Savings"]);
    }

    #[test]
    fn test_series_ordered_by_platform_then_account() {
        let records = vec![
            record("2024-06-01T00:00:00Z", "Sharesies", "Main", 1.0),
            record("2024-06-01T00:00:00Z", "ASB", "Savings", 1.0),
            record("2024-06-01T00:00:00Z", "ASB", "Everyday", 1.0),
        ];

        let history = build_history(
            &records,
            date(2024, 6, 1),
            LookbackWindow::default(),
            chrono_tz::UTC,
        );

        assert_eq!(history.len(), 1);
        let keys: Vec<&str> = history[0].values.keys().collect();
        assert_eq!(keys, vec!["ASB - Everyday", "ASB - Savings", "Sharesies - Main"]);
    }

    #[test]
    fn test_no_records_gives_empty_days() {
        let history = build_history(
            &[],
            date(2024, 6, 3),
            LookbackWindow::new(0, 0, 2),
            chrono_tz::UTC,
        );
        assert_eq!(history.len(), 3);
        assert!(history.iter().all(|s| s.values.is_empty()));
    }

    #[test]
    fn test_return_factors_compound_daily_ratios() {
        let snapshots = vec![
            RawSnapshot::new("2024-06-01", [("A", None)]),
            RawSnapshot::new("2024-06-02", [("A", Some(100.0))]),
            RawSnapshot::new("2024-06-03", [("A", Some(110.0))]),
            RawSnapshot::new("2024-06-04", [("A", Some(121.0))]),
        ];

        let factors = to_return_factors(&snapshots);
        assert_eq!(values(&factors[0]), vec![("A", None)]);
        assert_eq!(values(&factors[1]), vec![("A", Some(1.0))]);
        let day3 = factors[2].values.get("A").unwrap().unwrap();
        let day4 = factors[3].values.get("A").unwrap().unwrap();
        assert!((day3 - 1.1).abs() < 1e-12);
        assert!((day4 - 1.21).abs() < 1e-12);
    }

    #[test]
    fn test_return_factors_carry_over_zero_previous() {
        let snapshots = vec![
            RawSnapshot::new("2024-06-01", [("A", Some(100.0))]),
            RawSnapshot::new("2024-06-02", [("A", Some(0.0))]),
            RawSnapshot::new("2024-06-03", [("A", Some(50.0))]),
        ];

        let factors = to_return_factors(&snapshots);
        assert_eq!(values(&factors[1]), vec![("A", Some(0.0))]);
        // Ratio against a zero day is undefined, so the factor stays put
        assert_eq!(values(&factors[2]), vec![("A", Some(0.0))]);
    }

    #[test]
    fn test_return_factors_null_gap_carries_factor() {
        let snapshots = vec![
            RawSnapshot::new("2024-06-01", [("A", Some(100.0))]),
            RawSnapshot::new("2024-06-02", [("A", Some(200.0))]),
            RawSnapshot::new("2024-06-03", [("A", None)]),
            RawSnapshot::new("2024-06-04", [("A", Some(400.0))]),
            RawSnapshot::new("2024-06-05", [("A", Some(200.0))]),
        ];

        let factors = to_return_factors(&snapshots);
        assert_eq!(values(&factors[2]), vec![("A", None)]);
        assert_eq!(values(&factors[3]), vec![("A", Some(2.0))]);
        assert_eq!(values(&factors[4]), vec![("A", Some(1.0))]);
    }

    #[test]
    fn test_return_factors_per_series() {
        let snapshots = vec![
            RawSnapshot::with_amounts("2024-06-01", [("A", 100.0), ("B", 10.0)]),
            RawSnapshot::with_amounts("2024-06-02", [("A", 150.0), ("B", 5.0)]),
        ];

        let factors = to_return_factors(&snapshots);
        assert_eq!(values(&factors[1]), vec![("A", Some(1.5)), ("B", Some(0.5))]);
    }
}
