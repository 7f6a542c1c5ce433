use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize};

use crate::date_utils::{local_date, parse_instant};

/// A single balance reading for one account on one platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldingRecord {
    #[serde(deserialize_with = "deserialize_instant")]
    pub time: DateTime<Utc>,
    pub platform: String,
    pub account: String,
    pub amount: f64,
}

impl HoldingRecord {
    pub fn key(&self) -> HoldingKey {
        HoldingKey {
            platform: self.platform.clone(),
            account: self.account.clone(),
        }
    }
}

fn deserialize_instant<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse_instant(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp '{}'", raw)))
}

/// Identifies one tracked series: an account held on a platform.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HoldingKey {
    pub platform: String,
    pub account: String,
}

impl HoldingKey {
    /// Chart series name, e.g. "ASB - Savings".
    pub fn series_name(&self) -> String {
        format!("{} - {}", self.platform, self.account)
    }
}

/// Closing amount per account per local calendar date.
///
/// When an account reports several times on the same date, the reading with the
/// latest timestamp wins.
#[derive(Debug, Clone, Default)]
pub struct DailyHoldings {
    series: BTreeMap<HoldingKey, BTreeMap<NaiveDate, (DateTime<Utc>, f64)>>,
}

impl DailyHoldings {
    pub fn from_records(records: &[HoldingRecord], tz: Tz) -> Self {
        let mut series: BTreeMap<HoldingKey, BTreeMap<NaiveDate, (DateTime<Utc>, f64)>> =
            BTreeMap::new();

        for record in records {
            if !record.amount.is_finite() {
                tracing::warn!(
                    platform = %record.platform,
                    account = %record.account,
                    "Skipping non-finite holding amount"
                );
                continue;
            }

            let date = local_date(record.time, tz);
            let days = series.entry(record.key()).or_default();
            match days.get(&date) {
                Some((existing, _)) if *existing > record.time => {}
                _ => {
                    days.insert(date, (record.time, record.amount));
                }
            }
        }

        Self { series }
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Series in (platform, account) order.
    pub fn keys(&self) -> impl Iterator<Item = &HoldingKey> {
        self.series.keys()
    }

    /// Amount recorded for `key` exactly on `date`.
    pub fn amount_on(&self, key: &HoldingKey, date: NaiveDate) -> Option<f64> {
        self.series
            .get(key)
            .and_then(|days| days.get(&date))
            .map(|(_, amount)| *amount)
    }

    /// Most recent amount for `key` dated within `from..=to`.
    pub fn latest_between(&self, key: &HoldingKey, from: NaiveDate, to: NaiveDate) -> Option<f64> {
        if from > to {
            return None;
        }
        self.series
            .get(key)
            .and_then(|days| days.range(from..=to).next_back())
            .map(|(_, (_, amount))| *amount)
    }

    /// Most recent amount for `key` dated on or before `date`.
    pub fn latest_on_or_before(&self, key: &HoldingKey, date: NaiveDate) -> Option<f64> {
        self.latest_between(key, NaiveDate::MIN, date)
    }

    /// Whether `key` has any reading within `from..=to`.
    pub fn has_readings_between(&self, key: &HoldingKey, from: NaiveDate, to: NaiveDate) -> bool {
        self.latest_between(key, from, to).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date_utils::DEFAULT_TIMEZONE;

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

    #[test]
    fn test_latest_reading_per_day_wins() {
        let records = vec![
            record("2024-06-01T02:00:00Z", "ASB", "Savings", 200.0),
            record("2024-06-01T01:00:00Z", "ASB", "Savings", 100.0),
        ];
        let daily = DailyHoldings::from_records(&records, DEFAULT_TIMEZONE);
        let key = records[0].key();

        assert_eq!(daily.amount_on(&key, date(2024, 6, 1)), Some(200.0));
    }

    #[test]
    fn test_dates_are_local() {
        // 13:00 UTC on May 31 is June 1 in Auckland (UTC+12 in winter)
        let records = vec![record("2024-05-31T13:00:00Z", "BNZ", "Cheque", 50.0)];
        let daily = DailyHoldings::from_records(&records, DEFAULT_TIMEZONE);
        let key = records[0].key();

        assert_eq!(daily.amount_on(&key, date(2024, 6, 1)), Some(50.0));
        assert_eq!(daily.amount_on(&key, date(2024, 5, 31)), None);
    }

    #[test]
    fn test_latest_between() {
        let records = vec![
            record("2024-06-01T00:00:00Z", "Kernel", "KiwiSaver", 10.0),
            record("2024-06-05T00:00:00Z", "Kernel", "KiwiSaver", 20.0),
        ];
        let daily = DailyHoldings::from_records(&records, chrono_tz::UTC);
        let key = records[0].key();

        assert_eq!(daily.latest_between(&key, date(2024, 6, 1), date(2024, 6, 4)), Some(10.0));
        assert_eq!(daily.latest_between(&key, date(2024, 6, 2), date(2024, 6, 4)), None);
        assert_eq!(daily.latest_on_or_before(&key, date(2024, 6, 30)), Some(20.0));
    }

    #[test]
    fn test_deserialize_record_with_bare_date() {
        let json = r#"{"time": "2024-06-01", "platform": "ASB", "account": "Savings", "amount": 12.5}"#;
        let parsed: HoldingRecord = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.time, parse_instant("2024-06-01T00:00:00Z").unwrap());
        assert_eq!(parsed.key().series_name(), "ASB - Savings");
    }

    #[test]
    fn test_deserialize_rejects_bad_time() {
        let json = r#"{"time": "yesterday", "platform": "ASB", "account": "Savings", "amount": 1}"#;
        assert!(serde_json::from_str::<HoldingRecord>(json).is_err());
    }
}
