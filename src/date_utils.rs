use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;
use serde::Deserialize;

use crate::error::{AppError, AppResult};

/// Default time zone used to turn holding timestamps into calendar dates.
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::Pacific::Auckland;

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse a snapshot date identifier into a point in time.
///
/// Accepts plain `YYYY-MM-DD` dates (midnight), RFC 3339 timestamps (converted to UTC)
/// and naive `YYYY-MM-DDTHH:MM:SS` timestamps.
pub fn parse_calendar_date(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(value, DATE_FORMAT) {
        return date.and_hms_opt(0, 0, 0);
    }
    if let Ok(instant) = DateTime::parse_from_rfc3339(value) {
        return Some(instant.naive_utc());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
}

/// Parse a holding timestamp. Bare dates are taken as midnight UTC.
pub fn parse_instant(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(value) {
        return Some(instant.with_timezone(&Utc));
    }
    parse_calendar_date(value).map(|naive| naive.and_utc())
}

/// Ordering key for snapshot dates.
///
/// Unparsable dates sort after every valid date and compare equal to each other,
/// so a stable sort keeps them in input order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DateSortKey {
    Valid(NaiveDateTime),
    Invalid,
}

impl DateSortKey {
    pub fn parse(value: &str) -> Self {
        parse_calendar_date(value).map_or(Self::Invalid, Self::Valid)
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }
}

/// Calendar date of `instant` in the given time zone.
pub fn local_date(instant: DateTime<Utc>, tz: Tz) -> NaiveDate {
    instant.with_timezone(&tz).date_naive()
}

/// Today's calendar date in the given time zone.
pub fn today_in(tz: Tz) -> NaiveDate {
    local_date(Utc::now(), tz)
}

/// Every calendar date from `start` to `end`, inclusive. Empty when `start > end`.
pub fn dates_between(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let mut dates = Vec::new();
    let mut current = start;
    while current <= end {
        dates.push(current);
        match current.succ_opt() {
            Some(next) => current = next,
            None => break,
        }
    }
    dates
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Longest history window a request may ask for, roughly 100 years.
pub const MAX_HISTORY_DAYS: u32 = 36_500;

/// Requested lookback for history queries, e.g. `?years=1&months=6`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct LookbackWindow {
    #[serde(default)]
    pub years: u32,
    #[serde(default)]
    pub months: u32,
    #[serde(default)]
    pub days: u32,
}

impl LookbackWindow {
    pub fn new(years: u32, months: u32, days: u32) -> Self {
        Self {
            years,
            months,
            days,
        }
    }

    /// Window length in days. Months count as 30 days and years as 365.
    pub fn history_days(&self) -> u32 {
        self.days
            .saturating_add(self.months.saturating_mul(30))
            .saturating_add(self.years.saturating_mul(365))
    }

    /// Reject windows longer than [`MAX_HISTORY_DAYS`].
    pub fn validate(self) -> AppResult<Self> {
        let days = self.history_days();
        if days > MAX_HISTORY_DAYS {
            return Err(AppError::Validation(format!(
                "History window of {} days exceeds the maximum of {} days",
                days, MAX_HISTORY_DAYS
            )));
        }
        Ok(self)
    }

    /// First calendar date covered by the window ending at `as_of`.
    pub fn start_date(&self, as_of: NaiveDate) -> NaiveDate {
        as_of
            .checked_sub_signed(Duration::days(i64::from(self.history_days())))
            .unwrap_or(NaiveDate::MIN)
    }

    pub fn period_label(&self) -> String {
        period_label(self.years, self.months)
    }
}

/// Human-readable lookback label such as "2 years and 1 month".
///
/// Built from the requested parameters only; falls back to "period" when both are zero.
pub fn period_label(years: u32, months: u32) -> String {
    let mut parts = Vec::with_capacity(2);
    if years > 0 {
        parts.push(pluralize(years, "year"));
    }
    if months > 0 {
        parts.push(pluralize(months, "month"));
    }

    if parts.is_empty() {
        "period".to_string()
    } else {
        parts.join(" and ")
    }
}

fn pluralize(count: u32, unit: &str) -> String {
    if count == 1 {
        format!("{} {}", count, unit)
    } else {
        format!("{} {}s", count, unit)
    }
}
