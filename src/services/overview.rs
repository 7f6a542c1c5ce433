use chrono::{Duration, NaiveDate};
use chrono_tz::Tz;

use crate::models::{DailyHoldings, DayPair, HoldingRecord, PlatformAmounts, PortfolioOverview};
use crate::number_utils::round_dp;

const WEEK_DAYS: i64 = 7;
const MONTH_DAYS: i64 = 30;
const YEAR_DAYS: i64 = 365;

/// Summarize the portfolio as of `as_of`, comparing against earlier days.
///
/// Each account contributes its most recent reading at least `n` days before `as_of`
/// to the "n days ago" view, so accounts that stopped reporting still count.
pub fn portfolio_overview(records: &[HoldingRecord], as_of: NaiveDate, tz: Tz) -> PortfolioOverview {
    let daily = DailyHoldings::from_records(records, tz);
    if daily.is_empty() {
        return PortfolioOverview::empty(as_of);
    }

    let today = holdings_days_ago(&daily, as_of, 0);
    let yesterday = holdings_days_ago(&daily, as_of, 1);

    let total = round_dp(today.values().sum(), 0);
    let yesterday_total = round_dp(yesterday.values().sum(), 0);

    let pct_change = percent_change(total, &yesterday);
    let week_over_week = percent_change(total, &holdings_days_ago(&daily, as_of, WEEK_DAYS));
    let month_over_month = percent_change(total, &holdings_days_ago(&daily, as_of, MONTH_DAYS));
    let year_over_year = percent_change(total, &holdings_days_ago(&daily, as_of, YEAR_DAYS));

    let weightings = DayPair {
        today: weights(&today, total),
        yesterday: weights(&yesterday, yesterday_total),
    };

    tracing::debug!(%as_of, total, platforms = today.len(), "Computed portfolio overview");

    PortfolioOverview {
        as_of,
        holdings: DayPair { today, yesterday },
        weightings,
        total,
        yesterday_total,
        pct_change,
        week_over_week,
        month_over_month,
        year_over_year,
    }
}

/// Per-platform totals using each account's latest reading at least `days_ago` days old.
pub fn holdings_days_ago(daily: &DailyHoldings, as_of: NaiveDate, days_ago: i64) -> PlatformAmounts {
    let Some(cutoff) = as_of.checked_sub_signed(Duration::days(days_ago)) else {
        return PlatformAmounts::new();
    };

    let mut amounts = PlatformAmounts::new();
    for key in daily.keys() {
        if let Some(amount) = daily.latest_on_or_before(key, cutoff) {
            *amounts.entry(key.platform.clone()).or_insert(0.0) += amount;
        }
    }

    for amount in amounts.values_mut() {
        *amount = round_dp(*amount, 2);
    }
    amounts
}

fn weights(amounts: &PlatformAmounts, total: f64) -> PlatformAmounts {
    if total == 0.0 {
        return PlatformAmounts::new();
    }
    amounts
        .iter()
        .map(|(platform, amount)| (platform.clone(), round_dp(amount / total, 2)))
        .collect()
}

/// Percent change of `total` over the summed `base` holdings, to one decimal place.
fn percent_change(total: f64, base: &PlatformAmounts) -> Option<f64> {
    if base.is_empty() {
        return None;
    }
    let base_total: f64 = base.values().sum();
    if base_total == 0.0 {
        return None;
    }
    Some(round_dp(100.0 * total / base_total - 100.0, 1))
}
