use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

/// Per-platform amounts, sorted by platform name.
pub type PlatformAmounts = BTreeMap<String, f64>;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DayPair {
    pub today: PlatformAmounts,
    pub yesterday: PlatformAmounts,
}

/// Current state of the portfolio with day/week/month/year comparisons.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioOverview {
    pub as_of: NaiveDate,
    pub holdings: DayPair,
    pub weightings: DayPair,
    /// Today's total, rounded to whole units.
    pub total: f64,
    pub yesterday_total: f64,
    pub pct_change: Option<f64>,
    pub week_over_week: Option<f64>,
    pub month_over_month: Option<f64>,
    pub year_over_year: Option<f64>,
}

impl PortfolioOverview {
    pub fn empty(as_of: NaiveDate) -> Self {
        Self {
            as_of,
            holdings: DayPair::default(),
            weightings: DayPair::default(),
            total: 0.0,
            yesterday_total: 0.0,
            pct_change: None,
            week_over_week: None,
            month_over_month: None,
            year_over_year: None,
        }
    }
}
