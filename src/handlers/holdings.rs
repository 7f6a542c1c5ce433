use axum::extract::{Query, State};
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;

use crate::config::DisplayDefaults;
use crate::date_utils::LookbackWindow;
use crate::error::AppResult;
use crate::models::{HoldingRecord, PortfolioOverview, RawSnapshot};
use crate::services::history::{build_history, to_return_factors};
use crate::services::overview::portfolio_overview;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct HoldingsParams {
    pub years: Option<u32>,
    pub months: Option<u32>,
    pub days: Option<u32>,
    pub as_of: Option<NaiveDate>,
}

impl HoldingsParams {
    /// Requested window. The configured default applies only when no part is given.
    pub fn window(&self, defaults: &DisplayDefaults) -> AppResult<LookbackWindow> {
        let window = match (self.years, self.months, self.days) {
            (None, None, None) => LookbackWindow::new(defaults.years, defaults.months, 0),
            (years, months, days) => LookbackWindow::new(
                years.unwrap_or(0),
                months.unwrap_or(0),
                days.unwrap_or(0),
            ),
        };
        window.validate()
    }

    fn as_of(&self, state: &AppState) -> NaiveDate {
        self.as_of.unwrap_or_else(|| state.today())
    }
}

/// Daily, forward-filled amounts per account.
pub async fn history(
    State(state): State<AppState>,
    Query(params): Query<HoldingsParams>,
    Json(records): Json<Vec<HoldingRecord>>,
) -> AppResult<Json<Vec<RawSnapshot>>> {
    let window = params.window(&state.config.defaults)?;
    let as_of = params.as_of(&state);

    tracing::info!(
        records = records.len(),
        history_days = window.history_days(),
        %as_of,
        "Building holdings history"
    );

    Ok(Json(build_history(&records, as_of, window, state.config.timezone)))
}

/// Daily cumulative return factors per account.
pub async fn history_returns(
    State(state): State<AppState>,
    Query(params): Query<HoldingsParams>,
    Json(records): Json<Vec<HoldingRecord>>,
) -> AppResult<Json<Vec<RawSnapshot>>> {
    let window = params.window(&state.config.defaults)?;
    let as_of = params.as_of(&state);

    tracing::info!(
        records = records.len(),
        history_days = window.history_days(),
        %as_of,
        "Building holdings return history"
    );

    let history = build_history(&records, as_of, window, state.config.timezone);
    Ok(Json(to_return_factors(&history)))
}

/// Current holdings with day/week/month/year change.
pub async fn overview(
    State(state): State<AppState>,
    Query(params): Query<HoldingsParams>,
    Json(records): Json<Vec<HoldingRecord>>,
) -> Json<PortfolioOverview> {
    let as_of = params.as_of(&state);
    Json(portfolio_overview(&records, as_of, state.config.timezone))
}
