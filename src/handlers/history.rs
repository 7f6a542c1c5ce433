use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::DisplayDefaults;
use crate::error::{AppError, AppResult};
use crate::models::{DisplayMode, NormalizedPoint, PortfolioStats, RawSnapshot, SeriesSummary};
use crate::services::normalizer::normalize;
use crate::services::portfolio_stats::{compute_stats, series_breakdown};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct StatsParams {
    pub years: Option<u32>,
    pub months: Option<u32>,
    pub mode: Option<DisplayMode>,
}

impl StatsParams {
    /// Lookback (years, months). Falls back to the configured window only when
    /// neither is given.
    pub fn lookback(&self, defaults: &DisplayDefaults) -> (u32, u32) {
        match (self.years, self.months) {
            (None, None) => (defaults.years, defaults.months),
            (years, months) => (years.unwrap_or(0), months.unwrap_or(0)),
        }
    }
}

#[derive(Serialize)]
struct StatsView<'a> {
    #[serde(flatten)]
    stats: &'a PortfolioStats<'a>,
    is_returns: bool,
    headline: String,
    breakdown: Vec<SeriesSummary<'a>>,
}

#[derive(Serialize)]
struct StatsResponse<'a> {
    series: &'a [NormalizedPoint],
    stats: Option<StatsView<'a>>,
}

/// Sort and zero-fill raw snapshots for charting.
pub async fn normalize_series(Json(raw): Json<Vec<RawSnapshot>>) -> Json<Vec<NormalizedPoint>> {
    Json(normalize(&raw))
}

/// Normalize snapshots and compute period statistics. `stats` is null for empty input.
pub async fn stats(
    State(state): State<AppState>,
    Query(params): Query<StatsParams>,
    Json(raw): Json<Vec<RawSnapshot>>,
) -> AppResult<Json<Value>> {
    let defaults = state.config.defaults;
    let (years, months) = params.lookback(&defaults);
    let mode = params.mode.unwrap_or(defaults.mode);

    let points = normalize(&raw);
    let stats = compute_stats(&points, mode, years, months);

    let view = stats.as_ref().map(|stats| StatsView {
        stats,
        is_returns: stats.is_returns(),
        headline: stats.headline_label(),
        breakdown: series_breakdown(stats),
    });

    let response = StatsResponse {
        series: &points,
        stats: view,
    };

    serde_json::to_value(&response)
        .map(Json)
        .map_err(|e| AppError::Internal(format!("Failed to serialize stats: {}", e)))
}
