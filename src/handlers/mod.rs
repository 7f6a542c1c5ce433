pub mod history;
pub mod holdings;
pub mod import;

use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        // Snapshot series
        .route("/api/history/normalize", post(history::normalize_series))
        .route("/api/history/stats", post(history::stats))
        // Holding records
        .route("/api/holdings/history", post(holdings::history))
        .route("/api/holdings/history/returns", post(holdings::history_returns))
        .route("/api/holdings/overview", post(holdings::overview))
        // CSV import
        .route("/api/import/snapshots", post(import::snapshots))
        .route("/api/import/holdings", post(import::holdings))
        // Health check
        .route("/health", get(health))
}

async fn health() -> &'static str {
    "OK"
}
