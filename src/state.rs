use std::sync::Arc;

use chrono::NaiveDate;

use crate::config::Config;
use crate::date_utils::today_in;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Today's date in the configured time zone.
    pub fn today(&self) -> NaiveDate {
        today_in(self.config.timezone)
    }
}
