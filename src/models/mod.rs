pub mod holding;
pub mod overview;
pub mod snapshot;
pub mod stats;

pub use holding::{DailyHoldings, HoldingKey, HoldingRecord};
pub use overview::{DayPair, PlatformAmounts, PortfolioOverview};
pub use snapshot::{NormalizedPoint, RawSnapshot, SeriesMap};
pub use stats::{DisplayMode, PortfolioStats, SeriesSummary, StatsTotals};
