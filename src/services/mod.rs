pub mod csv_parser;
pub mod history;
pub mod normalizer;
pub mod overview;
pub mod portfolio_stats;
