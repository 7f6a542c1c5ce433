use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::snapshot::NormalizedPoint;

/// How series values are interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayMode {
    /// Currency amounts.
    Absolute,
    /// Cumulative return factors, `1.0` meaning unchanged since the period start.
    #[default]
    #[serde(rename = "returns", alias = "return_factor")]
    ReturnFactor,
}

impl DisplayMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Absolute => "absolute",
            Self::ReturnFactor => "returns",
        }
    }

    pub fn is_returns(&self) -> bool {
        matches!(self, Self::ReturnFactor)
    }
}

impl FromStr for DisplayMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "absolute" => Ok(Self::Absolute),
            "returns" | "return_factor" => Ok(Self::ReturnFactor),
            other => Err(format!("unknown display mode '{}'", other)),
        }
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mode-specific totals. Absolute amounts only exist in absolute mode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum StatsTotals {
    Absolute {
        total_latest: f64,
        total_oldest: f64,
        total_change: f64,
        total_change_percent: f64,
    },
    #[serde(rename = "returns")]
    ReturnFactor { total_change_percent: f64 },
}

impl StatsTotals {
    pub fn total_change_percent(&self) -> f64 {
        match self {
            Self::Absolute {
                total_change_percent,
                ..
            }
            | Self::ReturnFactor {
                total_change_percent,
            } => *total_change_percent,
        }
    }

    pub fn mode(&self) -> DisplayMode {
        match self {
            Self::Absolute { .. } => DisplayMode::Absolute,
            Self::ReturnFactor { .. } => DisplayMode::ReturnFactor,
        }
    }
}

/// Latest value of one series, as shown next to the chart legend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesSummary<'a> {
    pub name: &'a str,
    pub latest_value: f64,
    /// Return since the period start, only in return-factor mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_percent: Option<f64>,
}

/// Period statistics comparing the first and last normalized points.
#[derive(Debug, Clone, Serialize)]
pub struct PortfolioStats<'a> {
    pub series_keys: Vec<&'a str>,
    pub latest: &'a NormalizedPoint,
    pub oldest: &'a NormalizedPoint,
    pub period_label: String,
    pub totals: StatsTotals,
}

impl PortfolioStats<'_> {
    pub fn is_returns(&self) -> bool {
        self.totals.mode().is_returns()
    }

    pub fn total_change_percent(&self) -> f64 {
        self.totals.total_change_percent()
    }

    /// Period label with its first letter capitalized, e.g. "3 months".
    pub fn headline_label(&self) -> String {
        let mut chars = self.period_label.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}
