use std::env;
use std::str::FromStr;

use chrono_tz::Tz;

use crate::date_utils::DEFAULT_TIMEZONE;
use crate::error::{AppError, AppResult};
use crate::models::DisplayMode;

/// Lookback and mode used when a request does not specify them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayDefaults {
    pub years: u32,
    pub months: u32,
    pub mode: DisplayMode,
}

impl Default for DisplayDefaults {
    fn default() -> Self {
        Self {
            years: 0,
            months: 3,
            mode: DisplayMode::ReturnFactor,
        }
    }
}

/// Which origins may call the API from a browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsOrigins {
    Any,
    List(Vec<String>),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Zone used to turn holding timestamps into calendar dates.
    pub timezone: Tz,
    pub defaults: DisplayDefaults,
    pub cors_origins: CorsOrigins,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8181,
            timezone: DEFAULT_TIMEZONE,
            defaults: DisplayDefaults::default(),
            cors_origins: CorsOrigins::Any,
        }
    }
}

impl Config {
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();

        let defaults = DisplayDefaults::default();

        let timezone = match env::var("SAVINGS_TIMEZONE") {
            Ok(name) if !name.trim().is_empty() => Tz::from_str(name.trim())
                .map_err(|_| AppError::Config(format!("Unknown time zone '{}'", name)))?,
            _ => DEFAULT_TIMEZONE,
        };

        let mode = match env::var("SAVINGS_DEFAULT_MODE") {
            Ok(raw) if !raw.trim().is_empty() => {
                raw.parse::<DisplayMode>().map_err(AppError::Config)?
            }
            _ => defaults.mode,
        };

        Ok(Self {
            host: env::var("SAVINGS_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: parse_var("SAVINGS_PORT").unwrap_or(8181),
            timezone,
            defaults: DisplayDefaults {
                years: parse_var("SAVINGS_DEFAULT_YEARS").unwrap_or(defaults.years),
                months: parse_var("SAVINGS_DEFAULT_MONTHS").unwrap_or(defaults.months),
                mode,
            },
            cors_origins: env::var("SAVINGS_CORS_ORIGINS")
                .map(|raw| parse_cors_origins(&raw))
                .unwrap_or(CorsOrigins::Any),
        })
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

/// Comma-separated origin list. Empty or `*` allows any origin.
pub fn parse_cors_origins(raw: &str) -> CorsOrigins {
    let origins: Vec<String> = raw
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect();

    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        CorsOrigins::Any
    } else {
        CorsOrigins::List(origins)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cors_origins() {
        assert_eq!(parse_cors_origins(""), CorsOrigins::Any);
        assert_eq!(parse_cors_origins("*"), CorsOrigins::Any);
        assert_eq!(
            parse_cors_origins("http://localhost:3000, https://dash.example.com"),
            CorsOrigins::List(vec![
                "http://localhost:3000".into(),
                "https://dash.example.com".into()
            ])
        );
    }

    #[test]
    fn test_defaults_match_dashboard() {
        let config = Config::default();
        assert_eq!(config.port, 8181);
        assert_eq!(config.defaults.months, 3);
        assert_eq!(config.defaults.mode, DisplayMode::ReturnFactor);
        assert_eq!(config.timezone, chrono_tz::Pacific::Auckland);
    }
}
