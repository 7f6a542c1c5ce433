use crate::date_utils::period_label;
use crate::models::{DisplayMode, NormalizedPoint, PortfolioStats, SeriesSummary, StatsTotals};
use crate::number_utils::{finite_or_zero, mean, round_dp};

/// Neutral value for a series missing from a point in absolute mode.
const ABSENT_AMOUNT: f64 = 0.0;
/// Neutral value for a series missing from a point in return-factor mode.
///
/// A zero factor also counts as missing: a return series that has not started yet
/// is null, and normalization turns that null into `0`.
const ABSENT_FACTOR: f64 = 1.0;

/// Compare the first and last points of an ordered series.
///
/// Returns `None` when there are no points. The series set is taken from the latest
/// point, in that point's key order.
pub fn compute_stats(
    points: &[NormalizedPoint],
    mode: DisplayMode,
    years: u32,
    months: u32,
) -> Option<PortfolioStats<'_>> {
    let oldest = points.first()?;
    let latest = points.last()?;

    let series_keys: Vec<&str> = latest.series_keys().collect();

    let totals = match mode {
        DisplayMode::Absolute => absolute_totals(&series_keys, oldest, latest),
        DisplayMode::ReturnFactor => return_factor_totals(&series_keys, oldest, latest),
    };

    tracing::debug!(
        mode = %mode,
        series = series_keys.len(),
        points = points.len(),
        change_percent = totals.total_change_percent(),
        "Computed portfolio stats"
    );

    Some(PortfolioStats {
        series_keys,
        latest,
        oldest,
        period_label: period_label(years, months),
        totals,
    })
}

fn absolute_totals(keys: &[&str], oldest: &NormalizedPoint, latest: &NormalizedPoint) -> StatsTotals {
    let total_latest = sum_values(keys, latest);
    let total_oldest = sum_values(keys, oldest);
    let total_change = finite_or_zero(total_latest - total_oldest);

    // A non-positive base has no meaningful percentage
    let total_change_percent = if total_oldest > 0.0 {
        round_dp(total_change / total_oldest * 100.0, 2)
    } else {
        0.0
    };

    StatsTotals::Absolute {
        total_latest,
        total_oldest,
        total_change,
        total_change_percent,
    }
}

fn return_factor_totals(
    keys: &[&str],
    oldest: &NormalizedPoint,
    latest: &NormalizedPoint,
) -> StatsTotals {
    let returns: Vec<f64> = keys
        .iter()
        .map(|key| {
            series_return(factor_or_neutral(oldest, key), factor_or_neutral(latest, key))
        })
        .collect();

    StatsTotals::ReturnFactor {
        total_change_percent: round_dp(mean(&returns), 2),
    }
}

fn factor_or_neutral(point: &NormalizedPoint, key: &str) -> f64 {
    let factor = point.value_or(key, ABSENT_FACTOR);
    if factor == 0.0 {
        ABSENT_FACTOR
    } else {
        factor
    }
}

fn sum_values(keys: &[&str], point: &NormalizedPoint) -> f64 {
    finite_or_zero(keys.iter().map(|key| point.value_or(key, ABSENT_AMOUNT)).sum())
}

/// Percentage return between two factors, `0` when the starting factor is zero.
fn series_return(oldest: f64, latest: f64) -> f64 {
    if oldest == 0.0 {
        return 0.0;
    }
    finite_or_zero((latest / oldest - 1.0) * 100.0)
}

/// Latest value of every series in `stats`, with the cumulative return in return-factor mode.
pub fn series_breakdown<'a>(stats: &PortfolioStats<'a>) -> Vec<SeriesSummary<'a>> {
    stats
        .series_keys
        .iter()
        .map(|&name| match stats.totals {
            StatsTotals::Absolute { .. } => SeriesSummary {
                name,
                latest_value: stats.latest.value_or(name, ABSENT_AMOUNT),
                return_percent: None,
            },
            StatsTotals::ReturnFactor { .. } => {
                let factor = factor_or_neutral(stats.latest, name);
                SeriesSummary {
                    name,
                    latest_value: factor,
                    return_percent: Some(round_dp((factor - 1.0) * 100.0, 2)),
                }
            }
        })
        .collect()
}
