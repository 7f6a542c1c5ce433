use crate::date_utils::DateSortKey;
use crate::models::{NormalizedPoint, RawSnapshot, SeriesMap};
use crate::number_utils::finite_or_zero;
use tracing::{debug, warn};

/// Turn raw snapshots into chart points ordered by date.
///
/// Missing, null and non-finite values become `0`. Points with equal dates keep their
/// input order and duplicates are not merged. Unparsable dates sort after all valid ones.
pub fn normalize(raw: &[RawSnapshot]) -> Vec<NormalizedPoint> {
    let mut keyed: Vec<(DateSortKey, NormalizedPoint)> = raw
        .iter()
        .map(|snapshot| (DateSortKey::parse(&snapshot.date), normalize_snapshot(snapshot)))
        .collect();

    let invalid_dates = keyed.iter().filter(|(key, _)| !key.is_valid()).count();
    if invalid_dates > 0 {
        warn!(invalid_dates, "Snapshots with unparsable dates sorted last");
    }

    // sort_by is stable
    keyed.sort_by(|a, b| a.0.cmp(&b.0));

    let points: Vec<NormalizedPoint> = keyed.into_iter().map(|(_, point)| point).collect();
    debug!(
        points = points.len(),
        series = discover_series(&points).len(),
        "Normalized snapshots"
    );
    points
}

/// Normalize a single snapshot without reordering.
pub fn normalize_snapshot(snapshot: &RawSnapshot) -> NormalizedPoint {
    let values: SeriesMap<f64> = snapshot
        .values
        .iter()
        .map(|(key, value)| (key, value.map_or(0.0, finite_or_zero)))
        .collect();

    NormalizedPoint {
        date: snapshot.date.clone(),
        values,
    }
}

/// Every series key seen across `points`, in order of first appearance.
pub fn discover_series(points: &[NormalizedPoint]) -> Vec<&str> {
    let mut keys: Vec<&str> = Vec::new();
    for point in points {
        for key in point.series_keys() {
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
    }
    keys
}
