use std::fmt;

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Field names that carry the snapshot date on the wire.
pub const DATE_FIELDS: &[&str] = &["nz_date", "date"];

pub fn is_date_field(key: &str) -> bool {
    DATE_FIELDS.contains(&key)
}

/// Series name -> value mapping that keeps insertion order.
///
/// Series sets are small, so lookups are a linear scan.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesMap<V> {
    entries: Vec<(String, V)>,
}

impl<V> Default for SeriesMap<V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<V> SeriesMap<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace. A replaced key keeps its original position.
    pub fn insert(&mut self, key: impl Into<String>, value: V) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for SeriesMap<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

/// One dated record as received from the data source.
///
/// On the wire this is a flat JSON object: the date under `nz_date` or `date`, every
/// other key a series. Non-numeric series values are read as missing.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSnapshot {
    pub date: String,
    pub values: SeriesMap<Option<f64>>,
}

impl RawSnapshot {
    pub fn new<K: Into<String>>(
        date: impl Into<String>,
        values: impl IntoIterator<Item = (K, Option<f64>)>,
    ) -> Self {
        Self {
            date: date.into(),
            values: values.into_iter().collect(),
        }
    }

    /// Snapshot with every series present and numeric.
    pub fn with_amounts<K: Into<String>>(
        date: impl Into<String>,
        values: impl IntoIterator<Item = (K, f64)>,
    ) -> Self {
        Self::new(date, values.into_iter().map(|(k, v)| (k, Some(v))))
    }
}

impl Serialize for RawSnapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len() + 1))?;
        map.serialize_entry("date", &self.date)?;
        for (key, value) in self.values.iter() {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for RawSnapshot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(RawSnapshotVisitor)
    }
}

struct RawSnapshotVisitor;

impl<'de> Visitor<'de> for RawSnapshotVisitor {
    type Value = RawSnapshot;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a snapshot object with a date field")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut date: Option<String> = None;
        let mut values = SeriesMap::new();

        while let Some(key) = access.next_key::<String>()? {
            if is_date_field(&key) {
                date = Some(access.next_value()?);
            } else {
                let value: serde_json::Value = access.next_value()?;
                values.insert(key, value.as_f64());
            }
        }

        let date = date.ok_or_else(|| de::Error::missing_field("date"))?;
        if date.trim().is_empty() {
            return Err(de::Error::invalid_value(
                de::Unexpected::Str(&date),
                &"a non-empty date",
            ));
        }

        Ok(RawSnapshot { date, values })
    }
}

/// A snapshot after normalization: every value numeric, missing entries zeroed.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedPoint {
    pub date: String,
    pub values: SeriesMap<f64>,
}

impl NormalizedPoint {
    pub fn new<K: Into<String>>(
        date: impl Into<String>,
        values: impl IntoIterator<Item = (K, f64)>,
    ) -> Self {
        Self {
            date: date.into(),
            values: values.into_iter().collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.values.get(key).copied()
    }

    /// Value for `key`, or `default` when this point does not carry the series.
    pub fn value_or(&self, key: &str, default: f64) -> f64 {
        self.get(key).unwrap_or(default)
    }

    pub fn series_keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys()
    }
}

impl Serialize for NormalizedPoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len() + 1))?;
        map.serialize_entry("date", &self.date)?;
        for (key, value) in self.values.iter() {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
