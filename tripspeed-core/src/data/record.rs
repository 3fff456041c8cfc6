//! Raw trip records and the in-memory trip table.

use crate::error::{CoreError, Result};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Accepted layouts for `pickup_datetime`.
const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Canonical layout used when writing timestamps back out.
pub const TIMESTAMP_OUTPUT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Stable row key carried through every transform step.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TripId(String);

impl TripId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TripId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TripId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// A WGS84 position in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// One raw ride-hailing trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripRecord {
    pub id: TripId,
    #[serde(with = "timestamp")]
    pub pickup_datetime: NaiveDateTime,
    pub pickup_longitude: f64,
    pub pickup_latitude: f64,
    pub dropoff_longitude: f64,
    pub dropoff_latitude: f64,
    /// Duration in seconds.
    pub trip_duration: f64,
}

impl TripRecord {
    pub fn pickup(&self) -> Coordinate {
        Coordinate::new(self.pickup_latitude, self.pickup_longitude)
    }

    pub fn dropoff(&self) -> Coordinate {
        Coordinate::new(self.dropoff_latitude, self.dropoff_longitude)
    }
}

/// Parse a `pickup_datetime` cell.
pub fn parse_timestamp(value: &str) -> Result<NaiveDateTime> {
    let trimmed = value.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        .ok_or_else(|| CoreError::Timestamp {
            value: value.to_string(),
        })
}

mod timestamp {
    use super::{TIMESTAMP_OUTPUT_FORMAT, parse_timestamp};
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&value.format(TIMESTAMP_OUTPUT_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_timestamp(&raw).map_err(serde::de::Error::custom)
    }
}

/// An immutable batch of trips, unique by [`TripId`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TripTable {
    records: Vec<TripRecord>,
}

impl TripTable {
    /// Build a table, rejecting repeated trip ids.
    pub fn new(records: Vec<TripRecord>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(records.len());
        for record in &records {
            if !seen.insert(record.id.as_str()) {
                return Err(CoreError::DuplicateTripId {
                    id: record.id.to_string(),
                });
            }
        }
        Ok(Self { records })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[TripRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TripRecord> {
        self.records.iter()
    }

    /// The `pickup_datetime` column in row order.
    pub fn pickup_datetimes(&self) -> Vec<NaiveDateTime> {
        self.records.iter().map(|r| r.pickup_datetime).collect()
    }
}

impl<'a> IntoIterator for &'a TripTable {
    type Item = &'a TripRecord;
    type IntoIter = std::slice::Iter<'a, TripRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::trip;
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_timestamp_formats() {
        let a = parse_timestamp("2016-03-14 17:24:55").unwrap();
        let b = parse_timestamp("2016-03-14T17:24:55").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.hour(), 17);
        assert_eq!(a.day(), 14);

        let minutes_only = parse_timestamp("2016-03-14 17:24").unwrap();
        assert_eq!(minutes_only.second(), 0);
    }

    #[test]
    fn test_parse_timestamp_rejects_garbage() {
        let err = parse_timestamp("yesterday").unwrap_err();
        assert!(matches!(err, CoreError::Timestamp { .. }));
    }

    #[test]
    fn test_trip_table_rejects_duplicate_ids() {
        let a = trip("id1", "2016-03-14 17:24:55", (40.0, -73.0), (40.1, -73.1), 600.0);
        let b = trip("id1", "2016-03-15 08:00:00", (40.0, -73.0), (40.1, -73.1), 300.0);
        let err = TripTable::new(vec![a, b]).unwrap_err();
        assert!(matches!(err, CoreError::DuplicateTripId { ref id } if id == "id1"));
    }

    #[test]
    fn test_record_coordinates() {
        let t = trip("id2", "2016-03-14 17:24:55", (40.5, -73.5), (40.7, -73.9), 60.0);
        assert_eq!(t.pickup(), Coordinate::new(40.5, -73.5));
        assert_eq!(t.dropoff(), Coordinate::new(40.7, -73.9));
    }
}
