//! Physical-plausibility filtering of feature rows.
//!
//! A row survives only if every configured feature lies inside its inclusive
//! `[min, max]` bound. Non-finite values fail the comparison and are dropped.

use crate::data::table::{Column, FeatureTable};
use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Inclusive `[min, max]` range; serialized as a two-element array.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Bound {
    pub min: f64,
    pub max: f64,
}

impl Bound {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// `NaN` is never contained.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

impl From<[f64; 2]> for Bound {
    fn from([min, max]: [f64; 2]) -> Self {
        Self { min, max }
    }
}

impl From<Bound> for [f64; 2] {
    fn from(bound: Bound) -> Self {
        [bound.min, bound.max]
    }
}

/// Feature name to bound. Unlisted features are not checked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureBounds(BTreeMap<String, Bound>);

impl FeatureBounds {
    /// Empty bounds: every row passes.
    pub fn none() -> Self {
        Self(BTreeMap::new())
    }

    pub fn with(mut self, feature: impl Into<String>, bound: Bound) -> Self {
        self.0.insert(feature.into(), bound);
        self
    }

    pub fn insert(&mut self, feature: impl Into<String>, bound: Bound) -> Option<Bound> {
        self.0.insert(feature.into(), bound)
    }

    pub fn get(&self, feature: &str) -> Option<&Bound> {
        self.0.get(feature)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Bound)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for FeatureBounds {
    /// speed [0, 100] mph, distance [0, 500] miles, trip_duration [0, 3 h] seconds.
    fn default() -> Self {
        Self::none()
            .with("speed", Bound::new(0.0, 100.0))
            .with("distance", Bound::new(0.0, 500.0))
            .with("trip_duration", Bound::new(0.0, 3.0 * 3600.0))
    }
}

/// Keeps rows whose configured features all fall within bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeFilter {
    bounds: FeatureBounds,
}

impl RangeFilter {
    /// Rejects bounds whose endpoints are `NaN` or inverted.
    pub fn new(bounds: FeatureBounds) -> Result<Self> {
        for (feature, bound) in bounds.iter() {
            if bound.min.is_nan() || bound.max.is_nan() || bound.min > bound.max {
                return Err(CoreError::invalid_argument(format!(
                    "Invalid bound for '{feature}': [{}, {}]",
                    bound.min, bound.max
                )));
            }
        }
        Ok(Self { bounds })
    }

    pub fn bounds(&self) -> &FeatureBounds {
        &self.bounds
    }

    /// Filter `table`, preserving row order. Fails if a bounded feature is
    /// not a column of the table.
    pub fn apply(&self, table: &FeatureTable) -> Result<FeatureTable> {
        let checks: Vec<(Column, Bound)> = self
            .bounds
            .iter()
            .map(|(feature, bound)| Ok((table.resolve(feature)?, *bound)))
            .collect::<Result<_>>()?;

        let rows: Vec<_> = table
            .iter()
            .filter(|row| checks.iter().all(|(column, bound)| bound.contains(column.value(row))))
            .cloned()
            .collect();

        tracing::info!(
            rows_in = table.len(),
            rows_out = rows.len(),
            dropped = table.len() - rows.len(),
            "Applied feature range filter"
        );
        Ok(FeatureTable::new(table.period(), rows))
    }
}

impl Default for RangeFilter {
    fn default() -> Self {
        Self {
            bounds: FeatureBounds::default(),
        }
    }
}

/// Filter `table` with the default plausibility bounds.
pub fn filter_value_with_threshold(table: &FeatureTable) -> Result<FeatureTable> {
    RangeFilter::default().apply(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::table::fixtures::row;
    use crate::features::temporal::DatetimePeriod;

    fn table() -> FeatureTable {
        FeatureTable::new(
            DatetimePeriod::Day,
            vec![
                row("ok", "2020-12-30 14:45:00", 2.0, 12.0, 600.0),
                row("fast", "2020-12-30 15:00:00", 10.0, 150.0, 240.0),
                row("far", "2020-12-30 15:10:00", 600.0, 60.0, 10_000.0),
                row("long", "2020-12-30 15:20:00", 1.0, 0.3, 12_000.0),
                row("zero", "2020-12-30 15:30:00", 0.0, f64::NAN, 0.0),
                row("inf", "2020-12-30 15:40:00", 1.0, f64::INFINITY, 0.0),
                row("edge", "2020-12-30 15:50:00", 500.0, 100.0, 10_800.0),
            ],
        )
    }

    #[test]
    fn test_default_bounds() {
        let filtered = filter_value_with_threshold(&table()).unwrap();
        let ids: Vec<_> = filtered.ids().iter().map(|id| id.as_str()).collect();
        assert_eq!(ids, vec!["ok", "edge"]);
    }

    #[test]
    fn test_custom_bounds_are_anded() {
        let bounds = FeatureBounds::none()
            .with("distance", Bound::new(1.0, 10.0))
            .with("speed", Bound::new(0.0, 100.0));
        let filtered = RangeFilter::new(bounds).unwrap().apply(&table()).unwrap();
        let ids: Vec<_> = filtered.ids().iter().map(|id| id.as_str()).collect();
        assert_eq!(ids, vec!["ok", "long"]);
    }

    #[test]
    fn test_no_bounds_keeps_everything() {
        let t = table();
        let filtered = RangeFilter::new(FeatureBounds::none()).unwrap().apply(&t).unwrap();
        assert_eq!(filtered, t);
    }

    #[test]
    fn test_unknown_feature_is_an_error() {
        let bounds = FeatureBounds::none().with("fare_amount", Bound::new(0.0, 1.0));
        let err = RangeFilter::new(bounds).unwrap().apply(&table()).unwrap_err();
        assert!(matches!(err, CoreError::UnknownColumn { .. }));
    }

    #[test]
    fn test_inverted_bound_rejected() {
        let bounds = FeatureBounds::none().with("speed", Bound::new(10.0, 1.0));
        assert!(RangeFilter::new(bounds).is_err());
    }

    #[test]
    fn test_bound_serde_as_pair() {
        let bounds: FeatureBounds = serde_json::from_str(r#"{"speed": [0, 80]}"#).unwrap();
        assert_eq!(bounds.get("speed"), Some(&Bound::new(0.0, 80.0)));
        let json = serde_json::to_string(&FeatureBounds::default()).unwrap();
        assert!(json.contains(r#""trip_duration":[0.0,10800.0]"#));
    }
}
