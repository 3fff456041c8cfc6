//! Feature engineering: trip kinematics, pickup-time encoding, range
//! filtering and summary statistics.

pub mod filter;
pub mod geo;
pub mod stats;
pub mod temporal;

pub use filter::{Bound, FeatureBounds, RangeFilter, filter_value_with_threshold};
pub use geo::{
    DistanceMetric, DistanceMetricKind, Geodesic, Haversine, Kinematics,
    calculate_distance_and_speed,
};
pub use stats::{DistributionStats, describe};
pub use temporal::{
    CyclicalTime, DatetimePeriod, HourBins, TemporalEncoder, TimeFeatures, bin_datetime,
    cyclical_encode, hour_of_day, hour_of_week,
};

use crate::data::record::{TripId, TripTable};
use crate::data::table::{FeatureRow, FeatureTable};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A value computed from one trip, keyed by that trip's id.
#[derive(Debug, Clone, PartialEq)]
pub struct Derived<T> {
    pub id: TripId,
    pub value: T,
}

impl<T> Derived<T> {
    pub fn new(id: TripId, value: T) -> Self {
        Self { id, value }
    }
}

/// Everything derived from a single trip.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedFeatures {
    pub kinematics: Kinematics,
    pub time: TimeFeatures,
}

/// Inner join of the trips with their kinematics and time features on trip
/// id, in trip order. Trips missing from either side are dropped.
pub fn join_features(
    trips: &TripTable,
    kinematics: Vec<Derived<Kinematics>>,
    time: Vec<Derived<TimeFeatures>>,
    period: DatetimePeriod,
) -> FeatureTable {
    let mut kinematics: HashMap<TripId, Kinematics> =
        kinematics.into_iter().map(|d| (d.id, d.value)).collect();
    let mut time: HashMap<TripId, TimeFeatures> =
        time.into_iter().map(|d| (d.id, d.value)).collect();

    let rows: Vec<FeatureRow> = trips
        .iter()
        .filter_map(|trip| {
            let kinematics = kinematics.remove(&trip.id)?;
            let time = time.remove(&trip.id)?;
            Some(FeatureRow {
                trip: trip.clone(),
                features: DerivedFeatures { kinematics, time },
            })
        })
        .collect();

    if rows.len() != trips.len() {
        tracing::debug!(
            trips = trips.len(),
            joined = rows.len(),
            "Inner join dropped trips without derived features"
        );
    }
    FeatureTable::new(period, rows)
}
