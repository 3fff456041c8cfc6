//! Synthetic feature tables for unit tests.

use std::f64::consts::TAU;
use tripspeed_core::data::record::{Coordinate, TripId, TripRecord, TripTable, parse_timestamp};
use tripspeed_core::features::{DistanceMetric, Geodesic, hour_of_day};
use tripspeed_core::{FeatureTable, PreprocessPipeline};

/// `n` trips spread over one week whose speed is linear in distance and in
/// the sine/cosine of the pickup hour.
pub fn feature_table(n: usize) -> FeatureTable {
    let records = (0..n)
        .map(|i| {
            let at = format!(
                "2016-01-{:02} {:02}:{:02}:00",
                4 + i % 7,
                (i * 5) % 24,
                (i * 7) % 60
            );
            let pickup_datetime = parse_timestamp(&at).unwrap();
            let pickup = Coordinate::new(40.70, -74.00);
            let dropoff = Coordinate::new(
                40.70 + 0.002 * ((i % 15) + 1) as f64,
                -74.00 + 0.001 * (i % 9) as f64,
            );
            let distance = Geodesic::WGS84.distance_miles(pickup, dropoff);
            let angle = TAU * hour_of_day(&pickup_datetime) / 24.0;
            let speed = 12.0 + 3.0 * distance + 4.0 * angle.sin() - 2.0 * angle.cos();

            TripRecord {
                id: TripId::new(format!("t{i:04}")),
                pickup_datetime,
                pickup_longitude: pickup.longitude,
                pickup_latitude: pickup.latitude,
                dropoff_longitude: dropoff.longitude,
                dropoff_latitude: dropoff.latitude,
                trip_duration: distance / speed * 3600.0,
            }
        })
        .collect();
    let trips = TripTable::new(records).unwrap();
    PreprocessPipeline::new().derive(&trips).unwrap()
}
