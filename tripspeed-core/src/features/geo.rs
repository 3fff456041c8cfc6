//! Trip kinematics: great-circle distance between pickup and dropoff, and the
//! average speed it implies.
//!
//! Distance is pluggable through [`DistanceMetric`]. The default
//! [`Geodesic`] metric solves Vincenty's inverse problem on the WGS84
//! ellipsoid; [`Haversine`] is the cheaper spherical approximation.
//!
//! Coordinates are not validated. Out-of-range degrees and zero durations
//! produce meaningless or non-finite values that the range filter removes.

use crate::data::record::{Coordinate, TripTable};
use crate::features::Derived;
use serde::{Deserialize, Serialize};

/// Metres per international mile.
pub const METERS_PER_MILE: f64 = 1609.344;

/// Mean Earth radius (IUGG) in metres.
pub const MEAN_EARTH_RADIUS_M: f64 = 6_371_008.8;

const SECONDS_PER_HOUR: f64 = 3600.0;

/// A point-to-point distance capability.
///
/// Implementations must be monotonic with true geodesic distance and return
/// exactly zero for identical points.
pub trait DistanceMetric: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    /// Distance between two WGS84 positions, in miles.
    fn distance_miles(&self, from: Coordinate, to: Coordinate) -> f64;
}

/// Built-in metrics selectable from configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMetricKind {
    #[default]
    Geodesic,
    Haversine,
}

impl DistanceMetricKind {
    pub fn metric(self) -> Box<dyn DistanceMetric> {
        match self {
            Self::Geodesic => Box::new(Geodesic::WGS84),
            Self::Haversine => Box::new(Haversine),
        }
    }
}

/// Ellipsoidal distance via Vincenty's inverse formula.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geodesic {
    /// Semi-major axis in metres.
    pub semi_major: f64,
    /// Flattening.
    pub flattening: f64,
    pub max_iterations: usize,
    pub tolerance: f64,
}

impl Geodesic {
    pub const WGS84: Self = Self {
        semi_major: 6_378_137.0,
        flattening: 1.0 / 298.257_223_563,
        max_iterations: 200,
        tolerance: 1e-12,
    };

    /// Distance in metres, or `None` if the iteration does not converge
    /// (nearly antipodal points).
    pub fn inverse_meters(&self, from: Coordinate, to: Coordinate) -> Option<f64> {
        let a = self.semi_major;
        let f = self.flattening;
        let b = (1.0 - f) * a;

        let l = (to.longitude - from.longitude).to_radians();
        let u1 = ((1.0 - f) * from.latitude.to_radians().tan()).atan();
        let u2 = ((1.0 - f) * to.latitude.to_radians().tan()).atan();
        let (sin_u1, cos_u1) = u1.sin_cos();
        let (sin_u2, cos_u2) = u2.sin_cos();

        let mut lambda = l;
        for _ in 0..self.max_iterations {
            let (sin_lambda, cos_lambda) = lambda.sin_cos();
            let sin_sigma = ((cos_u2 * sin_lambda).powi(2)
                + (cos_u1 * sin_u2 - sin_u1 * cos_u2 * cos_lambda).powi(2))
            .sqrt();
            if sin_sigma == 0.0 {
                return Some(0.0);
            }
            let cos_sigma = sin_u1 * sin_u2 + cos_u1 * cos_u2 * cos_lambda;
            let sigma = sin_sigma.atan2(cos_sigma);
            let sin_alpha = cos_u1 * cos_u2 * sin_lambda / sin_sigma;
            let cos_sq_alpha = 1.0 - sin_alpha * sin_alpha;
            // Equatorial lines have cos_sq_alpha == 0.
            let cos_2sigma_m = if cos_sq_alpha == 0.0 {
                0.0
            } else {
                cos_sigma - 2.0 * sin_u1 * sin_u2 / cos_sq_alpha
            };
            let c = f / 16.0 * cos_sq_alpha * (4.0 + f * (4.0 - 3.0 * cos_sq_alpha));
            let previous = lambda;
            lambda = l
                + (1.0 - c)
                    * f
                    * sin_alpha
                    * (sigma
                        + c * sin_sigma
                            * (cos_2sigma_m + c * cos_sigma * (-1.0 + 2.0 * cos_2sigma_m.powi(2))));

            if (lambda - previous).abs() < self.tolerance {
                let u_sq = cos_sq_alpha * (a * a - b * b) / (b * b);
                let big_a =
                    1.0 + u_sq / 16384.0 * (4096.0 + u_sq * (-768.0 + u_sq * (320.0 - 175.0 * u_sq)));
                let big_b = u_sq / 1024.0 * (256.0 + u_sq * (-128.0 + u_sq * (74.0 - 47.0 * u_sq)));
                let delta_sigma = big_b
                    * sin_sigma
                    * (cos_2sigma_m
                        + big_b / 4.0
                            * (cos_sigma * (-1.0 + 2.0 * cos_2sigma_m.powi(2))
                                - big_b / 6.0
                                    * cos_2sigma_m
                                    * (-3.0 + 4.0 * sin_sigma.powi(2))
                                    * (-3.0 + 4.0 * cos_2sigma_m.powi(2))));
                return Some(b * big_a * (sigma - delta_sigma));
            }
        }
        None
    }
}

impl DistanceMetric for Geodesic {
    fn name(&self) -> &'static str {
        "geodesic"
    }

    fn distance_miles(&self, from: Coordinate, to: Coordinate) -> f64 {
        match self.inverse_meters(from, to) {
            Some(meters) => meters / METERS_PER_MILE,
            None => Haversine.distance_miles(from, to),
        }
    }
}

/// Spherical great-circle distance on the mean Earth radius.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Haversine;

impl DistanceMetric for Haversine {
    fn name(&self) -> &'static str {
        "haversine"
    }

    fn distance_miles(&self, from: Coordinate, to: Coordinate) -> f64 {
        let lat1 = from.latitude.to_radians();
        let lat2 = to.latitude.to_radians();
        let dlat = lat2 - lat1;
        let dlon = (to.longitude - from.longitude).to_radians();
        let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        let central_angle = 2.0 * h.sqrt().min(1.0).asin();
        MEAN_EARTH_RADIUS_M * central_angle / METERS_PER_MILE
    }
}

/// Distance and average speed of one trip.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Kinematics {
    /// Miles.
    pub distance: f64,
    /// Miles per hour. Non-finite when the duration is zero.
    pub speed: f64,
}

/// Average speed in mph. Zero durations yield `inf`/`NaN` rather than an error.
pub fn speed_mph(distance_miles: f64, duration_secs: f64) -> f64 {
    distance_miles / duration_secs * SECONDS_PER_HOUR
}

/// Compute `{distance, speed}` for every trip, keyed by trip id in input order.
pub fn calculate_distance_and_speed(
    trips: &TripTable,
    metric: &dyn DistanceMetric,
) -> Vec<Derived<Kinematics>> {
    let derived: Vec<Derived<Kinematics>> = trips
        .iter()
        .map(|trip| {
            let distance = metric.distance_miles(trip.pickup(), trip.dropoff());
            Derived::new(
                trip.id.clone(),
                Kinematics {
                    distance,
                    speed: speed_mph(distance, trip.trip_duration),
                },
            )
        })
        .collect();

    let non_finite = derived.iter().filter(|d| !d.value.speed.is_finite()).count();
    if non_finite > 0 {
        tracing::warn!(
            rows = non_finite,
            "Trips with non-finite speed (zero duration?) will be dropped by the range filter"
        );
    }
    tracing::debug!(rows = derived.len(), metric = metric.name(), "Computed trip kinematics");
    derived
}
