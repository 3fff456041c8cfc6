//! The preprocessing pipeline: kinematics and time features joined by trip
//! id, then range-filtered.

use crate::config::PipelineConfig;
use crate::data::record::TripTable;
use crate::data::table::FeatureTable;
use crate::error::Result;
use crate::features::filter::RangeFilter;
use crate::features::geo::{DistanceMetric, calculate_distance_and_speed};
use crate::features::temporal::TemporalEncoder;
use crate::features::join_features;

/// Raw trips to a filtered, model-ready feature table.
///
/// `preprocess(raw) = filter(join(raw, kinematics(raw), time(raw.pickup_datetime)))`.
/// Kinematics and time encoding are independent; filtering runs last, once
/// every derived column exists. The pipeline holds no mutable state, so one
/// instance may be reused across calls and threads.
pub struct PreprocessPipeline {
    metric: Box<dyn DistanceMetric>,
    encoder: TemporalEncoder,
    filter: RangeFilter,
}

impl PreprocessPipeline {
    /// Create a pipeline with default configuration
    pub fn new() -> Self {
        Self {
            metric: PipelineConfig::default().distance_metric.metric(),
            encoder: TemporalEncoder::default(),
            filter: RangeFilter::default(),
        }
    }

    /// Create a pipeline with custom configuration. Fails on a non-positive
    /// bin width or an inverted bound.
    pub fn with_config(config: &PipelineConfig) -> Result<Self> {
        Ok(Self {
            metric: config.distance_metric.metric(),
            encoder: TemporalEncoder::new(config.period, config.bin_width)?,
            filter: RangeFilter::new(config.bounds.clone())?,
        })
    }

    /// Replace the distance formula, e.g. with a faster approximation.
    pub fn with_distance_metric(mut self, metric: impl DistanceMetric + 'static) -> Self {
        self.metric = Box::new(metric);
        self
    }

    pub fn distance_metric(&self) -> &dyn DistanceMetric {
        self.metric.as_ref()
    }

    pub fn encoder(&self) -> &TemporalEncoder {
        &self.encoder
    }

    pub fn filter(&self) -> &RangeFilter {
        &self.filter
    }

    /// Derive features for every trip and join them, without filtering.
    pub fn derive(&self, trips: &TripTable) -> Result<FeatureTable> {
        let kinematics = calculate_distance_and_speed(trips, self.distance_metric());
        let time = self.encoder.encode(trips)?;
        Ok(join_features(trips, kinematics, time, self.encoder.period()))
    }

    /// Run the full transform.
    pub fn preprocess(&self, trips: &TripTable) -> Result<FeatureTable> {
        let joined = self.derive(trips)?;
        let table = self.filter.apply(&joined)?;
        tracing::debug!(
            trips = trips.len(),
            rows = table.len(),
            metric = self.distance_metric().name(),
            "Preprocessed trip data"
        );
        Ok(table)
    }
}

impl Default for PreprocessPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PreprocessPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreprocessPipeline")
            .field("metric", &self.distance_metric().name())
            .field("encoder", &self.encoder)
            .field("filter", &self.filter)
            .finish()
    }
}

/// Convenience function to preprocess trips with default settings.
pub fn preprocess_trip_data(trips: &TripTable) -> Result<FeatureTable> {
    PreprocessPipeline::new().preprocess(trips)
}
