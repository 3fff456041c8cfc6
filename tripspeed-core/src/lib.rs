//! # tripspeed-core - Trip Feature Engineering
//!
//! Turns raw ride-hailing trip records into a model-ready feature table:
//!
//! 1. **Kinematics**: geodesic trip distance (miles) and average speed (mph)
//! 2. **Time**: hour of day or week, fixed-width hour buckets, and a
//!    sine/cosine encoding split into weekday and weekend channels
//! 3. **Filtering**: inclusive plausibility bounds on any numeric column
//!
//! [`PreprocessPipeline`] composes the three stages; each stage is also usable
//! on its own.

pub mod config;
pub mod data;
pub mod error;
pub mod features;
pub mod pipeline;

// Re-exports
pub use config::{PipelineConfig, load_config};
pub use data::{FeatureTable, TripRecord, TripTable, load_trip_data};
pub use error::{CoreError, Result};
pub use features::{DatetimePeriod, DistanceMetric, FeatureBounds, RangeFilter};
pub use pipeline::{PreprocessPipeline, preprocess_trip_data};
