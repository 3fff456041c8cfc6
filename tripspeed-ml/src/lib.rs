//! # tripspeed-ml - Trip Speed Regression
//!
//! Fits a linear speed model on the feature table produced by
//! `tripspeed-core`:
//!
//! - [`FeatureSet`] picks either the combined all-week time encoding or the
//!   weekday/weekend-separated one, always alongside trip distance
//! - [`StandardScaler`] standardizes the inputs using training rows only
//! - [`SgdRegressor`] fits the linear model by stochastic gradient descent
//! - [`RegressionMetrics`] scores predictions on held-out rows

pub mod config;
pub mod error;
pub mod features;
pub mod metrics;
pub mod predict;
pub mod scaler;
pub mod sgd;
pub mod split;

#[cfg(test)]
pub(crate) mod test_support;

// Re-exports
pub use config::{ModelConfig, SgdConfig};
pub use error::{MlError, Result};
pub use features::FeatureSet;
pub use metrics::RegressionMetrics;
pub use predict::{LinearPipeline, PredictionReport, fit_and_evaluate, predict_ride_hailing};
pub use scaler::StandardScaler;
pub use sgd::SgdRegressor;
pub use split::train_test_split;
