//! Speed prediction from a preprocessed feature table.
//!
//! A [`LinearPipeline`] standardizes the selected feature columns with
//! statistics learned on the training rows only, then fits an
//! [`SgdRegressor`]. Predictions come back in the row order of the table
//! they were made for.

use tripspeed_core::FeatureTable;

use crate::config::ModelConfig;
use crate::error::{MlError, Result};
use crate::features::FeatureSet;
use crate::metrics::RegressionMetrics;
use crate::scaler::StandardScaler;
use crate::sgd::SgdRegressor;

/// Scaler followed by an SGD linear regressor.
#[derive(Debug, Clone)]
pub struct LinearPipeline {
    feature_set: FeatureSet,
    scaler: StandardScaler,
    regressor: SgdRegressor,
}

impl LinearPipeline {
    pub fn new(feature_set: FeatureSet, regressor: SgdRegressor) -> Self {
        Self {
            feature_set,
            scaler: StandardScaler::new(),
            regressor,
        }
    }

    /// Pipeline described by `config`.
    pub fn from_config(config: &ModelConfig) -> Result<Self> {
        Ok(Self::new(
            FeatureSet::from_flag(config.separate_weekend),
            SgdRegressor::new(config.sgd.clone(), config.seed)?,
        ))
    }

    pub fn feature_set(&self) -> FeatureSet {
        self.feature_set
    }

    pub fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }

    pub fn regressor(&self) -> &SgdRegressor {
        &self.regressor
    }

    pub fn fit(&mut self, table: &FeatureTable, target: &str) -> Result<()> {
        if table.is_empty() {
            return Err(MlError::empty_dataset("training table has no rows"));
        }
        let x = self.feature_set.matrix(table)?;
        let y = table.column(target)?;
        let z = self.scaler.fit_transform(&x)?;
        self.regressor.fit(&z, &y)?;
        tracing::debug!(
            rows = table.len(),
            features = %self.feature_set,
            epochs = self.regressor.n_iter(),
            "Fitted linear pipeline"
        );
        Ok(())
    }

    pub fn predict(&self, table: &FeatureTable) -> Result<Vec<f64>> {
        let x = self.feature_set.matrix(table)?;
        let z = self.scaler.transform(&x)?;
        self.regressor.predict(&z)
    }

    /// Predict `table` and score the predictions against its `target` column.
    pub fn evaluate(&self, table: &FeatureTable, target: &str) -> Result<(Vec<f64>, RegressionMetrics)> {
        let predictions = self.predict(table)?;
        let metrics = RegressionMetrics::calculate(&table.column(target)?, &predictions)?;
        Ok((predictions, metrics))
    }

    /// Coefficient of determination on `table`.
    pub fn score(&self, table: &FeatureTable, target: &str) -> Result<f64> {
        Ok(self.evaluate(table, target)?.1.r_squared)
    }
}

/// Fit on `train`, predict `test`.
///
/// The test R² is logged (rounded to three places) rather than returned.
pub fn predict_ride_hailing(
    train: &FeatureTable,
    test: &FeatureTable,
    config: &ModelConfig,
) -> Result<Vec<f64>> {
    Ok(fit_and_evaluate(train, test, config)?.predictions)
}

/// Outcome of a fit/evaluate run.
#[derive(Debug, Clone)]
pub struct PredictionReport {
    pub predictions: Vec<f64>,
    pub metrics: RegressionMetrics,
    pub pipeline: LinearPipeline,
}

/// Like [`predict_ride_hailing`], also returning the metrics and fitted pipeline.
pub fn fit_and_evaluate(
    train: &FeatureTable,
    test: &FeatureTable,
    config: &ModelConfig,
) -> Result<PredictionReport> {
    let mut pipeline = LinearPipeline::from_config(config)?;
    pipeline.fit(train, &config.target)?;
    let (predictions, metrics) = pipeline.evaluate(test, &config.target)?;

    let r_squared = metrics.r_squared;
    tracing::info!(r_squared, "Prediction R^2: {:.3}", r_squared);

    Ok(PredictionReport {
        predictions,
        metrics,
        pipeline,
    })
}
