//! Linear regression fitted by stochastic gradient descent.
//!
//! Squared loss with an L2 penalty, one sample per update, and an
//! inverse-scaling learning rate `eta = eta0 / t^power_t` where `t` counts
//! updates from 1. Samples are reshuffled every epoch from a seeded RNG, so
//! fits are reproducible for a given seed.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::config::SgdConfig;
use crate::error::{MlError, Result};
use crate::scaler::check_matrix;

/// Gradients are clipped to this magnitude.
const MAX_DLOSS: f64 = 1e12;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SgdRegressor {
    config: SgdConfig,
    seed: u64,
    coef: Vec<f64>,
    intercept: f64,
    n_iter: usize,
    fitted: bool,
}

impl SgdRegressor {
    pub fn new(config: SgdConfig, seed: u64) -> Result<Self> {
        if !(config.eta0.is_finite() && config.eta0 > 0.0) {
            return Err(MlError::invalid_input(format!(
                "eta0 must be positive, got {}",
                config.eta0
            )));
        }
        if !(config.alpha.is_finite() && config.alpha >= 0.0) {
            return Err(MlError::invalid_input(format!(
                "alpha must be non-negative, got {}",
                config.alpha
            )));
        }
        if config.max_iter == 0 {
            return Err(MlError::invalid_input("max_iter must be at least 1"));
        }
        Ok(Self {
            config,
            seed,
            coef: Vec::new(),
            intercept: 0.0,
            n_iter: 0,
            fitted: false,
        })
    }

    pub fn coef(&self) -> &[f64] {
        &self.coef
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Epochs run by the last fit.
    pub fn n_iter(&self) -> usize {
        self.n_iter
    }

    pub fn is_fitted(&self) -> bool {
        self.fitted
    }

    pub fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<()> {
        let width = check_matrix(x)?;
        if y.len() != x.len() {
            return Err(MlError::invalid_input(format!(
                "{} rows but {} targets",
                x.len(),
                y.len()
            )));
        }
        if let Some(i) = y.iter().position(|v| !v.is_finite()) {
            return Err(MlError::invalid_input(format!("target {i} is not finite")));
        }

        let SgdConfig {
            alpha,
            eta0,
            power_t,
            max_iter,
            tol,
            n_iter_no_change,
        } = self.config;
        let n = x.len();

        let mut coef = vec![0.0; width];
        let mut intercept = 0.0;
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut order: Vec<usize> = (0..n).collect();
        let mut t = 1.0_f64;
        let mut best_loss = f64::INFINITY;
        let mut no_improvement = 0;
        let mut epochs = 0;

        for _ in 0..max_iter {
            order.shuffle(&mut rng);
            let mut epoch_loss = 0.0;

            for &i in &order {
                let row = &x[i];
                let p = dot(&coef, row) + intercept;
                let residual = p - y[i];
                epoch_loss += 0.5 * residual * residual;

                let eta = eta0 / t.powf(power_t);
                let update = -eta * residual.clamp(-MAX_DLOSS, MAX_DLOSS);
                let shrink = (1.0 - eta * alpha).max(0.0);
                for (w, v) in coef.iter_mut().zip(row) {
                    *w = *w * shrink + update * v;
                }
                intercept += update;
                t += 1.0;
            }
            epochs += 1;

            if let Some(tol) = tol {
                if epoch_loss > best_loss - tol * n as f64 {
                    no_improvement += 1;
                } else {
                    no_improvement = 0;
                }
                if epoch_loss < best_loss {
                    best_loss = epoch_loss;
                }
                if no_improvement >= n_iter_no_change {
                    tracing::debug!(epochs, loss = epoch_loss, "SGD converged");
                    break;
                }
            }
        }

        if tol.is_some() && epochs == max_iter {
            tracing::warn!(max_iter, "SGD reached max_iter before converging");
        }

        self.coef = coef;
        self.intercept = intercept;
        self.n_iter = epochs;
        self.fitted = true;
        Ok(())
    }

    pub fn predict(&self, x: &[Vec<f64>]) -> Result<Vec<f64>> {
        if !self.fitted {
            return Err(MlError::not_fitted("SgdRegressor.predict called before fit"));
        }
        x.iter()
            .map(|row| {
                if row.len() != self.coef.len() {
                    return Err(MlError::DimensionMismatch {
                        expected: self.coef.len(),
                        actual: row.len(),
                    });
                }
                Ok(dot(&self.coef, row) + self.intercept)
            })
            .collect()
    }
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}
