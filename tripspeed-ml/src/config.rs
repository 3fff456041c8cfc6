//! Configuration types for the tripspeed-ml crate.
//!
//! These are the model sub-configs referenced from the binary's `Settings`.

use serde::{Deserialize, Serialize};

/// Speed-model configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Use separate weekday/weekend cyclical channels instead of the combined pair.
    #[serde(default)]
    pub separate_weekend: bool,
    /// Column to regress on.
    #[serde(default = "default_target")]
    pub target: String,
    /// Share of rows held out for scoring, in `(0, 1)`.
    #[serde(default = "default_test_fraction")]
    pub test_fraction: f64,
    /// Seed for the train/test split and SGD shuffling.
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Optimizer hyperparameters.
    #[serde(default)]
    pub sgd: SgdConfig,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            separate_weekend: false,
            target: default_target(),
            test_fraction: default_test_fraction(),
            seed: default_seed(),
            sgd: SgdConfig::default(),
        }
    }
}

fn default_target() -> String {
    "speed".into()
}

fn default_test_fraction() -> f64 {
    0.2
}

fn default_seed() -> u64 {
    42
}

/// Stochastic gradient descent hyperparameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SgdConfig {
    /// L2 regularization strength.
    #[serde(default = "default_alpha")]
    pub alpha: f64,
    /// Initial learning rate.
    #[serde(default = "default_eta0")]
    pub eta0: f64,
    /// Exponent of the inverse-scaling learning rate.
    #[serde(default = "default_power_t")]
    pub power_t: f64,
    /// Maximum number of passes over the training data.
    #[serde(default = "default_max_iter")]
    pub max_iter: usize,
    /// Minimum epoch-loss improvement; `None` disables early stopping.
    #[serde(default = "default_tol")]
    pub tol: Option<f64>,
    /// Epochs without improvement before stopping.
    #[serde(default = "default_n_iter_no_change")]
    pub n_iter_no_change: usize,
}

impl Default for SgdConfig {
    fn default() -> Self {
        Self {
            alpha: default_alpha(),
            eta0: default_eta0(),
            power_t: default_power_t(),
            max_iter: default_max_iter(),
            tol: default_tol(),
            n_iter_no_change: default_n_iter_no_change(),
        }
    }
}

fn default_alpha() -> f64 {
    1e-4
}

fn default_eta0() -> f64 {
    0.01
}

fn default_power_t() -> f64 {
    0.25
}

fn default_max_iter() -> usize {
    1000
}

fn default_tol() -> Option<f64> {
    Some(1e-3)
}

fn default_n_iter_no_change() -> usize {
    5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_config_defaults() {
        let config = ModelConfig::default();
        assert!(!config.separate_weekend);
        assert_eq!(config.target, "speed");
        assert_eq!(config.test_fraction, 0.2);
        assert_eq!(config.seed, 42);
        assert_eq!(config.sgd.max_iter, 1000);
        assert_eq!(config.sgd.tol, Some(1e-3));
    }

    #[test]
    fn test_partial_deserialize_fills_defaults() {
        let config: ModelConfig =
            serde_json::from_str(r#"{"separate_weekend": true, "sgd": {"eta0": 0.05}}"#).unwrap();
        assert!(config.separate_weekend);
        assert_eq!(config.target, "speed");
        assert_eq!(config.sgd.eta0, 0.05);
        assert_eq!(config.sgd.alpha, 1e-4);
        assert_eq!(config.sgd.n_iter_no_change, 5);
    }
}
