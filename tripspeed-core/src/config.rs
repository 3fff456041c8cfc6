//! Configuration for the preprocessing pipeline.
//!
//! Uses `figment` for layered configuration: defaults -> user config file ->
//! explicit config file -> environment. The user file lives at
//! `~/.config/tripspeed/config.toml`; environment keys use the `TRIPSPEED_`
//! prefix with `__` between nested keys (`TRIPSPEED_PIPELINE__BIN_WIDTH=0.5`).

use crate::error::Result;
use crate::features::filter::FeatureBounds;
use crate::features::geo::DistanceMetricKind;
use crate::features::temporal::DatetimePeriod;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::collections::BTreeMap;
use std::path::Path;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "TRIPSPEED_";

/// Settings for [`crate::pipeline::PreprocessPipeline`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Inclusive plausibility bounds, by feature name.
    #[serde(default)]
    pub bounds: FeatureBounds,
    /// Period the pickup hour is measured in.
    #[serde(default)]
    pub period: DatetimePeriod,
    /// Width of the hour buckets, in hours.
    #[serde(default = "default_bin_width")]
    pub bin_width: f64,
    /// Distance formula used for trip length.
    #[serde(default)]
    pub distance_metric: DistanceMetricKind,
    /// Human-readable column labels for reports.
    #[serde(default = "default_labels")]
    pub labels: BTreeMap<String, String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            bounds: FeatureBounds::default(),
            period: DatetimePeriod::default(),
            bin_width: default_bin_width(),
            distance_metric: DistanceMetricKind::default(),
            labels: default_labels(),
        }
    }
}

impl PipelineConfig {
    /// Label for `column`, falling back to the column name.
    pub fn label<'a>(&'a self, column: &'a str) -> &'a str {
        self.labels.get(column).map(String::as_str).unwrap_or(column)
    }
}

fn default_bin_width() -> f64 {
    1.0
}

fn default_labels() -> BTreeMap<String, String> {
    [
        ("speed", "Trip Average Speed [mph]"),
        ("distance", "Trip Distance [miles]"),
        ("trip_duration", "Trip Duration [s]"),
        ("hour_of_day", "Hour of Day"),
        ("hour_of_week", "Hour of Week (0: Mo 00:00)"),
        ("binned_hour_of_day", "Hour of Day"),
        ("binned_hour_of_week", "Hour of Week (0: Mo 00:00)"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

/// Load any serde settings type from layered sources.
///
/// Priority (highest to lowest):
/// 1. Environment variables (prefixed with `TRIPSPEED_`)
/// 2. Explicit config file (`file`)
/// 3. User config (`~/.config/tripspeed/config.toml`)
/// 4. Built-in defaults
pub fn load_config<T>(file: Option<&Path>) -> Result<T>
where
    T: Default + Serialize + DeserializeOwned,
{
    let mut figment = Figment::from(Serialized::defaults(T::default()));

    if let Some(dirs) = directories::ProjectDirs::from("dev", "tripspeed", "tripspeed") {
        let user_config = dirs.config_dir().join("config.toml");
        if user_config.exists() {
            figment = figment.merge(Toml::file(&user_config));
        }
    }

    // An explicit file must exist; only the user file is optional.
    if let Some(path) = file {
        if !path.is_file() {
            let msg = format!("Config file not found: {}", path.display());
            return Err(Box::new(figment::Error::from(msg)).into());
        }
        figment = figment.merge(Toml::file(path));
    }

    figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

    figment.extract().map_err(|e| Box::new(e).into())
}
