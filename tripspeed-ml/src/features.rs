//! Feature-set selection for the speed model.

use serde::{Deserialize, Serialize};
use std::fmt;
use tripspeed_core::FeatureTable;

use crate::error::Result;

/// Which model inputs to draw from a feature table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureSet {
    /// Distance plus the all-week sine/cosine pair.
    #[default]
    Combined,
    /// Distance plus separate weekday and weekend sine/cosine pairs.
    SeparateWeekend,
}

impl FeatureSet {
    pub fn from_flag(separate_weekend: bool) -> Self {
        if separate_weekend {
            Self::SeparateWeekend
        } else {
            Self::Combined
        }
    }

    pub fn columns(self) -> &'static [&'static str] {
        match self {
            Self::Combined => &["distance", "sine_t", "cosine_t"],
            Self::SeparateWeekend => &[
                "distance",
                "weekday_sine_t",
                "weekday_cosine_t",
                "weekend_sine_t",
                "weekend_cosine_t",
            ],
        }
    }

    pub fn width(self) -> usize {
        self.columns().len()
    }

    /// Row-major design matrix for `table`.
    pub fn matrix(self, table: &FeatureTable) -> Result<Vec<Vec<f64>>> {
        Ok(table.select(self.columns())?)
    }
}

impl fmt::Display for FeatureSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Combined => f.write_str("combined"),
            Self::SeparateWeekend => f.write_str("separate_weekend"),
        }
    }
}
