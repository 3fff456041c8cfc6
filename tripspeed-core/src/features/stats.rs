//! Summary statistics over feature columns.

use crate::data::table::{Column, FeatureTable};
use serde::{Deserialize, Serialize};

/// Distribution statistics of one numeric column. Non-finite values are
/// skipped and counted separately.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionStats {
    pub count: usize,
    pub non_finite: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub median: f64,
    pub quartiles: [f64; 3],
}

impl DistributionStats {
    /// `None` if there is no finite value.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let mut finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if finite.is_empty() {
            return None;
        }
        finite.sort_by(f64::total_cmp);

        let n = finite.len() as f64;
        let mean = finite.iter().sum::<f64>() / n;
        // Sample standard deviation, zero for a single value.
        let std_dev = if finite.len() > 1 {
            (finite.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0)).sqrt()
        } else {
            0.0
        };
        let quartiles = [
            quantile(&finite, 0.25),
            quantile(&finite, 0.5),
            quantile(&finite, 0.75),
        ];

        Some(Self {
            count: finite.len(),
            non_finite: values.len() - finite.len(),
            mean,
            std_dev,
            min: finite[0],
            max: finite[finite.len() - 1],
            median: quartiles[1],
            quartiles,
        })
    }
}

/// Linearly interpolated quantile of sorted, non-empty data.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * frac
}

/// Statistics for every numeric column of `table`, in column order.
/// Columns without a finite value are omitted.
pub fn describe(table: &FeatureTable) -> Vec<(&'static str, DistributionStats)> {
    Column::ALL
        .into_iter()
        .filter_map(|column| {
            let values: Vec<f64> = table.iter().map(|row| column.value(row)).collect();
            DistributionStats::from_values(&values).map(|s| (column.name(table.period()), s))
        })
        .collect()
}
