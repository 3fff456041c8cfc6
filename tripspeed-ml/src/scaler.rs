//! Per-column standardization to zero mean and unit variance.

use serde::{Deserialize, Serialize};

use crate::error::{MlError, Result};

/// Learns column means and population standard deviations on fit data and
/// applies `(x - mean) / scale`. Columns with zero variance get a scale of 1.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    mean: Vec<f64>,
    scale: Vec<f64>,
    fitted: bool,
}

impl StandardScaler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_fitted(&self) -> bool {
        self.fitted
    }

    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    pub fn scale(&self) -> &[f64] {
        &self.scale
    }

    pub fn fit(&mut self, x: &[Vec<f64>]) -> Result<()> {
        let width = check_matrix(x)?;
        let n = x.len() as f64;

        let mut mean = vec![0.0; width];
        for row in x {
            for (m, v) in mean.iter_mut().zip(row) {
                *m += v;
            }
        }
        mean.iter_mut().for_each(|m| *m /= n);

        let mut var = vec![0.0; width];
        for row in x {
            for ((s, v), m) in var.iter_mut().zip(row).zip(&mean) {
                *s += (v - m).powi(2);
            }
        }
        let scale = var
            .into_iter()
            .map(|s| {
                let std = (s / n).sqrt();
                if std > 0.0 && std.is_finite() { std } else { 1.0 }
            })
            .collect();

        self.mean = mean;
        self.scale = scale;
        self.fitted = true;
        Ok(())
    }

    pub fn transform(&self, x: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
        if !self.fitted {
            return Err(MlError::not_fitted("StandardScaler.transform called before fit"));
        }
        x.iter()
            .map(|row| {
                if row.len() != self.mean.len() {
                    return Err(MlError::DimensionMismatch {
                        expected: self.mean.len(),
                        actual: row.len(),
                    });
                }
                Ok(row
                    .iter()
                    .zip(&self.mean)
                    .zip(&self.scale)
                    .map(|((v, m), s)| (v - m) / s)
                    .collect())
            })
            .collect()
    }

    pub fn fit_transform(&mut self, x: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
        self.fit(x)?;
        self.transform(x)
    }
}

/// Validates a non-empty rectangular matrix of finite values and returns its width.
pub(crate) fn check_matrix(x: &[Vec<f64>]) -> Result<usize> {
    let width = x
        .first()
        .map(Vec::len)
        .ok_or_else(|| MlError::empty_dataset("no rows to fit"))?;
    if width == 0 {
        return Err(MlError::invalid_input("rows have no columns"));
    }
    for (i, row) in x.iter().enumerate() {
        if row.len() != width {
            return Err(MlError::DimensionMismatch {
                expected: width,
                actual: row.len(),
            });
        }
        if row.iter().any(|v| !v.is_finite()) {
            return Err(MlError::invalid_input(format!("row {i} has a non-finite value")));
        }
    }
    Ok(width)
}
