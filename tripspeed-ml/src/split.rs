//! Seeded train/test partitioning of feature tables.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tripspeed_core::FeatureTable;

use crate::error::{MlError, Result};

/// Randomly partition `table` into `(train, test)`.
///
/// The test part holds `ceil(test_fraction * n)` rows. Rows keep their
/// original relative order inside each part, and the same seed always
/// yields the same partition.
pub fn train_test_split(
    table: &FeatureTable,
    test_fraction: f64,
    seed: u64,
) -> Result<(FeatureTable, FeatureTable)> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(MlError::invalid_input(format!(
            "test_fraction must be in (0, 1), got {test_fraction}"
        )));
    }

    let n = table.len();
    let n_test = (test_fraction * n as f64).ceil() as usize;
    if n_test == 0 || n_test >= n {
        return Err(MlError::empty_dataset(format!(
            "cannot split {n} rows with test_fraction {test_fraction}"
        )));
    }

    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(&mut StdRng::seed_from_u64(seed));
    let (test, train) = indices.split_at_mut(n_test);
    test.sort_unstable();
    train.sort_unstable();

    tracing::debug!(train = train.len(), test = test.len(), seed, "Split feature table");
    Ok((table.take(train)?, table.take(test)?))
}
