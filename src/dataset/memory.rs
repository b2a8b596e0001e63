use std::ops::Range;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::backend::{Backend, Tensor1D, Tensor2D};
use crate::dataset::Dataset;
use crate::error::{LinRegError, Result};

/// Feature matrix and targets held in host memory.
///
/// Row `i` of `x` always pairs with `y[i]`; the only mutation after
/// construction is the single shuffle permutation applied by [`ingest`](Self::ingest).
#[derive(Debug, Clone)]
pub struct InMemoryDataset {
    x: Vec<Vec<f32>>,
    y: Vec<f32>,
    n_inputs: usize,
}

impl InMemoryDataset {
    /// Builds a dataset without shuffling.
    pub fn new(x: Vec<Vec<f32>>, y: Vec<f32>) -> Result<Self> {
        Self::ingest(x, y, false, None)
    }

    /// Validates and stores `(x, y)`, optionally applying one uniform random
    /// permutation to both.
    ///
    /// With `seed = Some(s)` the permutation is reproducible; with `None` the
    /// RNG is seeded from OS entropy.
    ///
    /// # Errors
    /// - [`LinRegError::DimensionMismatch`] if `x.len() != y.len()`
    /// - [`LinRegError::ShapeMismatch`] if a row's width differs from the first row's
    /// - [`LinRegError::EmptyDataset`] if there are no rows
    ///
    /// ```
    /// use linreg_parity::dataset::InMemoryDataset;
    ///
    /// let x = vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]];
    /// let y = vec![1.0, 2.0, 3.0];
    /// let ds = InMemoryDataset::ingest(x, y, true, Some(7)).unwrap();
    /// assert_eq!((ds.n_examples(), ds.n_inputs()), (3, 2));
    /// ```
    pub fn ingest(
        mut x: Vec<Vec<f32>>,
        mut y: Vec<f32>,
        shuffle: bool,
        seed: Option<u64>,
    ) -> Result<Self> {
        if x.len() != y.len() {
            return Err(LinRegError::DimensionMismatch {
                features: x.len(),
                targets: y.len(),
            });
        }
        let n_inputs = match x.first() {
            Some(row) => row.len(),
            None => return Err(LinRegError::EmptyDataset),
        };
        if let Some(bad) = x.iter().position(|row| row.len() != n_inputs) {
            log::debug!(
                "row {bad} has {} features, expected {n_inputs}",
                x[bad].len()
            );
            return Err(LinRegError::ShapeMismatch {
                expected: n_inputs,
                got: x[bad].len(),
            });
        }

        if shuffle {
            let mut rng = match seed {
                Some(s) => StdRng::seed_from_u64(s),
                None => StdRng::from_os_rng(),
            };
            let mut order: Vec<usize> = (0..x.len()).collect();
            order.shuffle(&mut rng);
            x = order.iter().map(|&i| std::mem::take(&mut x[i])).collect();
            y = order.iter().map(|&i| y[i]).collect();
        }

        log::debug!(
            "ingested {} examples with {n_inputs} inputs (shuffled: {shuffle})",
            x.len()
        );
        Ok(Self { x, y, n_inputs })
    }

    pub fn n_examples(&self) -> usize {
        self.x.len()
    }

    pub fn n_inputs(&self) -> usize {
        self.n_inputs
    }

    /// Rows in storage order.
    pub fn features(&self) -> &[Vec<f32>] {
        &self.x
    }

    /// Targets in storage order.
    pub fn targets(&self) -> &[f32] {
        &self.y
    }
}

impl Dataset for InMemoryDataset {
    type Error = LinRegError;

    fn len(&self) -> Option<usize> {
        Some(self.x.len())
    }

    fn get_batch<B: Backend>(
        &self,
        range: Range<usize>,
    ) -> std::result::Result<(Tensor2D<B>, Tensor1D<B>), Self::Error> {
        let out_of_range = || LinRegError::BatchOutOfRange {
            start: range.start,
            end: range.end,
            len: self.x.len(),
        };
        let batch_x = self.x.get(range.clone()).ok_or_else(out_of_range)?;
        let batch_y = self.y.get(range.clone()).ok_or_else(out_of_range)?;

        let x_tensor = Tensor2D::<B>::from_rows(batch_x, self.n_inputs)?;
        let y_tensor = Tensor1D::<B>::new(batch_y.to_vec());

        Ok((x_tensor, y_tensor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{CpuBackend, NdarrayBackend};

    fn sample(n: usize) -> (Vec<Vec<f32>>, Vec<f32>) {
        let x = (0..n).map(|i| vec![i as f32, 10.0 * i as f32]).collect();
        let y = (0..n).map(|i| i as f32).collect();
        (x, y)
    }

    #[test]
    fn test_ingest_length_mismatch() {
        let err = InMemoryDataset::new(vec![vec![1.0], vec![2.0]], vec![1.0]).unwrap_err();
        assert!(matches!(
            err,
            LinRegError::DimensionMismatch {
                features: 2,
                targets: 1
            }
        ));
    }

    #[test]
    fn test_ingest_ragged_rows() {
        let x = vec![vec![1.0, 2.0], vec![3.0]];
        let err = InMemoryDataset::new(x, vec![0.0, 1.0]).unwrap_err();
        assert!(matches!(
            err,
            LinRegError::ShapeMismatch {
                expected: 2,
                got: 1
            }
        ));
    }

    #[test]
    fn test_ingest_empty() {
        let err = InMemoryDataset::new(vec![], vec![]).unwrap_err();
        assert!(matches!(err, LinRegError::EmptyDataset));
    }

    #[test]
    fn test_shuffle_keeps_pairs_together() {
        let (x, y) = sample(50);
        let ds = InMemoryDataset::ingest(x, y, true, Some(42)).unwrap();

        for (row, &target) in ds.features().iter().zip(ds.targets()) {
            assert_eq!(row[0], target);
            assert_eq!(row[1], 10.0 * target);
        }
        let mut seen: Vec<f32> = ds.targets().to_vec();
        seen.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(seen, sample(50).1);
    }

    #[test]
    fn test_shuffle_is_seeded() {
        let (x, y) = sample(30);
        let a = InMemoryDataset::ingest(x.clone(), y.clone(), true, Some(3)).unwrap();
        let b = InMemoryDataset::ingest(x, y, true, Some(3)).unwrap();
        assert_eq!(a.targets(), b.targets());
    }

    #[test]
    fn test_no_shuffle_keeps_order() {
        let (x, y) = sample(10);
        let ds = InMemoryDataset::ingest(x, y.clone(), false, Some(1)).unwrap();
        assert_eq!(ds.targets(), &y[..]);
    }

    #[test]
    fn test_batches_partition_all_rows() {
        let (x, y) = sample(103);
        let ds = InMemoryDataset::ingest(x, y, true, Some(9)).unwrap();

        let mut collected = Vec::new();
        let mut sizes = Vec::new();
        for batch in ds.batches::<NdarrayBackend>(10) {
            let (xb, yb) = batch.unwrap();
            assert_eq!(xb.rows(), yb.len());
            sizes.push(yb.len());
            collected.extend(yb.to_vec());
        }

        assert_eq!(sizes.len(), 11);
        assert!(sizes[..10].iter().all(|&s| s == 10));
        assert_eq!(sizes[10], 3);

        let stored: Vec<f64> = ds.targets().iter().map(|&v| f64::from(v)).collect();
        assert_eq!(collected, stored);
    }

    #[test]
    fn test_get_batch_out_of_range() {
        let (x, y) = sample(4);
        let ds = InMemoryDataset::new(x, y).unwrap();
        let err = ds.get_batch::<CpuBackend>(2..6).unwrap_err();
        assert!(matches!(
            err,
            LinRegError::BatchOutOfRange {
                start: 2,
                end: 6,
                len: 4
            }
        ));
    }
}
