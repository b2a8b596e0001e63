//! Dataset abstractions for mini-batch training.
//!
//! This module provides a generic [`Dataset`] trait for uniform access to training data
//! and a [`DatasetBatchIter`] iterator that slices it into contiguous batches on any backend.
//!
//! # Core Concepts
//!
//! - **Dataset**: a source of `(X, y)` pairs where `X` is a feature matrix of shape `(n_samples, n_features)`
//!   and `y` is a target vector of shape `(n_samples,)`.
//! - **Batch**: a contiguous subset of samples for mini-batch gradient descent. Batches are
//!   taken in storage order; any shuffling happens once, when the data is ingested.
//!
//! # Example
//!
//! ```rust
//! use linreg_parity::dataset::{Dataset, InMemoryDataset};
//! use linreg_parity::backend::CpuBackend;
//!
//! let x = vec![vec![1.0], vec![2.0], vec![3.0]];
//! let y = vec![0.0, 1.0, 2.0];
//! let dataset = InMemoryDataset::new(x, y).unwrap();
//!
//! let sizes: Vec<usize> = dataset
//!     .batches::<CpuBackend>(2)
//!     .map(|batch| batch.unwrap().0.rows())
//!     .collect();
//! assert_eq!(sizes, vec![2, 1]);
//! ```

use crate::backend::{Backend, Tensor1D, Tensor2D};
use crate::error::LinRegError;
use std::{fmt::Debug, ops::Range};

pub mod memory;
pub use self::memory::InMemoryDataset;

/// Abstract interface for a regression dataset.
///
/// Defines a contract for loading data in `(X, y)` format where:
/// - `X`: feature matrix with shape `(n_samples, n_features)`
/// - `y`: target vector with shape `(n_samples,)`
///
/// # Example Implementation
///
/// ```rust
/// use linreg_parity::dataset::Dataset;
/// use linreg_parity::backend::{Backend, Tensor1D, Tensor2D};
/// use linreg_parity::error::LinRegError;
/// use std::ops::Range;
///
/// struct Constant { n: usize }
///
/// impl Dataset for Constant {
///     type Error = LinRegError;
///
///     fn len(&self) -> Option<usize> {
///         Some(self.n)
///     }
///
///     fn get_batch<B: Backend>(
///         &self,
///         range: Range<usize>,
///     ) -> Result<(Tensor2D<B>, Tensor1D<B>), Self::Error> {
///         let n = range.len();
///         Ok((Tensor2D::new(vec![1.0; n], n, 1), Tensor1D::new(vec![1.0; n])))
///     }
/// }
///
/// let ds = Constant { n: 5 };
/// assert_eq!(ds.batches::<linreg_parity::backend::CpuBackend>(2).count(), 3);
/// ```
pub trait Dataset {
    /// Error type returned when accessing data.
    type Error: Debug + Into<LinRegError> + 'static;

    /// Returns the total number of samples in the dataset, if known.
    ///
    /// `None` means the size is unknown; such a dataset yields no batches.
    fn len(&self) -> Option<usize>;

    /// Checks whether the dataset is empty.
    fn is_empty(&self) -> bool {
        self.len() == Some(0)
    }

    /// Creates an iterator over fixed-size batches.
    ///
    /// Returns batches of size `batch_size`, except possibly the last one.
    /// The iterator is restartable: calling `batches` again yields the same
    /// sequence.
    ///
    /// # Panics
    /// If `batch_size == 0`.
    fn batches<B: Backend>(&self, batch_size: usize) -> DatasetBatchIter<'_, B, Self>
    where
        Self: Sized,
    {
        assert!(batch_size > 0, "batch_size must be positive");
        DatasetBatchIter {
            dataset: self,
            batch_size,
            current: 0,
            _backend: std::marker::PhantomData,
        }
    }

    /// Loads the samples in `range` (`[start, end)`) as tensors.
    ///
    /// Returns a feature matrix `(n, n_features)` and a target vector `(n,)`,
    /// or an error for an out-of-bounds range.
    fn get_batch<B: Backend>(
        &self,
        range: Range<usize>,
    ) -> Result<(Tensor2D<B>, Tensor1D<B>), Self::Error>;
}

/// Iterator over dataset batches.
///
/// Created by [`Dataset::batches`]. Data is fetched lazily when `next()` is
/// called; errors from `get_batch` are forwarded as `Some(Err(e))`.
pub struct DatasetBatchIter<'a, B: Backend, D: ?Sized> {
    dataset: &'a D,
    batch_size: usize,
    /// Index of the next sample to yield.
    current: usize,
    _backend: std::marker::PhantomData<B>,
}

impl<B: Backend, D: Dataset> Iterator for DatasetBatchIter<'_, B, D> {
    type Item = Result<(Tensor2D<B>, Tensor1D<B>), D::Error>;

    fn next(&mut self) -> Option<Self::Item> {
        let total = self.dataset.len()?;
        if self.current >= total {
            return None;
        }

        let end = (self.current + self.batch_size).min(total);
        let range = self.current..end;
        self.current = end;

        Some(self.dataset.get_batch::<B>(range))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::CpuBackend;
    use std::ops::Range;

    // Mock dataset for iterator logic testing
    struct MockDataset {
        len: usize,
    }

    impl Dataset for MockDataset {
        type Error = LinRegError;

        fn len(&self) -> Option<usize> {
            Some(self.len)
        }

        fn get_batch<B: Backend>(
            &self,
            range: Range<usize>,
        ) -> Result<(Tensor2D<B>, Tensor1D<B>), Self::Error> {
            if range.start >= self.len || range.end > self.len {
                return Err(LinRegError::BatchOutOfRange {
                    start: range.start,
                    end: range.end,
                    len: self.len,
                });
            }

            let n = range.len();
            let start = range.start;

            // X: (n, 2) with unique values per sample
            let x_data: Vec<f32> = (0..n * 2).map(|i| (start * 2 + i) as f32).collect();
            let x = Tensor2D::<B>::new(x_data, n, 2);

            // y: sequential values starting from `start`
            let y_data: Vec<f32> = (start..range.end).map(|i| i as f32).collect();
            let y = Tensor1D::<B>::new(y_data);

            Ok((x, y))
        }
    }

    #[test]
    fn test_dataset_is_empty() {
        assert!(MockDataset { len: 0 }.is_empty());
        assert!(!MockDataset { len: 1 }.is_empty());
    }

    #[test]
    fn test_batches_full() {
        let dataset = MockDataset { len: 6 };
        let mut iter = dataset.batches::<CpuBackend>(2);

        for i in 0..3 {
            let (x, y) = iter.next().unwrap().unwrap();
            assert_eq!(x.shape(), (2, 2));
            assert_eq!(y.to_vec(), vec![i as f64 * 2.0, i as f64 * 2.0 + 1.0]);
        }
        assert!(iter.next().is_none());
    }

    #[test]
    fn test_batches_partial_last() {
        let dataset = MockDataset { len: 5 };
        let mut iter = dataset.batches::<CpuBackend>(2);

        assert_eq!(iter.next().unwrap().unwrap().0.shape(), (2, 2));
        assert_eq!(iter.next().unwrap().unwrap().0.shape(), (2, 2));
        assert_eq!(iter.next().unwrap().unwrap().0.shape(), (1, 2));
        assert!(iter.next().is_none());
    }

    #[test]
    fn test_batches_larger_than_dataset() {
        let dataset = MockDataset { len: 3 };
        let mut iter = dataset.batches::<CpuBackend>(10);

        let batch = iter.next().unwrap().unwrap();
        assert_eq!(batch.0.shape(), (3, 2));
        assert!(iter.next().is_none());
    }

    #[test]
    fn test_batches_empty_dataset() {
        let dataset = MockDataset { len: 0 };
        assert!(dataset.batches::<CpuBackend>(2).next().is_none());
    }

    #[test]
    fn test_batches_restartable() {
        let dataset = MockDataset { len: 7 };
        let first: Vec<Vec<f64>> = dataset
            .batches::<CpuBackend>(3)
            .map(|b| b.unwrap().1.to_vec())
            .collect();
        let second: Vec<Vec<f64>> = dataset
            .batches::<CpuBackend>(3)
            .map(|b| b.unwrap().1.to_vec())
            .collect();
        assert_eq!(first, second);
    }

    #[test]
    #[should_panic(expected = "batch_size must be positive")]
    fn test_batches_zero_size_panics() {
        let dataset = MockDataset { len: 3 };
        let _ = dataset.batches::<CpuBackend>(0);
    }
}
