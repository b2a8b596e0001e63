use super::tensor1d::Tensor1D;
use crate::backend::Backend;
use crate::error::{LinRegError, Result};
use std::marker::PhantomData;

/// Backend-typed 2D tensor (row-major feature matrix).
#[derive(Clone)]
pub struct Tensor2D<B: Backend> {
    pub(crate) data: B::Tensor2D,
    pub(crate) backend: PhantomData<B>,
}

impl<B: Backend> std::fmt::Debug for Tensor2D<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (rows, cols) = self.shape();
        f.debug_struct("Tensor2D")
            .field("rows", &rows)
            .field("cols", &cols)
            .finish()
    }
}

impl<B: Backend> Tensor2D<B> {
    /// Creates a tensor from row-major `f32` data.
    ///
    /// # Panics
    /// If `data.len() != rows * cols`.
    pub fn new(data: Vec<f32>, rows: usize, cols: usize) -> Self {
        Self {
            data: B::from_vec_2d(data, rows, cols),
            backend: PhantomData,
        }
    }

    /// Builds a tensor from row vectors, checking every row against `cols`.
    ///
    /// # Errors
    /// [`LinRegError::ShapeMismatch`] when a row has a different length.
    ///
    /// ```
    /// use linreg_parity::backend::{CpuBackend, Tensor2D};
    ///
    /// let rows = vec![vec![1.0, 2.0], vec![3.0, 4.0]];
    /// let t = Tensor2D::<CpuBackend>::from_rows(&rows, 2).unwrap();
    /// assert_eq!(t.shape(), (2, 2));
    /// assert!(Tensor2D::<CpuBackend>::from_rows(&rows, 3).is_err());
    /// ```
    pub fn from_rows(rows: &[Vec<f32>], cols: usize) -> Result<Self> {
        if let Some(bad) = rows.iter().find(|r| r.len() != cols) {
            return Err(LinRegError::ShapeMismatch {
                expected: cols,
                got: bad.len(),
            });
        }
        let flat: Vec<f32> = rows.iter().flat_map(|r| r.iter()).copied().collect();
        Ok(Self::new(flat, rows.len(), cols))
    }

    /// `self · v`, one value per row.
    pub fn dot(&self, other: &Tensor1D<B>) -> Tensor1D<B> {
        Tensor1D {
            data: B::matvec(&self.data, &other.data),
            backend: PhantomData,
        }
    }

    /// `selfᵀ · v`, one value per column.
    pub fn tdot(&self, other: &Tensor1D<B>) -> Tensor1D<B> {
        Tensor1D {
            data: B::matvec_transposed(&self.data, &other.data),
            backend: PhantomData,
        }
    }

    /// Flattens in row-major order.
    pub fn ravel(&self) -> Tensor1D<B> {
        Tensor1D {
            data: B::ravel_2d(&self.data),
            backend: PhantomData,
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        B::shape(&self.data)
    }

    pub fn rows(&self) -> usize {
        self.shape().0
    }

    pub fn cols(&self) -> usize {
        self.shape().1
    }
}
