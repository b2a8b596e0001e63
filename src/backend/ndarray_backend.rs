use super::{Backend, Tensor1D, Tensor2D};
use ndarray::{Array1, Array2, ArrayView2, Axis};
use std::marker::PhantomData;

/// CPU tensor backend built on the `ndarray` crate.
///
/// This is also the storage the autodiff engines operate on, so batches handed
/// to them never need a host copy.
///
/// # Type mappings
/// - `Scalar`: `f64`
/// - `Tensor1D`: `ndarray::Array1<f64>`
/// - `Tensor2D`: [`NdarrayTensor2D`] wrapper around `ndarray::Array2<f64>`
#[derive(Clone, Debug, Copy)]
pub struct NdarrayBackend;

/// Wrapper type for 2D tensors using ndarray's `Array2<f64>`.
///
/// # Example
/// ```
/// use linreg_parity::backend::NdarrayTensor2D;
///
/// let tensor = NdarrayTensor2D::from(&[
///     vec![1.0f64, 2.0, 3.0],
///     vec![4.0f64, 5.0, 6.0],
/// ][..]);
/// assert_eq!(tensor.0.shape(), &[2, 3]);
/// ```
#[derive(Debug, Clone)]
pub struct NdarrayTensor2D(pub Array2<f64>);

impl From<&[Vec<f64>]> for NdarrayTensor2D {
    /// Converts a slice of row vectors into a 2D tensor.
    ///
    /// # Panics
    /// If rows have inconsistent lengths.
    fn from(x: &[Vec<f64>]) -> Self {
        let rows = x.len();
        let cols = x.first().map_or(0, Vec::len);
        assert!(
            x.iter().all(|r| r.len() == cols),
            "All rows must have same length"
        );
        NdarrayTensor2D(Array2::from_shape_fn((rows, cols), |(i, j)| x[i][j]))
    }
}

impl From<Array2<f64>> for NdarrayTensor2D {
    fn from(a: Array2<f64>) -> Self {
        NdarrayTensor2D(a)
    }
}

impl Backend for NdarrayBackend {
    type Scalar = f64;
    type Tensor1D = Array1<f64>;
    type Tensor2D = NdarrayTensor2D;

    fn name() -> &'static str {
        "ndarray"
    }

    fn zeros_1d(len: usize) -> Self::Tensor1D {
        Array1::zeros(len)
    }

    fn from_vec_1d(data: Vec<f32>) -> Self::Tensor1D {
        data.into_iter().map(f64::from).collect()
    }

    fn from_f64_1d(data: Vec<f64>) -> Self::Tensor1D {
        Array1::from_vec(data)
    }

    /// # Panics
    /// If `data.len() != rows * cols`.
    fn from_vec_2d(data: Vec<f32>, rows: usize, cols: usize) -> Self::Tensor2D {
        assert_eq!(data.len(), rows * cols, "Inconsistent shape");
        NdarrayTensor2D(Array2::from_shape_fn((rows, cols), |(i, j)| {
            f64::from(data[i * cols + j])
        }))
    }

    fn add_1d(a: &Self::Tensor1D, b: &Self::Tensor1D) -> Self::Tensor1D {
        a + b
    }

    fn sub_1d(a: &Self::Tensor1D, b: &Self::Tensor1D) -> Self::Tensor1D {
        a - b
    }

    fn mul_1d(a: &Self::Tensor1D, b: &Self::Tensor1D) -> Self::Tensor1D {
        a * b
    }

    fn mul_scalar_1d(t: &Self::Tensor1D, s: &Self::Scalar) -> Self::Tensor1D {
        t * *s
    }

    fn add_scalar_1d(t: &Self::Tensor1D, s: &Self::Scalar) -> Self::Tensor1D {
        t + *s
    }

    fn sum_all_1d(t: &Self::Tensor1D) -> Self::Scalar {
        t.sum()
    }

    /// Mean of all elements; `NaN` for an empty tensor, matching [`CpuBackend`](super::CpuBackend).
    fn mean_all_1d(t: &Self::Tensor1D) -> Self::Scalar {
        t.mean().unwrap_or(f64::NAN)
    }

    fn scalar_f64(value: f64) -> Self::Scalar {
        value
    }

    fn to_vec_1d(t: &Self::Tensor1D) -> Vec<f64> {
        t.to_vec()
    }

    fn len_1d(t: &Self::Tensor1D) -> usize {
        t.len()
    }

    /// Matrix-vector multiplication: `A @ x`.
    ///
    /// # Panics
    /// If matrix columns != vector length.
    ///
    /// # Example
    /// ```
    /// // [[1, 2],    [1]   [5]
    /// //  [3, 4]] @ [2] = [11]
    /// use linreg_parity::backend::{Backend, NdarrayBackend, NdarrayTensor2D};
    /// use ndarray::Array1;
    ///
    /// let a = NdarrayTensor2D::from(&[vec![1.0, 2.0], vec![3.0, 4.0]][..]);
    /// let x = Array1::from_vec(vec![1.0, 2.0]);
    /// let y = NdarrayBackend::matvec(&a, &x);
    /// assert_eq!(y.to_vec(), vec![5.0, 11.0]);
    /// ```
    fn matvec(a: &Self::Tensor2D, x: &Self::Tensor1D) -> Self::Tensor1D {
        a.0.dot(x)
    }

    /// Transposed matrix-vector multiplication: `Aᵀ @ x`.
    fn matvec_transposed(a: &Self::Tensor2D, x: &Self::Tensor1D) -> Self::Tensor1D {
        a.0.t().dot(x)
    }

    fn shape(t: &Self::Tensor2D) -> (usize, usize) {
        t.0.dim()
    }

    fn column_1d(t: &Self::Tensor1D) -> Self::Tensor2D {
        NdarrayTensor2D(t.clone().insert_axis(Axis(1)))
    }

    fn ravel_2d(x: &Self::Tensor2D) -> Self::Tensor1D {
        x.0.iter().copied().collect()
    }
}

impl Tensor2D<NdarrayBackend> {
    /// Borrows the underlying array.
    pub fn as_array(&self) -> ArrayView2<'_, f64> {
        self.data.0.view()
    }

    pub fn from_array(a: Array2<f64>) -> Self {
        Self {
            data: NdarrayTensor2D(a),
            backend: PhantomData,
        }
    }
}

impl Tensor1D<NdarrayBackend> {
    pub fn from_array(a: Array1<f64>) -> Self {
        Self {
            data: a,
            backend: PhantomData,
        }
    }

    pub fn as_array(&self) -> &Array1<f64> {
        &self.data
    }
}
