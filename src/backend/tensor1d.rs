use super::scalar::Scalar;
use super::tensor2d::Tensor2D;
use crate::backend::Backend;
use std::marker::PhantomData;

/// Backend-typed 1D tensor.
///
/// Wraps a backend's native 1D tensor (`B::Tensor1D`) and carries the backend
/// as a phantom type, so vectors from different backends never mix.
///
/// # Precision semantics
/// - [`Tensor1D::new`] accepts `Vec<f32>` for ergonomic data loading and widens
///   to the backend's `f64`
/// - [`Tensor1D::from_f64`] keeps full precision (used for model parameters)
/// - `to_vec()` returns `Vec<f64>`
///
/// # Example
/// ```
/// use linreg_parity::backend::{CpuBackend, Scalar, Tensor1D};
///
/// let x: Tensor1D<CpuBackend> = Tensor1D::new(vec![1.0f32, 2.0, 3.0]);
/// let y = x.scale(&Scalar::<CpuBackend>::new(2.0));
/// assert_eq!(y.to_vec(), vec![2.0, 4.0, 6.0]);
/// ```
#[derive(Clone)]
pub struct Tensor1D<B: Backend> {
    pub(crate) data: B::Tensor1D,
    pub(crate) backend: PhantomData<B>,
}

impl<B: Backend> std::fmt::Debug for Tensor1D<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Tensor1D").field(&self.to_vec()).finish()
    }
}

impl<B: Backend> Tensor1D<B> {
    fn wrap(data: B::Tensor1D) -> Self {
        Self {
            data,
            backend: PhantomData,
        }
    }

    /// Creates a new 1D tensor from `f32` values.
    pub fn new(data: Vec<f32>) -> Self {
        Self::wrap(B::from_vec_1d(data))
    }

    /// Creates a new 1D tensor from `f64` values without precision loss.
    pub fn from_f64(data: Vec<f64>) -> Self {
        Self::wrap(B::from_f64_1d(data))
    }

    /// Creates a 1D tensor filled with zeros.
    ///
    /// ```
    /// use linreg_parity::backend::{CpuBackend, Tensor1D};
    ///
    /// let z: Tensor1D<CpuBackend> = Tensor1D::zeros(3);
    /// assert_eq!(z.to_vec(), vec![0.0, 0.0, 0.0]);
    /// ```
    pub fn zeros(len: usize) -> Self {
        Self::wrap(B::zeros_1d(len))
    }

    /// Element-wise addition.
    pub fn add(&self, other: &Self) -> Self {
        Self::wrap(B::add_1d(&self.data, &other.data))
    }

    /// Element-wise subtraction (`self - other`).
    pub fn sub(&self, other: &Self) -> Self {
        Self::wrap(B::sub_1d(&self.data, &other.data))
    }

    /// Element-wise multiplication.
    pub fn mul(&self, other: &Self) -> Self {
        Self::wrap(B::mul_1d(&self.data, &other.data))
    }

    /// Multiplies every element by `a`.
    pub fn scale(&self, a: &Scalar<B>) -> Self {
        Self::wrap(B::mul_scalar_1d(&self.data, &a.data))
    }

    /// Adds `a` to every element.
    pub fn add_scalar(&self, a: &Scalar<B>) -> Self {
        Self::wrap(B::add_scalar_1d(&self.data, &a.data))
    }

    /// Sum of all elements.
    pub fn sum(&self) -> Scalar<B> {
        Scalar {
            data: B::sum_all_1d(&self.data),
            backend: PhantomData,
        }
    }

    /// Arithmetic mean of all elements.
    pub fn mean(&self) -> Scalar<B> {
        Scalar {
            data: B::mean_all_1d(&self.data),
            backend: PhantomData,
        }
    }

    /// Inner product.
    ///
    /// ```
    /// use linreg_parity::backend::{CpuBackend, Tensor1D};
    ///
    /// let a: Tensor1D<CpuBackend> = Tensor1D::new(vec![1.0, 2.0, 3.0]);
    /// let b: Tensor1D<CpuBackend> = Tensor1D::new(vec![4.0, 5.0, 6.0]);
    /// assert_eq!(a.dot(&b).to_f64(), 32.0);
    /// ```
    pub fn dot(&self, other: &Self) -> Scalar<B> {
        self.mul(other).sum()
    }

    /// Copies the tensor to host memory.
    pub fn to_vec(&self) -> Vec<f64> {
        B::to_vec_1d(&self.data)
    }

    pub fn len(&self) -> usize {
        B::len_1d(&self.data)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reshapes into an (n × 1) column, the form the loss and the autodiff
    /// graphs expect for targets.
    pub fn to_column(&self) -> Tensor2D<B> {
        Tensor2D {
            data: B::column_1d(&self.data),
            backend: PhantomData,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{CpuBackend, NdarrayBackend};

    #[test]
    fn test_tensor1d_new_widens_f32() {
        let t: Tensor1D<CpuBackend> = Tensor1D::new(vec![1.0, 2.5, 3.75]);
        assert_eq!(t.to_vec(), vec![1.0, 2.5, 3.75]);
    }

    #[test]
    fn test_tensor1d_from_f64_keeps_precision() {
        let v = 0.1f64 + 0.2f64;
        let t: Tensor1D<NdarrayBackend> = Tensor1D::from_f64(vec![v]);
        assert_eq!(t.to_vec(), vec![v]);
    }

    #[test]
    fn test_tensor1d_add_sub() {
        let a: Tensor1D<CpuBackend> = Tensor1D::new(vec![5.0, 3.0]);
        let b: Tensor1D<CpuBackend> = Tensor1D::new(vec![1.0, 1.0]);
        assert_eq!(a.sub(&b).to_vec(), vec![4.0, 2.0]);
        assert_eq!(a.add(&b).to_vec(), vec![6.0, 4.0]);
    }

    #[test]
    fn test_tensor1d_reductions() {
        let t: Tensor1D<NdarrayBackend> = Tensor1D::new(vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(t.sum().to_f64(), 10.0);
        assert_eq!(t.mean().to_f64(), 2.5);
    }

    #[test]
    fn test_tensor1d_add_scalar() {
        let t: Tensor1D<CpuBackend> = Tensor1D::new(vec![1.0, -1.0]);
        let shifted = t.add_scalar(&Scalar::new(0.5));
        assert_eq!(shifted.to_vec(), vec![1.5, -0.5]);
    }

    #[test]
    fn test_tensor1d_to_column() {
        let t: Tensor1D<CpuBackend> = Tensor1D::new(vec![1.0, 2.0, 3.0]);
        let col = t.to_column();
        assert_eq!(col.shape(), (3, 1));
        assert_eq!(col.ravel().to_vec(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_tensor1d_empty() {
        let t: Tensor1D<CpuBackend> = Tensor1D::zeros(0);
        assert!(t.is_empty());
        assert_eq!(t.len(), 0);
    }
}
