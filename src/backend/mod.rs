//! # Backend Abstraction
//!
//! Trait-based abstraction over the numeric storage used by the manual-gradient
//! strategy. Models written against [`Backend`] run unchanged on the pure-Rust
//! [`CpuBackend`] and on the `ndarray`-backed [`NdarrayBackend`].
//!
//! ## Design Philosophy
//!
//! - **Minimal trait surface**: only the operations linear regression needs
//!   (affine forward, transposed product for the weight gradient, reductions).
//! - **Zero-cost generics**: backend selection happens at compile time via type
//!   parameters.
//! - **Type-safe tensor handling**: [`Tensor1D`], [`Tensor2D`] and [`Scalar`]
//!   carry their backend as a phantom type, so tensors from different backends
//!   never mix.
//!
//! ## Available Backends
//!
//! | Backend          | Storage                 | Use Case                          |
//! |------------------|-------------------------|-----------------------------------|
//! | `CpuBackend`     | `Vec<f64>` (row-major)  | Reference pure-Rust implementation |
//! | `NdarrayBackend` | `ndarray::Array{1,2}`   | Shared storage with the autodiff engines |
//!
//! ## Example
//!
//! ```rust
//! use linreg_parity::backend::{CpuBackend, Tensor1D, Tensor2D};
//!
//! let w: Tensor1D<CpuBackend> = Tensor1D::new(vec![0.5, 0.5]);
//! let x: Tensor2D<CpuBackend> = Tensor2D::new(vec![1.0, 2.0, 3.0, 4.0], 2, 2);
//! let y = x.dot(&w);
//! assert_eq!(y.to_vec(), vec![1.5, 3.5]);
//! ```

pub mod cpu;
pub use cpu::{CpuBackend, CpuTensor2D};

mod ndarray_backend;
pub use ndarray_backend::{NdarrayBackend, NdarrayTensor2D};

/// Scalar value representation and arithmetic operations.
pub mod scalar;
/// One-dimensional tensor abstraction.
pub mod tensor1d;
/// Two-dimensional tensor abstraction.
pub mod tensor2d;

pub use scalar::{Scalar, ScalarOps};
pub use tensor1d::Tensor1D;
pub use tensor2d::Tensor2D;

/// Abstraction over tensor storage and the operations linear regression needs.
///
/// # Safety Guarantees
///
/// - `matvec` / `matvec_transposed` validate shapes and panic on mismatch;
///   public entry points of the crate validate shapes beforehand and return
///   [`LinRegError::ShapeMismatch`](crate::error::LinRegError::ShapeMismatch)
///   instead of reaching these panics.
/// - Tensor types are `Clone + Send + Sync`.
pub trait Backend: Clone + Copy + std::fmt::Debug + 'static {
    /// Scalar type supporting arithmetic operations.
    type Scalar: ScalarOps + std::fmt::Debug;

    /// One-dimensional tensor type.
    type Tensor1D: Clone + Send + Sync;

    /// Two-dimensional tensor type.
    type Tensor2D: Clone + Send + Sync;

    /// Short human-readable name used in logs.
    fn name() -> &'static str;

    // --- Constructors ---

    /// Creates a 1D tensor filled with zeros of given length.
    fn zeros_1d(len: usize) -> Self::Tensor1D;

    /// Constructs a 1D tensor from `f32` host data (widened to `f64`).
    fn from_vec_1d(data: Vec<f32>) -> Self::Tensor1D;

    /// Constructs a 1D tensor from `f64` host data without precision loss.
    fn from_f64_1d(data: Vec<f64>) -> Self::Tensor1D;

    /// Constructs a 2D tensor from row-major ordered data.
    ///
    /// # Panics
    /// If `data.len() != rows * cols`.
    fn from_vec_2d(data: Vec<f32>, rows: usize, cols: usize) -> Self::Tensor2D;

    // --- Element-wise operations (1D) ---

    /// Element-wise addition.
    ///
    /// # Panics
    /// If tensors have different lengths.
    fn add_1d(a: &Self::Tensor1D, b: &Self::Tensor1D) -> Self::Tensor1D;

    /// Element-wise subtraction.
    ///
    /// # Panics
    /// If tensors have different lengths.
    fn sub_1d(a: &Self::Tensor1D, b: &Self::Tensor1D) -> Self::Tensor1D;

    /// Element-wise multiplication.
    ///
    /// # Panics
    /// If tensors have different lengths.
    fn mul_1d(a: &Self::Tensor1D, b: &Self::Tensor1D) -> Self::Tensor1D;

    /// Multiplies each element by a scalar.
    fn mul_scalar_1d(t: &Self::Tensor1D, s: &Self::Scalar) -> Self::Tensor1D;

    /// Adds a scalar to each element.
    fn add_scalar_1d(t: &Self::Tensor1D, s: &Self::Scalar) -> Self::Tensor1D;

    // --- Reductions ---

    /// Sum of all elements.
    fn sum_all_1d(t: &Self::Tensor1D) -> Self::Scalar;

    /// Arithmetic mean of all elements (`NaN` for an empty tensor).
    fn mean_all_1d(t: &Self::Tensor1D) -> Self::Scalar;

    // --- Scalars and host access ---

    /// Creates a backend scalar from an `f64` value.
    fn scalar_f64(value: f64) -> Self::Scalar;

    /// Copies a 1D tensor to host memory.
    fn to_vec_1d(t: &Self::Tensor1D) -> Vec<f64>;

    /// Number of elements in a 1D tensor.
    fn len_1d(t: &Self::Tensor1D) -> usize;

    // --- Linear algebra ---

    /// `y = A · x` where `A` is (m × n) and `x` is (n,).
    ///
    /// # Panics
    /// If `A.cols() != x.len()`.
    fn matvec(a: &Self::Tensor2D, x: &Self::Tensor1D) -> Self::Tensor1D;

    /// `y = Aᵀ · x` where `A` is (m × n) and `x` is (m,).
    ///
    /// # Panics
    /// If `A.rows() != x.len()`.
    fn matvec_transposed(a: &Self::Tensor2D, x: &Self::Tensor1D) -> Self::Tensor1D;

    /// Returns the shape of a 2D tensor as (rows, cols).
    fn shape(t: &Self::Tensor2D) -> (usize, usize);

    // --- Reshaping ---

    /// Reshapes a length-`n` vector into an (n × 1) column.
    fn column_1d(t: &Self::Tensor1D) -> Self::Tensor2D;

    /// Flattens a 2D tensor in row-major order.
    fn ravel_2d(t: &Self::Tensor2D) -> Self::Tensor1D;
}
