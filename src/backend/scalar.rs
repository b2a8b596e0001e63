use crate::backend::Backend;
use std::marker::PhantomData;

/// Trait for scalar operations required by numerical backends.
///
/// Implemented for the primitive floating-point type used by the backends
/// (`f64`). Arithmetic comes from the standard operator traits; the methods
/// here cover constants and host conversion.
///
/// # Example
/// ```
/// use linreg_parity::backend::ScalarOps;
///
/// assert_eq!(f64::zero(), 0.0);
/// assert_eq!(f64::from_f64(2.5).to_f64(), 2.5);
/// ```
pub trait ScalarOps:
    Clone
    + Copy
    + Send
    + Sync
    + std::ops::Add<Output = Self>
    + std::ops::Mul<Output = Self>
    + std::ops::Sub<Output = Self>
    + std::ops::Div<Output = Self>
{
    /// Returns the additive identity (zero) for this scalar type.
    fn zero() -> Self;

    /// Converts an `f64` value to this scalar type.
    fn from_f64(v: f64) -> Self;

    /// Converts this scalar to an `f64` value.
    fn to_f64(self) -> f64;
}

impl ScalarOps for f64 {
    fn zero() -> Self {
        0.0
    }

    fn from_f64(v: f64) -> Self {
        v
    }

    fn to_f64(self) -> f64 {
        self
    }
}

/// Backend-typed scalar wrapper.
///
/// Wraps a backend's native scalar type (`B::Scalar`) while carrying phantom
/// type information about its originating backend, so scalars from
/// different backends cannot be combined.
///
/// ```compile_fail
/// use linreg_parity::backend::{CpuBackend, NdarrayBackend, Scalar};
///
/// let cpu: Scalar<CpuBackend> = Scalar::new(1.0);
/// let nd: Scalar<NdarrayBackend> = Scalar::new(2.0);
/// let _ = cpu + nd;
/// ```
#[derive(Clone, Debug, Copy)]
pub struct Scalar<B: Backend> {
    pub(crate) data: B::Scalar,
    pub(crate) backend: PhantomData<B>,
}

impl<B: Backend> Scalar<B> {
    /// Creates a new scalar from an `f64` host value.
    ///
    /// ```
    /// use linreg_parity::backend::{CpuBackend, Scalar};
    ///
    /// let s: Scalar<CpuBackend> = Scalar::new(3.5);
    /// assert_eq!(s.to_f64(), 3.5);
    /// ```
    pub fn new(f: f64) -> Self {
        Self {
            data: B::scalar_f64(f),
            backend: PhantomData,
        }
    }

    /// Converts this backend scalar to a host `f64` value.
    pub fn to_f64(&self) -> f64 {
        self.data.to_f64()
    }
}

impl<B: Backend> std::ops::Add for Scalar<B> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            data: self.data + rhs.data,
            backend: PhantomData,
        }
    }
}

impl<B: Backend> std::ops::Sub for Scalar<B> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self {
            data: self.data - rhs.data,
            backend: PhantomData,
        }
    }
}

impl<B: Backend> std::ops::Mul for Scalar<B> {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self {
            data: self.data * rhs.data,
            backend: PhantomData,
        }
    }
}

/// # Panics
/// Never for `f64` backends: division by zero follows IEEE 754.
impl<B: Backend> std::ops::Div for Scalar<B> {
    type Output = Self;

    fn div(self, rhs: Self) -> Self {
        Self {
            data: self.data / rhs.data,
            backend: PhantomData,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{CpuBackend, NdarrayBackend};

    #[test]
    fn test_scalar_ops_f64() {
        assert_eq!(f64::zero(), 0.0);
        assert_eq!(f64::from_f64(3.25), 3.25);
        assert_eq!(3.25f64.to_f64(), 3.25);
    }

    #[test]
    fn test_scalar_arithmetic() {
        let a: Scalar<CpuBackend> = Scalar::new(5.0);
        let b: Scalar<CpuBackend> = Scalar::new(2.0);

        let sum = a + b;
        assert_eq!(sum.data, 7.0);

        let diff = sum - Scalar::new(3.0);
        assert_eq!(diff.data, 4.0);

        let prod = diff * Scalar::new(0.5);
        assert_eq!(prod.data, 2.0);

        let quot = prod / Scalar::new(4.0);
        assert_eq!(quot.data, 0.5);
    }

    #[test]
    fn test_scalar_same_value_across_backends() {
        let cpu: Scalar<CpuBackend> = Scalar::new(0.1);
        let nd: Scalar<NdarrayBackend> = Scalar::new(0.1);
        assert_eq!(cpu.to_f64(), nd.to_f64());
    }
}
