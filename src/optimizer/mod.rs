use crate::backend::{Backend, Scalar};
use crate::model::ParamOps;

/// Trait for gradient-based optimizers.
///
/// Training logic (the trainer and the gradient strategies) is decoupled from
/// the parameter update rule, so any parameter set implementing [`ParamOps`]
/// can be paired with any optimizer without dynamic dispatch.
///
/// # Example
/// ```rust
/// use linreg_parity::backend::{CpuBackend, Scalar, Tensor1D};
/// use linreg_parity::model::LinearParams;
/// use linreg_parity::optimizer::{Optimizer, SGD};
///
/// let params = LinearParams {
///     weights: Tensor1D::<CpuBackend>::new(vec![1.0, 2.0]),
///     bias: Scalar::<CpuBackend>::new(0.5),
/// };
/// let grads = LinearParams {
///     weights: Tensor1D::<CpuBackend>::new(vec![1.0, -1.0]),
///     bias: Scalar::<CpuBackend>::new(1.0),
/// };
/// let updated = SGD::<CpuBackend>::new(0.5).step(&params, &grads);
/// assert_eq!(updated.weights.to_vec(), vec![0.5, 2.5]);
/// assert_eq!(updated.bias.to_f64(), 0.0);
/// ```
pub trait Optimizer<B: Backend, P> {
    /// Returns `params - learning_rate * gradients` as a new value.
    fn step(&self, params: &P, gradients: &P) -> P;
}

/// Plain stochastic gradient descent: `θ ← θ - η · ∇L(θ)`.
///
/// Stateless (no momentum), immutable update semantics.
#[derive(Clone, Debug)]
pub struct SGD<B: Backend> {
    lr: Scalar<B>,
}

impl<B: Backend> SGD<B> {
    pub fn new(lr: f64) -> Self {
        Self {
            lr: Scalar::<B>::new(lr),
        }
    }

    pub fn learning_rate(&self) -> f64 {
        self.lr.to_f64()
    }
}

impl<B: Backend, P: ParamOps<B>> Optimizer<B, P> for SGD<B> {
    fn step(&self, params: &P, grads: &P) -> P {
        // a + (-b) rounds identically to a - b
        let neg_lr = Scalar::<B>::new(0.0) - self.lr;
        params.add(&grads.scale(neg_lr))
    }
}
