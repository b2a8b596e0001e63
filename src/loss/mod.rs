use crate::backend::{Backend, Scalar, Tensor1D};

/// A differentiable loss used by the manual gradient strategy.
///
/// Implementors define:
/// - the scalar loss value (for reporting)
/// - the gradient of the loss w.r.t. the model's predictions, which is passed
///   to the model's `backward()`
pub trait Loss<B: Backend> {
    type Prediction;
    type Target;

    /// Computes the scalar loss value.
    fn loss(&self, prediction: &Self::Prediction, target: &Self::Target) -> Scalar<B>;

    /// Computes `∂L/∂pred`.
    fn grad_wrt_prediction(
        &self,
        prediction: &Self::Prediction,
        target: &Self::Target,
    ) -> Self::Prediction;
}

/// Mean Squared Error: `L = (1/n) * Σ(pred_i - target_i)²`
///
/// Gradient w.r.t. prediction: `∂L/∂pred = (pred - target) / n`
///
/// The factor of 2 is omitted; it is absorbed into the learning rate. The
/// autodiff strategies differentiate `½·MSE` by default so their updates match.
#[derive(Debug, Clone, Copy, Default)]
pub struct MSELoss;

impl<B: Backend> Loss<B> for MSELoss {
    type Prediction = Tensor1D<B>;
    type Target = Tensor1D<B>;

    fn loss(&self, pred: &Self::Prediction, target: &Self::Target) -> Scalar<B> {
        let diff = pred.sub(target);
        diff.dot(&diff) / Scalar::<B>::new(diff.len() as f64)
    }

    fn grad_wrt_prediction(&self, pred: &Self::Prediction, target: &Self::Target) -> Tensor1D<B> {
        let diff = pred.sub(target);
        let n = Scalar::<B>::new(1. / pred.len() as f64);
        diff.scale(&n)
    }
}
