use std::fmt;

use super::{check_batch, GradientStrategy};
use crate::backend::{Backend, Tensor1D, Tensor2D};
use crate::error::{LinRegError, Result};
use crate::loss::{Loss, MSELoss};
use crate::model::{Coefficients, LinearModel, TrainableModel};
use crate::optimizer::{Optimizer, SGD};

/// Closed-form gradient on any [`Backend`].
///
/// For a batch of `m` rows, `∇w = Xᵀ(ŷ − y)/m` and `∇b = mean(ŷ − y)`, then
/// `θ ← θ − lr·∇θ`. This is the gradient of `½·MSE`; the factor of two is left
/// in the learning rate.
pub struct ManualGradient<B: Backend> {
    state: Option<(LinearModel<B>, SGD<B>)>,
    loss: MSELoss,
}

impl<B: Backend> ManualGradient<B> {
    pub fn new() -> Self {
        Self {
            state: None,
            loss: MSELoss,
        }
    }

    fn state(&self) -> Result<&(LinearModel<B>, SGD<B>)> {
        self.state.as_ref().ok_or(LinRegError::NotFitted)
    }
}

impl<B: Backend> Default for ManualGradient<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: Backend> fmt::Debug for ManualGradient<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManualGradient")
            .field("backend", &B::name())
            .field("initialized", &self.state.is_some())
            .finish()
    }
}

impl<B: Backend> GradientStrategy for ManualGradient<B> {
    type Backend = B;

    fn name(&self) -> &'static str {
        "manual"
    }

    fn initialize(&mut self, initial: &Coefficients, learning_rate: f64) -> Result<()> {
        let model = LinearModel::from_params(initial.into());
        self.state = Some((model, SGD::new(learning_rate)));
        Ok(())
    }

    fn step(&mut self, x: &Tensor2D<B>, y: &Tensor2D<B>) -> Result<()> {
        let (model, optimizer) = self.state.as_mut().ok_or(LinRegError::NotFitted)?;
        check_batch(model.params().weights.len(), x, y)?;

        let target = y.ravel();
        let preds = model.forward(x);
        let grad_preds = Loss::<B>::grad_wrt_prediction(&self.loss, &preds, &target);
        let grads = model.backward(x, &grad_preds);
        let new_params = optimizer.step(model.params(), &grads);
        model.update_params(&new_params);
        Ok(())
    }

    fn forward(&self, x: &Tensor2D<B>) -> Result<Tensor1D<B>> {
        let (model, _) = self.state()?;
        let n = model.params().weights.len();
        if x.cols() != n {
            return Err(LinRegError::ShapeMismatch {
                expected: n,
                got: x.cols(),
            });
        }
        Ok(model.forward(x))
    }

    fn coefficients(&self) -> Result<Coefficients> {
        Ok(self.state()?.0.coefficients())
    }
}
