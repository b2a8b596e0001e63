use super::{check_batch, GradientStrategy};
use crate::autodiff::eager::{Linear, Sgd};
use crate::autodiff::tape::Tape;
use crate::autodiff::Objective;
use crate::backend::{NdarrayBackend, Tensor1D, Tensor2D};
use crate::error::{LinRegError, Result};
use crate::model::Coefficients;

/// Define-by-run reverse-mode autodiff.
///
/// Every step records a fresh [`Tape`]: forward through a [`Linear`] layer,
/// build the objective, `backward`, copy gradients into the parameters,
/// `step`, `zero_grad`.
#[derive(Debug, Clone, Default)]
pub struct EagerAutodiff {
    objective: Objective,
    state: Option<(Linear, Sgd)>,
}

impl EagerAutodiff {
    /// Differentiates [`Objective::HalfMse`].
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_objective(objective: Objective) -> Self {
        Self {
            objective,
            state: None,
        }
    }

    pub fn objective(&self) -> Objective {
        self.objective
    }
}

impl GradientStrategy for EagerAutodiff {
    type Backend = NdarrayBackend;

    fn name(&self) -> &'static str {
        "eager-autodiff"
    }

    fn initialize(&mut self, initial: &Coefficients, learning_rate: f64) -> Result<()> {
        self.state = Some((Linear::from_coefficients(initial), Sgd::new(learning_rate)));
        Ok(())
    }

    fn step(&mut self, x: &Tensor2D<NdarrayBackend>, y: &Tensor2D<NdarrayBackend>) -> Result<()> {
        let (layer, sgd) = self.state.as_mut().ok_or(LinRegError::NotFitted)?;
        check_batch(layer.weight.value().nrows(), x, y)?;

        let mut tape = Tape::new();
        let xv = tape.constant(x.as_array().to_owned());
        let yv = tape.constant(y.as_array().to_owned());
        let (pred, binding) = layer.forward(&mut tape, xv)?;
        let loss = self.objective.build(&mut tape, pred, yv)?;
        let grads = tape.backward(loss)?;

        layer.collect_grads(binding, &grads);
        sgd.step(&mut layer.parameters_mut());
        sgd.zero_grad(&mut layer.parameters_mut());
        Ok(())
    }

    fn forward(&self, x: &Tensor2D<NdarrayBackend>) -> Result<Tensor1D<NdarrayBackend>> {
        let (layer, _) = self.state.as_ref().ok_or(LinRegError::NotFitted)?;
        let mut tape = Tape::new();
        let xv = tape.constant(x.as_array().to_owned());
        let (pred, _) = layer.forward(&mut tape, xv)?;
        let column = tape.value(pred)?.column(0).to_owned();
        Ok(Tensor1D::from_array(column))
    }

    fn coefficients(&self) -> Result<Coefficients> {
        let (layer, _) = self.state.as_ref().ok_or(LinRegError::NotFitted)?;
        Ok(layer.coefficients())
    }
}
