//! Gradient strategies: the one place the three backends differ.
//!
//! The [`Trainer`](crate::trainer::Trainer) only knows how to feed batches to
//! a [`GradientStrategy`]. Each strategy owns its model state and decides how
//! the gradient of the batch objective is obtained:
//!
//! | Strategy | Gradient | State |
//! |---|---|---|
//! | [`ManualGradient<B>`] | closed form `Xᵀ(ŷ − y)/m` | [`LinearModel<B>`](crate::model::LinearModel) |
//! | [`EagerAutodiff`] | define-by-run tape | [`Linear`](crate::autodiff::eager::Linear) layer |
//! | [`GraphAutodiff`] | static graph + session | graph variables |

mod eager;
mod graph;
mod manual;

pub use eager::EagerAutodiff;
pub use graph::GraphAutodiff;
pub use manual::ManualGradient;

use crate::backend::{Backend, Tensor1D, Tensor2D};
use crate::error::{LinRegError, Result};
use crate::model::Coefficients;

/// How one mini-batch update is computed and applied.
///
/// Every method except [`initialize`](GradientStrategy::initialize) returns
/// [`LinRegError::NotFitted`](crate::error::LinRegError::NotFitted) until the
/// strategy has been initialised.
pub trait GradientStrategy {
    /// Tensor storage batches must be delivered in.
    type Backend: Backend;

    fn name(&self) -> &'static str;

    /// Discards any previous state and starts from `initial`.
    fn initialize(&mut self, initial: &Coefficients, learning_rate: f64) -> Result<()>;

    /// Applies one gradient-descent update for batch `x` with column targets `y`.
    ///
    /// # Errors
    /// [`LinRegError::ShapeMismatch`](crate::error::LinRegError::ShapeMismatch)
    /// if `x` does not have `n_inputs` columns or `y` is not an `(m, 1)` column.
    fn step(&mut self, x: &Tensor2D<Self::Backend>, y: &Tensor2D<Self::Backend>) -> Result<()>;

    /// `x · w + b` with the current parameters.
    fn forward(&self, x: &Tensor2D<Self::Backend>) -> Result<Tensor1D<Self::Backend>>;

    /// Current parameters, copied out of the strategy's own storage.
    fn coefficients(&self) -> Result<Coefficients>;
}

/// Checks a batch against the model width, shared by all strategies.
pub(crate) fn check_batch<B: Backend>(
    n_inputs: usize,
    x: &Tensor2D<B>,
    y: &Tensor2D<B>,
) -> Result<()> {
    if x.cols() != n_inputs {
        return Err(LinRegError::ShapeMismatch {
            expected: n_inputs,
            got: x.cols(),
        });
    }
    if y.shape() != (x.rows(), 1) {
        return Err(LinRegError::ShapeMismatch {
            expected: x.rows(),
            got: y.rows() * y.cols(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{CpuBackend, NdarrayBackend};

    fn batch<B: Backend>() -> (Tensor2D<B>, Tensor2D<B>) {
        let x = Tensor2D::new(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 3, 2);
        let y = Tensor1D::new(vec![1.0, 0.0, 2.0]).to_column();
        (x, y)
    }

    fn one_step<S: GradientStrategy>(mut s: S, initial: &Coefficients) -> Coefficients {
        let (x, y) = batch::<S::Backend>();
        s.initialize(initial, 0.05).unwrap();
        s.step(&x, &y).unwrap();
        s.coefficients().unwrap()
    }

    fn assert_close(a: &Coefficients, b: &Coefficients) {
        assert!((a.bias - b.bias).abs() < 1e-12, "{a:?} vs {b:?}");
        for (wa, wb) in a.weights.iter().zip(&b.weights) {
            assert!((wa - wb).abs() < 1e-12, "{a:?} vs {b:?}");
        }
    }

    #[test]
    fn test_strategies_agree_after_one_step() {
        let initial = Coefficients {
            bias: 0.1,
            weights: vec![-0.2, 0.3],
        };
        let reference = one_step(ManualGradient::<CpuBackend>::new(), &initial);

        assert_close(&one_step(ManualGradient::<NdarrayBackend>::new(), &initial), &reference);
        assert_close(&one_step(EagerAutodiff::new(), &initial), &reference);
        assert_close(&one_step(GraphAutodiff::new(), &initial), &reference);
    }

    #[test]
    fn test_uninitialized_strategies_report_not_fitted() {
        let (x, y) = batch::<NdarrayBackend>();

        let mut manual = ManualGradient::<NdarrayBackend>::new();
        assert!(matches!(manual.step(&x, &y), Err(LinRegError::NotFitted)));
        assert!(matches!(manual.coefficients(), Err(LinRegError::NotFitted)));

        let eager = EagerAutodiff::new();
        assert!(matches!(eager.forward(&x), Err(LinRegError::NotFitted)));

        let graph = GraphAutodiff::new();
        assert!(matches!(graph.coefficients(), Err(LinRegError::NotFitted)));
    }

    #[test]
    fn test_wrong_width_rejected_by_every_strategy() {
        let (x, y) = batch::<NdarrayBackend>();
        let initial = Coefficients::zeros(3);

        let mut manual = ManualGradient::<NdarrayBackend>::new();
        manual.initialize(&initial, 0.1).unwrap();
        let mut eager = EagerAutodiff::new();
        eager.initialize(&initial, 0.1).unwrap();
        let mut graph = GraphAutodiff::new();
        graph.initialize(&initial, 0.1).unwrap();

        for err in [
            manual.step(&x, &y).unwrap_err(),
            eager.step(&x, &y).unwrap_err(),
            graph.step(&x, &y).unwrap_err(),
        ] {
            assert!(matches!(
                err,
                LinRegError::ShapeMismatch {
                    expected: 3,
                    got: 2
                }
            ));
        }
    }
}
