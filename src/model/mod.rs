//! Model parameters and the trainable-model interface used by the manual
//! gradient strategy.

pub mod linear;
pub use linear::{LinearModel, LinearParams};

use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use crate::backend::{Backend, Scalar};
use crate::config::WeightInit;
use crate::error::{LinRegError, Result};

/// A model that can produce predictions and backpropagate a gradient with
/// respect to its own predictions into parameter gradients.
pub trait TrainableModel<B: Backend> {
    type Input;
    type Prediction;
    type Params;
    type Gradients;

    fn forward(&self, input: &Self::Input) -> Self::Prediction;
    fn backward(&self, input: &Self::Input, grad_output: &Self::Prediction) -> Self::Gradients;
    fn params(&self) -> &Self::Params;
    fn update_params(&mut self, new_params: &Self::Params);
}

/// Vector-space operations an optimizer needs on a parameter set.
pub trait ParamOps<B: Backend>: Clone {
    fn add(&self, other: &Self) -> Self;
    fn scale(&self, scalar: Scalar<B>) -> Self;
}

/// Backend-independent snapshot of a fitted linear model.
///
/// This is what every gradient strategy reports, what checkpoints persist, and
/// what inference runs on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coefficients {
    pub bias: f64,
    pub weights: Vec<f64>,
}

impl Coefficients {
    pub fn zeros(n_inputs: usize) -> Self {
        Self {
            bias: 0.0,
            weights: vec![0.0; n_inputs],
        }
    }

    /// Starting parameters for a fit.
    ///
    /// The bias always starts at zero. With [`WeightInit::Normal`] weights are
    /// drawn from `N(0, std_dev²)` using an RNG seeded from `seed` (OS entropy
    /// when `None`).
    ///
    /// ```
    /// use linreg_parity::config::WeightInit;
    /// use linreg_parity::model::Coefficients;
    ///
    /// let a = Coefficients::initial(3, WeightInit::Normal { std_dev: 1.0 }, Some(5)).unwrap();
    /// let b = Coefficients::initial(3, WeightInit::Normal { std_dev: 1.0 }, Some(5)).unwrap();
    /// assert_eq!(a, b);
    /// assert_eq!(a.bias, 0.0);
    /// ```
    pub fn initial(n_inputs: usize, init: WeightInit, seed: Option<u64>) -> Result<Self> {
        match init {
            WeightInit::Zeros => Ok(Self::zeros(n_inputs)),
            WeightInit::Normal { std_dev } => {
                if !std_dev.is_finite() || std_dev < 0.0 {
                    return Err(LinRegError::InvalidConfig(format!(
                        "weight init std_dev must be non-negative and finite, got {std_dev}"
                    )));
                }
                let normal = Normal::new(0.0, std_dev)
                    .map_err(|e| LinRegError::InvalidConfig(format!("weight init: {e}")))?;
                let mut rng = match seed {
                    Some(s) => StdRng::seed_from_u64(s),
                    None => StdRng::from_os_rng(),
                };
                let weights = (0..n_inputs).map(|_| normal.sample(&mut rng)).collect();
                Ok(Self { bias: 0.0, weights })
            }
        }
    }

    pub fn n_inputs(&self) -> usize {
        self.weights.len()
    }

    /// `x · w + b` for each row of `x`.
    ///
    /// # Errors
    /// [`LinRegError::ShapeMismatch`] if any row has the wrong number of columns.
    pub fn predict(&self, x: &[Vec<f32>]) -> Result<Vec<f64>> {
        x.iter()
            .map(|row| {
                if row.len() != self.weights.len() {
                    return Err(LinRegError::ShapeMismatch {
                        expected: self.weights.len(),
                        got: row.len(),
                    });
                }
                let dot: f64 = row
                    .iter()
                    .zip(&self.weights)
                    .map(|(&xi, &wi)| f64::from(xi) * wi)
                    .sum();
                Ok(dot + self.bias)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zeros() {
        let c = Coefficients::zeros(4);
        assert_eq!(c.bias, 0.0);
        assert_eq!(c.weights, vec![0.0; 4]);
        assert_eq!(c.n_inputs(), 4);
    }

    #[test]
    fn test_initial_normal_nonzero_weights() {
        let c = Coefficients::initial(16, WeightInit::Normal { std_dev: 1.0 }, Some(11)).unwrap();
        assert_eq!(c.weights.len(), 16);
        assert!(c.weights.iter().any(|&w| w != 0.0));
    }

    #[test]
    fn test_initial_normal_rejects_bad_std_dev() {
        let err = Coefficients::initial(2, WeightInit::Normal { std_dev: -1.0 }, Some(0))
            .unwrap_err();
        assert!(matches!(err, LinRegError::InvalidConfig(_)));

        let nan = Coefficients::initial(2, WeightInit::Normal { std_dev: f64::NAN }, None);
        assert!(matches!(nan, Err(LinRegError::InvalidConfig(_))));
    }

    #[test]
    fn test_initial_normal_zero_std_dev_gives_zeros() {
        let c = Coefficients::initial(3, WeightInit::Normal { std_dev: 0.0 }, Some(2)).unwrap();
        assert_eq!(c, Coefficients::zeros(3));
    }

    #[test]
    fn test_predict() {
        let c = Coefficients {
            bias: 1.0,
            weights: vec![2.0, -1.0],
        };
        let out = c.predict(&[vec![1.0, 1.0], vec![0.5, 3.0]]).unwrap();
        assert_eq!(out, vec![2.0, -1.0]);
    }

    #[test]
    fn test_predict_shape_mismatch() {
        let c = Coefficients::zeros(2);
        let err = c.predict(&[vec![1.0, 2.0, 3.0]]).unwrap_err();
        assert!(matches!(
            err,
            LinRegError::ShapeMismatch {
                expected: 2,
                got: 3
            }
        ));
    }
}
