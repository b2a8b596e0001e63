//! Linear model `y = X·w + b` over a [`Backend`].
//!
//! The forward pass produces one prediction per row; the backward pass turns a
//! gradient with respect to the predictions into `∇w = Xᵀ·g` and `∇b = Σg`.

use crate::backend::{Backend, Scalar, Tensor1D, Tensor2D};
use crate::model::{Coefficients, ParamOps, TrainableModel};

/// Trainable parameters of a linear model: weights and bias.
#[derive(Clone, Debug)]
pub struct LinearParams<B: Backend> {
    pub weights: Tensor1D<B>,
    pub bias: Scalar<B>,
}

impl<B: Backend> From<&Coefficients> for LinearParams<B> {
    fn from(c: &Coefficients) -> Self {
        Self {
            weights: Tensor1D::from_f64(c.weights.clone()),
            bias: Scalar::new(c.bias),
        }
    }
}

impl<B: Backend> From<&LinearParams<B>> for Coefficients {
    fn from(params: &LinearParams<B>) -> Self {
        Self {
            bias: params.bias.to_f64(),
            weights: params.weights.to_vec(),
        }
    }
}

impl<B: Backend> ParamOps<B> for LinearParams<B> {
    fn add(&self, other: &Self) -> Self {
        Self {
            weights: self.weights.add(&other.weights),
            bias: self.bias + other.bias,
        }
    }

    fn scale(&self, scalar: Scalar<B>) -> Self {
        Self {
            weights: self.weights.scale(&scalar),
            bias: self.bias * scalar,
        }
    }
}

/// Linear regression model holding its parameters on backend `B`.
#[derive(Clone, Debug)]
pub struct LinearModel<B: Backend> {
    params: LinearParams<B>,
}

impl<B: Backend> LinearModel<B> {
    /// Zero-initialised model with `n_features` weights.
    pub fn new(n_features: usize) -> Self {
        Self {
            params: LinearParams {
                weights: Tensor1D::zeros(n_features),
                bias: Scalar::new(0.),
            },
        }
    }

    /// Constructs a model from explicit parameters (warm start, tests).
    pub fn from_params(params: LinearParams<B>) -> Self {
        Self { params }
    }

    pub fn coefficients(&self) -> Coefficients {
        (&self.params).into()
    }
}

impl<B: Backend> TrainableModel<B> for LinearModel<B> {
    type Params = LinearParams<B>;
    type Gradients = LinearParams<B>;
    type Prediction = Tensor1D<B>;
    type Input = Tensor2D<B>;

    fn forward(&self, x: &Self::Input) -> Self::Prediction {
        x.dot(&self.params.weights).add_scalar(&self.params.bias)
    }

    fn params(&self) -> &Self::Params {
        &self.params
    }

    fn update_params(&mut self, params: &Self::Params) {
        self.params = params.clone();
    }

    fn backward(&self, x: &Self::Input, grad_output: &Self::Prediction) -> Self::Gradients {
        LinearParams {
            weights: x.tdot(grad_output),
            bias: grad_output.sum(),
        }
    }
}
