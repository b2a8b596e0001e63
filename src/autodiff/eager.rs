//! Eager (define-by-run) training primitives.
//!
//! A training step records a fresh [`Tape`], calls `backward` on the loss,
//! copies gradients into each [`Parameter`], applies [`Sgd::step`] and then
//! [`Sgd::zero_grad`].

use ndarray::Array2;

use super::tape::{Gradients, Tape, Var};
use super::OpBuilder;
use crate::error::Result;
use crate::model::Coefficients;

/// A trainable tensor together with its accumulated gradient.
#[derive(Debug, Clone)]
pub struct Parameter {
    value: Array2<f64>,
    grad: Option<Array2<f64>>,
}

impl Parameter {
    pub fn new(value: Array2<f64>) -> Self {
        Self { value, grad: None }
    }

    pub fn value(&self) -> &Array2<f64> {
        &self.value
    }

    pub fn grad(&self) -> Option<&Array2<f64>> {
        self.grad.as_ref()
    }

    /// Adds `g` to the stored gradient.
    pub fn accumulate(&mut self, g: &Array2<f64>) {
        match self.grad.as_mut() {
            Some(acc) => *acc += g,
            None => self.grad = Some(g.clone()),
        }
    }
}

/// Fully connected layer with one output: `x · weight + bias`.
#[derive(Debug, Clone)]
pub struct Linear {
    /// Shape `(n_inputs, 1)`.
    pub weight: Parameter,
    /// Shape `(1, 1)`.
    pub bias: Parameter,
}

/// Tape handles of a [`Linear`] layer's parameters for one forward pass.
#[derive(Debug, Clone, Copy)]
pub struct LinearBinding {
    weight: Var,
    bias: Var,
}

impl Linear {
    pub fn from_coefficients(c: &Coefficients) -> Self {
        let n = c.weights.len();
        Self {
            weight: Parameter::new(Array2::from_shape_fn((n, 1), |(i, _)| c.weights[i])),
            bias: Parameter::new(Array2::from_elem((1, 1), c.bias)),
        }
    }

    pub fn coefficients(&self) -> Coefficients {
        Coefficients {
            bias: self.bias.value[[0, 0]],
            weights: self.weight.value.iter().copied().collect(),
        }
    }

    /// Records `x · weight + bias` on `tape`.
    pub fn forward(&self, tape: &mut Tape, x: Var) -> Result<(Var, LinearBinding)> {
        let binding = LinearBinding {
            weight: tape.parameter(self.weight.value.clone()),
            bias: tape.parameter(self.bias.value.clone()),
        };
        let out = tape.linear(x, binding.weight, binding.bias)?;
        Ok((out, binding))
    }

    /// Copies the gradients of this layer's parameters out of a backward pass.
    pub fn collect_grads(&mut self, binding: LinearBinding, grads: &Gradients) {
        if let Some(g) = grads.get(binding.weight) {
            self.weight.accumulate(g);
        }
        if let Some(g) = grads.get(binding.bias) {
            self.bias.accumulate(g);
        }
    }

    pub fn parameters_mut(&mut self) -> [&mut Parameter; 2] {
        [&mut self.weight, &mut self.bias]
    }
}

/// Vanilla SGD over a set of [`Parameter`]s.
#[derive(Debug, Clone, Copy)]
pub struct Sgd {
    lr: f64,
}

impl Sgd {
    pub fn new(lr: f64) -> Self {
        Self { lr }
    }

    pub fn learning_rate(&self) -> f64 {
        self.lr
    }

    /// `value -= lr * grad` for every parameter that has a gradient.
    pub fn step(&self, params: &mut [&mut Parameter]) {
        let lr = self.lr;
        for p in params.iter_mut() {
            if let Some(g) = p.grad.as_ref() {
                p.value.zip_mut_with(g, |w, &g| *w -= lr * g);
            }
        }
    }

    pub fn zero_grad(&self, params: &mut [&mut Parameter]) {
        for p in params.iter_mut() {
            p.grad = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autodiff::Objective;
    use ndarray::array;

    #[test]
    fn test_linear_roundtrip_coefficients() {
        let c = Coefficients {
            bias: -0.5,
            weights: vec![1.0, 2.0, 3.0],
        };
        let layer = Linear::from_coefficients(&c);
        assert_eq!(layer.weight.value().dim(), (3, 1));
        assert_eq!(layer.coefficients(), c);
    }

    #[test]
    fn test_train_cycle_updates_and_clears() {
        let mut layer = Linear::from_coefficients(&Coefficients::zeros(1));
        let sgd = Sgd::new(0.5);

        let mut tape = Tape::new();
        let x = tape.constant(array![[1.0], [2.0]]);
        let y = tape.constant(array![[2.0], [4.0]]);
        let (pred, binding) = layer.forward(&mut tape, x).unwrap();
        let loss = Objective::HalfMse.build(&mut tape, pred, y).unwrap();
        let grads = tape.backward(loss).unwrap();

        layer.collect_grads(binding, &grads);
        // dw = mean(x * (0 - y)) = -(2 + 8) / 2, db = mean(0 - y) = -3
        assert_eq!(layer.weight.grad().unwrap(), &array![[-5.0]]);
        assert_eq!(layer.bias.grad().unwrap(), &array![[-3.0]]);

        sgd.step(&mut layer.parameters_mut());
        sgd.zero_grad(&mut layer.parameters_mut());

        assert_eq!(layer.coefficients().weights, vec![2.5]);
        assert_eq!(layer.coefficients().bias, 1.5);
        assert!(layer.weight.grad().is_none());
    }

    #[test]
    fn test_gradients_accumulate_without_zero_grad() {
        let mut p = Parameter::new(array![[0.0]]);
        p.accumulate(&array![[1.0]]);
        p.accumulate(&array![[2.0]]);
        assert_eq!(p.grad().unwrap(), &array![[3.0]]);
    }
}
