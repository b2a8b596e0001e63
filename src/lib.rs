//! # linreg-parity
//!
//! Linear regression trained by mini-batch gradient descent on three
//! interchangeable gradient strategies that follow the same trajectory:
//!
//! - **Manual gradient**: closed-form `Xᵀ(ŷ − y)/m` on any [`Backend`]
//!   (pure-Rust [`CpuBackend`] or `ndarray`).
//! - **Eager autodiff**: a define-by-run tape rebuilt for every batch, with a
//!   `zero_grad` / `backward` / `step` cycle.
//! - **Graph autodiff**: a static graph built once, run through a session with
//!   fed placeholders and a `minimize` train op.
//!
//! ## Core Design Principles
//!
//! - **One training loop**: [`trainer::Trainer`] is written once against
//!   [`strategy::GradientStrategy`]; only the gradient computation differs.
//! - **Parity by construction**: the autodiff strategies differentiate
//!   `½·MSE` by default, whose gradient equals the manual rule.
//! - **Explicit seeding**: shuffling and weight initialisation take their seed
//!   from [`config::TrainingConfig`], never from a global RNG.
//! - **Scoped persistence**: checkpoints are written through a guard that
//!   removes partial files on every exit path.
//!
//! ## Quick Start
//!
//! ```rust
//! use linreg_parity::config::TrainingConfig;
//! use linreg_parity::regressor::LinearRegressor;
//! use linreg_parity::strategy::ManualGradient;
//! use linreg_parity::CpuBackend;
//!
//! let config = TrainingConfig::default()
//!     .batch_size(10)
//!     .learning_rate(0.1)
//!     .n_epochs(500)
//!     .seed(42);
//!
//! let x: Vec<Vec<f32>> = (0..100).map(|i| vec![i as f32 / 100.0]).collect();
//! let y: Vec<f32> = x.iter().map(|r| 3.0 * r[0] + 2.0).collect();
//!
//! let mut model = LinearRegressor::new(ManualGradient::<CpuBackend>::new(), config).unwrap();
//! model.ingest(x, y).unwrap();
//! model.fit().unwrap();
//!
//! let c = model.coefficients().unwrap();
//! assert!((c.bias - 2.0).abs() < 1e-2);
//! assert!((c.weights[0] - 3.0).abs() < 1e-2);
//! ```
//!
//! ## Module Structure
//!
//! - `backend`: tensor abstractions for the manual strategy (`Tensor1D`, `Tensor2D`)
//! - `dataset`: in-memory dataset and restartable batch iteration
//! - `model`, `loss`, `optimizer`: linear model, MSE and SGD for the manual strategy
//! - `autodiff`: reverse-mode tape and static graph
//! - `strategy`: the three gradient strategies
//! - `trainer`: the shared training loop
//! - `regressor`: ingest / fit / coefficients / predict
//! - `checkpoint`, `serialization`: coefficient persistence
//! - `metrics`: MSE, RMSE and R² over predictions

pub mod backend;

/// Reverse-mode automatic differentiation: eager tape and static graph.
pub mod autodiff;

/// Scoped checkpoint writes and restores.
pub mod checkpoint;

/// Training hyperparameters.
pub mod config;

/// Data loading utilities and dataset abstractions.
pub mod dataset;

pub mod error;

/// Differentiable loss functions for model training.
pub mod loss;

/// Regression metrics.
pub mod metrics;

/// Linear model parameters and the trainable-model interface.
pub mod model;

/// Optimization algorithms for parameter updates.
pub mod optimizer;

pub mod regressor;

/// Model persistence formats.
pub mod serialization;

/// Interchangeable gradient computations.
pub mod strategy;

/// High-level training loop orchestration.
pub mod trainer;

/// Re-export of core types for convenient usage.
pub use backend::{Backend, CpuBackend, NdarrayBackend, ScalarOps, Tensor1D, Tensor2D};
pub use error::{LinRegError, Result};
pub use model::Coefficients;
pub use regressor::{FitState, LinearRegressor};
