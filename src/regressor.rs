//! User-facing linear regressor: ingest, fit, read coefficients, predict.

use std::path::Path;

use crate::backend::Tensor2D;
use crate::checkpoint;
use crate::config::TrainingConfig;
use crate::dataset::InMemoryDataset;
use crate::error::{LinRegError, Result};
use crate::model::Coefficients;
use crate::strategy::GradientStrategy;
use crate::trainer::{FitReport, Trainer};

/// Lifecycle of a [`LinearRegressor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitState {
    NotFitted,
    Fitting,
    Fitted,
}

/// Linear regression trained by mini-batch gradient descent through a
/// [`GradientStrategy`].
///
/// ```
/// use linreg_parity::config::TrainingConfig;
/// use linreg_parity::regressor::LinearRegressor;
/// use linreg_parity::strategy::GraphAutodiff;
///
/// let cfg = TrainingConfig::default()
///     .learning_rate(0.5)
///     .n_epochs(200)
///     .batch_size(4)
///     .seed(1);
/// let mut reg = LinearRegressor::new(GraphAutodiff::new(), cfg).unwrap();
///
/// let x: Vec<Vec<f32>> = (0..8).map(|i| vec![i as f32 / 8.0]).collect();
/// let y: Vec<f32> = x.iter().map(|r| 2.0 * r[0] - 1.0).collect();
/// reg.ingest(x, y).unwrap();
/// reg.fit().unwrap();
///
/// let c = reg.coefficients().unwrap();
/// assert!((c.weights[0] - 2.0).abs() < 0.05);
/// assert!((c.bias + 1.0).abs() < 0.05);
/// ```
#[derive(Debug)]
pub struct LinearRegressor<S: GradientStrategy> {
    strategy: S,
    config: TrainingConfig,
    dataset: Option<InMemoryDataset>,
    state: FitState,
}

impl<S: GradientStrategy> LinearRegressor<S> {
    /// # Errors
    /// [`LinRegError::InvalidConfig`] if `config` fails validation.
    pub fn new(strategy: S, config: TrainingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            strategy,
            config,
            dataset: None,
            state: FitState::NotFitted,
        })
    }

    pub fn state(&self) -> FitState {
        self.state
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    pub fn dataset(&self) -> Option<&InMemoryDataset> {
        self.dataset.as_ref()
    }

    /// Stores the training data, shuffling it once when the config asks for it.
    ///
    /// # Errors
    /// [`LinRegError::DimensionMismatch`] if `x` and `y` differ in length,
    /// [`LinRegError::ShapeMismatch`] for ragged rows and
    /// [`LinRegError::EmptyDataset`] for no rows.
    pub fn ingest(&mut self, x: Vec<Vec<f32>>, y: Vec<f32>) -> Result<()> {
        let dataset = InMemoryDataset::ingest(x, y, self.config.shuffle, self.config.seed)?;
        self.dataset = Some(dataset);
        Ok(())
    }

    /// Runs `n_epochs` of mini-batch gradient descent on the ingested data.
    ///
    /// When a checkpoint path is configured the coefficients are saved before
    /// the regressor is marked `Fitted`. Any error, including a failed save,
    /// aborts the fit and leaves the regressor `NotFitted`.
    pub fn fit(&mut self) -> Result<FitReport> {
        let dataset = self.dataset.as_ref().ok_or(LinRegError::MissingData)?;
        self.state = FitState::Fitting;

        match Self::run_fit(&mut self.strategy, &self.config, dataset) {
            Ok(report) => {
                self.state = FitState::Fitted;
                Ok(report)
            }
            Err(e) => {
                self.state = FitState::NotFitted;
                Err(e)
            }
        }
    }

    fn run_fit(
        strategy: &mut S,
        config: &TrainingConfig,
        dataset: &InMemoryDataset,
    ) -> Result<FitReport> {
        // the init draw must not reuse the shuffle stream
        let init_seed = config.seed.map(|s| s.wrapping_add(1));
        let initial = Coefficients::initial(dataset.n_inputs(), config.weight_init, init_seed)?;
        let report = Trainer::new(config.clone())?.fit(strategy, dataset, &initial)?;

        if let Some(path) = &config.checkpoint {
            checkpoint::save(path, &strategy.coefficients()?)?;
        }
        Ok(report)
    }

    /// `(bias, weights)` of the fitted model.
    pub fn coefficients(&self) -> Result<Coefficients> {
        if self.state != FitState::Fitted {
            return Err(LinRegError::NotFitted);
        }
        self.strategy.coefficients()
    }

    /// One prediction per row of `x`.
    ///
    /// # Errors
    /// [`LinRegError::NotFitted`] before a fit; [`LinRegError::ShapeMismatch`]
    /// if a row's length differs from the number of trained inputs.
    pub fn predict(&self, x: &[Vec<f32>]) -> Result<Vec<f64>> {
        let n_inputs = self.coefficients()?.n_inputs();
        let x = Tensor2D::<S::Backend>::from_rows(x, n_inputs)?;
        Ok(self.strategy.forward(&x)?.to_vec())
    }

    pub fn save_checkpoint(&self, path: impl AsRef<Path>) -> Result<()> {
        checkpoint::save(path, &self.coefficients()?)
    }

    /// Loads coefficients into the strategy and marks the regressor `Fitted`.
    pub fn restore_checkpoint(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let coefficients = checkpoint::restore(path)?;
        self.strategy
            .initialize(&coefficients, self.config.learning_rate)?;
        self.state = FitState::Fitted;
        Ok(())
    }
}
