use crate::{
    backend::{Scalar, Tensor1D, Tensor2D},
    config::TrainingConfig,
    dataset::Dataset,
    error::{LinRegError, Result},
    loss::{Loss, MSELoss},
    model::Coefficients,
    strategy::GradientStrategy,
};

/// Orchestrates mini-batch gradient descent for any [`GradientStrategy`].
///
/// One epoch walks the dataset's batches in storage order. For each batch the
/// target vector is reshaped into a column, the strategy applies one update,
/// and the batch MSE is recomputed with the updated parameters. The epoch's
/// training loss is the row-weighted mean of those batch losses.
///
/// There is no convergence check: exactly `n_epochs` epochs run.
#[derive(Debug, Clone)]
pub struct Trainer {
    config: TrainingConfig,
    loss_fn: MSELoss,
}

/// Per-epoch training losses returned by [`Trainer::fit`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FitReport {
    pub epoch_losses: Vec<f64>,
}

impl FitReport {
    pub fn first_loss(&self) -> Option<f64> {
        self.epoch_losses.first().copied()
    }

    pub fn final_loss(&self) -> Option<f64> {
        self.epoch_losses.last().copied()
    }

    pub fn n_epochs(&self) -> usize {
        self.epoch_losses.len()
    }
}

impl Trainer {
    /// # Errors
    /// [`LinRegError::InvalidConfig`] if `config` fails validation.
    pub fn new(config: TrainingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            loss_fn: MSELoss,
        })
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Trains `strategy` on `dataset`, starting from `initial`.
    ///
    /// # Returns
    /// The average training loss of every epoch, or an error if:
    /// - the dataset is empty or its length is unknown
    /// - a batch fails to load
    /// - the strategy rejects a batch
    pub fn fit<S, D>(&self, strategy: &mut S, dataset: &D, initial: &Coefficients) -> Result<FitReport>
    where
        S: GradientStrategy,
        D: Dataset,
    {
        let n_total = match dataset.len() {
            Some(0) | None => return Err(LinRegError::EmptyDataset),
            Some(n) => n,
        };

        strategy.initialize(initial, self.config.learning_rate)?;
        log::debug!(
            "fitting {} strategy on {} examples ({} per batch, {} epochs)",
            strategy.name(),
            n_total,
            self.config.batch_size,
            self.config.n_epochs
        );

        let mut report = FitReport {
            epoch_losses: Vec::with_capacity(self.config.n_epochs),
        };

        for epoch in 0..self.config.n_epochs {
            let mut total_loss = Scalar::<S::Backend>::new(0.);

            for batch in dataset.batches::<S::Backend>(self.config.batch_size) {
                let (batch_x, batch_y) = batch.map_err(Into::<LinRegError>::into)?;
                let rows = batch_x.rows();
                self.step(strategy, &batch_x, &batch_y)?;

                let batch_loss = self.batch_loss(strategy, &batch_x, &batch_y)?;
                total_loss = total_loss + batch_loss * Scalar::new(rows as f64);
            }

            let avg_loss = (total_loss / Scalar::new(n_total as f64)).to_f64();
            if !avg_loss.is_finite() {
                log::warn!("epoch {epoch}: training loss is {avg_loss}; learning rate may be too high");
            }
            let every = self.config.report_every;
            if every > 0 && epoch % every == 0 {
                log::info!("epoch {epoch}: training loss {avg_loss}");
            }
            report.epoch_losses.push(avg_loss);
        }

        Ok(report)
    }

    fn step<S: GradientStrategy>(
        &self,
        strategy: &mut S,
        x: &Tensor2D<S::Backend>,
        y: &Tensor1D<S::Backend>,
    ) -> Result<()> {
        strategy.step(x, &y.to_column())
    }

    /// MSE of the batch under the strategy's current parameters.
    fn batch_loss<S: GradientStrategy>(
        &self,
        strategy: &S,
        x: &Tensor2D<S::Backend>,
        y: &Tensor1D<S::Backend>,
    ) -> Result<Scalar<S::Backend>> {
        let preds = strategy.forward(x)?;
        Ok(Loss::<S::Backend>::loss(&self.loss_fn, &preds, y))
    }
}
