use ndarray::Array2;

use super::{check_batch, GradientStrategy};
use crate::autodiff::graph::{FeedDict, GradientDescent, Graph, NodeId, Session, TrainOp};
use crate::autodiff::{Objective, OpBuilder};
use crate::backend::{NdarrayBackend, Tensor1D, Tensor2D};
use crate::error::{LinRegError, Result};
use crate::model::Coefficients;

/// Handles into the graph built by [`GraphAutodiff::initialize`].
#[derive(Debug, Clone)]
struct Built {
    session: Session,
    x: NodeId,
    y: NodeId,
    weights: NodeId,
    bias: NodeId,
    pred: NodeId,
    train: TrainOp,
}

/// Build-once static graph trained through a session.
///
/// `initialize` builds the whole graph (placeholders `x` and `y`, variables
/// `weights` and `bias`, the prediction, the objective and a
/// [`GradientDescent`] train op) and opens a [`Session`]. Each step then only
/// feeds a batch and runs the train op.
#[derive(Debug, Clone, Default)]
pub struct GraphAutodiff {
    objective: Objective,
    built: Option<Built>,
}

impl GraphAutodiff {
    /// Differentiates [`Objective::HalfMse`].
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_objective(objective: Objective) -> Self {
        Self {
            objective,
            built: None,
        }
    }

    fn built(&self) -> Result<&Built> {
        self.built.as_ref().ok_or(LinRegError::NotFitted)
    }

    fn n_inputs(built: &Built) -> Result<usize> {
        built
            .session
            .variable(built.weights)
            .map(|w| w.nrows())
            .ok_or_else(|| LinRegError::InvalidGraph("weights variable missing".into()))
    }
}

impl GradientStrategy for GraphAutodiff {
    type Backend = NdarrayBackend;

    fn name(&self) -> &'static str {
        "graph-autodiff"
    }

    fn initialize(&mut self, initial: &Coefficients, learning_rate: f64) -> Result<()> {
        let n = initial.n_inputs();
        let mut g = Graph::new();
        let x = g.placeholder("x");
        let y = g.placeholder("y");
        let weights = g.variable(
            "weights",
            Array2::from_shape_fn((n, 1), |(i, _)| initial.weights[i]),
        );
        let bias = g.variable("bias", Array2::from_elem((1, 1), initial.bias));
        let pred = g.linear(x, weights, bias)?;
        let loss = self.objective.build(&mut g, pred, y)?;
        let train = GradientDescent::new(learning_rate).minimize(&g, loss)?;
        log::debug!(
            "built graph with {} nodes, training {} variables",
            g.len(),
            train.variables().len()
        );

        self.built = Some(Built {
            session: Session::new(g),
            x,
            y,
            weights,
            bias,
            pred,
            train,
        });
        Ok(())
    }

    fn step(&mut self, x: &Tensor2D<NdarrayBackend>, y: &Tensor2D<NdarrayBackend>) -> Result<()> {
        let built = self.built.as_mut().ok_or(LinRegError::NotFitted)?;
        check_batch(Self::n_inputs(built)?, x, y)?;

        let feed = FeedDict::new()
            .with(built.x, x.as_array())
            .with(built.y, y.as_array());
        built.session.run_train(&built.train, &feed)?;
        Ok(())
    }

    fn forward(&self, x: &Tensor2D<NdarrayBackend>) -> Result<Tensor1D<NdarrayBackend>> {
        let built = self.built()?;
        let feed = FeedDict::new().with(built.x, x.as_array());
        let out = built.session.run(built.pred, &feed)?;
        Ok(Tensor1D::from_array(out.column(0).to_owned()))
    }

    fn coefficients(&self) -> Result<Coefficients> {
        let built = self.built()?;
        let missing = || LinRegError::InvalidGraph("model variable missing".into());
        let w = built.session.variable(built.weights).ok_or_else(missing)?;
        let b = built.session.variable(built.bias).ok_or_else(missing)?;
        Ok(Coefficients {
            bias: b[[0, 0]],
            weights: w.iter().copied().collect(),
        })
    }
}
