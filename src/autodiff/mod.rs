//! Reverse-mode automatic differentiation for the two autodiff strategies.
//!
//! - [`tape`]: define-by-run Wengert tape, rebuilt for every batch.
//! - [`eager`]: parameters with `.grad`, a `Linear` layer and an `Sgd`
//!   optimizer driven through a `zero_grad` / `backward` / `step` cycle.
//! - [`graph`]: build-once static graph with placeholders and variables, run
//!   through a [`graph::Session`] with a feed, trained by a `minimize` op.
//!
//! Both recorders expose the same [`OpBuilder`] surface, so the linear forward
//! pass and the training objective are written once.

pub mod eager;
pub mod graph;
pub mod ops;
pub mod tape;

pub use ops::Op;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Something that records operations and hands back node handles.
pub trait OpBuilder {
    type Handle: Copy;

    fn apply(&mut self, op: Op, inputs: &[Self::Handle]) -> Result<Self::Handle>;

    fn matmul(&mut self, a: Self::Handle, b: Self::Handle) -> Result<Self::Handle> {
        self.apply(Op::MatMul, &[a, b])
    }

    fn add_bias(&mut self, a: Self::Handle, bias: Self::Handle) -> Result<Self::Handle> {
        self.apply(Op::AddBias, &[a, bias])
    }

    fn sub(&mut self, a: Self::Handle, b: Self::Handle) -> Result<Self::Handle> {
        self.apply(Op::Sub, &[a, b])
    }

    fn square(&mut self, a: Self::Handle) -> Result<Self::Handle> {
        self.apply(Op::Square, &[a])
    }

    fn mean(&mut self, a: Self::Handle) -> Result<Self::Handle> {
        self.apply(Op::Mean, &[a])
    }

    fn scale(&mut self, a: Self::Handle, c: f64) -> Result<Self::Handle> {
        self.apply(Op::Scale(c), &[a])
    }

    /// `x · w + b`.
    fn linear(
        &mut self,
        x: Self::Handle,
        w: Self::Handle,
        b: Self::Handle,
    ) -> Result<Self::Handle> {
        let xw = self.matmul(x, w)?;
        self.add_bias(xw, b)
    }
}

/// The scalar the autodiff strategies differentiate.
///
/// `HalfMse` has the same gradient as the manual rule `Xᵀ(ŷ − y)/m`, so all
/// strategies follow the same trajectory. `Mse` differentiates the plain mean
/// squared error and therefore takes steps twice as large.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Objective {
    #[default]
    HalfMse,
    Mse,
}

impl Objective {
    /// Records the objective for predictions `pred` against column targets `target`.
    pub fn build<R: OpBuilder>(
        self,
        recorder: &mut R,
        pred: R::Handle,
        target: R::Handle,
    ) -> Result<R::Handle> {
        let diff = recorder.sub(pred, target)?;
        let sq = recorder.square(diff)?;
        let mse = recorder.mean(sq)?;
        match self {
            Objective::HalfMse => recorder.scale(mse, 0.5),
            Objective::Mse => Ok(mse),
        }
    }
}
