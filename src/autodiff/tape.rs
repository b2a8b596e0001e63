//! Define-by-run computation tape.
//!
//! Operations execute immediately and are appended to the tape; `backward`
//! replays the tape in reverse to produce gradients for every node that
//! requires them.

use ndarray::Array2;

use super::ops::{backpropagate, Op, Wengert};
use super::OpBuilder;
use crate::error::{LinRegError, Result};

/// Handle to a value recorded on a [`Tape`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Var(usize);

#[derive(Debug)]
struct TapeNode {
    op: Option<Op>,
    inputs: Vec<usize>,
    value: Array2<f64>,
    requires_grad: bool,
}

/// A Wengert list of executed operations.
#[derive(Debug, Default)]
pub struct Tape {
    nodes: Vec<TapeNode>,
}

impl Tape {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn push(&mut self, op: Option<Op>, inputs: Vec<usize>, value: Array2<f64>, requires_grad: bool) -> Var {
        let id = self.nodes.len();
        self.nodes.push(TapeNode {
            op,
            inputs,
            value,
            requires_grad,
        });
        Var(id)
    }

    /// Leaf whose gradient is wanted.
    pub fn parameter(&mut self, value: Array2<f64>) -> Var {
        self.push(None, Vec::new(), value, true)
    }

    /// Leaf excluded from differentiation (inputs, targets).
    pub fn constant(&mut self, value: Array2<f64>) -> Var {
        self.push(None, Vec::new(), value, false)
    }

    /// Forward value of `v`.
    ///
    /// # Errors
    /// [`LinRegError::InvalidGraph`] if `v` was recorded on another tape.
    pub fn value(&self, v: Var) -> Result<&Array2<f64>> {
        self.check(v)?;
        Ok(&self.nodes[v.0].value)
    }

    fn check(&self, v: Var) -> Result<()> {
        if v.0 >= self.nodes.len() {
            return Err(LinRegError::InvalidGraph(format!(
                "variable {} is not on this tape",
                v.0
            )));
        }
        Ok(())
    }

    /// Reverse-mode pass from `root`, seeded with ones of `root`'s shape.
    pub fn backward(&self, root: Var) -> Result<Gradients> {
        self.check(root)?;
        Ok(Gradients {
            grads: backpropagate(self, root.0)?,
        })
    }
}

impl OpBuilder for Tape {
    type Handle = Var;

    fn apply(&mut self, op: Op, inputs: &[Var]) -> Result<Var> {
        for &v in inputs {
            self.check(v)?;
        }
        let values: Vec<&Array2<f64>> = inputs.iter().map(|v| &self.nodes[v.0].value).collect();
        let value = op.forward(&values)?;
        let requires_grad = inputs.iter().any(|v| self.nodes[v.0].requires_grad);
        Ok(self.push(
            Some(op),
            inputs.iter().map(|v| v.0).collect(),
            value,
            requires_grad,
        ))
    }
}

impl Wengert for Tape {
    fn op_of(&self, id: usize) -> Option<(Op, &[usize])> {
        let node = self.nodes.get(id)?;
        node.op.map(|op| (op, node.inputs.as_slice()))
    }

    fn value_of(&self, id: usize) -> Option<&Array2<f64>> {
        self.nodes.get(id).map(|n| &n.value)
    }

    fn wants_grad(&self, id: usize) -> bool {
        self.nodes.get(id).is_some_and(|n| n.requires_grad)
    }
}

/// Gradients produced by [`Tape::backward`].
#[derive(Debug)]
pub struct Gradients {
    grads: Vec<Option<Array2<f64>>>,
}

impl Gradients {
    /// `∂root/∂v`, or `None` if `v` does not require gradients or does not
    /// influence the root.
    pub fn get(&self, v: Var) -> Option<&Array2<f64>> {
        self.grads.get(v.0).and_then(Option::as_ref)
    }
}
