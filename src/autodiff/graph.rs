//! Build-once static computation graph.
//!
//! A [`Graph`] is assembled up front from placeholders (fed per run),
//! variables (owned by a [`Session`]) and operations. Nothing is computed
//! until [`Session::run`] evaluates a fetch against a [`FeedDict`]. Training
//! goes through [`GradientDescent::minimize`], which returns a [`TrainOp`]
//! that [`Session::run_train`] executes.
//!
//! ```
//! use linreg_parity::autodiff::graph::{FeedDict, GradientDescent, Graph, Session};
//! use linreg_parity::autodiff::{Objective, OpBuilder};
//! use ndarray::array;
//!
//! let mut g = Graph::new();
//! let x = g.placeholder("x");
//! let y = g.placeholder("y");
//! let w = g.variable("weights", array![[0.0]]);
//! let b = g.variable("bias", array![[0.0]]);
//! let pred = g.linear(x, w, b).unwrap();
//! let loss = Objective::HalfMse.build(&mut g, pred, y).unwrap();
//! let train = GradientDescent::new(0.1).minimize(&g, loss).unwrap();
//!
//! let mut sess = Session::new(g);
//! let (xs, ys) = (array![[1.0], [2.0]], array![[2.0], [4.0]]);
//! let feed = FeedDict::new().with(x, xs.view()).with(y, ys.view());
//! sess.run_train(&train, &feed).unwrap();
//! assert!(sess.variable(w).unwrap()[[0, 0]] > 0.0);
//! ```

use std::collections::HashMap;

use ndarray::{Array2, ArrayView2};

use super::ops::{backpropagate, Op, Wengert};
use super::OpBuilder;
use crate::error::{LinRegError, Result};

/// Handle to a node of a [`Graph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
enum NodeKind {
    Placeholder { name: String },
    Variable { name: String, initial: Array2<f64> },
    Op { op: Op, inputs: Vec<usize> },
}

/// Static dataflow graph. Node ids are assigned in insertion order, so the
/// node list is always topologically sorted.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: Vec<NodeKind>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        self.nodes.push(kind);
        NodeId(self.nodes.len() - 1)
    }

    /// Input slot that must be fed on every run that depends on it.
    pub fn placeholder(&mut self, name: impl Into<String>) -> NodeId {
        self.push(NodeKind::Placeholder { name: name.into() })
    }

    /// Trainable state, initialised to `initial` when a [`Session`] is created.
    pub fn variable(&mut self, name: impl Into<String>, initial: Array2<f64>) -> NodeId {
        self.push(NodeKind::Variable {
            name: name.into(),
            initial,
        })
    }

    pub fn name(&self, id: NodeId) -> Option<&str> {
        match self.nodes.get(id.0)? {
            NodeKind::Placeholder { name } | NodeKind::Variable { name, .. } => Some(name),
            NodeKind::Op { .. } => None,
        }
    }

    fn check(&self, id: NodeId) -> Result<()> {
        if id.0 >= self.nodes.len() {
            return Err(LinRegError::InvalidGraph(format!(
                "node {} does not belong to this graph",
                id.0
            )));
        }
        Ok(())
    }

    /// Marks `fetch` and everything it depends on.
    fn ancestors(&self, fetch: usize) -> Vec<bool> {
        let mut needed = vec![false; fetch + 1];
        needed[fetch] = true;
        for id in (0..=fetch).rev() {
            if !needed[id] {
                continue;
            }
            if let NodeKind::Op { inputs, .. } = &self.nodes[id] {
                for &i in inputs {
                    needed[i] = true;
                }
            }
        }
        needed
    }
}

impl OpBuilder for Graph {
    type Handle = NodeId;

    /// Adds an operation node. Shapes are checked when the graph runs.
    fn apply(&mut self, op: Op, inputs: &[NodeId]) -> Result<NodeId> {
        if inputs.len() != op.arity() {
            return Err(LinRegError::InvalidGraph(format!(
                "{op:?} takes {} operands, got {}",
                op.arity(),
                inputs.len()
            )));
        }
        for &i in inputs {
            self.check(i)?;
        }
        Ok(self.push(NodeKind::Op {
            op,
            inputs: inputs.iter().map(|i| i.0).collect(),
        }))
    }
}

/// Values for placeholders, keyed by node.
#[derive(Debug, Default)]
pub struct FeedDict<'a> {
    values: HashMap<NodeId, ArrayView2<'a, f64>>,
}

impl<'a> FeedDict<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, node: NodeId, value: ArrayView2<'a, f64>) -> Self {
        self.values.insert(node, value);
        self
    }
}

/// Trainable variables reachable from a loss, with the step size to apply.
#[derive(Debug, Clone)]
pub struct TrainOp {
    loss: NodeId,
    variables: Vec<NodeId>,
    learning_rate: f64,
}

impl TrainOp {
    pub fn loss(&self) -> NodeId {
        self.loss
    }

    pub fn variables(&self) -> &[NodeId] {
        &self.variables
    }
}

/// Plain gradient descent: `var ← var − lr · ∂loss/∂var`.
#[derive(Debug, Clone, Copy)]
pub struct GradientDescent {
    learning_rate: f64,
}

impl GradientDescent {
    pub fn new(learning_rate: f64) -> Self {
        Self { learning_rate }
    }

    /// Builds a train op updating every variable `loss` depends on.
    pub fn minimize(&self, graph: &Graph, loss: NodeId) -> Result<TrainOp> {
        graph.check(loss)?;
        let needed = graph.ancestors(loss.0);
        let variables = needed
            .iter()
            .enumerate()
            .filter(|&(id, &n)| n && matches!(graph.nodes[id], NodeKind::Variable { .. }))
            .map(|(id, _)| NodeId(id))
            .collect();
        Ok(TrainOp {
            loss,
            variables,
            learning_rate: self.learning_rate,
        })
    }
}

/// Owns a graph and the current values of its variables.
#[derive(Debug, Clone)]
pub struct Session {
    graph: Graph,
    variables: HashMap<usize, Array2<f64>>,
}

/// Forward values of one evaluation, indexed by node id.
struct Evaluation<'g> {
    graph: &'g Graph,
    values: Vec<Option<Array2<f64>>>,
}

impl Wengert for Evaluation<'_> {
    fn op_of(&self, id: usize) -> Option<(Op, &[usize])> {
        match self.graph.nodes.get(id)? {
            NodeKind::Op { op, inputs } => Some((*op, inputs.as_slice())),
            _ => None,
        }
    }

    fn value_of(&self, id: usize) -> Option<&Array2<f64>> {
        self.values.get(id).and_then(Option::as_ref)
    }

    fn wants_grad(&self, id: usize) -> bool {
        matches!(
            self.graph.nodes.get(id),
            Some(NodeKind::Variable { .. } | NodeKind::Op { .. })
        )
    }
}

impl Session {
    /// Initialises every variable from its declared initial value.
    pub fn new(graph: Graph) -> Self {
        let variables = graph
            .nodes
            .iter()
            .enumerate()
            .filter_map(|(id, kind)| match kind {
                NodeKind::Variable { initial, .. } => Some((id, initial.clone())),
                _ => None,
            })
            .collect();
        Self { graph, variables }
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn variable(&self, id: NodeId) -> Option<&Array2<f64>> {
        self.variables.get(&id.0)
    }

    /// Overwrites a variable's value.
    ///
    /// # Errors
    /// [`LinRegError::InvalidGraph`] if `id` is not a variable, or
    /// [`LinRegError::ShapeMismatch`] if the shape changes.
    pub fn assign(&mut self, id: NodeId, value: Array2<f64>) -> Result<()> {
        let current = self.variables.get_mut(&id.0).ok_or_else(|| {
            LinRegError::InvalidGraph(format!("node {} is not a variable", id.0))
        })?;
        if current.dim() != value.dim() {
            return Err(LinRegError::ShapeMismatch {
                expected: current.len(),
                got: value.len(),
            });
        }
        *current = value;
        Ok(())
    }

    fn evaluate(&self, fetch: NodeId, feed: &FeedDict<'_>) -> Result<Evaluation<'_>> {
        self.graph.check(fetch)?;
        let needed = self.graph.ancestors(fetch.0);
        let mut values: Vec<Option<Array2<f64>>> = vec![None; fetch.0 + 1];

        for id in 0..=fetch.0 {
            if !needed[id] {
                continue;
            }
            let value = match &self.graph.nodes[id] {
                NodeKind::Placeholder { name } => feed
                    .values
                    .get(&NodeId(id))
                    .map(|v| v.to_owned())
                    .ok_or_else(|| LinRegError::UnfedPlaceholder(name.clone()))?,
                NodeKind::Variable { name, .. } => self
                    .variables
                    .get(&id)
                    .cloned()
                    .ok_or_else(|| LinRegError::InvalidGraph(format!("variable `{name}` missing")))?,
                NodeKind::Op { op, inputs } => {
                    let args = inputs
                        .iter()
                        .map(|&i| {
                            values[i].as_ref().ok_or_else(|| {
                                LinRegError::InvalidGraph(format!("node {i} not evaluated"))
                            })
                        })
                        .collect::<Result<Vec<_>>>()?;
                    op.forward(&args)?
                }
            };
            values[id] = Some(value);
        }

        Ok(Evaluation {
            graph: &self.graph,
            values,
        })
    }

    /// Evaluates `fetch` and returns its value. Only `fetch`'s ancestors are
    /// computed, so only the placeholders they use must be fed.
    pub fn run(&self, fetch: NodeId, feed: &FeedDict<'_>) -> Result<Array2<f64>> {
        let mut eval = self.evaluate(fetch, feed)?;
        eval.values[fetch.0]
            .take()
            .ok_or_else(|| LinRegError::InvalidGraph(format!("node {} not evaluated", fetch.0)))
    }

    /// Runs one gradient-descent step and returns the loss computed before
    /// the update.
    pub fn run_train(&mut self, train: &TrainOp, feed: &FeedDict<'_>) -> Result<Array2<f64>> {
        let (loss, updates) = {
            let eval = self.evaluate(train.loss, feed)?;
            let grads = backpropagate(&eval, train.loss.0)?;
            let loss = eval.values[train.loss.0].clone().ok_or_else(|| {
                LinRegError::InvalidGraph(format!("node {} not evaluated", train.loss.0))
            })?;
            let updates: Vec<(usize, Array2<f64>)> = train
                .variables
                .iter()
                .filter_map(|v| grads.get(v.0).cloned().flatten().map(|g| (v.0, g)))
                .collect();
            (loss, updates)
        };

        let lr = train.learning_rate;
        for (id, g) in updates {
            if let Some(value) = self.variables.get_mut(&id) {
                value.zip_mut_with(&g, |w, &g| *w -= lr * g);
            }
        }
        Ok(loss)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autodiff::Objective;
    use ndarray::array;

    fn linear_graph() -> (Graph, NodeId, NodeId, NodeId, NodeId, NodeId, NodeId) {
        let mut g = Graph::new();
        let x = g.placeholder("x");
        let y = g.placeholder("y");
        let w = g.variable("weights", array![[0.0], [0.0]]);
        let b = g.variable("bias", array![[0.0]]);
        let pred = g.linear(x, w, b).unwrap();
        let loss = Objective::HalfMse.build(&mut g, pred, y).unwrap();
        (g, x, y, w, b, pred, loss)
    }

    #[test]
    fn test_run_only_needs_ancestor_feeds() {
        let (g, x, _y, w, _b, pred, _loss) = linear_graph();
        let mut sess = Session::new(g);
        sess.assign(w, array![[1.0], [2.0]]).unwrap();

        let xs = array![[1.0, 1.0], [0.0, 3.0]];
        let out = sess.run(pred, &FeedDict::new().with(x, xs.view())).unwrap();
        assert_eq!(out, array![[3.0], [6.0]]);
    }

    #[test]
    fn test_unfed_placeholder() {
        let (g, x, _y, _w, _b, _pred, loss) = linear_graph();
        let sess = Session::new(g);
        let xs = array![[1.0, 1.0]];
        let err = sess.run(loss, &FeedDict::new().with(x, xs.view())).unwrap_err();
        assert!(matches!(err, LinRegError::UnfedPlaceholder(ref n) if n == "y"));
    }

    #[test]
    fn test_minimize_collects_variables() {
        let (g, _x, _y, w, b, _pred, loss) = linear_graph();
        let train = GradientDescent::new(0.1).minimize(&g, loss).unwrap();
        assert_eq!(train.variables(), &[w, b]);
        assert_eq!(train.loss(), loss);
        assert_eq!(g.name(w), Some("weights"));
    }

    #[test]
    fn test_run_train_matches_closed_form_step() {
        let (g, x, y, w, b, _pred, loss) = linear_graph();
        let train = GradientDescent::new(0.1).minimize(&g, loss).unwrap();
        let mut sess = Session::new(g);

        let xs = array![[1.0, 2.0], [3.0, 4.0]];
        let ys = array![[1.0], [2.0]];
        let feed = FeedDict::new().with(x, xs.view()).with(y, ys.view());
        let pre_loss = sess.run_train(&train, &feed).unwrap();

        // zero init: loss = ½·mean(y²), dw = -Xᵀy/2, db = -mean(y)
        assert!((pre_loss[[0, 0]] - 1.25).abs() < 1e-12);
        let wv = sess.variable(w).unwrap();
        assert!((wv[[0, 0]] - 0.1 * 3.5).abs() < 1e-12);
        assert!((wv[[1, 0]] - 0.1 * 5.0).abs() < 1e-12);
        assert!((sess.variable(b).unwrap()[[0, 0]] - 0.15).abs() < 1e-12);
    }

    #[test]
    fn test_assign_rejects_shape_change() {
        let (g, _x, _y, w, _b, _pred, _loss) = linear_graph();
        let mut sess = Session::new(g);
        let err = sess.assign(w, array![[1.0]]).unwrap_err();
        assert!(matches!(err, LinRegError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_shape_error_surfaces_at_run() {
        let (g, x, _y, _w, _b, pred, _loss) = linear_graph();
        let sess = Session::new(g);
        let xs = array![[1.0, 2.0, 3.0]];
        let err = sess.run(pred, &FeedDict::new().with(x, xs.view())).unwrap_err();
        assert!(matches!(err, LinRegError::ShapeMismatch { .. }));
    }
}
