//! Differentiable primitives shared by the eager tape and the static graph.
//!
//! Every value is an `Array2<f64>`; vectors are carried as `(n, 1)` columns and
//! scalars as `(1, 1)`.

use ndarray::{Array2, Zip};

use crate::error::{LinRegError, Result};

/// One recorded operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Op {
    /// `(n, k) · (k, m)`
    MatMul,
    /// `(n, k) + (1, k)`, bias row broadcast over every row.
    AddBias,
    /// Element-wise `a - b` on equal shapes.
    Sub,
    /// Element-wise `a²`.
    Square,
    /// Mean of all elements, as `(1, 1)`.
    Mean,
    /// Multiply by a constant.
    Scale(f64),
}

impl Op {
    pub fn arity(self) -> usize {
        match self {
            Op::MatMul | Op::AddBias | Op::Sub => 2,
            Op::Square | Op::Mean | Op::Scale(_) => 1,
        }
    }

    pub fn forward(self, inputs: &[&Array2<f64>]) -> Result<Array2<f64>> {
        self.check_arity(inputs.len())?;
        let a = inputs[0];
        match self {
            Op::MatMul => {
                let b = inputs[1];
                if a.ncols() != b.nrows() {
                    return Err(LinRegError::ShapeMismatch {
                        expected: b.nrows(),
                        got: a.ncols(),
                    });
                }
                Ok(a.dot(b))
            }
            Op::AddBias => {
                let bias = inputs[1];
                if bias.nrows() != 1 || bias.ncols() != a.ncols() {
                    return Err(LinRegError::ShapeMismatch {
                        expected: a.ncols(),
                        got: bias.ncols(),
                    });
                }
                Ok(a + bias)
            }
            Op::Sub => {
                let b = inputs[1];
                if a.dim() != b.dim() {
                    return Err(LinRegError::DimensionMismatch {
                        features: a.nrows(),
                        targets: b.nrows(),
                    });
                }
                Ok(a - b)
            }
            Op::Square => Ok(a.mapv(|v| v * v)),
            Op::Mean => Ok(Array2::from_elem((1, 1), a.mean().unwrap_or(f64::NAN))),
            Op::Scale(c) => Ok(a * c),
        }
    }

    /// Vector-Jacobian products: one gradient per input, each shaped like
    /// that input. `grad` is the upstream gradient, shaped like the output.
    pub fn backward(self, inputs: &[&Array2<f64>], grad: &Array2<f64>) -> Result<Vec<Array2<f64>>> {
        self.check_arity(inputs.len())?;
        let a = inputs[0];
        let grads = match self {
            Op::MatMul => {
                let b = inputs[1];
                vec![grad.dot(&b.t()), a.t().dot(grad)]
            }
            Op::AddBias => {
                let db = Array2::from_shape_fn((1, grad.ncols()), |(_, j)| {
                    grad.column(j).sum()
                });
                vec![grad.clone(), db]
            }
            Op::Sub => vec![grad.clone(), grad.mapv(|g| -g)],
            Op::Square => vec![Zip::from(grad).and(a).map_collect(|&g, &x| 2.0 * g * x)],
            Op::Mean => {
                let share = grad[[0, 0]] / a.len() as f64;
                vec![Array2::from_elem(a.raw_dim(), share)]
            }
            Op::Scale(c) => vec![grad * c],
        };
        Ok(grads)
    }

    fn check_arity(self, got: usize) -> Result<()> {
        if got != self.arity() {
            return Err(LinRegError::InvalidGraph(format!(
                "{self:?} takes {} operands, got {got}",
                self.arity()
            )));
        }
        Ok(())
    }
}

/// Read access to a topologically ordered node list (a Wengert list).
///
/// Node ids are dense indices and every input id is smaller than the id of
/// the node consuming it.
pub(crate) trait Wengert {
    /// The operation and input ids of an interior node, `None` for leaves.
    fn op_of(&self, id: usize) -> Option<(Op, &[usize])>;

    /// The forward value of a node, if it was computed.
    fn value_of(&self, id: usize) -> Option<&Array2<f64>>;

    /// Whether gradients should flow into this node.
    fn wants_grad(&self, id: usize) -> bool;
}

/// Reverse-mode sweep from `root`, seeded with ones.
///
/// Returns one optional gradient per node id up to and including `root`;
/// nodes that do not influence `root` or do not want gradients get `None`.
pub(crate) fn backpropagate(list: &impl Wengert, root: usize) -> Result<Vec<Option<Array2<f64>>>> {
    let root_value = list
        .value_of(root)
        .ok_or_else(|| LinRegError::InvalidGraph(format!("node {root} has no value")))?;

    let mut grads: Vec<Option<Array2<f64>>> = vec![None; root + 1];
    grads[root] = Some(Array2::ones(root_value.raw_dim()));

    for id in (0..=root).rev() {
        let Some((op, inputs)) = list.op_of(id) else {
            continue;
        };
        let Some(upstream) = grads[id].clone() else {
            continue;
        };

        let values = inputs
            .iter()
            .map(|&i| {
                list.value_of(i)
                    .ok_or_else(|| LinRegError::InvalidGraph(format!("node {i} has no value")))
            })
            .collect::<Result<Vec<_>>>()?;

        for (&input, g) in inputs.iter().zip(op.backward(&values, &upstream)?) {
            if !list.wants_grad(input) {
                continue;
            }
            if let Some(acc) = grads[input].as_mut() {
                *acc += &g;
            } else {
                grads[input] = Some(g);
            }
        }
    }
    Ok(grads)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_matmul_forward_backward() {
        let x = array![[1.0, 2.0], [3.0, 4.0]];
        let w = array![[0.5], [-1.0]];

        let out = Op::MatMul.forward(&[&x, &w]).unwrap();
        assert_eq!(out, array![[-1.5], [-2.5]]);

        let g = array![[1.0], [1.0]];
        let grads = Op::MatMul.backward(&[&x, &w], &g).unwrap();
        assert_eq!(grads[0], array![[0.5, -1.0], [0.5, -1.0]]);
        assert_eq!(grads[1], array![[4.0], [6.0]]);
    }

    #[test]
    fn test_matmul_shape_mismatch() {
        let x = array![[1.0, 2.0, 3.0]];
        let w = array![[1.0], [1.0]];
        let err = Op::MatMul.forward(&[&x, &w]).unwrap_err();
        assert!(matches!(
            err,
            LinRegError::ShapeMismatch {
                expected: 2,
                got: 3
            }
        ));
    }

    #[test]
    fn test_add_bias_backward_sums_rows() {
        let a = array![[1.0], [2.0], [3.0]];
        let b = array![[10.0]];
        assert_eq!(
            Op::AddBias.forward(&[&a, &b]).unwrap(),
            array![[11.0], [12.0], [13.0]]
        );

        let g = array![[0.5], [0.25], [0.25]];
        let grads = Op::AddBias.backward(&[&a, &b], &g).unwrap();
        assert_eq!(grads[0], g);
        assert_eq!(grads[1], array![[1.0]]);
    }

    #[test]
    fn test_square_and_mean() {
        let a = array![[1.0], [-3.0]];
        let sq = Op::Square.forward(&[&a]).unwrap();
        assert_eq!(sq, array![[1.0], [9.0]]);
        assert_eq!(Op::Mean.forward(&[&sq]).unwrap(), array![[5.0]]);

        let dmean = Op::Mean.backward(&[&sq], &array![[1.0]]).unwrap();
        assert_eq!(dmean[0], array![[0.5], [0.5]]);

        let dsq = Op::Square.backward(&[&a], &dmean[0]).unwrap();
        assert_eq!(dsq[0], array![[1.0], [-3.0]]);
    }

    #[test]
    fn test_sub_and_scale() {
        let a = array![[3.0], [1.0]];
        let b = array![[1.0], [1.0]];
        assert_eq!(Op::Sub.forward(&[&a, &b]).unwrap(), array![[2.0], [0.0]]);
        let grads = Op::Sub.backward(&[&a, &b], &array![[1.0], [2.0]]).unwrap();
        assert_eq!(grads[1], array![[-1.0], [-2.0]]);

        assert_eq!(Op::Scale(0.5).forward(&[&a]).unwrap(), array![[1.5], [0.5]]);
    }

    #[test]
    fn test_wrong_arity() {
        let a = array![[1.0]];
        let err = Op::Sub.forward(&[&a]).unwrap_err();
        assert!(matches!(err, LinRegError::InvalidGraph(_)));
    }
}
