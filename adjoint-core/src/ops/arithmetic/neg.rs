use std::any::Any;

use num_traits::Float;

use crate::autograd::BackwardContext;
use crate::error::AdjointError;
use crate::function::{Function, VarMeta};
use crate::graph::{Graph, Var};
use crate::ndarray::{NdArray, UnaryKernel};
use crate::ops::{apply_unary, unary_setup};

/// Element-wise `y = -x`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Neg;

impl UnaryKernel for Neg {
    fn apply<T: Float>(&self, v: T) -> T {
        -v
    }
}

impl Function for Neg {
    fn name(&self) -> &str {
        "Neg"
    }

    fn setup(&self, inputs: &[VarMeta]) -> Result<Vec<VarMeta>, AdjointError> {
        unary_setup(self.name(), inputs)
    }

    fn forward(&self, inputs: &[&NdArray]) -> Result<Vec<NdArray>, AdjointError> {
        apply_unary(self.name(), self, inputs)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub fn neg_op(graph: &mut Graph, x: Var) -> Result<Var, AdjointError> {
    graph.apply_one(Neg, &[x])
}

pub(crate) fn neg_backward(
    graph: &mut Graph,
    ctx: &BackwardContext,
) -> Result<Vec<Option<Var>>, AdjointError> {
    if !ctx.propagate_down(0) {
        return Ok(vec![None]);
    }
    Ok(vec![Some(neg_op(graph, ctx.grad_output(0)?)?)])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neg_forward() {
        let mut g = Graph::new();
        let x = g.constant(NdArray::from_vec_f32(vec![1.0, -2.0, 0.0], vec![3]).unwrap());
        let y = neg_op(&mut g, x).unwrap();
        assert_eq!(g.evaluate(y).unwrap().to_vec_f32(), vec![-1.0, 2.0, 0.0]);
    }
}
