use std::any::Any;

use num_traits::Float;

use super::neg::neg_op;
use crate::autograd::BackwardContext;
use crate::error::AdjointError;
use crate::function::{Function, VarMeta};
use crate::graph::{Graph, Var};
use crate::ndarray::{BinaryKernel, NdArray};
use crate::ops::{apply_binary, binary_setup};

/// Element-wise `y = a - b`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sub2;

struct SubKernel;

impl BinaryKernel for SubKernel {
    fn apply<T: Float>(&self, a: T, b: T) -> T {
        a - b
    }
}

impl Function for Sub2 {
    fn name(&self) -> &str {
        "Sub2"
    }

    fn num_inputs(&self) -> Option<usize> {
        Some(2)
    }

    fn setup(&self, inputs: &[VarMeta]) -> Result<Vec<VarMeta>, AdjointError> {
        binary_setup(self.name(), inputs)
    }

    fn forward(&self, inputs: &[&NdArray]) -> Result<Vec<NdArray>, AdjointError> {
        apply_binary(self.name(), &SubKernel, inputs)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub fn sub_op(graph: &mut Graph, a: Var, b: Var) -> Result<Var, AdjointError> {
    graph.apply_one(Sub2, &[a, b])
}

/// `da = dy`, `db = -dy`
pub(crate) fn sub2_backward(
    graph: &mut Graph,
    ctx: &BackwardContext,
) -> Result<Vec<Option<Var>>, AdjointError> {
    let dy = ctx.grad_output(0)?;
    let db = if ctx.propagate_down(1) {
        Some(neg_op(graph, dy)?)
    } else {
        None
    };
    Ok(vec![ctx.propagate_down(0).then_some(dy), db])
}
