use std::any::Any;

use num_traits::Float;

use super::mul::mul_op;
use super::neg::neg_op;
use crate::autograd::BackwardContext;
use crate::error::AdjointError;
use crate::function::{Function, VarMeta};
use crate::graph::{Graph, Var};
use crate::ndarray::{BinaryKernel, NdArray};
use crate::ops::{apply_binary, binary_setup};

/// Element-wise `y = a / b`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Div2;

struct DivKernel;

impl BinaryKernel for DivKernel {
    fn apply<T: Float>(&self, a: T, b: T) -> T {
        a / b
    }
}

impl Function for Div2 {
    fn name(&self) -> &str {
        "Div2"
    }

    fn num_inputs(&self) -> Option<usize> {
        Some(2)
    }

    fn setup(&self, inputs: &[VarMeta]) -> Result<Vec<VarMeta>, AdjointError> {
        binary_setup(self.name(), inputs)
    }

    fn forward(&self, inputs: &[&NdArray]) -> Result<Vec<NdArray>, AdjointError> {
        apply_binary(self.name(), &DivKernel, inputs)
    }

    // da needs b; db needs both.
    fn grad_depends_input_data(&self, i: usize, j: usize) -> bool {
        j == 1 || i == 1
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub fn div_op(graph: &mut Graph, a: Var, b: Var) -> Result<Var, AdjointError> {
    graph.apply_one(Div2, &[a, b])
}

/// `da = dy / b`, `db = -(dy / b) * (a / b)`
pub(crate) fn div2_backward(
    graph: &mut Graph,
    ctx: &BackwardContext,
) -> Result<Vec<Option<Var>>, AdjointError> {
    let dy = ctx.grad_output(0)?;
    let b = ctx.input(1)?;
    let t = div_op(graph, dy, b)?;
    let da = ctx.propagate_down(0).then_some(t);
    let db = if ctx.propagate_down(1) {
        let a = ctx.input(0)?;
        let ratio = div_op(graph, a, b)?;
        let prod = mul_op(graph, t, ratio)?;
        Some(neg_op(graph, prod)?)
    } else {
        None
    };
    Ok(vec![da, db])
}

#[cfg(test)]
#[path = "div_test.rs"]
mod tests;
