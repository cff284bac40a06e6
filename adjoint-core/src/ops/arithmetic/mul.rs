use std::any::Any;

use num_traits::Float;

use crate::autograd::BackwardContext;
use crate::error::AdjointError;
use crate::function::{Function, VarMeta};
use crate::graph::{Graph, Var};
use crate::ndarray::{BinaryKernel, NdArray};
use crate::ops::{apply_binary, binary_setup};

/// Element-wise `y = a * b`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Mul2;

struct MulKernel;

impl BinaryKernel for MulKernel {
    fn apply<T: Float>(&self, a: T, b: T) -> T {
        a * b
    }
}

impl Function for Mul2 {
    fn name(&self) -> &str {
        "Mul2"
    }

    fn num_inputs(&self) -> Option<usize> {
        Some(2)
    }

    fn setup(&self, inputs: &[VarMeta]) -> Result<Vec<VarMeta>, AdjointError> {
        binary_setup(self.name(), inputs)
    }

    fn forward(&self, inputs: &[&NdArray]) -> Result<Vec<NdArray>, AdjointError> {
        apply_binary(self.name(), &MulKernel, inputs)
    }

    // da needs b, db needs a.
    fn grad_depends_input_data(&self, i: usize, j: usize) -> bool {
        i != j
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub fn mul_op(graph: &mut Graph, a: Var, b: Var) -> Result<Var, AdjointError> {
    graph.apply_one(Mul2, &[a, b])
}

/// `da = dy * b`, `db = dy * a`
pub(crate) fn mul2_backward(
    graph: &mut Graph,
    ctx: &BackwardContext,
) -> Result<Vec<Option<Var>>, AdjointError> {
    let dy = ctx.grad_output(0)?;
    let da = if ctx.propagate_down(0) {
        Some(mul_op(graph, dy, ctx.input(1)?)?)
    } else {
        None
    };
    let db = if ctx.propagate_down(1) {
        Some(mul_op(graph, dy, ctx.input(0)?)?)
    } else {
        None
    };
    Ok(vec![da, db])
}

#[cfg(test)]
#[path = "mul_test.rs"]
mod tests;
