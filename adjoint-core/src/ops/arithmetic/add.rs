use std::any::Any;

use num_traits::Float;

use crate::autograd::BackwardContext;
use crate::error::AdjointError;
use crate::function::{Function, VarMeta};
use crate::graph::{Graph, Var};
use crate::ndarray::{BinaryKernel, NdArray};
use crate::ops::{apply_binary, binary_setup};

/// Element-wise `y = a + b`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Add2;

struct AddKernel;

impl BinaryKernel for AddKernel {
    fn apply<T: Float>(&self, a: T, b: T) -> T {
        a + b
    }
}

impl Function for Add2 {
    fn name(&self) -> &str {
        "Add2"
    }

    fn num_inputs(&self) -> Option<usize> {
        Some(2)
    }

    fn setup(&self, inputs: &[VarMeta]) -> Result<Vec<VarMeta>, AdjointError> {
        binary_setup(self.name(), inputs)
    }

    fn forward(&self, inputs: &[&NdArray]) -> Result<Vec<NdArray>, AdjointError> {
        apply_binary(self.name(), &AddKernel, inputs)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub fn add_op(graph: &mut Graph, a: Var, b: Var) -> Result<Var, AdjointError> {
    graph.apply_one(Add2, &[a, b])
}

/// `da = dy`, `db = dy`
pub(crate) fn add2_backward(
    _graph: &mut Graph,
    ctx: &BackwardContext,
) -> Result<Vec<Option<Var>>, AdjointError> {
    let dy = ctx.grad_output(0)?;
    Ok(vec![
        ctx.propagate_down(0).then_some(dy),
        ctx.propagate_down(1).then_some(dy),
    ])
}
