use std::any::Any;

use super::utils::{calculate_reduction_output_shape, process_reduction_axes, reduction_index_map};
use crate::autograd::BackwardContext;
use crate::error::AdjointError;
use crate::function::{expect_inputs, Function, VarMeta};
use crate::graph::{Graph, Var};
use crate::ndarray::NdArray;
use crate::ops::view::{broadcast_to_op, reshape_op};

/// Sum over `axes` (every axis when empty).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Sum {
    pub axes: Vec<usize>,
    pub keep_dims: bool,
}

impl Function for Sum {
    fn name(&self) -> &str {
        "Sum"
    }

    fn setup(&self, inputs: &[VarMeta]) -> Result<Vec<VarMeta>, AdjointError> {
        expect_inputs(self.name(), inputs, 1)?;
        let shape = &inputs[0].shape;
        let axes = process_reduction_axes(shape.len(), &self.axes, self.name())?;
        Ok(vec![VarMeta::new(
            calculate_reduction_output_shape(shape, &axes, self.keep_dims),
            inputs[0].dtype,
        )])
    }

    fn forward(&self, inputs: &[&NdArray]) -> Result<Vec<NdArray>, AdjointError> {
        expect_inputs(self.name(), inputs, 1)?;
        let x = inputs[0];
        let axes = process_reduction_axes(x.shape().len(), &self.axes, self.name())?;
        let out_shape = calculate_reduction_output_shape(x.shape(), &axes, self.keep_dims);
        let indices = reduction_index_map(x.shape(), &axes);
        Ok(vec![x.scatter_add(&indices, &out_shape)?])
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub fn sum_op(graph: &mut Graph, x: Var, axes: &[usize], keep_dims: bool) -> Result<Var, AdjointError> {
    graph.apply_one(
        Sum {
            axes: axes.to_vec(),
            keep_dims,
        },
        &[x],
    )
}

/// Sum of every element, as a 0-d value.
pub fn sum_all_op(graph: &mut Graph, x: Var) -> Result<Var, AdjointError> {
    sum_op(graph, x, &[], false)
}

/// Restores the reduced axes as size 1, then broadcasts back to the input shape.
pub(crate) fn sum_backward(
    graph: &mut Graph,
    ctx: &BackwardContext,
) -> Result<Vec<Option<Var>>, AdjointError> {
    if !ctx.propagate_down(0) {
        return Ok(vec![None]);
    }
    let sum = ctx.function_as::<Sum>()?;
    let input_shape = ctx.input_shape(0)?.to_vec();
    let axes = process_reduction_axes(input_shape.len(), &sum.axes, "Sum")?;
    let kept_shape = calculate_reduction_output_shape(&input_shape, &axes, true);

    let mut dy = ctx.grad_output(0)?;
    if ctx.output_shape(0)? != kept_shape.as_slice() {
        dy = reshape_op(graph, dy, &kept_shape)?;
    }
    if kept_shape != input_shape {
        dy = broadcast_to_op(graph, dy, &input_shape)?;
    }
    Ok(vec![Some(dy)])
}

#[cfg(test)]
#[path = "sum_test.rs"]
mod tests;
