use std::any::Any;

use super::concat::concatenate_op;
use super::utils::{axis_window, slice_index_map, slice_output_shape};
use crate::autograd::BackwardContext;
use crate::error::AdjointError;
use crate::function::{expect_inputs, Function, VarMeta};
use crate::graph::{Graph, Var};
use crate::ndarray::NdArray;

/// Cuts the input into `sections` equal pieces along `axis`, one output each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Split {
    pub axis: usize,
    pub sections: usize,
}

impl Split {
    /// Length of each piece along `axis`.
    fn piece_len(&self, shape: &[usize]) -> Result<usize, AdjointError> {
        if self.axis >= shape.len() {
            return Err(AdjointError::InvalidAxis {
                axis: self.axis,
                rank: shape.len(),
                operation: "Split".to_string(),
            });
        }
        let dim = shape[self.axis];
        if self.sections == 0 || dim % self.sections != 0 {
            return Err(AdjointError::UnsupportedOperation(format!(
                "Split: axis {} of size {} cannot be cut into {} equal sections",
                self.axis, dim, self.sections
            )));
        }
        Ok(dim / self.sections)
    }
}

impl Function for Split {
    fn name(&self) -> &str {
        "Split"
    }

    fn setup(&self, inputs: &[VarMeta]) -> Result<Vec<VarMeta>, AdjointError> {
        expect_inputs(self.name(), inputs, 1)?;
        let len = self.piece_len(&inputs[0].shape)?;
        let mut shape = inputs[0].shape.clone();
        shape[self.axis] = len;
        Ok(vec![VarMeta::new(shape, inputs[0].dtype); self.sections])
    }

    fn forward(&self, inputs: &[&NdArray]) -> Result<Vec<NdArray>, AdjointError> {
        expect_inputs(self.name(), inputs, 1)?;
        let x = inputs[0];
        let len = self.piece_len(x.shape())?;
        (0..self.sections)
            .map(|k| {
                let ranges = axis_window(x.shape(), self.axis, k * len, len);
                x.gather(&slice_index_map(x.shape(), &ranges), &slice_output_shape(&ranges))
            })
            .collect()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub fn split_op(graph: &mut Graph, x: Var, axis: usize, sections: usize) -> Result<Vec<Var>, AdjointError> {
    graph.apply(Split { axis, sections }, &[x])
}

/// `dx = concatenate(dy_0, ..., dy_n)`
pub(crate) fn split_backward(
    graph: &mut Graph,
    ctx: &BackwardContext,
) -> Result<Vec<Option<Var>>, AdjointError> {
    if !ctx.propagate_down(0) {
        return Ok(vec![None]);
    }
    let axis = ctx.function_as::<Split>()?.axis;
    Ok(vec![Some(concatenate_op(graph, ctx.grad_outputs(), axis)?)])
}
