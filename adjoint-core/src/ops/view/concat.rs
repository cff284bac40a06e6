use std::any::Any;

use super::slice::slice_op;
use crate::autograd::BackwardContext;
use crate::error::AdjointError;
use crate::function::{Function, VarMeta};
use crate::graph::{Graph, Var};
use crate::ndarray::utils::{calculate_strides, coord_to_index, index_to_coord, numel};
use crate::ndarray::NdArray;

/// Joins any number of inputs along `axis`. All other axes must agree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Concatenate {
    pub axis: usize,
}

impl Concatenate {
    fn output_shape(&self, shapes: &[&[usize]]) -> Result<Vec<usize>, AdjointError> {
        let first = match shapes.first() {
            Some(first) => *first,
            None => {
                return Err(AdjointError::ArityMismatch {
                    operation: "Concatenate".to_string(),
                    what: "inputs (at least)",
                    expected: 1,
                    actual: 0,
                })
            }
        };
        let rank = first.len();
        if self.axis >= rank {
            return Err(AdjointError::InvalidAxis {
                axis: self.axis,
                rank,
                operation: "Concatenate".to_string(),
            });
        }
        let mut out = first.to_vec();
        out[self.axis] = 0;
        for shape in shapes {
            let compatible = shape.len() == rank
                && shape
                    .iter()
                    .enumerate()
                    .all(|(i, &d)| i == self.axis || d == first[i]);
            if !compatible {
                return Err(AdjointError::ShapeMismatch {
                    expected: first.to_vec(),
                    actual: shape.to_vec(),
                    operation: "Concatenate".to_string(),
                });
            }
            out[self.axis] += shape[self.axis];
        }
        Ok(out)
    }
}

impl Function for Concatenate {
    fn name(&self) -> &str {
        "Concatenate"
    }

    fn num_inputs(&self) -> Option<usize> {
        None
    }

    fn setup(&self, inputs: &[VarMeta]) -> Result<Vec<VarMeta>, AdjointError> {
        let shapes: Vec<&[usize]> = inputs.iter().map(|m| m.shape.as_slice()).collect();
        let shape = self.output_shape(&shapes)?;
        Ok(vec![VarMeta::new(shape, inputs[0].dtype)])
    }

    fn forward(&self, inputs: &[&NdArray]) -> Result<Vec<NdArray>, AdjointError> {
        let shapes: Vec<&[usize]> = inputs.iter().map(|a| a.shape()).collect();
        let out_shape = self.output_shape(&shapes)?;
        let flat = NdArray::concat_flat(inputs)?;

        // For each output position along `axis`: (source input, its offset in `flat`, local index).
        let mut owner = Vec::with_capacity(out_shape[self.axis]);
        let mut base = 0;
        for (k, shape) in shapes.iter().enumerate() {
            for local in 0..shape[self.axis] {
                owner.push((k, base, local));
            }
            base += numel(shape);
        }
        let in_strides: Vec<Vec<usize>> = shapes.iter().map(|s| calculate_strides(s)).collect();
        let out_strides = calculate_strides(&out_shape);
        let indices: Vec<usize> = (0..numel(&out_shape))
            .map(|i| {
                let mut coord = index_to_coord(i, &out_strides, &out_shape);
                let (k, base, local) = owner[coord[self.axis]];
                coord[self.axis] = local;
                base + coord_to_index(&coord, &in_strides[k])
            })
            .collect();
        Ok(vec![flat.gather(&indices, &out_shape)?])
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub fn concatenate_op(graph: &mut Graph, inputs: &[Var], axis: usize) -> Result<Var, AdjointError> {
    graph.apply_one(Concatenate { axis }, inputs)
}

/// Each input receives the window of `dy` it occupied.
pub(crate) fn concatenate_backward(
    graph: &mut Graph,
    ctx: &BackwardContext,
) -> Result<Vec<Option<Var>>, AdjointError> {
    let axis = ctx.function_as::<Concatenate>()?.axis;
    let dy = ctx.grad_output(0)?;
    let out_shape = ctx.output_shape(0)?.to_vec();
    let mut offset = 0;
    let mut grads = Vec::with_capacity(ctx.num_inputs());
    for j in 0..ctx.num_inputs() {
        let len = ctx.input_shape(j)?[axis];
        if ctx.propagate_down(j) {
            let mut start = vec![0; out_shape.len()];
            let mut stop = out_shape.clone();
            start[axis] = offset;
            stop[axis] = offset + len;
            let step = vec![1; out_shape.len()];
            grads.push(Some(slice_op(graph, dy, &start, &stop, &step)?));
        } else {
            grads.push(None);
        }
        offset += len;
    }
    Ok(grads)
}
