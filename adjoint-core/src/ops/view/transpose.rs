use super::utils::{permute_index_map, permute_shape, validate_permutation};
use crate::autograd::data_grad::{structural_op, StructuralTransform};
use crate::error::AdjointError;
use crate::graph::{Graph, Var};
use crate::ndarray::NdArray;

/// Axis permutation: output axis `k` is input axis `axes[k]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transpose {
    pub axes: Vec<usize>,
}

impl StructuralTransform for Transpose {
    const NAME: &'static str = "Transpose";
    const DATA_GRAD_NAME: &'static str = "TransposeDataGrad";

    fn output_shape(&self, input_shape: &[usize]) -> Result<Vec<usize>, AdjointError> {
        validate_permutation(input_shape.len(), &self.axes)?;
        Ok(permute_shape(input_shape, &self.axes))
    }

    fn apply(&self, x: &NdArray) -> Result<NdArray, AdjointError> {
        let shape = self.output_shape(x.shape())?;
        x.gather(&permute_index_map(x.shape(), &self.axes), &shape)
    }

    fn apply_adjoint(&self, dy: &NdArray, input_shape: &[usize]) -> Result<NdArray, AdjointError> {
        validate_permutation(input_shape.len(), &self.axes)?;
        dy.scatter_add(&permute_index_map(input_shape, &self.axes), input_shape)
    }
}

pub fn transpose_op(graph: &mut Graph, x: Var, axes: &[usize]) -> Result<Var, AdjointError> {
    structural_op(graph, x, Transpose { axes: axes.to_vec() })
}

#[cfg(test)]
#[path = "transpose_test.rs"]
mod tests;
