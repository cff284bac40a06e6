use crate::autograd::data_grad::{structural_op, StructuralTransform};
use crate::error::AdjointError;
use crate::graph::{Graph, Var};
use crate::ndarray::utils::numel;
use crate::ndarray::NdArray;

/// Same elements in row-major order, new shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reshape {
    pub shape: Vec<usize>,
}

impl StructuralTransform for Reshape {
    const NAME: &'static str = "Reshape";
    const DATA_GRAD_NAME: &'static str = "ReshapeDataGrad";

    fn output_shape(&self, input_shape: &[usize]) -> Result<Vec<usize>, AdjointError> {
        if numel(input_shape) != numel(&self.shape) {
            return Err(AdjointError::ShapeMismatch {
                expected: input_shape.to_vec(),
                actual: self.shape.clone(),
                operation: Self::NAME.to_string(),
            });
        }
        Ok(self.shape.clone())
    }

    fn apply(&self, x: &NdArray) -> Result<NdArray, AdjointError> {
        x.reshape(&self.shape)
    }

    fn apply_adjoint(&self, dy: &NdArray, input_shape: &[usize]) -> Result<NdArray, AdjointError> {
        dy.reshape(input_shape)
    }
}

pub fn reshape_op(graph: &mut Graph, x: Var, shape: &[usize]) -> Result<Var, AdjointError> {
    structural_op(graph, x, Reshape { shape: shape.to_vec() })
}
