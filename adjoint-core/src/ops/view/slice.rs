use super::utils::{normalize_slice, slice_index_map, slice_output_shape, SliceRange};
use crate::autograd::data_grad::{structural_op, StructuralTransform};
use crate::error::AdjointError;
use crate::graph::{Graph, Var};
use crate::ndarray::NdArray;

/// Strided window `start[i]..stop[i]` by `step[i]` along every axis.
///
/// `stop` is clamped to the axis length; steps must be positive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slice {
    pub start: Vec<usize>,
    pub stop: Vec<usize>,
    pub step: Vec<usize>,
}

impl Slice {
    fn ranges(&self, input_shape: &[usize]) -> Result<Vec<SliceRange>, AdjointError> {
        let rank = input_shape.len();
        if self.start.len() != rank || self.stop.len() != rank || self.step.len() != rank {
            return Err(AdjointError::SliceError {
                message: format!(
                    "start/stop/step must have {} entries, got {}/{}/{}",
                    rank,
                    self.start.len(),
                    self.stop.len(),
                    self.step.len()
                ),
            });
        }
        input_shape
            .iter()
            .enumerate()
            .map(|(i, &dim)| normalize_slice(self.start[i], self.stop[i], self.step[i], dim))
            .collect()
    }
}

impl StructuralTransform for Slice {
    const NAME: &'static str = "Slice";
    const DATA_GRAD_NAME: &'static str = "SliceDataGrad";

    fn output_shape(&self, input_shape: &[usize]) -> Result<Vec<usize>, AdjointError> {
        Ok(slice_output_shape(&self.ranges(input_shape)?))
    }

    fn apply(&self, x: &NdArray) -> Result<NdArray, AdjointError> {
        let ranges = self.ranges(x.shape())?;
        x.gather(&slice_index_map(x.shape(), &ranges), &slice_output_shape(&ranges))
    }

    fn apply_adjoint(&self, dy: &NdArray, input_shape: &[usize]) -> Result<NdArray, AdjointError> {
        let ranges = self.ranges(input_shape)?;
        dy.scatter_add(&slice_index_map(input_shape, &ranges), input_shape)
    }
}

pub fn slice_op(
    graph: &mut Graph,
    x: Var,
    start: &[usize],
    stop: &[usize],
    step: &[usize],
) -> Result<Var, AdjointError> {
    structural_op(
        graph,
        x,
        Slice {
            start: start.to_vec(),
            stop: stop.to_vec(),
            step: step.to_vec(),
        },
    )
}

#[cfg(test)]
#[path = "slice_test.rs"]
mod tests;
