use std::any::Any;

use super::utils::{broadcast_axes, broadcast_index_map, validate_broadcast};
use crate::autograd::BackwardContext;
use crate::error::AdjointError;
use crate::function::{expect_inputs, Function, VarMeta};
use crate::graph::{Graph, Var};
use crate::ndarray::NdArray;
use crate::ops::reduction::sum_op;

/// Repeats size-1 axes up to `shape`. Input and target must have the same rank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastTo {
    pub shape: Vec<usize>,
}

impl Function for BroadcastTo {
    fn name(&self) -> &str {
        "BroadcastTo"
    }

    fn setup(&self, inputs: &[VarMeta]) -> Result<Vec<VarMeta>, AdjointError> {
        expect_inputs(self.name(), inputs, 1)?;
        validate_broadcast(&inputs[0].shape, &self.shape)?;
        Ok(vec![VarMeta::new(self.shape.clone(), inputs[0].dtype)])
    }

    fn forward(&self, inputs: &[&NdArray]) -> Result<Vec<NdArray>, AdjointError> {
        expect_inputs(self.name(), inputs, 1)?;
        let x = inputs[0];
        validate_broadcast(x.shape(), &self.shape)?;
        Ok(vec![x.gather(&broadcast_index_map(x.shape(), &self.shape), &self.shape)?])
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub fn broadcast_to_op(graph: &mut Graph, x: Var, shape: &[usize]) -> Result<Var, AdjointError> {
    graph.apply_one(
        BroadcastTo {
            shape: shape.to_vec(),
        },
        &[x],
    )
}

/// `dx = sum(dy)` over the repeated axes, keeping them as size 1.
pub(crate) fn broadcast_to_backward(
    graph: &mut Graph,
    ctx: &BackwardContext,
) -> Result<Vec<Option<Var>>, AdjointError> {
    if !ctx.propagate_down(0) {
        return Ok(vec![None]);
    }
    let dy = ctx.grad_output(0)?;
    let axes = broadcast_axes(ctx.input_shape(0)?, ctx.output_shape(0)?);
    if axes.is_empty() {
        return Ok(vec![Some(dy)]);
    }
    Ok(vec![Some(sum_op(graph, dy, &axes, true)?)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autograd::grad;
    use crate::autograd::grad_check::check_grad;
    use crate::types::DType;
    use crate::utils::testing::check_array_near;

    #[test]
    fn test_broadcast_forward() {
        let mut g = Graph::new();
        let x = g.constant(NdArray::from_vec_f64(vec![1.0, 2.0], vec![2, 1]).unwrap());
        let y = broadcast_to_op(&mut g, x, &[2, 3]).unwrap();
        check_array_near(&g.evaluate(y).unwrap(), &[2, 3], &[1.0, 1.0, 1.0, 2.0, 2.0, 2.0], 0.0);
    }

    #[test]
    fn test_broadcast_rejects_incompatible() {
        let mut g = Graph::new();
        let x = g.variable(&[2, 2], DType::F32, false);
        assert!(matches!(
            broadcast_to_op(&mut g, x, &[2, 3]),
            Err(AdjointError::BroadcastError { .. })
        ));
    }

    #[test]
    fn test_broadcast_backward_sums_repeats() {
        let mut g = Graph::new();
        let x = g.from_array(NdArray::ones(&[1, 3], DType::F64), true);
        let y = broadcast_to_op(&mut g, x, &[4, 3]).unwrap();
        let dx = grad(&mut g, &[y], &[x], &[]).unwrap()[0];
        check_array_near(&g.evaluate(dx).unwrap(), &[1, 3], &[4.0, 4.0, 4.0], 1e-12);
    }

    #[test]
    fn test_broadcast_grad_check() {
        let x = NdArray::randn(&[2, 1], DType::F64, 8);
        let w = NdArray::randn(&[2, 3], DType::F64, 9);
        check_grad(
            |g, xs| {
                let b = broadcast_to_op(g, xs[0], &[2, 3])?;
                let w = g.constant(w.clone());
                crate::ops::arithmetic::mul_op(g, b, w)
            },
            &[x],
            1e-6,
            1e-5,
        )
        .unwrap();
    }
}
