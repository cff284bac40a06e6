use super::cos::cos_op;
use crate::autograd::BackwardContext;
use crate::error::AdjointError;
use crate::graph::{Graph, Var};
use crate::ops::arithmetic::mul_op;

unary_function!(
    Sin, "Sin", |v| v.sin(),
    input_data: true, output_data: false
);

pub fn sin_op(graph: &mut Graph, x: Var) -> Result<Var, AdjointError> {
    graph.apply_one(Sin, &[x])
}

/// `dx = dy * cos(x)`
pub(crate) fn sin_backward(
    graph: &mut Graph,
    ctx: &BackwardContext,
) -> Result<Vec<Option<Var>>, AdjointError> {
    if !ctx.propagate_down(0) {
        return Ok(vec![None]);
    }
    let c = cos_op(graph, ctx.input(0)?)?;
    Ok(vec![Some(mul_op(graph, ctx.grad_output(0)?, c)?)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autograd::grad;
    use crate::ndarray::NdArray;
    use approx::assert_relative_eq;

    #[test]
    fn test_sin_third_derivative() {
        let mut g = Graph::new();
        let x0 = 0.7f64;
        let x = g.from_array(NdArray::from_vec_f64(vec![x0], vec![1]).unwrap(), true);
        let y = sin_op(&mut g, x).unwrap();
        let d1 = grad(&mut g, &[y], &[x], &[]).unwrap()[0];
        let d2 = grad(&mut g, &[d1], &[x], &[]).unwrap()[0];
        let d3 = grad(&mut g, &[d2], &[x], &[]).unwrap()[0];
        let values = g.evaluate_all(&[d1, d2, d3]).unwrap();
        assert_relative_eq!(values[0].item().unwrap(), x0.cos(), epsilon = 1e-12);
        assert_relative_eq!(values[1].item().unwrap(), -x0.sin(), epsilon = 1e-12);
        assert_relative_eq!(values[2].item().unwrap(), -x0.cos(), epsilon = 1e-12);
    }
}
