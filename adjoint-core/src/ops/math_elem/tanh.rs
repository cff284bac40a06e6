use crate::autograd::BackwardContext;
use crate::error::AdjointError;
use crate::graph::{Graph, Var};
use crate::ops::arithmetic::{mul_op, rsub_scalar_op};

unary_function!(
    Tanh, "Tanh", |v| v.tanh(),
    input_data: false, output_data: true
);

pub fn tanh_op(graph: &mut Graph, x: Var) -> Result<Var, AdjointError> {
    graph.apply_one(Tanh, &[x])
}

/// `dx = dy * (1 - y^2)`
pub(crate) fn tanh_backward(
    graph: &mut Graph,
    ctx: &BackwardContext,
) -> Result<Vec<Option<Var>>, AdjointError> {
    if !ctx.propagate_down(0) {
        return Ok(vec![None]);
    }
    let y = ctx.output(0)?;
    let y2 = mul_op(graph, y, y)?;
    let slope = rsub_scalar_op(graph, y2, 1.0)?;
    Ok(vec![Some(mul_op(graph, ctx.grad_output(0)?, slope)?)])
}
