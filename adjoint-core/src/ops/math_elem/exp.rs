use crate::autograd::BackwardContext;
use crate::error::AdjointError;
use crate::graph::{Graph, Var};
use crate::ops::arithmetic::mul_op;

unary_function!(
    Exp, "Exp", |v| v.exp(),
    input_data: false, output_data: true
);

pub fn exp_op(graph: &mut Graph, x: Var) -> Result<Var, AdjointError> {
    graph.apply_one(Exp, &[x])
}

/// `dx = dy * y`
pub(crate) fn exp_backward(
    graph: &mut Graph,
    ctx: &BackwardContext,
) -> Result<Vec<Option<Var>>, AdjointError> {
    if !ctx.propagate_down(0) {
        return Ok(vec![None]);
    }
    Ok(vec![Some(mul_op(graph, ctx.grad_output(0)?, ctx.output(0)?)?)])
}
