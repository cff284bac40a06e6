use crate::autograd::BackwardContext;
use crate::error::AdjointError;
use crate::graph::{Graph, Var};
use crate::ops::arithmetic::div_op;

unary_function!(
    /// Natural logarithm. Non-positive inputs give `-inf`/`NaN` as usual.
    Log, "Log", |v| v.ln(),
    input_data: true, output_data: false
);

pub fn log_op(graph: &mut Graph, x: Var) -> Result<Var, AdjointError> {
    graph.apply_one(Log, &[x])
}

/// `dx = dy / x`
pub(crate) fn log_backward(
    graph: &mut Graph,
    ctx: &BackwardContext,
) -> Result<Vec<Option<Var>>, AdjointError> {
    if !ctx.propagate_down(0) {
        return Ok(vec![None]);
    }
    Ok(vec![Some(div_op(graph, ctx.grad_output(0)?, ctx.input(0)?)?)])
}
