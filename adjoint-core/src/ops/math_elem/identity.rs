use crate::autograd::BackwardContext;
use crate::error::AdjointError;
use crate::graph::{Graph, Var};

unary_function!(
    /// `y = x`, as a distinct node.
    Identity, "Identity", |v| v,
    input_data: false, output_data: false
);

pub fn identity_op(graph: &mut Graph, x: Var) -> Result<Var, AdjointError> {
    graph.apply_one(Identity, &[x])
}

pub(crate) fn identity_backward(
    _graph: &mut Graph,
    ctx: &BackwardContext,
) -> Result<Vec<Option<Var>>, AdjointError> {
    Ok(vec![ctx.propagate_down(0).then_some(ctx.grad_output(0)?)])
}
