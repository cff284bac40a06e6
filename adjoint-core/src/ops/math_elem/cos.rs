use super::sin::sin_op;
use crate::autograd::BackwardContext;
use crate::error::AdjointError;
use crate::graph::{Graph, Var};
use crate::ops::arithmetic::{mul_op, neg_op};

unary_function!(
    Cos, "Cos", |v| v.cos(),
    input_data: true, output_data: false
);

pub fn cos_op(graph: &mut Graph, x: Var) -> Result<Var, AdjointError> {
    graph.apply_one(Cos, &[x])
}

/// `dx = -(dy * sin(x))`
pub(crate) fn cos_backward(
    graph: &mut Graph,
    ctx: &BackwardContext,
) -> Result<Vec<Option<Var>>, AdjointError> {
    if !ctx.propagate_down(0) {
        return Ok(vec![None]);
    }
    let s = sin_op(graph, ctx.input(0)?)?;
    let prod = mul_op(graph, ctx.grad_output(0)?, s)?;
    Ok(vec![Some(neg_op(graph, prod)?)])
}
