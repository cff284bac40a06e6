use crate::autograd::BackwardContext;
use crate::error::AdjointError;
use crate::graph::{Graph, Var};
use crate::ops::arithmetic::{mul_op, rsub_scalar_op};

unary_function!(
    /// Logistic function `1 / (1 + e^-x)`.
    Sigmoid, "Sigmoid", |v| ((-v).exp() + T::one()).recip(),
    input_data: false, output_data: true
);

pub fn sigmoid_op(graph: &mut Graph, x: Var) -> Result<Var, AdjointError> {
    graph.apply_one(Sigmoid, &[x])
}

/// `dx = dy * y * (1 - y)`
pub(crate) fn sigmoid_backward(
    graph: &mut Graph,
    ctx: &BackwardContext,
) -> Result<Vec<Option<Var>>, AdjointError> {
    if !ctx.propagate_down(0) {
        return Ok(vec![None]);
    }
    let y = ctx.output(0)?;
    let one_minus = rsub_scalar_op(graph, y, 1.0)?;
    let slope = mul_op(graph, y, one_minus)?;
    Ok(vec![Some(mul_op(graph, ctx.grad_output(0)?, slope)?)])
}
