//! Element-wise operations between a variable and a constant `f64` parameter.
//!
//! The parameter is stored on the function and converted to the input's float
//! type inside the kernel, so one struct serves both dtypes.

use std::any::Any;

use num_traits::Float;

use super::mul::mul_op;
use super::neg::neg_op;
use crate::autograd::BackwardContext;
use crate::error::AdjointError;
use crate::function::{Function, VarMeta};
use crate::graph::{Graph, Var};
use crate::ndarray::utils::float_from;
use crate::ndarray::{NdArray, UnaryKernel};
use crate::ops::{apply_unary, unary_setup};

macro_rules! scalar_function {
    ($ty:ident, $name:literal, |$v:ident, $c:ident| $body:expr) => {
        #[derive(Debug, Clone, Copy, PartialEq)]
        pub struct $ty {
            pub value: f64,
        }

        impl UnaryKernel for $ty {
            fn apply<T: Float>(&self, $v: T) -> T {
                let $c: T = float_from(self.value);
                $body
            }
        }

        impl Function for $ty {
            fn name(&self) -> &str {
                $name
            }

            fn setup(&self, inputs: &[VarMeta]) -> Result<Vec<VarMeta>, AdjointError> {
                unary_setup(self.name(), inputs)
            }

            fn forward(&self, inputs: &[&NdArray]) -> Result<Vec<NdArray>, AdjointError> {
                apply_unary(self.name(), self, inputs)
            }

            fn grad_depends_input_data(&self, _i: usize, _j: usize) -> bool {
                Self::NEEDS_INPUT
            }

            fn as_any(&self) -> &dyn Any {
                self
            }
        }
    };
}

scalar_function!(AddScalar, "AddScalar", |v, c| v + c);
scalar_function!(MulScalar, "MulScalar", |v, c| v * c);
scalar_function!(PowScalar, "PowScalar", |v, c| v.powf(c));
scalar_function!(RSubScalar, "RSubScalar", |v, c| c - v);

impl AddScalar {
    const NEEDS_INPUT: bool = false;
}

impl MulScalar {
    const NEEDS_INPUT: bool = false;
}

impl PowScalar {
    const NEEDS_INPUT: bool = true;
}

impl RSubScalar {
    const NEEDS_INPUT: bool = false;
}

/// `y = x + value`
pub fn add_scalar_op(graph: &mut Graph, x: Var, value: f64) -> Result<Var, AdjointError> {
    graph.apply_one(AddScalar { value }, &[x])
}

/// `y = x * value`
pub fn mul_scalar_op(graph: &mut Graph, x: Var, value: f64) -> Result<Var, AdjointError> {
    graph.apply_one(MulScalar { value }, &[x])
}

/// `y = x ^ value`
pub fn pow_scalar_op(graph: &mut Graph, x: Var, value: f64) -> Result<Var, AdjointError> {
    graph.apply_one(PowScalar { value }, &[x])
}

/// `y = value - x`
pub fn rsub_scalar_op(graph: &mut Graph, x: Var, value: f64) -> Result<Var, AdjointError> {
    graph.apply_one(RSubScalar { value }, &[x])
}

pub(crate) fn add_scalar_backward(
    _graph: &mut Graph,
    ctx: &BackwardContext,
) -> Result<Vec<Option<Var>>, AdjointError> {
    Ok(vec![ctx.propagate_down(0).then_some(ctx.grad_output(0)?)])
}

pub(crate) fn mul_scalar_backward(
    graph: &mut Graph,
    ctx: &BackwardContext,
) -> Result<Vec<Option<Var>>, AdjointError> {
    if !ctx.propagate_down(0) {
        return Ok(vec![None]);
    }
    let value = ctx.function_as::<MulScalar>()?.value;
    Ok(vec![Some(mul_scalar_op(graph, ctx.grad_output(0)?, value)?)])
}

/// `dx = dy * value * x ^ (value - 1)`
pub(crate) fn pow_scalar_backward(
    graph: &mut Graph,
    ctx: &BackwardContext,
) -> Result<Vec<Option<Var>>, AdjointError> {
    if !ctx.propagate_down(0) {
        return Ok(vec![None]);
    }
    let value = ctx.function_as::<PowScalar>()?.value;
    let dy = ctx.grad_output(0)?;
    if value == 0.0 {
        return Ok(vec![Some(mul_scalar_op(graph, dy, 0.0)?)]);
    }
    let x = ctx.input(0)?;
    let lowered = pow_scalar_op(graph, x, value - 1.0)?;
    let slope = mul_scalar_op(graph, lowered, value)?;
    Ok(vec![Some(mul_op(graph, dy, slope)?)])
}

pub(crate) fn rsub_scalar_backward(
    graph: &mut Graph,
    ctx: &BackwardContext,
) -> Result<Vec<Option<Var>>, AdjointError> {
    if !ctx.propagate_down(0) {
        return Ok(vec![None]);
    }
    Ok(vec![Some(neg_op(graph, ctx.grad_output(0)?)?)])
}

#[cfg(test)]
#[path = "scalar_test.rs"]
mod tests;
