//! # Primitive Operations Module (`ops`)
//!
//! The reference set of primitives the graph can be built from. Each primitive
//! lives in its own file and contributes three things:
//!
//! - **A `Function` struct** (e.g. `Mul2`, `Sum`) holding the op parameters,
//!   inferring output shapes, running the CPU kernel, and declaring which forward
//!   values its gradient needs.
//! - **An `_op` builder** (e.g. `mul_op`) appending the function to a [`Graph`].
//! - **A `_backward` adapter** building the gradient sub-graph out of other
//!   primitives, registered under the function's name by [`register_builtin`].
//!
//! Structural primitives (`Transpose`, `Reshape`, `Slice`) do not have hand-written
//! adapters; they instantiate the generic template in
//! [`crate::autograd::data_grad`].
//!
//! ## Submodules:
//!
//! - [`arithmetic`]: element-wise binary and scalar arithmetic.
//! - [`math_elem`]: element-wise math functions.
//! - [`reduction`]: reductions (sum).
//! - [`view`]: shape and layout operations.

pub mod arithmetic;
pub mod math_elem;
pub mod reduction;
pub mod view;

use crate::autograd::Registry;
use crate::error::AdjointError;
use crate::function::{expect_inputs, VarMeta};
use crate::ndarray::{BinaryKernel, NdArray, UnaryKernel};

/// Registers the adapter of every primitive defined in this module.
pub fn register_builtin(registry: &mut Registry) {
    arithmetic::register(registry);
    math_elem::register(registry);
    reduction::register(registry);
    view::register(registry);
}

/// Output metadata of a one-input element-wise function.
pub(crate) fn unary_setup(name: &str, inputs: &[VarMeta]) -> Result<Vec<VarMeta>, AdjointError> {
    expect_inputs(name, inputs, 1)?;
    Ok(vec![inputs[0].clone()])
}

/// Output metadata of a two-input element-wise function. Shapes must be identical.
pub(crate) fn binary_setup(name: &str, inputs: &[VarMeta]) -> Result<Vec<VarMeta>, AdjointError> {
    expect_inputs(name, inputs, 2)?;
    if inputs[0].shape != inputs[1].shape {
        return Err(AdjointError::ShapeMismatch {
            expected: inputs[0].shape.clone(),
            actual: inputs[1].shape.clone(),
            operation: name.to_string(),
        });
    }
    Ok(vec![inputs[0].clone()])
}

/// Runs a unary kernel over the single input.
pub(crate) fn apply_unary<K: UnaryKernel>(
    name: &str,
    kernel: &K,
    inputs: &[&NdArray],
) -> Result<Vec<NdArray>, AdjointError> {
    expect_inputs(name, inputs, 1)?;
    Ok(vec![inputs[0].map(kernel)])
}

/// Runs a binary kernel over the two inputs.
pub(crate) fn apply_binary<K: BinaryKernel>(
    name: &str,
    kernel: &K,
    inputs: &[&NdArray],
) -> Result<Vec<NdArray>, AdjointError> {
    expect_inputs(name, inputs, 2)?;
    Ok(vec![inputs[0].zip_with(inputs[1], kernel, name)?])
}
