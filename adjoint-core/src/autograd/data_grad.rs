//! Generic adapters for structural (shape/layout) primitives.
//!
//! A structural primitive moves elements around without doing arithmetic on
//! them: permutation, reshape, slicing. Its gradient is the *adjoint* movement
//! applied to the upstream gradient, and the gradient of that adjoint is the
//! original movement again. Both directions are expressed once here:
//!
//! * [`Structural<T>`] is the forward function `y = T(x)`.
//! * [`DataGrad<T>`] is the function `dx = T*(dy)`, whose kernel applies the adjoint.
//! * [`StructuralBackward<T>`] (registered under `T::NAME`) appends a `DataGrad<T>` node.
//! * [`DataGradBackward<T>`] (registered under `T::DATA_GRAD_NAME`) appends a
//!   `Structural<T>` node on the second-order gradient.
//!
//! A new structural op only has to implement [`StructuralTransform`] and call
//! [`register_structural`].

use std::any::Any;
use std::fmt::Debug;
use std::marker::PhantomData;

use super::adapter::{BackwardAdapter, BackwardContext};
use super::registry::Registry;
use crate::error::AdjointError;
use crate::function::{expect_inputs, Function, VarMeta};
use crate::graph::{Graph, Var};
use crate::ndarray::NdArray;

/// A pure data-movement transform with a known adjoint.
pub trait StructuralTransform: Debug + Clone + Send + Sync + 'static {
    /// Name of the forward function.
    const NAME: &'static str;
    /// Name of the function computing the data gradient.
    const DATA_GRAD_NAME: &'static str;

    fn output_shape(&self, input_shape: &[usize]) -> Result<Vec<usize>, AdjointError>;

    /// `y = T(x)`
    fn apply(&self, x: &NdArray) -> Result<NdArray, AdjointError>;

    /// `dx = T*(dy)`, with `input_shape` the shape of the forward input.
    fn apply_adjoint(&self, dy: &NdArray, input_shape: &[usize]) -> Result<NdArray, AdjointError>;
}

/// Forward function of a structural transform.
#[derive(Debug, Clone)]
pub struct Structural<T>(pub T);

impl<T: StructuralTransform> Function for Structural<T> {
    fn name(&self) -> &str {
        T::NAME
    }

    fn setup(&self, inputs: &[VarMeta]) -> Result<Vec<VarMeta>, AdjointError> {
        expect_inputs(T::NAME, inputs, 1)?;
        let shape = self.0.output_shape(&inputs[0].shape)?;
        Ok(vec![VarMeta::new(shape, inputs[0].dtype)])
    }

    fn forward(&self, inputs: &[&NdArray]) -> Result<Vec<NdArray>, AdjointError> {
        expect_inputs(T::NAME, inputs, 1)?;
        Ok(vec![self.0.apply(inputs[0])?])
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Data-gradient function of a structural transform: maps an output-shaped
/// gradient back to the forward input's shape.
#[derive(Debug, Clone)]
pub struct DataGrad<T> {
    pub transform: T,
    pub input_shape: Vec<usize>,
}

impl<T: StructuralTransform> Function for DataGrad<T> {
    fn name(&self) -> &str {
        T::DATA_GRAD_NAME
    }

    fn setup(&self, inputs: &[VarMeta]) -> Result<Vec<VarMeta>, AdjointError> {
        expect_inputs(T::DATA_GRAD_NAME, inputs, 1)?;
        let expected = self.transform.output_shape(&self.input_shape)?;
        if inputs[0].shape != expected {
            return Err(AdjointError::ShapeMismatch {
                expected,
                actual: inputs[0].shape.clone(),
                operation: T::DATA_GRAD_NAME.to_string(),
            });
        }
        Ok(vec![VarMeta::new(self.input_shape.clone(), inputs[0].dtype)])
    }

    fn forward(&self, inputs: &[&NdArray]) -> Result<Vec<NdArray>, AdjointError> {
        expect_inputs(T::DATA_GRAD_NAME, inputs, 1)?;
        Ok(vec![self.transform.apply_adjoint(inputs[0], &self.input_shape)?])
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Appends `T(x)`.
pub fn structural_op<T: StructuralTransform>(
    graph: &mut Graph,
    x: Var,
    transform: T,
) -> Result<Var, AdjointError> {
    graph.apply_one(Structural(transform), &[x])
}

/// Backward of `Structural<T>`: `dx = DataGrad<T>(dy)`.
pub struct StructuralBackward<T>(PhantomData<fn() -> T>);

impl<T> Default for StructuralBackward<T> {
    fn default() -> Self {
        StructuralBackward(PhantomData)
    }
}

impl<T: StructuralTransform> BackwardAdapter for StructuralBackward<T> {
    fn backward(&self, graph: &mut Graph, ctx: &BackwardContext) -> Result<Vec<Option<Var>>, AdjointError> {
        if !ctx.propagate_down(0) {
            return Ok(vec![None]);
        }
        let forward = ctx.function_as::<Structural<T>>()?;
        let data_grad = DataGrad {
            transform: forward.0.clone(),
            input_shape: ctx.input_shape(0)?.to_vec(),
        };
        let dx = graph.apply_one(data_grad, &[ctx.grad_output(0)?])?;
        Ok(vec![Some(dx)])
    }
}

/// Backward of `DataGrad<T>`: applies the forward transform to the incoming
/// second-order gradient, `gdy = T(gdx)`.
pub struct DataGradBackward<T>(PhantomData<fn() -> T>);

impl<T> Default for DataGradBackward<T> {
    fn default() -> Self {
        DataGradBackward(PhantomData)
    }
}

impl<T: StructuralTransform> BackwardAdapter for DataGradBackward<T> {
    fn backward(&self, graph: &mut Graph, ctx: &BackwardContext) -> Result<Vec<Option<Var>>, AdjointError> {
        if !ctx.propagate_down(0) {
            return Ok(vec![None]);
        }
        let data_grad = ctx.function_as::<DataGrad<T>>()?;
        let gdy = structural_op(graph, ctx.grad_output(0)?, data_grad.transform.clone())?;
        Ok(vec![Some(gdy)])
    }
}

/// Registers both adapters of a structural transform.
pub fn register_structural<T: StructuralTransform>(registry: &mut Registry) {
    registry.register(T::NAME, StructuralBackward::<T>::default());
    registry.register(T::DATA_GRAD_NAME, DataGradBackward::<T>::default());
}
