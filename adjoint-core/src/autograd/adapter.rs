use std::any::type_name;
use std::sync::Arc;

use crate::error::AdjointError;
use crate::function::Function;
use crate::graph::{Graph, Var};

/// Everything a backward adapter may read about the forward node it differentiates.
///
/// Recorded inputs/outputs are only handed over when the node's function declared
/// that its gradient depends on their data (`grad_depends_input_data` /
/// `grad_depends_output_data`); the others are `None`, and only their shapes are
/// available.
#[derive(Debug, Clone)]
pub struct BackwardContext {
    pub(crate) function: Arc<dyn Function>,
    pub(crate) grad_outputs: Vec<Var>,
    pub(crate) inputs: Vec<Option<Var>>,
    pub(crate) input_shapes: Vec<Vec<usize>>,
    pub(crate) outputs: Vec<Option<Var>>,
    pub(crate) output_shapes: Vec<Vec<usize>>,
    pub(crate) propagate_down: Vec<bool>,
}

impl BackwardContext {
    pub fn new(
        function: Arc<dyn Function>,
        grad_outputs: Vec<Var>,
        inputs: Vec<Option<Var>>,
        input_shapes: Vec<Vec<usize>>,
        outputs: Vec<Option<Var>>,
        output_shapes: Vec<Vec<usize>>,
        propagate_down: Vec<bool>,
    ) -> Self {
        BackwardContext {
            function,
            grad_outputs,
            inputs,
            input_shapes,
            outputs,
            output_shapes,
            propagate_down,
        }
    }

    pub fn function(&self) -> &dyn Function {
        self.function.as_ref()
    }

    /// Downcasts the forward function to read its parameters.
    pub fn function_as<F: Function>(&self) -> Result<&F, AdjointError> {
        self.function.as_any().downcast_ref::<F>().ok_or_else(|| {
            AdjointError::InternalError(format!(
                "adapter for '{}' expected function type {}",
                self.function.name(),
                type_name::<F>()
            ))
        })
    }

    pub fn num_inputs(&self) -> usize {
        self.inputs.len()
    }

    /// Upstream gradient for output slot `o`.
    pub fn grad_output(&self, o: usize) -> Result<Var, AdjointError> {
        self.grad_outputs
            .get(o)
            .copied()
            .ok_or_else(|| self.slot_error("grad_output", o))
    }

    pub fn grad_outputs(&self) -> &[Var] {
        &self.grad_outputs
    }

    /// Recorded forward input `j`. Fails if the function did not declare a dependency on it.
    pub fn input(&self, j: usize) -> Result<Var, AdjointError> {
        self.inputs
            .get(j)
            .copied()
            .flatten()
            .ok_or_else(|| self.slot_error("input", j))
    }

    /// Recorded forward output `o`. Fails if the function did not declare a dependency on it.
    pub fn output(&self, o: usize) -> Result<Var, AdjointError> {
        self.outputs
            .get(o)
            .copied()
            .flatten()
            .ok_or_else(|| self.slot_error("output", o))
    }

    pub fn input_shape(&self, j: usize) -> Result<&[usize], AdjointError> {
        self.input_shapes
            .get(j)
            .map(Vec::as_slice)
            .ok_or_else(|| self.slot_error("input shape", j))
    }

    pub fn output_shape(&self, o: usize) -> Result<&[usize], AdjointError> {
        self.output_shapes
            .get(o)
            .map(Vec::as_slice)
            .ok_or_else(|| self.slot_error("output shape", o))
    }

    /// Whether a gradient for input `j` is wanted. Adapters may skip building it otherwise.
    pub fn propagate_down(&self, j: usize) -> bool {
        self.propagate_down.get(j).copied().unwrap_or(false)
    }

    fn slot_error(&self, what: &str, index: usize) -> AdjointError {
        AdjointError::InternalError(format!(
            "backward of '{}' requested {} {} which is not recorded",
            self.function.name(),
            what,
            index
        ))
    }
}

/// Builds the backward sub-graph of one primitive.
///
/// Given the upstream gradients of a node's outputs, an adapter appends ordinary
/// forward nodes to the graph that compute the gradient wrt each input, and returns
/// one entry per input (`None` when no gradient is defined or wanted). Adapters must
/// only build structure; they never compute values.
pub trait BackwardAdapter: Send + Sync {
    fn backward(
        &self,
        graph: &mut Graph,
        ctx: &BackwardContext,
    ) -> Result<Vec<Option<Var>>, AdjointError>;
}

impl<F> BackwardAdapter for F
where
    F: Fn(&mut Graph, &BackwardContext) -> Result<Vec<Option<Var>>, AdjointError> + Send + Sync,
{
    fn backward(
        &self,
        graph: &mut Graph,
        ctx: &BackwardContext,
    ) -> Result<Vec<Option<Var>>, AdjointError> {
        self(graph, ctx)
    }
}

/// Adapter for primitives whose gradient is not implemented.
///
/// Invoking it is an error, so it must only ever fire for nodes that actually lie
/// on a path between requested outputs and inputs.
#[derive(Debug, Clone, Default)]
pub struct NotImplementedBackward {
    reason: Option<String>,
}

impl NotImplementedBackward {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reason(reason: impl Into<String>) -> Self {
        NotImplementedBackward {
            reason: Some(reason.into()),
        }
    }
}

impl BackwardAdapter for NotImplementedBackward {
    fn backward(
        &self,
        _graph: &mut Graph,
        ctx: &BackwardContext,
    ) -> Result<Vec<Option<Var>>, AdjointError> {
        let op = ctx.function().name().to_string();
        Err(AdjointError::NotImplementedAdapter {
            reason: self
                .reason
                .clone()
                .unwrap_or_else(|| format!("{}_backward is not implemented", op)),
            op,
        })
    }
}
