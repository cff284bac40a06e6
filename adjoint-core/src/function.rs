use crate::error::AdjointError;
use crate::ndarray::NdArray;
use crate::types::DType;
use std::any::Any;
use std::fmt::Debug;

/// Shape and dtype recorded for one graph slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarMeta {
    pub shape: Vec<usize>,
    pub dtype: DType,
}

impl VarMeta {
    pub fn new(shape: Vec<usize>, dtype: DType) -> Self {
        VarMeta { shape, dtype }
    }
}

/// Defines the interface of a primitive operation placed in the graph.
///
/// A `Function` is what the graph-building side hands to [`Graph::apply`](crate::graph::Graph::apply):
/// it knows its name (the key used to look up its backward adapter), how to infer output
/// metadata from input metadata, how to compute its outputs numerically, and which
/// forward values its gradient needs.
///
/// The trait requires `Debug + Send + Sync` because functions are shared through
/// `Arc<dyn Function>` between the forward node, the adapters that read its parameters
/// and any caller inspecting the graph.
pub trait Function: Debug + Send + Sync + Any {
    /// The operation-type identifier. Adapters are registered under this name.
    fn name(&self) -> &str;

    /// Number of inputs the function expects, or `None` if variadic.
    fn num_inputs(&self) -> Option<usize> {
        Some(1)
    }

    /// Infers per-output metadata from the inputs' metadata.
    ///
    /// Inputs have already been checked to share one dtype.
    fn setup(&self, inputs: &[VarMeta]) -> Result<Vec<VarMeta>, AdjointError>;

    /// Computes the outputs from the inputs' data.
    fn forward(&self, inputs: &[&NdArray]) -> Result<Vec<NdArray>, AdjointError>;

    /// Whether the gradient wrt input `i` needs the forward data of input `j`.
    fn grad_depends_input_data(&self, _i: usize, _j: usize) -> bool {
        false
    }

    /// Whether the gradient wrt input `i` needs the forward data of output `o`.
    fn grad_depends_output_data(&self, _i: usize, _o: usize) -> bool {
        false
    }

    fn as_any(&self) -> &dyn Any;
}

/// Checks that exactly `expected` inputs were given.
pub(crate) fn expect_inputs<T>(
    name: &str,
    inputs: &[T],
    expected: usize,
) -> Result<(), AdjointError> {
    if inputs.len() != expected {
        return Err(AdjointError::ArityMismatch {
            operation: name.to_string(),
            what: "inputs",
            expected,
            actual: inputs.len(),
        });
    }
    Ok(())
}
