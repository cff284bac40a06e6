use crate::types::DType;
use thiserror::Error;

/// Custom error type for the adjoint graph library.
///
/// Every error is raised while the graph is being *built* (or explicitly evaluated by a
/// caller); the gradient engine never defers a failure into numeric execution.
#[derive(Error, Debug, PartialEq, Clone)]
pub enum AdjointError {
    #[error("No backward adapter registered for operation '{op}'")]
    UnregisteredAdapter { op: String },

    #[error("Backward of '{op}' is not implemented: {reason}")]
    NotImplementedAdapter { op: String, reason: String },

    #[error("Shape mismatch: expected {expected:?}, got {actual:?} during operation {operation}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
        operation: String,
    },

    #[error("Invalid variable reference: node {node}, slot {slot}")]
    InvalidVar { node: usize, slot: usize },

    #[error("Operation '{operation}' expected {expected} {what}, got {actual}")]
    ArityMismatch {
        operation: String,
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("DType mismatch for operation '{operation}': expected {expected:?}, got {actual:?}")]
    DTypeMismatch {
        expected: DType,
        actual: DType,
        operation: String,
    },

    #[error("Invalid permutation: axes {axes:?} are not a valid permutation for rank {rank}")]
    InvalidPermutation { axes: Vec<usize>, rank: usize },

    #[error("Invalid axis {axis} for rank {rank} in operation '{operation}'")]
    InvalidAxis {
        axis: usize,
        rank: usize,
        operation: String,
    },

    #[error("Slice error: {message}")]
    SliceError { message: String },

    #[error("Cannot broadcast shape {from:?} to {to:?}")]
    BroadcastError { from: Vec<usize>, to: Vec<usize> },

    #[error("Array creation error: data length {data_len} does not match shape {shape:?}")]
    ArrayCreationError { data_len: usize, shape: Vec<usize> },

    #[error("No data available for node {node}, slot {slot}; set it or evaluate the graph first")]
    MissingData { node: usize, slot: usize },

    #[error("Got {actual} upstream seeds for {expected} outputs")]
    SeedCountMismatch { expected: usize, actual: usize },

    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}
