use std::fmt::Debug;
use std::sync::Arc;

use crate::error::AdjointError;
use crate::types::DType;

/// Typed CPU storage backing an [`NdArray`](crate::ndarray::NdArray).
///
/// The vectors are wrapped in `Arc` so that cloning an array (e.g. handing a
/// recorded forward value to an adapter or the executor) never copies data.
#[derive(Debug, Clone, PartialEq)]
pub enum Buffer {
    /// Buffer holding f32 data.
    F32(Arc<Vec<f32>>),
    /// Buffer holding f64 data.
    F64(Arc<Vec<f64>>),
}

impl Buffer {
    pub fn dtype(&self) -> DType {
        match self {
            Buffer::F32(_) => DType::F32,
            Buffer::F64(_) => DType::F64,
        }
    }

    /// Returns the number of elements in the buffer.
    pub fn len(&self) -> usize {
        match self {
            Buffer::F32(data) => data.len(),
            Buffer::F64(data) => data.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Attempts to get a reference to the underlying f32 vector.
    pub fn try_get_f32(&self) -> Result<&Arc<Vec<f32>>, AdjointError> {
        match self {
            Buffer::F32(data) => Ok(data),
            Buffer::F64(_) => Err(AdjointError::DTypeMismatch {
                expected: DType::F32,
                actual: DType::F64,
                operation: "try_get_f32".to_string(),
            }),
        }
    }

    /// Attempts to get a reference to the underlying f64 vector.
    pub fn try_get_f64(&self) -> Result<&Arc<Vec<f64>>, AdjointError> {
        match self {
            Buffer::F64(data) => Ok(data),
            Buffer::F32(_) => Err(AdjointError::DTypeMismatch {
                expected: DType::F64,
                actual: DType::F32,
                operation: "try_get_f64".to_string(),
            }),
        }
    }

    /// Copies the contents out as f64, whatever the storage type.
    pub fn to_vec_f64(&self) -> Vec<f64> {
        match self {
            Buffer::F32(data) => data.iter().map(|&v| v as f64).collect(),
            Buffer::F64(data) => data.as_ref().clone(),
        }
    }
}
