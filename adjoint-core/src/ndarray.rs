//! Raw numeric values stored in graph slots.
//!
//! `NdArray` is deliberately simple: a contiguous, row-major buffer plus its shape.
//! It is the value type the execution layer produces and the type callers use to
//! seed gradients or feed leaves. The gradient engine itself never looks inside one.

pub mod utils;

use std::sync::Arc;

use num_traits::Float;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, StandardNormal, Uniform};

use crate::buffer::Buffer;
use crate::error::AdjointError;
use crate::types::DType;
use utils::numel;

/// Element-wise kernel over a single value, generic over the float type.
pub trait UnaryKernel {
    fn apply<T: Float>(&self, v: T) -> T;
}

/// Element-wise kernel over a pair of values, generic over the float type.
pub trait BinaryKernel {
    fn apply<T: Float>(&self, a: T, b: T) -> T;
}

/// A contiguous n-dimensional array of floats.
#[derive(Debug, Clone, PartialEq)]
pub struct NdArray {
    shape: Vec<usize>,
    buffer: Buffer,
}

impl NdArray {
    /// Wraps an existing buffer, checking that its length matches `shape`.
    pub fn from_buffer(buffer: Buffer, shape: Vec<usize>) -> Result<Self, AdjointError> {
        let data_len = buffer.len();
        if data_len != numel(&shape) {
            return Err(AdjointError::ArrayCreationError { data_len, shape });
        }
        Ok(NdArray { shape, buffer })
    }

    /// Creates an f32 array from row-major data.
    pub fn from_vec_f32(data: Vec<f32>, shape: Vec<usize>) -> Result<Self, AdjointError> {
        Self::from_buffer(Buffer::F32(Arc::new(data)), shape)
    }

    /// Creates an f64 array from row-major data.
    pub fn from_vec_f64(data: Vec<f64>, shape: Vec<usize>) -> Result<Self, AdjointError> {
        Self::from_buffer(Buffer::F64(Arc::new(data)), shape)
    }

    /// Creates an array of `dtype` from f64 values, converting if needed.
    pub fn from_f64_values(
        data: Vec<f64>,
        shape: Vec<usize>,
        dtype: DType,
    ) -> Result<Self, AdjointError> {
        match dtype {
            DType::F32 => Self::from_vec_f32(data.into_iter().map(|v| v as f32).collect(), shape),
            DType::F64 => Self::from_vec_f64(data, shape),
        }
    }

    pub fn full(shape: &[usize], dtype: DType, value: f64) -> Self {
        let n = numel(shape);
        let buffer = match dtype {
            DType::F32 => Buffer::F32(Arc::new(vec![value as f32; n])),
            DType::F64 => Buffer::F64(Arc::new(vec![value; n])),
        };
        NdArray {
            shape: shape.to_vec(),
            buffer,
        }
    }

    pub fn zeros(shape: &[usize], dtype: DType) -> Self {
        Self::full(shape, dtype, 0.0)
    }

    pub fn ones(shape: &[usize], dtype: DType) -> Self {
        Self::full(shape, dtype, 1.0)
    }

    /// A 0-dimensional array holding one value.
    pub fn scalar(value: f64, dtype: DType) -> Self {
        Self::full(&[], dtype, value)
    }

    pub fn zeros_like(other: &NdArray) -> Self {
        Self::zeros(&other.shape, other.dtype())
    }

    pub fn ones_like(other: &NdArray) -> Self {
        Self::ones(&other.shape, other.dtype())
    }

    /// Samples a standard normal array from a seeded generator.
    pub fn randn(shape: &[usize], dtype: DType, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let values: Vec<f64> = (0..numel(shape))
            .map(|_| StandardNormal.sample(&mut rng))
            .collect();
        Self::from_f64_values(values, shape.to_vec(), dtype)
            .unwrap_or_else(|_| Self::zeros(shape, dtype))
    }

    /// Samples a uniform array in `[low, high)` from a seeded generator.
    pub fn rand_uniform(
        shape: &[usize],
        dtype: DType,
        low: f64,
        high: f64,
        seed: u64,
    ) -> Result<Self, AdjointError> {
        if low.is_nan() || high.is_nan() || low >= high {
            return Err(AdjointError::UnsupportedOperation(format!(
                "rand_uniform requires low < high, got [{}, {})",
                low, high
            )));
        }
        let mut rng = StdRng::seed_from_u64(seed);
        let dist = Uniform::new(low, high);
        let values: Vec<f64> = (0..numel(shape)).map(|_| dist.sample(&mut rng)).collect();
        Self::from_f64_values(values, shape.to_vec(), dtype)
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn dtype(&self) -> DType {
        self.buffer.dtype()
    }

    pub fn numel(&self) -> usize {
        self.buffer.len()
    }

    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    pub fn to_vec_f64(&self) -> Vec<f64> {
        self.buffer.to_vec_f64()
    }

    pub fn to_vec_f32(&self) -> Vec<f32> {
        match &self.buffer {
            Buffer::F32(data) => data.as_ref().clone(),
            Buffer::F64(data) => data.iter().map(|&v| v as f32).collect(),
        }
    }

    /// Returns the single value of a one-element array.
    pub fn item(&self) -> Result<f64, AdjointError> {
        if self.numel() != 1 {
            return Err(AdjointError::ShapeMismatch {
                expected: vec![],
                actual: self.shape.clone(),
                operation: "item".to_string(),
            });
        }
        Ok(self.to_vec_f64()[0])
    }

    /// Same data, new shape. The buffer is shared, not copied.
    pub fn reshape(&self, shape: &[usize]) -> Result<Self, AdjointError> {
        if numel(shape) != self.numel() {
            return Err(AdjointError::ShapeMismatch {
                expected: self.shape.clone(),
                actual: shape.to_vec(),
                operation: "reshape".to_string(),
            });
        }
        Ok(NdArray {
            shape: shape.to_vec(),
            buffer: self.buffer.clone(),
        })
    }

    pub fn astype(&self, dtype: DType) -> Self {
        if self.dtype() == dtype {
            return self.clone();
        }
        let buffer = match dtype {
            DType::F32 => Buffer::F32(Arc::new(self.to_vec_f32())),
            DType::F64 => Buffer::F64(Arc::new(self.to_vec_f64())),
        };
        NdArray {
            shape: self.shape.clone(),
            buffer,
        }
    }

    /// Applies an element-wise kernel.
    pub fn map<K: UnaryKernel>(&self, kernel: &K) -> Self {
        let buffer = match &self.buffer {
            Buffer::F32(data) => Buffer::F32(Arc::new(data.iter().map(|&v| kernel.apply(v)).collect())),
            Buffer::F64(data) => Buffer::F64(Arc::new(data.iter().map(|&v| kernel.apply(v)).collect())),
        };
        NdArray {
            shape: self.shape.clone(),
            buffer,
        }
    }

    /// Applies an element-wise kernel to two arrays of identical shape and dtype.
    pub fn zip_with<K: BinaryKernel>(
        &self,
        other: &NdArray,
        kernel: &K,
        operation: &str,
    ) -> Result<Self, AdjointError> {
        if self.shape != other.shape {
            return Err(AdjointError::ShapeMismatch {
                expected: self.shape.clone(),
                actual: other.shape.clone(),
                operation: operation.to_string(),
            });
        }
        let buffer = match (&self.buffer, &other.buffer) {
            (Buffer::F32(a), Buffer::F32(b)) => Buffer::F32(Arc::new(
                a.iter().zip(b.iter()).map(|(&x, &y)| kernel.apply(x, y)).collect(),
            )),
            (Buffer::F64(a), Buffer::F64(b)) => Buffer::F64(Arc::new(
                a.iter().zip(b.iter()).map(|(&x, &y)| kernel.apply(x, y)).collect(),
            )),
            _ => {
                return Err(AdjointError::DTypeMismatch {
                    expected: self.dtype(),
                    actual: other.dtype(),
                    operation: operation.to_string(),
                })
            }
        };
        Ok(NdArray {
            shape: self.shape.clone(),
            buffer,
        })
    }

    /// Joins the buffers of `arrays` end to end into one 1-d array.
    pub fn concat_flat(arrays: &[&NdArray]) -> Result<Self, AdjointError> {
        let dtype = match arrays.first() {
            Some(first) => first.dtype(),
            None => {
                return Err(AdjointError::UnsupportedOperation(
                    "concat_flat of zero arrays".to_string(),
                ))
            }
        };
        if let Some(other) = arrays.iter().find(|a| a.dtype() != dtype) {
            return Err(AdjointError::DTypeMismatch {
                expected: dtype,
                actual: other.dtype(),
                operation: "concat_flat".to_string(),
            });
        }
        let total: usize = arrays.iter().map(|a| a.numel()).sum();
        let buffer = match dtype {
            DType::F32 => {
                let mut data = Vec::with_capacity(total);
                for a in arrays {
                    data.extend(a.to_vec_f32());
                }
                Buffer::F32(Arc::new(data))
            }
            DType::F64 => {
                let mut data = Vec::with_capacity(total);
                for a in arrays {
                    data.extend(a.to_vec_f64());
                }
                Buffer::F64(Arc::new(data))
            }
        };
        Ok(NdArray {
            shape: vec![total],
            buffer,
        })
    }

    /// Builds a new array whose element `i` is `self[indices[i]]`.
    pub fn gather(&self, indices: &[usize], shape: &[usize]) -> Result<Self, AdjointError> {
        if indices.len() != numel(shape) {
            return Err(AdjointError::ArrayCreationError {
                data_len: indices.len(),
                shape: shape.to_vec(),
            });
        }
        if let Some(&bad) = indices.iter().find(|&&i| i >= self.numel()) {
            return Err(AdjointError::InternalError(format!(
                "gather index {} out of bounds for {} elements",
                bad,
                self.numel()
            )));
        }
        let buffer = match &self.buffer {
            Buffer::F32(data) => Buffer::F32(Arc::new(indices.iter().map(|&i| data[i]).collect())),
            Buffer::F64(data) => Buffer::F64(Arc::new(indices.iter().map(|&i| data[i]).collect())),
        };
        Ok(NdArray {
            shape: shape.to_vec(),
            buffer,
        })
    }

    /// Builds a zero array of `shape` and accumulates `self[i]` into element `indices[i]`.
    pub fn scatter_add(&self, indices: &[usize], shape: &[usize]) -> Result<Self, AdjointError> {
        if indices.len() != self.numel() {
            return Err(AdjointError::ArrayCreationError {
                data_len: indices.len(),
                shape: self.shape.clone(),
            });
        }
        let n = numel(shape);
        if let Some(&bad) = indices.iter().find(|&&i| i >= n) {
            return Err(AdjointError::InternalError(format!(
                "scatter index {} out of bounds for {} elements",
                bad, n
            )));
        }
        let buffer = match &self.buffer {
            Buffer::F32(data) => Buffer::F32(Arc::new(scatter_add_kernel(data, indices, n))),
            Buffer::F64(data) => Buffer::F64(Arc::new(scatter_add_kernel(data, indices, n))),
        };
        Ok(NdArray {
            shape: shape.to_vec(),
            buffer,
        })
    }
}

fn scatter_add_kernel<T: Float>(data: &[T], indices: &[usize], len: usize) -> Vec<T> {
    let mut out = vec![T::zero(); len];
    for (&v, &i) in data.iter().zip(indices) {
        out[i] = out[i] + v;
    }
    out
}

#[cfg(test)]
#[path = "ndarray_test.rs"]
mod tests;
