//! Symbolic reverse-mode differentiation over a node arena.
//!
//! Build a forward graph out of primitives, ask [`grad`] (or a [`GradEngine`]) for
//! the gradients of some outputs wrt some inputs, and get back ordinary graph
//! values. Those can be evaluated, combined further, or differentiated again.
//!
//! ```no_run
//! use adjoint_core::ops::arithmetic::mul_op;
//! use adjoint_core::{grad, DType, Graph, NdArray};
//!
//! let mut g = Graph::new();
//! let x = g.from_array(NdArray::full(&[3], DType::F64, 2.0), true);
//! let x2 = mul_op(&mut g, x, x)?;
//! let y = mul_op(&mut g, x2, x)?;
//! let dx = grad(&mut g, &[y], &[x], &[])?[0];
//! let ddx = grad(&mut g, &[dx], &[x], &[])?[0];
//! assert_eq!(g.evaluate(ddx)?.to_vec_f64(), vec![12.0; 3]);
//! # Ok::<(), adjoint_core::AdjointError>(())
//! ```

pub mod autograd;
pub mod buffer;
pub mod config;
pub mod error;
pub mod exec;
pub mod function;
pub mod graph;
pub mod ndarray;
pub mod ops;
pub mod types;
pub mod utils;

pub use autograd::{grad, GradEngine, Registry, Seed};
pub use config::{ForwardOptions, GraphConfig};
pub use error::AdjointError;
pub use function::{Function, VarMeta};
pub use graph::{Graph, NodeId, Var};
pub use ndarray::NdArray;
pub use types::DType;

// Re-export traits required by public functions/structs
pub use num_traits;
