//! # Gradient graph construction
//!
//! Differentiation here is symbolic over the node arena: asking for gradients
//! appends new nodes to the [`Graph`](crate::graph::Graph) and hands back their
//! [`Var`](crate::graph::Var) handles. Nothing is evaluated.
//!
//! - [`adapter`]: the [`BackwardAdapter`] capability and the [`BackwardContext`] it receives.
//! - [`registry`]: op-type name to adapter mapping.
//! - [`data_grad`]: generic adapters for structural (layout-only) primitives.
//! - [`engine`]: the Graph Walker ([`GradEngine`], [`grad`]).
//! - [`grad_check`]: finite-difference verification.

pub mod adapter;
pub mod data_grad;
pub mod engine;
pub mod grad_check;
pub mod registry;

pub use adapter::{BackwardAdapter, BackwardContext, NotImplementedBackward};
pub use data_grad::{register_structural, DataGrad, Structural, StructuralTransform};
pub use engine::{grad, GradEngine, Seed};
pub use registry::Registry;
