//! Reductions.

pub mod sum;
pub(crate) mod utils;

pub use sum::{sum_all_op, sum_op, Sum};

use crate::autograd::Registry;

pub(crate) fn register(registry: &mut Registry) {
    registry.register("Sum", sum::sum_backward);
}
