//! Layout operations: broadcasting, joining, splitting and the structural
//! transforms (`Transpose`, `Reshape`, `Slice`).

pub mod broadcast;
pub mod concat;
pub mod reshape;
pub mod slice;
pub mod split;
pub mod transpose;
pub(crate) mod utils;

pub use broadcast::{broadcast_to_op, BroadcastTo};
pub use concat::{concatenate_op, Concatenate};
pub use reshape::{reshape_op, Reshape};
pub use slice::{slice_op, Slice};
pub use split::{split_op, Split};
pub use transpose::{transpose_op, Transpose};

use crate::autograd::data_grad::register_structural;
use crate::autograd::Registry;

pub(crate) fn register(registry: &mut Registry) {
    registry.register("BroadcastTo", broadcast::broadcast_to_backward);
    registry.register("Concatenate", concat::concatenate_backward);
    registry.register("Split", split::split_backward);
    register_structural::<Transpose>(registry);
    register_structural::<Reshape>(registry);
    register_structural::<Slice>(registry);
}
