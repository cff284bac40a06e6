use std::sync::Arc;

use crate::function::{Function, VarMeta};
use crate::ndarray::NdArray;

/// Index of a node in the [`Graph`](super::Graph) arena.
///
/// Identity comparisons (memoisation keys, visited sets) are plain integer compares.
pub type NodeId = usize;

/// Handle to one output slot of a node.
///
/// Leaves have exactly one slot. `Var` is `Copy`; it stays valid for the lifetime of
/// the graph it was created in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Var {
    pub(crate) node: NodeId,
    pub(crate) slot: usize,
}

impl Var {
    pub(crate) fn new(node: NodeId, slot: usize) -> Self {
        Var { node, slot }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn slot(&self) -> usize {
        self.slot
    }
}

/// Metadata and (optional) data of one output slot.
#[derive(Debug, Clone)]
pub struct Slot {
    pub(crate) meta: VarMeta,
    /// Does this slot take part in gradient propagation.
    pub(crate) need_grad: bool,
    /// Set by an explicit `set_need_grad(false)`: gradient never flows through this slot.
    pub(crate) cut: bool,
    /// Must the forward data survive for a consumer's backward.
    pub(crate) retain: bool,
    pub(crate) data: Option<NdArray>,
}

impl Slot {
    pub(crate) fn new(meta: VarMeta, need_grad: bool) -> Self {
        Slot {
            meta,
            need_grad,
            cut: false,
            retain: false,
            data: None,
        }
    }

    pub fn meta(&self) -> &VarMeta {
        &self.meta
    }

    pub fn need_grad(&self) -> bool {
        self.need_grad
    }

    pub fn is_cut(&self) -> bool {
        self.cut
    }

    pub fn is_retained(&self) -> bool {
        self.retain
    }

    pub fn data(&self) -> Option<&NdArray> {
        self.data.as_ref()
    }
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    /// Parameter, input or constant. Data is supplied by the caller.
    Leaf,
    /// Instance of a primitive applied to input slots.
    Op {
        function: Arc<dyn Function>,
        inputs: Vec<Var>,
    },
}

/// One entry of the arena.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) kind: NodeKind,
    pub(crate) slots: Vec<Slot>,
}

impl Node {
    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf)
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Input slots, empty for leaves.
    pub fn inputs(&self) -> &[Var] {
        match &self.kind {
            NodeKind::Leaf => &[],
            NodeKind::Op { inputs, .. } => inputs,
        }
    }

    pub fn function(&self) -> Option<&Arc<dyn Function>> {
        match &self.kind {
            NodeKind::Leaf => None,
            NodeKind::Op { function, .. } => Some(function),
        }
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn num_outputs(&self) -> usize {
        self.slots.len()
    }
}
