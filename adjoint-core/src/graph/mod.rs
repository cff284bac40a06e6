//! # Node arena
//!
//! The forward graph *and* every gradient graph built from it live in one [`Graph`]:
//! a `Vec<Node>` indexed by [`NodeId`]. Nodes refer to their inputs by [`Var`]
//! (node index + output slot), so sharing a value between many consumers is just
//! copying a handle, and identity checks are integer compares.
//!
//! Nodes are append-only. A node's inputs always have smaller ids than the node
//! itself, which [`traversal::topological_sort`] relies on.

mod node;
pub mod traversal;

pub use node::{Node, NodeId, NodeKind, Slot, Var};

use std::sync::Arc;

use log::{trace, warn};

use crate::config::{ForwardOptions, GraphConfig};
use crate::error::AdjointError;
use crate::function::{expect_inputs, Function, VarMeta};
use crate::ndarray::NdArray;
use crate::types::DType;

#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: Vec<Node>,
    config: GraphConfig,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: GraphConfig) -> Self {
        Graph {
            nodes: Vec::new(),
            config,
        }
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    /// Switches eager evaluation on or off for nodes created from now on.
    pub fn set_auto_forward(&mut self, enabled: bool) {
        self.config.auto_forward = enabled;
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Result<&Node, AdjointError> {
        self.nodes
            .get(id)
            .ok_or(AdjointError::InvalidVar { node: id, slot: 0 })
    }

    pub fn slot(&self, var: Var) -> Result<&Slot, AdjointError> {
        self.nodes
            .get(var.node)
            .and_then(|n| n.slots.get(var.slot))
            .ok_or(AdjointError::InvalidVar {
                node: var.node,
                slot: var.slot,
            })
    }

    fn slot_mut(&mut self, var: Var) -> Result<&mut Slot, AdjointError> {
        self.nodes
            .get_mut(var.node)
            .and_then(|n| n.slots.get_mut(var.slot))
            .ok_or(AdjointError::InvalidVar {
                node: var.node,
                slot: var.slot,
            })
    }

    // --- Leaves ---

    fn push_leaf(&mut self, meta: VarMeta, need_grad: bool, data: Option<NdArray>) -> Var {
        let mut slot = Slot::new(meta, need_grad);
        slot.data = data;
        let id = self.nodes.len();
        self.nodes.push(Node {
            kind: NodeKind::Leaf,
            slots: vec![slot],
        });
        Var::new(id, 0)
    }

    /// A leaf with metadata only. It can be differentiated structurally, but
    /// evaluating anything that depends on it fails until data is set.
    pub fn variable(&mut self, shape: &[usize], dtype: DType, need_grad: bool) -> Var {
        self.push_leaf(VarMeta::new(shape.to_vec(), dtype), need_grad, None)
    }

    /// A leaf holding `array`.
    pub fn from_array(&mut self, array: NdArray, need_grad: bool) -> Var {
        let meta = VarMeta::new(array.shape().to_vec(), array.dtype());
        self.push_leaf(meta, need_grad, Some(array))
    }

    /// A leaf that never requires gradient.
    pub fn constant(&mut self, array: NdArray) -> Var {
        self.from_array(array, false)
    }

    pub fn full(&mut self, shape: &[usize], dtype: DType, value: f64) -> Var {
        self.constant(NdArray::full(shape, dtype, value))
    }

    pub fn zeros_like(&mut self, var: Var) -> Result<Var, AdjointError> {
        let meta = self.meta(var)?.clone();
        Ok(self.full(&meta.shape, meta.dtype, 0.0))
    }

    pub fn ones_like(&mut self, var: Var) -> Result<Var, AdjointError> {
        let meta = self.meta(var)?.clone();
        Ok(self.full(&meta.shape, meta.dtype, 1.0))
    }

    /// Replaces the data of a leaf. Shape and dtype must match its metadata.
    pub fn set_data(&mut self, var: Var, array: NdArray) -> Result<(), AdjointError> {
        if !self.node(var.node)?.is_leaf() {
            return Err(AdjointError::UnsupportedOperation(format!(
                "set_data on non-leaf node {}",
                var.node
            )));
        }
        let slot = self.slot_mut(var)?;
        check_meta(&slot.meta, &array, "set_data")?;
        slot.data = Some(array);
        Ok(())
    }

    // --- Introspection ---

    pub fn meta(&self, var: Var) -> Result<&VarMeta, AdjointError> {
        Ok(&self.slot(var)?.meta)
    }

    pub fn shape(&self, var: Var) -> Result<&[usize], AdjointError> {
        Ok(&self.slot(var)?.meta.shape)
    }

    pub fn dtype(&self, var: Var) -> Result<DType, AdjointError> {
        Ok(self.slot(var)?.meta.dtype)
    }

    pub fn need_grad(&self, var: Var) -> Result<bool, AdjointError> {
        Ok(self.slot(var)?.need_grad)
    }

    /// Overrides the `need_grad` flag of one slot.
    ///
    /// Clearing it cuts gradient flow through that slot for every gradient request
    /// made afterwards. A cut slot that is itself requested still receives its
    /// gradient but passes none to its producer. Consumers created later derive
    /// `need_grad` false from it. Setting it again lifts the cut.
    pub fn set_need_grad(&mut self, var: Var, need_grad: bool) -> Result<(), AdjointError> {
        if need_grad && !self.node(var.node)?.is_leaf() && !self.slot(var)?.need_grad {
            warn!(
                "Setting need_grad=true on non-leaf node {}; its inputs do not require grad",
                var.node
            );
        }
        let slot = self.slot_mut(var)?;
        slot.need_grad = need_grad;
        slot.cut = !need_grad;
        Ok(())
    }

    pub fn is_retained(&self, var: Var) -> Result<bool, AdjointError> {
        Ok(self.slot(var)?.retain)
    }

    pub fn is_leaf(&self, var: Var) -> Result<bool, AdjointError> {
        Ok(self.node(var.node)?.is_leaf())
    }

    pub fn inputs(&self, id: NodeId) -> Result<&[Var], AdjointError> {
        Ok(self.node(id)?.inputs())
    }

    pub fn function(&self, id: NodeId) -> Result<Option<&Arc<dyn Function>>, AdjointError> {
        Ok(self.node(id)?.function())
    }

    pub fn num_outputs(&self, id: NodeId) -> Result<usize, AdjointError> {
        Ok(self.node(id)?.num_outputs())
    }

    /// All output slots of a node.
    pub fn outputs(&self, id: NodeId) -> Result<Vec<Var>, AdjointError> {
        let n = self.num_outputs(id)?;
        Ok((0..n).map(|slot| Var::new(id, slot)).collect())
    }

    /// Data currently held by a slot, if any.
    pub fn data(&self, var: Var) -> Result<Option<&NdArray>, AdjointError> {
        Ok(self.slot(var)?.data.as_ref())
    }

    pub(crate) fn store_data(&mut self, var: Var, array: NdArray) -> Result<(), AdjointError> {
        let slot = self.slot_mut(var)?;
        check_meta(&slot.meta, &array, "store_data")?;
        slot.data = Some(array);
        Ok(())
    }

    pub(crate) fn clear_data(&mut self, var: Var) -> Result<(), AdjointError> {
        self.slot_mut(var)?.data = None;
        Ok(())
    }

    // --- Functions ---

    /// Appends a node applying `function` to `inputs` and returns its output slots.
    pub fn apply<F: Function>(&mut self, function: F, inputs: &[Var]) -> Result<Vec<Var>, AdjointError> {
        self.apply_arc(Arc::new(function), inputs)
    }

    /// Like [`Graph::apply`] for functions returning a single output.
    pub fn apply_one<F: Function>(&mut self, function: F, inputs: &[Var]) -> Result<Var, AdjointError> {
        let outputs = self.apply(function, inputs)?;
        match outputs.as_slice() {
            [single] => Ok(*single),
            _ => Err(AdjointError::ArityMismatch {
                operation: "apply_one".to_string(),
                what: "outputs",
                expected: 1,
                actual: outputs.len(),
            }),
        }
    }

    pub fn apply_arc(
        &mut self,
        function: Arc<dyn Function>,
        inputs: &[Var],
    ) -> Result<Vec<Var>, AdjointError> {
        if let Some(expected) = function.num_inputs() {
            expect_inputs(function.name(), inputs, expected)?;
        }
        let metas = inputs
            .iter()
            .map(|&v| self.meta(v).cloned())
            .collect::<Result<Vec<_>, _>>()?;
        if let Some(first) = metas.first() {
            if let Some(other) = metas.iter().find(|m| m.dtype != first.dtype) {
                return Err(AdjointError::DTypeMismatch {
                    expected: first.dtype,
                    actual: other.dtype,
                    operation: function.name().to_string(),
                });
            }
        }

        let out_metas = function.setup(&metas)?;
        if out_metas.is_empty() {
            return Err(AdjointError::ArityMismatch {
                operation: function.name().to_string(),
                what: "outputs",
                expected: 1,
                actual: 0,
            });
        }

        let mut need_grad = false;
        for &v in inputs {
            need_grad |= self.slot(v)?.need_grad;
        }

        // Inputs whose data some input gradient depends on must outlive the forward pass.
        let n_inputs = inputs.len();
        for (j, &v) in inputs.iter().enumerate() {
            if (0..n_inputs).any(|i| function.grad_depends_input_data(i, j)) {
                self.slot_mut(v)?.retain = true;
            }
        }
        let slots = out_metas
            .into_iter()
            .enumerate()
            .map(|(o, meta)| {
                let mut slot = Slot::new(meta, need_grad);
                slot.retain = (0..n_inputs).any(|i| function.grad_depends_output_data(i, o));
                slot
            })
            .collect::<Vec<_>>();

        let id = self.nodes.len();
        let n_outputs = slots.len();
        trace!(
            "Graph: node {} = {}({:?}), need_grad={}",
            id,
            function.name(),
            inputs,
            need_grad
        );
        self.nodes.push(Node {
            kind: NodeKind::Op {
                function,
                inputs: inputs.to_vec(),
            },
            slots,
        });

        let outputs: Vec<Var> = (0..n_outputs).map(|slot| Var::new(id, slot)).collect();
        if self.config.auto_forward {
            crate::exec::forward(self, &outputs, ForwardOptions::default())?;
        }
        Ok(outputs)
    }

    // --- Evaluation (delegated to the executor) ---

    /// Evaluates `var` (and whatever it depends on) and returns its value.
    pub fn evaluate(&mut self, var: Var) -> Result<NdArray, AdjointError> {
        let mut values = self.evaluate_all(&[var])?;
        values
            .pop()
            .ok_or_else(|| AdjointError::InternalError("evaluate produced no value".to_string()))
    }

    /// Evaluates several vars in one pass, sharing common sub-expressions.
    pub fn evaluate_all(&mut self, vars: &[Var]) -> Result<Vec<NdArray>, AdjointError> {
        crate::exec::forward(self, vars, ForwardOptions::default())?;
        vars.iter()
            .map(|&v| {
                self.data(v)?.cloned().ok_or(AdjointError::MissingData {
                    node: v.node,
                    slot: v.slot,
                })
            })
            .collect()
    }
}

fn check_meta(meta: &VarMeta, array: &NdArray, operation: &str) -> Result<(), AdjointError> {
    if meta.shape.as_slice() != array.shape() {
        return Err(AdjointError::ShapeMismatch {
            expected: meta.shape.clone(),
            actual: array.shape().to_vec(),
            operation: operation.to_string(),
        });
    }
    if meta.dtype != array.dtype() {
        return Err(AdjointError::DTypeMismatch {
            expected: meta.dtype,
            actual: array.dtype(),
            operation: operation.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
#[path = "graph_test.rs"]
mod tests;
