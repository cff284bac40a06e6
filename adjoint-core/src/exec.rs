//! Reference execution layer.
//!
//! Evaluates graph slots on the CPU by running each primitive's forward kernel in
//! topological order. Results are memoised in the arena; a slot that already
//! holds data is never recomputed. The gradient engine never calls into this
//! module: evaluation is always requested by a caller (or by eager mode).

use std::collections::HashSet;

use log::debug;

use crate::config::ForwardOptions;
use crate::error::AdjointError;
use crate::graph::traversal::topological_sort;
use crate::graph::{Graph, NodeId, Var};
use crate::ndarray::NdArray;

/// Computes `targets` and every ancestor that lacks data.
pub fn forward(graph: &mut Graph, targets: &[Var], options: ForwardOptions) -> Result<(), AdjointError> {
    let order = topological_sort(graph, targets)?;
    let mut computed = 0usize;

    for &id in &order {
        let node = graph.node(id)?;
        if node.slots().iter().all(|s| s.data().is_some()) {
            continue;
        }
        let function = match node.function() {
            Some(f) => f.clone(),
            None => {
                // A leaf without data cannot be produced here.
                return Err(AdjointError::MissingData { node: id, slot: 0 });
            }
        };
        let inputs = node.inputs().to_vec();
        let input_data: Vec<NdArray> = inputs
            .iter()
            .map(|&v| {
                graph.data(v)?.cloned().ok_or(AdjointError::MissingData {
                    node: v.node(),
                    slot: v.slot(),
                })
            })
            .collect::<Result<_, _>>()?;
        let input_refs: Vec<&NdArray> = input_data.iter().collect();

        let outputs = function.forward(&input_refs)?;
        let n_outputs = graph.num_outputs(id)?;
        if outputs.len() != n_outputs {
            return Err(AdjointError::ArityMismatch {
                operation: function.name().to_string(),
                what: "forward outputs",
                expected: n_outputs,
                actual: outputs.len(),
            });
        }
        for (slot, array) in outputs.into_iter().enumerate() {
            graph.store_data(Var::new(id, slot), array)?;
        }
        computed += 1;
    }

    if options.clear_unretained {
        clear_unretained(graph, &order, targets)?;
    }
    debug!(
        "exec::forward: {} nodes in scope, {} computed",
        order.len(),
        computed
    );
    Ok(())
}

/// Frees intermediate buffers nobody declared a need for.
fn clear_unretained(graph: &mut Graph, order: &[NodeId], targets: &[Var]) -> Result<(), AdjointError> {
    let keep: HashSet<Var> = targets.iter().copied().collect();
    for &id in order {
        if graph.node(id)?.is_leaf() {
            continue;
        }
        for var in graph.outputs(id)? {
            if !keep.contains(&var) && !graph.is_retained(var)? {
                graph.clear_data(var)?;
            }
        }
    }
    Ok(())
}
