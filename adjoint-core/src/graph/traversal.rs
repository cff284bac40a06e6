use std::collections::HashSet;

use super::{Graph, NodeId, Var};
use crate::error::AdjointError;

/// Collects every node reachable backwards from `roots`, roots included.
pub fn ancestors(graph: &Graph, roots: &[Var]) -> Result<HashSet<NodeId>, AdjointError> {
    let mut visited = HashSet::new();
    let mut stack = Vec::with_capacity(roots.len());
    for &root in roots {
        graph.slot(root)?;
        stack.push(root.node);
    }
    while let Some(id) = stack.pop() {
        if !visited.insert(id) {
            continue;
        }
        for input in graph.node(id)?.inputs() {
            if !visited.contains(&input.node) {
                stack.push(input.node);
            }
        }
    }
    Ok(visited)
}

/// Returns the ancestors of `roots` in topological order (inputs before consumers).
///
/// The arena only ever appends a node after all of its inputs exist, so ascending
/// `NodeId` order is a valid topological order of any subset of the graph.
pub fn topological_sort(graph: &Graph, roots: &[Var]) -> Result<Vec<NodeId>, AdjointError> {
    let mut sorted: Vec<NodeId> = ancestors(graph, roots)?.into_iter().collect();
    sorted.sort_unstable();
    Ok(sorted)
}
