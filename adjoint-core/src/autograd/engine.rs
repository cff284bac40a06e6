//! The Graph Walker: builds gradient nodes for requested inputs by walking the
//! forward graph backwards and invoking one backward adapter per node.
//!
//! The walk never evaluates anything. Every gradient it returns is an ordinary
//! node of the same [`Graph`], so feeding it back into
//! [`GradEngine::compute_gradients`] yields higher-order derivatives.

use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

use log::{debug, trace, warn};

use super::adapter::BackwardContext;
use super::registry::Registry;
use crate::error::AdjointError;
use crate::graph::traversal::topological_sort;
use crate::graph::{Graph, NodeId, Var};
use crate::ndarray::NdArray;
use crate::ops::arithmetic::add_op;

/// Upstream gradient supplied for one requested output.
#[derive(Debug, Clone, Default)]
pub enum Seed {
    /// Ones shaped like the output.
    #[default]
    Default,
    /// A constant broadcast to the output's shape.
    Scalar(f64),
    /// A buffer of the output's shape, or holding a single element.
    Array(NdArray),
    /// A graph value of the output's shape. Higher-order gradients may flow into it.
    Var(Var),
}

impl From<f64> for Seed {
    fn from(value: f64) -> Self {
        Seed::Scalar(value)
    }
}

impl From<i32> for Seed {
    fn from(value: i32) -> Self {
        Seed::Scalar(f64::from(value))
    }
}

impl From<NdArray> for Seed {
    fn from(array: NdArray) -> Self {
        Seed::Array(array)
    }
}

impl From<Var> for Seed {
    fn from(var: Var) -> Self {
        Seed::Var(var)
    }
}

/// Owns the adapter registry and runs gradient requests against graphs.
#[derive(Debug, Clone)]
pub struct GradEngine {
    registry: Registry,
}

impl Default for GradEngine {
    fn default() -> Self {
        GradEngine::new(Registry::builtin())
    }
}

impl GradEngine {
    pub fn new(registry: Registry) -> Self {
        GradEngine { registry }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    /// Appends the gradient sub-graph of `outputs` wrt `inputs` and returns one
    /// gradient var per input, in order.
    ///
    /// `seeds` is either empty (every output seeded with ones) or holds one seed per
    /// output. Inputs no requested output depends on get a constant zero gradient.
    /// Only nodes lying between the outputs and the inputs are visited, and the
    /// adapter of such a node is looked up only when it is about to be invoked.
    pub fn compute_gradients(
        &self,
        graph: &mut Graph,
        outputs: &[Var],
        inputs: &[Var],
        seeds: &[Seed],
    ) -> Result<Vec<Var>, AdjointError> {
        if !seeds.is_empty() && seeds.len() != outputs.len() {
            return Err(AdjointError::SeedCountMismatch {
                expected: outputs.len(),
                actual: seeds.len(),
            });
        }
        for &var in inputs {
            graph.slot(var)?;
        }
        let nodes_before = graph.len();

        let order = topological_sort(graph, outputs)?;
        let relevant = relevant_vars(graph, &order, inputs)?;

        let mut walk = Walk::default();
        for (k, &output) in outputs.iter().enumerate() {
            if !relevant.contains(&output) {
                warn!(
                    "GradEngine: output {:?} does not depend on any requested input; its seed is ignored",
                    output
                );
                continue;
            }
            let seed = match seeds.get(k) {
                Some(seed) => coerce_seed(graph, output, seed)?,
                None => coerce_seed(graph, output, &Seed::Default)?,
            };
            walk.accumulate(graph, output, seed)?;
        }

        for &id in order.iter().rev() {
            self.visit(graph, id, &relevant, &mut walk)?;
        }

        let mut result = Vec::with_capacity(inputs.len());
        for &input in inputs {
            match walk.grads.get(&input) {
                Some(&g) => result.push(g),
                None => {
                    trace!("GradEngine: input {:?} is disconnected, returning zeros", input);
                    result.push(graph.zeros_like(input)?);
                }
            }
        }

        debug!(
            "GradEngine: {} outputs, {} inputs, {} relevant vars, {} adapters invoked, {} accumulations, {} nodes appended",
            outputs.len(),
            inputs.len(),
            relevant.len(),
            walk.invoked,
            walk.accumulations,
            graph.len() - nodes_before
        );
        Ok(result)
    }

    /// Runs the adapter of node `id` if gradient flows through it.
    fn visit(
        &self,
        graph: &mut Graph,
        id: NodeId,
        relevant: &HashSet<Var>,
        walk: &mut Walk,
    ) -> Result<(), AdjointError> {
        let node = graph.node(id)?;
        let function = match node.function() {
            Some(f) => f.clone(),
            None => return Ok(()),
        };
        let node_inputs = node.inputs().to_vec();
        let node_outputs = graph.outputs(id)?;
        // A cut slot may hold a gradient (it was requested) but passes none upstream.
        let upstream: Vec<Option<Var>> = node
            .slots()
            .iter()
            .zip(&node_outputs)
            .map(|(slot, out)| if slot.is_cut() { None } else { walk.grads.get(out).copied() })
            .collect();

        let propagate_down: Vec<bool> = node_inputs.iter().map(|v| relevant.contains(v)).collect();
        if !propagate_down.iter().any(|&p| p) {
            return Ok(());
        }
        if upstream.iter().all(Option::is_none) {
            return Ok(());
        }

        let adapter = self.registry.lookup(function.name())?;

        let mut grad_outputs = Vec::with_capacity(node_outputs.len());
        for (&out, g) in node_outputs.iter().zip(upstream) {
            match g {
                Some(g) => grad_outputs.push(g),
                None => grad_outputs.push(graph.zeros_like(out)?),
            }
        }
        let n_inputs = node_inputs.len();
        let recorded_inputs = node_inputs
            .iter()
            .enumerate()
            .map(|(j, &v)| (0..n_inputs).any(|i| function.grad_depends_input_data(i, j)).then_some(v))
            .collect();
        let recorded_outputs = node_outputs
            .iter()
            .enumerate()
            .map(|(o, &v)| (0..n_inputs).any(|i| function.grad_depends_output_data(i, o)).then_some(v))
            .collect();
        let input_shapes = node_inputs
            .iter()
            .map(|&v| graph.shape(v).map(<[usize]>::to_vec))
            .collect::<Result<Vec<_>, _>>()?;
        let output_shapes = node_outputs
            .iter()
            .map(|&v| graph.shape(v).map(<[usize]>::to_vec))
            .collect::<Result<Vec<_>, _>>()?;

        let ctx = BackwardContext::new(
            function.clone(),
            grad_outputs,
            recorded_inputs,
            input_shapes,
            recorded_outputs,
            output_shapes,
            propagate_down,
        );
        trace!("GradEngine: invoking {} backward for node {}", function.name(), id);
        let grads = adapter.backward(graph, &ctx)?;
        walk.invoked += 1;

        if grads.len() != n_inputs {
            return Err(AdjointError::ArityMismatch {
                operation: format!("{}_backward", function.name()),
                what: "input gradients",
                expected: n_inputs,
                actual: grads.len(),
            });
        }
        for (j, g) in grads.into_iter().enumerate() {
            let g = match g {
                Some(g) if ctx.propagate_down(j) => g,
                _ => continue,
            };
            let expected = ctx.input_shape(j)?;
            let actual = graph.shape(g)?;
            if expected != actual {
                return Err(AdjointError::ShapeMismatch {
                    expected: expected.to_vec(),
                    actual: actual.to_vec(),
                    operation: format!("{}_backward", function.name()),
                });
            }
            walk.accumulate(graph, node_inputs[j], g)?;
        }
        Ok(())
    }
}

/// Per-request state of the walk.
#[derive(Debug, Default)]
struct Walk {
    grads: HashMap<Var, Var>,
    invoked: usize,
    accumulations: usize,
}

impl Walk {
    /// Adds `g` into the gradient accumulator of `var`.
    fn accumulate(&mut self, graph: &mut Graph, var: Var, g: Var) -> Result<(), AdjointError> {
        let sum = match self.grads.get(&var) {
            None => g,
            Some(&existing) => {
                self.accumulations += 1;
                trace!("GradEngine: accumulating into {:?}", var);
                add_op(graph, existing, g)?
            }
        };
        self.grads.insert(var, sum);
        Ok(())
    }
}

/// Vars lying between `inputs` and the end of `order`: a requested input, or a
/// slot produced from a relevant var that was not cut with `set_need_grad(false)`.
///
/// The derived `need_grad` flag is not consulted, so a requested constant is
/// differentiated through its consumers like any other input.
fn relevant_vars(graph: &Graph, order: &[NodeId], inputs: &[Var]) -> Result<HashSet<Var>, AdjointError> {
    let requested: HashSet<Var> = inputs.iter().copied().collect();
    let mut relevant = HashSet::new();
    for &id in order {
        let node = graph.node(id)?;
        let fed = !node.is_leaf() && node.inputs().iter().any(|v| relevant.contains(v));
        for (slot, var) in node.slots().iter().zip(graph.outputs(id)?) {
            if requested.contains(&var) || (fed && !slot.is_cut()) {
                relevant.insert(var);
            }
        }
    }
    Ok(relevant)
}

/// Turns a seed into a graph var shaped like `output`.
fn coerce_seed(graph: &mut Graph, output: Var, seed: &Seed) -> Result<Var, AdjointError> {
    let meta = graph.meta(output)?.clone();
    match seed {
        Seed::Default => graph.ones_like(output),
        Seed::Scalar(value) => Ok(graph.full(&meta.shape, meta.dtype, *value)),
        Seed::Array(array) => {
            if array.shape() == meta.shape.as_slice() {
                Ok(graph.constant(array.astype(meta.dtype)))
            } else if array.numel() == 1 {
                Ok(graph.full(&meta.shape, meta.dtype, array.item()?))
            } else {
                Err(AdjointError::ShapeMismatch {
                    expected: meta.shape,
                    actual: array.shape().to_vec(),
                    operation: "seed".to_string(),
                })
            }
        }
        Seed::Var(var) => {
            let seed_meta = graph.meta(*var)?;
            if seed_meta.shape != meta.shape {
                return Err(AdjointError::ShapeMismatch {
                    expected: meta.shape,
                    actual: seed_meta.shape.clone(),
                    operation: "seed".to_string(),
                });
            }
            if seed_meta.dtype != meta.dtype {
                return Err(AdjointError::DTypeMismatch {
                    expected: meta.dtype,
                    actual: seed_meta.dtype,
                    operation: "seed".to_string(),
                });
            }
            Ok(*var)
        }
    }
}

/// [`GradEngine::compute_gradients`] with the built-in registry.
///
/// The engine behind this function is a process-wide instance created on first
/// use with [`Registry::builtin`]. Adapters registered on any other `GradEngine`
/// or `Registry` never reach it; use [`GradEngine::new`] for custom coverage.
pub fn grad(graph: &mut Graph, outputs: &[Var], inputs: &[Var], seeds: &[Seed]) -> Result<Vec<Var>, AdjointError> {
    static ENGINE: OnceLock<GradEngine> = OnceLock::new();
    ENGINE
        .get_or_init(GradEngine::default)
        .compute_gradients(graph, outputs, inputs, seeds)
}

#[cfg(test)]
#[path = "engine_test.rs"]
mod tests;
