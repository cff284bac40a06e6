use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use log::debug;

use super::adapter::BackwardAdapter;
use crate::error::AdjointError;

/// Maps an operation-type name to the adapter that builds its backward graph.
///
/// The registry is a plain value: the engine owns one, and callers extend or
/// override coverage with [`Registry::register`] before differentiating. The last
/// registration for a name wins. Mutating a registry that an engine is using from
/// another thread is not supported.
#[derive(Clone)]
pub struct Registry {
    adapters: HashMap<String, Arc<dyn BackwardAdapter>>,
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Registry {
            adapters: HashMap::new(),
        }
    }

    /// A registry populated with adapters for every built-in primitive.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        crate::ops::register_builtin(&mut registry);
        debug!("Registry: {} built-in adapters", registry.len());
        registry
    }

    /// Installs `adapter` for `op`, returning the adapter it replaces, if any.
    pub fn register<A>(&mut self, op: impl Into<String>, adapter: A) -> Option<Arc<dyn BackwardAdapter>>
    where
        A: BackwardAdapter + 'static,
    {
        self.register_arc(op, Arc::new(adapter))
    }

    pub fn register_arc(
        &mut self,
        op: impl Into<String>,
        adapter: Arc<dyn BackwardAdapter>,
    ) -> Option<Arc<dyn BackwardAdapter>> {
        let op = op.into();
        let previous = self.adapters.insert(op.clone(), adapter);
        if previous.is_some() {
            debug!("Registry: overriding adapter for '{}'", op);
        }
        previous
    }

    pub fn lookup(&self, op: &str) -> Result<Arc<dyn BackwardAdapter>, AdjointError> {
        self.adapters
            .get(op)
            .cloned()
            .ok_or_else(|| AdjointError::UnregisteredAdapter { op: op.to_string() })
    }

    pub fn unregister(&mut self, op: &str) -> Option<Arc<dyn BackwardAdapter>> {
        self.adapters.remove(op)
    }

    pub fn contains(&self, op: &str) -> bool {
        self.adapters.contains_key(op)
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }

    /// Registered operation names, sorted.
    pub fn ops(&self) -> Vec<&str> {
        let mut ops: Vec<&str> = self.adapters.keys().map(String::as_str).collect();
        ops.sort_unstable();
        ops
    }
}

/// The default registry is [`Registry::builtin`].
impl Default for Registry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry").field("ops", &self.ops()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autograd::adapter::{BackwardContext, NotImplementedBackward};
    use crate::graph::{Graph, Var};

    fn passthrough(_g: &mut Graph, ctx: &BackwardContext) -> Result<Vec<Option<Var>>, AdjointError> {
        Ok(vec![Some(ctx.grad_output(0)?)])
    }

    #[test]
    fn test_lookup_missing_is_unregistered() {
        let registry = Registry::new();
        assert!(matches!(
            registry.lookup("Nope"),
            Err(AdjointError::UnregisteredAdapter { op }) if op == "Nope"
        ));
    }

    #[test]
    fn test_register_overrides_last_writer_wins() {
        let mut registry = Registry::new();
        assert!(registry.register("Custom", NotImplementedBackward::new()).is_none());
        assert!(registry.register("Custom", passthrough).is_some());
        assert_eq!(registry.len(), 1);
        assert!(registry.contains("Custom"));
    }

    #[test]
    fn test_builtin_covers_structural_data_grads() {
        let registry = Registry::builtin();
        for op in [
            "Add2",
            "Mul2",
            "Sin",
            "Sum",
            "BroadcastTo",
            "Transpose",
            "TransposeDataGrad",
            "Reshape",
            "ReshapeDataGrad",
            "Slice",
            "SliceDataGrad",
            "Sign",
            "Concatenate",
            "Split",
        ] {
            assert!(registry.contains(op), "missing adapter for {}", op);
        }
        assert!(Registry::new().is_empty());
        assert_eq!(Registry::default().len(), registry.len());
    }
}
