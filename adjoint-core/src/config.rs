use crate::types::DType;

/// Per-graph settings.
///
/// `auto_forward` switches the graph into eager mode: every node is evaluated as soon as
/// it is appended, including nodes created by backward adapters. In the default lazy
/// mode nothing is computed until [`crate::exec::forward`] is called.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphConfig {
    pub auto_forward: bool,
    /// DType used by convenience constructors that do not take one explicitly.
    pub default_dtype: DType,
}

impl Default for GraphConfig {
    fn default() -> Self {
        GraphConfig {
            auto_forward: false,
            default_dtype: DType::F32,
        }
    }
}

impl GraphConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn auto_forward(mut self, enabled: bool) -> Self {
        self.auto_forward = enabled;
        self
    }

    pub fn default_dtype(mut self, dtype: DType) -> Self {
        self.default_dtype = dtype;
        self
    }
}

/// Options for one call to [`crate::exec::forward`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ForwardOptions {
    /// Free every intermediate buffer whose retention flag is false once the
    /// requested targets are computed. Leaves and targets are always kept.
    pub clear_unretained: bool,
}

impl ForwardOptions {
    pub fn clear_unretained(mut self, enabled: bool) -> Self {
        self.clear_unretained = enabled;
        self
    }
}
