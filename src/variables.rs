//! Two-tier variable storage
//!
//! The global tier is shared by every pipeline created from one engine and is
//! guarded by a lock. The local tier belongs to a single pipeline and shadows
//! the global tier on reads.

use crate::error::{PipelineError, Result};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::trace;

/// Process-wide variables shared between pipelines of one engine
#[derive(Debug, Clone, Default)]
pub struct GlobalVariables {
    inner: Arc<RwLock<HashMap<String, String>>>,
}

impl GlobalVariables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create-or-update a global variable
    pub fn set(&self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        trace!(variable = %name, "setting global variable");
        let mut vars = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        vars.insert(name, value.into());
    }

    pub fn get(&self, name: &str) -> Option<String> {
        let vars = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        vars.get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Variable view of one pipeline: its own local tier plus the shared globals
#[derive(Debug, Clone)]
pub struct VariableStore {
    local: HashMap<String, String>,
    globals: GlobalVariables,
}

impl VariableStore {
    pub fn new(globals: GlobalVariables) -> Self {
        Self {
            local: HashMap::new(),
            globals,
        }
    }

    /// Create-or-update a local variable; never fails
    pub fn set_safe(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        trace!(variable = %name, "setting local variable");
        self.local.insert(name, value.into());
    }

    /// Read a variable, local tier first, failing if neither tier defines it
    pub fn get(&self, name: &str) -> Result<String> {
        self.local
            .get(name)
            .cloned()
            .or_else(|| self.globals.get(name))
            .ok_or_else(|| PipelineError::missing_variable(name))
    }

    /// Write to the shared tier; visible to every pipeline of the engine
    pub fn set_global(&self, name: impl Into<String>, value: impl Into<String>) {
        self.globals.set(name, value);
    }
}
