//! Filter descriptors: dispatch metadata plus documentation metadata

use crate::command::Command;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Handler signature for external filters: `(active text, resolved command) -> text`
pub type FilterFn = Arc<dyn Fn(&str, &Command) -> Result<String> + Send + Sync>;

/// Operations intercepted by the executor instead of calling a handler
///
/// These read or write the variable store or the active text buffer directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuiltinOp {
    Clear,
    ReadFrom,
    WriteTo,
    SetVar,
    InitVar,
    AppendVar,
    Now,
}

/// How a filter is dispatched
#[derive(Clone)]
pub enum FilterKind {
    Builtin(BuiltinOp),
    External(FilterFn),
}

impl fmt::Debug for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterKind::Builtin(op) => f.debug_tuple("Builtin").field(op).finish(),
            FilterKind::External(_) => f.write_str("External(<handler>)"),
        }
    }
}

/// Help metadata for one argument
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArgumentMeta {
    /// 1-based position of the argument
    pub position: usize,
    pub display_name: String,
    pub required: bool,
    pub help: String,
}

/// Example usage kept for documentation tooling; never run by the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeSample {
    pub input: String,
    pub command: String,
    pub output: String,
}

/// A registered filter
#[derive(Debug, Clone)]
pub struct FilterDescriptor {
    pub category: String,
    pub name: String,
    pub description: String,
    pub arguments: Vec<ArgumentMeta>,
    pub samples: Vec<CodeSample>,
    /// When false, `$name` references in arguments are left as written
    pub resolves_variables: bool,
    /// External capability this filter needs, checked before dispatch
    pub required_capability: Option<String>,
    pub kind: FilterKind,
}

impl FilterDescriptor {
    fn new(category: &str, name: &str, kind: FilterKind) -> Self {
        Self {
            category: category.to_string(),
            name: name.to_string(),
            description: String::new(),
            arguments: Vec::new(),
            samples: Vec::new(),
            resolves_variables: true,
            required_capability: None,
            kind,
        }
    }

    /// Descriptor for an operation the executor handles itself
    pub fn builtin(category: &str, name: &str, op: BuiltinOp) -> Self {
        Self::new(category, name, FilterKind::Builtin(op))
    }

    /// Descriptor for a handler-backed filter
    pub fn external<F>(category: &str, name: &str, handler: F) -> Self
    where
        F: Fn(&str, &Command) -> Result<String> + Send + Sync + 'static,
    {
        Self::new(category, name, FilterKind::External(Arc::new(handler)))
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn argument(mut self, position: usize, display_name: &str, required: bool, help: &str) -> Self {
        self.arguments.push(ArgumentMeta {
            position,
            display_name: display_name.to_string(),
            required,
            help: help.to_string(),
        });
        self
    }

    pub fn sample(mut self, input: &str, command: &str, output: &str) -> Self {
        self.samples.push(CodeSample {
            input: input.to_string(),
            command: command.to_string(),
            output: output.to_string(),
        });
        self
    }

    /// Opt out of `$variable` expansion for this filter's arguments
    pub fn no_variable_resolution(mut self) -> Self {
        self.resolves_variables = false;
        self
    }

    pub fn requires(mut self, capability: &str) -> Self {
        self.required_capability = Some(capability.to_string());
        self
    }

    /// `Category.Name` as registered
    pub fn full_name(&self) -> String {
        format!("{}.{}", self.category, self.name)
    }

    /// Case-folded lookup key
    pub(crate) fn key(&self) -> String {
        registry_key(&self.category, &self.name)
    }

    pub fn builtin_op(&self) -> Option<BuiltinOp> {
        match self.kind {
            FilterKind::Builtin(op) => Some(op),
            FilterKind::External(_) => None,
        }
    }

    /// Serializable metadata view
    pub fn info(&self) -> FilterInfo {
        FilterInfo {
            name: self.full_name(),
            description: self.description.clone(),
            arguments: self.arguments.clone(),
            samples: self.samples.clone(),
            resolves_variables: self.resolves_variables,
            required_capability: self.required_capability.clone(),
            builtin: self.builtin_op().is_some(),
        }
    }
}

pub(crate) fn registry_key(category: &str, name: &str) -> String {
    format!("{}.{}", category.to_ascii_lowercase(), name.to_ascii_lowercase())
}

/// Metadata of a filter without its handler, suitable for listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterInfo {
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub arguments: Vec<ArgumentMeta>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub samples: Vec<CodeSample>,
    pub resolves_variables: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_capability: Option<String>,
    pub builtin: bool,
}
