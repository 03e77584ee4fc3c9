//! Structured representation of one pipeline script line

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A parsed command: filter name, arguments and optional output redirection
///
/// The zeroth positional argument is conventionally the "primary" argument,
/// e.g. the variable name for `SetVar`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    /// Filter name exactly as written (`SetVar`, `File.Read`)
    pub filter: String,

    /// Positional arguments in source order
    #[serde(default)]
    pub args: Vec<String>,

    /// Named `-key:value` arguments, keys folded to ASCII lower case
    #[serde(default)]
    pub named: HashMap<String, String>,

    /// Target variable of a trailing `=> $name`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

impl Command {
    pub fn new(filter: impl Into<String>) -> Self {
        Self {
            filter: filter.into(),
            args: Vec::new(),
            named: HashMap::new(),
            output: None,
        }
    }

    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn with_named(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.named.insert(fold_key(&key.into()), value.into());
        self
    }

    pub fn with_output(mut self, variable: impl Into<String>) -> Self {
        self.output = Some(variable.into());
        self
    }

    /// Positional argument at `index`
    pub fn arg(&self, index: usize) -> Option<&str> {
        self.args.get(index).map(String::as_str)
    }

    /// Named argument, matched case-insensitively on the key
    pub fn named_arg(&self, key: &str) -> Option<&str> {
        self.named.get(&fold_key(key)).map(String::as_str)
    }

    /// Split the filter name into `(category, name)`; bare names belong to `Core`
    pub fn qualified_name(&self) -> (&str, &str) {
        split_filter_name(&self.filter)
    }
}

/// Canonical spelling of a named-argument key
pub(crate) fn fold_key(key: &str) -> String {
    key.to_ascii_lowercase()
}

/// Category used for filter names written without a `Category.` prefix
pub const DEFAULT_CATEGORY: &str = "Core";

pub(crate) fn split_filter_name(full: &str) -> (&str, &str) {
    match full.rsplit_once('.') {
        Some((category, name)) => (category, name),
        None => (DEFAULT_CATEGORY, full),
    }
}
