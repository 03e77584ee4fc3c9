//! Runtime capabilities that filters may declare as dependencies

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Capability provided by every standard build
pub const FILESYSTEM: &str = "filesystem";

/// Set of capability names satisfiable in this runtime
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilitySet {
    available: BTreeSet<String>,
}

impl CapabilitySet {
    /// A set with nothing available
    pub fn empty() -> Self {
        Self {
            available: BTreeSet::new(),
        }
    }

    pub fn provide(&mut self, capability: impl Into<String>) -> &mut Self {
        self.available.insert(capability.into());
        self
    }

    pub fn contains(&self, capability: &str) -> bool {
        self.available.contains(capability)
    }

    /// Whether an optional requirement is met; no requirement is always met
    pub fn satisfies(&self, requirement: Option<&str>) -> bool {
        requirement.map_or(true, |cap| self.contains(cap))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.available.iter().map(String::as_str)
    }
}

impl Default for CapabilitySet {
    fn default() -> Self {
        let mut set = Self::empty();
        set.provide(FILESYSTEM);
        set
    }
}

impl<S: Into<String>> Extend<S> for CapabilitySet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        self.available.extend(iter.into_iter().map(Into::into));
    }
}
