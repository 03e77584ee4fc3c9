//! Explicit execution context shared by pipelines
//!
//! An [`Engine`] owns the frozen filter registry, the global variable tier and
//! the time source. Pipelines created from the same engine (or its clones)
//! share one global tier; separate engines never do.

use crate::clock::{Clock, SystemClock};
use crate::config::{EngineConfig, DEFAULT_NOW_FORMAT, SANDBOX_VARIABLE};
use crate::error::Result;
use crate::pipeline::Pipeline;
use crate::registry::FilterRegistry;
use crate::variables::GlobalVariables;
use std::sync::Arc;
use tracing::debug;

#[derive(Clone)]
pub struct Engine {
    registry: Arc<FilterRegistry>,
    globals: GlobalVariables,
    clock: Arc<dyn Clock>,
    now_format: String,
}

impl Engine {
    pub fn new(registry: FilterRegistry) -> Self {
        Self::with_globals(registry, GlobalVariables::new())
    }

    /// Engine over an existing global tier, e.g. the one handed to
    /// [`FilterRegistry::with_defaults`]
    pub fn with_globals(registry: FilterRegistry, globals: GlobalVariables) -> Self {
        Self {
            registry: Arc::new(registry),
            globals,
            clock: Arc::new(SystemClock),
            now_format: DEFAULT_NOW_FORMAT.to_string(),
        }
    }

    /// Engine with the default registry, seeded from configuration
    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        let globals = GlobalVariables::new();
        for (name, value) in &config.globals {
            globals.set(name.as_str(), value.as_str());
        }
        if let Some(root) = &config.sandbox_root {
            globals.set(SANDBOX_VARIABLE, root.to_string_lossy().into_owned());
        }

        let registry = FilterRegistry::with_defaults(config, &globals)?;
        let engine =
            Self::with_globals(registry, globals).with_now_format(config.now_format.clone());

        debug!(
            filters = engine.registry.len(),
            globals = engine.globals.len(),
            "engine initialized"
        );
        Ok(engine)
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn with_now_format(mut self, format: impl Into<String>) -> Self {
        self.now_format = format.into();
        self
    }

    pub fn registry(&self) -> &FilterRegistry {
        &self.registry
    }

    pub fn globals(&self) -> &GlobalVariables {
        &self.globals
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub fn now_format(&self) -> &str {
        &self.now_format
    }

    /// Create-or-update a global variable
    pub fn set_global_variable(&self, name: impl Into<String>, value: impl Into<String>) {
        self.globals.set(name, value);
    }

    /// New empty pipeline bound to this engine
    pub fn pipeline(&self) -> Pipeline {
        Pipeline::new(self.clone())
    }

    /// Parse and run a whole script in a fresh pipeline
    pub fn run_script(&self, script: &str) -> Result<String> {
        let mut pipeline = self.pipeline();
        pipeline.add_script(script)?;
        pipeline.execute()
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("filters", &self.registry.len())
            .field("globals", &self.globals.len())
            .field("now_format", &self.now_format)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_from_config_seeds_globals() {
        let mut config = EngineConfig::default();
        config.globals.insert("Site".to_string(), "example.org".to_string());
        config.sandbox_root = Some(PathBuf::from("/srv/box"));

        let engine = Engine::from_config(&config).unwrap();
        assert_eq!(engine.globals().get("Site").as_deref(), Some("example.org"));
        assert_eq!(
            engine.globals().get(SANDBOX_VARIABLE).as_deref(),
            Some("/srv/box")
        );
    }

    #[test]
    fn test_clones_share_globals() {
        let engine = Engine::from_config(&EngineConfig::default()).unwrap();
        let other = engine.clone();
        other.set_global_variable("Shared", "1");
        assert_eq!(engine.globals().get("Shared").as_deref(), Some("1"));
    }

    #[test]
    fn test_separate_engines_are_isolated() {
        let first = Engine::from_config(&EngineConfig::default()).unwrap();
        let second = Engine::from_config(&EngineConfig::default()).unwrap();
        first.set_global_variable("Only", "first");
        assert!(second.globals().get("Only").is_none());
    }

    #[test]
    fn test_run_script() {
        let engine = Engine::from_config(&EngineConfig::default()).unwrap();
        let result = engine
            .run_script("SetVar Name James\nAppendVar Name \" Bond\"\nReadFrom Name")
            .unwrap();
        assert_eq!(result, "James Bond");
    }

    #[test]
    fn test_sandbox_global_confines_file_filters() {
        let sandbox = tempfile::TempDir::new().unwrap();
        let outside = tempfile::TempDir::new().unwrap();
        let secret = outside.path().join("secret.txt");
        std::fs::write(&secret, "SECRET").unwrap();

        let engine = Engine::from_config(&EngineConfig::default()).unwrap();
        engine.set_global_variable(
            SANDBOX_VARIABLE,
            sandbox.path().to_string_lossy().into_owned(),
        );

        let err = engine
            .run_script(&format!("File.Read -file:\"{}\"", secret.display()))
            .unwrap_err();
        assert_eq!(err.code(), crate::error::ErrorCode::FILTER_FAILED);
        assert!(err.to_string().contains("outside the sandbox"));
    }
}
