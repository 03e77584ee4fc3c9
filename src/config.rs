//! Engine configuration
//!
//! Loaded from TOML, then overridden by `TEXTPIPE_*` environment variables.

use anyhow::{anyhow, Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Long date with short time, e.g. `Wednesday, February 25, 2015 3:04 PM`
pub const DEFAULT_NOW_FORMAT: &str = "%A, %B %-d, %Y %-I:%M %p";

/// Global variable holding the directory file filters are confined to
pub const SANDBOX_VARIABLE: &str = "__sandbox_root";

const CONFIG_FILE_NAME: &str = "textpipe.toml";

fn default_now_format() -> String {
    DEFAULT_NOW_FORMAT.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Tracing filter directive, e.g. `debug` or `textpipe=trace`
    pub log_level: Option<String>,

    /// Register the diagnostic filters used to exercise dependency checks
    pub enable_test_filters: bool,

    /// Capability names declared available in addition to the defaults
    pub capabilities: Vec<String>,

    /// strftime format used by `Now` when no format argument is given
    #[serde(default = "default_now_format")]
    pub now_format: String,

    /// Directory file filters may read from; seeded as a global variable
    pub sandbox_root: Option<PathBuf>,

    /// Global variables seeded into every engine built from this config
    pub globals: BTreeMap<String, String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            log_level: None,
            enable_test_filters: false,
            capabilities: Vec::new(),
            now_format: default_now_format(),
            sandbox_root: None,
            globals: BTreeMap::new(),
        }
    }
}

/// Directory holding the user-level configuration file
pub fn get_config_dir() -> Result<PathBuf> {
    ProjectDirs::from("dev", "textpipe", "textpipe")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_else(|| anyhow!("Could not determine home directory"))
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse engine configuration")
    }

    /// Load configuration from an explicit file and apply env overrides
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config = Self::from_toml_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        config.merge_env_vars();
        Ok(config)
    }

    /// Load the user-level config file if present, otherwise defaults
    pub fn load_default() -> Result<Self> {
        let path = get_config_dir()?.join(CONFIG_FILE_NAME);
        if path.exists() {
            return Self::load(&path);
        }
        let mut config = Self::default();
        config.merge_env_vars();
        Ok(config)
    }

    pub fn merge_env_vars(&mut self) {
        self.merge_vars(|key| std::env::var(key).ok());
    }

    fn merge_vars(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(level) = lookup("TEXTPIPE_LOG") {
            self.log_level = Some(level);
        }

        if let Some(flag) = lookup("TEXTPIPE_TEST_FILTERS") {
            if let Ok(value) = flag.parse::<bool>() {
                self.enable_test_filters = value;
            }
        }

        if let Some(root) = lookup("TEXTPIPE_SANDBOX") {
            self.sandbox_root = Some(PathBuf::from(root));
        }
    }
}
