//! # textpipe
//!
//! A sequential text-transformation pipeline engine. Scripts are lists of
//! one-line filter commands; each command transforms a single active text
//! value and may read or write named variables along the way.
//!
//! ## Usage
//!
//! ```bash
//! textpipe run script.tp [--var name=value] [--global name=value]
//! textpipe filters [--json]
//! ```
//!
//! ## Modules
//!
//! - `command` - Parsed command representation
//! - `parser` - Command-line syntax: positional and `-key:value` arguments, `=> $var` redirection
//! - `variables` - Two-tier variable store (per-pipeline locals over shared globals)
//! - `resolver` - `$name` expansion in command arguments
//! - `registry` - Immutable filter table with metadata and capability checks
//! - `filters` - Built-in opcodes plus the bundled `Text` and `File` filters
//! - `pipeline` - Sequential executor and built-in opcode semantics
//! - `engine` - Shared execution context pipelines are created from
//! - `config` - TOML configuration with environment overrides
//! - `error` - Error type and stable error codes
pub mod clock;
pub mod command;
pub mod config;
pub mod engine;
pub mod error;
pub mod filters;
pub mod parser;
pub mod pipeline;
pub mod registry;
pub mod resolver;
pub mod variables;

pub use command::Command;
pub use config::EngineConfig;
pub use engine::Engine;
pub use error::{ErrorCode, PipelineError, Result};
pub use pipeline::{ExecutionState, Pipeline, ScriptCommand};
pub use registry::{FilterDescriptor, FilterRegistry};
pub use variables::{GlobalVariables, VariableStore};
