//! Sequential pipeline executor
//!
//! A pipeline walks its commands in order, threading one active text value
//! through them. Execution stops at the first error; variable writes made by
//! earlier commands are kept.

use crate::command::Command;
use crate::engine::Engine;
use crate::error::{PipelineError, Result};
use crate::parser::{is_ignorable_line, parse_command};
use crate::registry::FilterKind;
use crate::resolver;
use crate::variables::VariableStore;
use serde::Serialize;
use tracing::{debug, info, warn};

mod builtins;

use builtins::BuiltinContext;

/// Lifecycle of a pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExecutionState {
    Idle,
    Running,
    Completed,
    Failed,
}

/// A parsed command together with the line it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptCommand {
    pub source: String,
    pub command: Command,
}

pub struct Pipeline {
    engine: Engine,
    commands: Vec<ScriptCommand>,
    variables: VariableStore,
    active_text: String,
    state: ExecutionState,
}

impl Pipeline {
    pub fn new(engine: Engine) -> Self {
        let variables = VariableStore::new(engine.globals().clone());
        Self {
            engine,
            commands: Vec::new(),
            variables,
            active_text: String::new(),
            state: ExecutionState::Idle,
        }
    }

    /// Parse and append one command; malformed lines are rejected immediately
    pub fn add_command(&mut self, line: &str) -> Result<&mut Self> {
        let command =
            parse_command(line).map_err(|e| e.at_command(self.commands.len() + 1, line))?;
        self.commands.push(ScriptCommand {
            source: line.to_string(),
            command,
        });
        Ok(self)
    }

    /// Parse a multi-line script, skipping blank lines and `#` comments
    ///
    /// Either every line is appended or, on a parse error, none are.
    pub fn add_script(&mut self, script: &str) -> Result<usize> {
        let mut parsed = Vec::new();
        for line in script.lines().filter(|l| !is_ignorable_line(l)) {
            let index = self.commands.len() + parsed.len() + 1;
            let command = parse_command(line).map_err(|e| e.at_command(index, line))?;
            parsed.push(ScriptCommand {
                source: line.to_string(),
                command,
            });
        }

        let added = parsed.len();
        self.commands.extend(parsed);
        Ok(added)
    }

    pub fn commands(&self) -> &[ScriptCommand] {
        &self.commands
    }

    pub fn state(&self) -> ExecutionState {
        self.state
    }

    /// Active text as left by the last run, including a failed one
    pub fn active_text(&self) -> &str {
        &self.active_text
    }

    /// Seed the local tier before execution
    pub fn set_variable(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.variables.set_safe(name, value);
    }

    /// Seed the shared tier; visible to every pipeline of the same engine
    pub fn set_global_variable(&self, name: impl Into<String>, value: impl Into<String>) {
        self.variables.set_global(name, value);
    }

    /// Read a variable, local tier first; uninitialized names are an error
    pub fn get_variable(&self, name: &str) -> Result<String> {
        self.variables.get(name)
    }

    /// Run every command in order and return the final active text
    ///
    /// Each call starts from an empty active text. Local variables persist
    /// between calls.
    pub fn execute(&mut self) -> Result<String> {
        let Self {
            engine,
            commands,
            variables,
            active_text,
            state,
        } = self;

        active_text.clear();
        *state = ExecutionState::Running;
        debug!(commands = commands.len(), "pipeline started");

        for (i, entry) in commands.iter().enumerate() {
            let index = i + 1;
            if let Err(e) = run_command(engine, variables, active_text, index, &entry.command) {
                *state = ExecutionState::Failed;
                warn!(index, line = %entry.source, error = %e, "pipeline failed");
                return Err(e.at_command(index, entry.source.as_str()));
            }
        }

        *state = ExecutionState::Completed;
        info!(commands = commands.len(), "pipeline completed");
        Ok(active_text.clone())
    }
}

/// Execute a single command against the pipeline state
fn run_command(
    engine: &Engine,
    variables: &mut VariableStore,
    active_text: &mut String,
    index: usize,
    command: &Command,
) -> Result<()> {
    let registry = engine.registry();
    let descriptor = registry.lookup_name(&command.filter)?;

    if !registry.check_capability(descriptor) {
        return Err(PipelineError::dependency_unavailable(
            descriptor.full_name(),
            descriptor.required_capability.clone().unwrap_or_default(),
        ));
    }

    let resolved = resolver::resolve(command, variables, descriptor.resolves_variables)?;

    match &descriptor.kind {
        FilterKind::Builtin(op) => {
            debug!(index, filter = %descriptor.full_name(), "running built-in");
            builtins::apply(
                *op,
                &resolved,
                BuiltinContext {
                    variables: &mut *variables,
                    active_text: &mut *active_text,
                    clock: engine.clock(),
                    now_format: engine.now_format(),
                },
            )?;
        }
        FilterKind::External(handler) => {
            debug!(index, filter = %descriptor.full_name(), "running filter");
            *active_text = handler(active_text, &resolved)?;
        }
    }

    // Tee: the active text keeps flowing to the next command
    if let Some(target) = &resolved.output {
        variables.set_safe(target.as_str(), active_text.as_str());
    }

    Ok(())
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("commands", &self.commands.len())
            .field("state", &self.state)
            .field("active_text", &self.active_text)
            .finish()
    }
}
