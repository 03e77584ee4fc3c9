//! Built-in opcodes that operate on the variable store and active text

use crate::clock::Clock;
use crate::command::Command;
use crate::error::{PipelineError, Result};
use crate::parser::is_identifier;
use crate::registry::BuiltinOp;
use crate::variables::VariableStore;
use chrono::format::{Item, StrftimeItems};
use std::fmt::Write;
use tracing::trace;

/// Mutable state a built-in may touch
pub(crate) struct BuiltinContext<'a> {
    pub variables: &'a mut VariableStore,
    pub active_text: &'a mut String,
    pub clock: &'a dyn Clock,
    pub now_format: &'a str,
}

/// The variable name in the first positional argument
fn variable_arg<'c>(command: &'c Command, op: BuiltinOp) -> Result<&'c str> {
    let name = command.arg(0).ok_or_else(|| {
        PipelineError::invalid_argument(format!("{op:?}"), "a variable name is required")
    })?;
    check_variable_name(name, op)?;
    Ok(name)
}

fn check_variable_name(name: &str, op: BuiltinOp) -> Result<()> {
    if is_identifier(name) {
        Ok(())
    } else {
        Err(PipelineError::invalid_argument(
            format!("{op:?}"),
            format!("'{name}' is not a valid variable name"),
        ))
    }
}

fn format_now(clock: &dyn Clock, format: &str) -> Result<String> {
    let items: Vec<Item<'_>> = StrftimeItems::new(format).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return Err(PipelineError::invalid_argument(
            "Now",
            format!("invalid format string '{format}'"),
        ));
    }

    // Some specifiers parse but only fail once formatted
    let mut out = String::new();
    write!(out, "{}", clock.now().format_with_items(items.into_iter())).map_err(|_| {
        PipelineError::invalid_argument("Now", format!("cannot format the time with '{format}'"))
    })?;
    Ok(out)
}

/// Run one built-in against the pipeline state
pub(crate) fn apply(op: BuiltinOp, command: &Command, ctx: BuiltinContext<'_>) -> Result<()> {
    let BuiltinContext {
        variables,
        active_text,
        clock,
        now_format,
    } = ctx;

    match op {
        BuiltinOp::Clear => active_text.clear(),
        BuiltinOp::ReadFrom => {
            let name = variable_arg(command, op)?;
            *active_text = variables.get(name)?;
        }
        BuiltinOp::WriteTo => {
            let name = variable_arg(command, op)?;
            variables.set_safe(name, active_text.as_str());
        }
        BuiltinOp::SetVar => {
            let name = variable_arg(command, op)?;
            variables.set_safe(name, command.arg(1).unwrap_or_default());
        }
        BuiltinOp::InitVar => {
            if command.args.is_empty() {
                return Err(PipelineError::invalid_argument(
                    "InitVar",
                    "at least one variable name is required",
                ));
            }
            for name in &command.args {
                check_variable_name(name, op)?;
            }
            for name in &command.args {
                variables.set_safe(name.as_str(), "");
            }
        }
        BuiltinOp::AppendVar => {
            let name = variable_arg(command, op)?;
            let updated = match command.arg(1) {
                // An explicit value needs an initialized variable
                Some(value) => variables.get(name)? + value,
                // Appending the active text starts a fresh variable if needed
                None => {
                    let current = variables.get(name).unwrap_or_default();
                    current + active_text.as_str()
                }
            };
            trace!(variable = name, "appending to variable");
            variables.set_safe(name, updated);
        }
        BuiltinOp::Now => {
            let format = command.arg(0).unwrap_or(now_format);
            *active_text = format_now(clock, format)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::variables::GlobalVariables;
    use chrono::{Local, TimeZone};

    struct State {
        variables: VariableStore,
        text: String,
        clock: FixedClock,
    }

    impl State {
        fn new(text: &str) -> Self {
            let moment = Local.with_ymd_and_hms(2015, 2, 25, 15, 4, 0).unwrap();
            Self {
                variables: VariableStore::new(GlobalVariables::new()),
                text: text.to_string(),
                clock: FixedClock(moment),
            }
        }

        fn run(&mut self, op: BuiltinOp, command: Command) -> Result<()> {
            apply(
                op,
                &command,
                BuiltinContext {
                    variables: &mut self.variables,
                    active_text: &mut self.text,
                    clock: &self.clock,
                    now_format: crate::config::DEFAULT_NOW_FORMAT,
                },
            )
        }
    }

    #[test]
    fn test_clear() {
        let mut state = State::new("War and Peace");
        state.run(BuiltinOp::Clear, Command::new("Clear")).unwrap();
        assert_eq!(state.text, "");
    }

    #[test]
    fn test_write_then_read() {
        let mut state = State::new("James Bond");
        state
            .run(BuiltinOp::WriteTo, Command::new("WriteTo").with_arg("Name"))
            .unwrap();
        assert_eq!(state.text, "James Bond");

        state.text.clear();
        state
            .run(BuiltinOp::ReadFrom, Command::new("ReadFrom").with_arg("Name"))
            .unwrap();
        assert_eq!(state.text, "James Bond");
    }

    #[test]
    fn test_read_missing_variable() {
        let mut state = State::new("keep");
        let err = state
            .run(BuiltinOp::ReadFrom, Command::new("ReadFrom").with_arg("Nope"))
            .unwrap_err();
        assert_eq!(err.missing_variable_name(), Some("Nope"));
        assert_eq!(state.text, "keep");
    }

    #[test]
    fn test_set_var_without_value_is_empty() {
        let mut state = State::new("text");
        state
            .run(BuiltinOp::SetVar, Command::new("SetVar").with_arg("Name"))
            .unwrap();
        assert_eq!(state.variables.get("Name").unwrap(), "");
        assert_eq!(state.text, "text");
    }

    #[test]
    fn test_init_var_many() {
        let mut state = State::new("");
        let cmd = Command::new("InitVar").with_arg("A").with_arg("B").with_arg("C");
        state.run(BuiltinOp::InitVar, cmd).unwrap();
        for name in ["A", "B", "C"] {
            assert_eq!(state.variables.get(name).unwrap(), "");
        }
    }

    #[test]
    fn test_init_var_rejects_bad_name_before_writing() {
        let mut state = State::new("");
        let cmd = Command::new("InitVar").with_arg("A").with_arg("not-valid");
        assert!(state.run(BuiltinOp::InitVar, cmd).unwrap_err().is_invalid_argument());
        assert!(state.variables.get("A").is_err());
    }

    #[test]
    fn test_missing_variable_name_is_invalid_argument() {
        for op in [
            BuiltinOp::ReadFrom,
            BuiltinOp::WriteTo,
            BuiltinOp::SetVar,
            BuiltinOp::InitVar,
            BuiltinOp::AppendVar,
        ] {
            let mut state = State::new("");
            let err = state.run(op, Command::new(format!("{op:?}"))).unwrap_err();
            assert!(err.is_invalid_argument(), "{op:?}");
        }
    }

    #[test]
    fn test_append_value_requires_existing_variable() {
        let mut state = State::new("");
        let cmd = Command::new("AppendVar").with_arg("Name").with_arg(" Bond");
        let err = state.run(BuiltinOp::AppendVar, cmd.clone()).unwrap_err();
        assert!(err.is_missing_variable());

        state.variables.set_safe("Name", "James");
        state.run(BuiltinOp::AppendVar, cmd).unwrap();
        assert_eq!(state.variables.get("Name").unwrap(), "James Bond");
    }

    #[test]
    fn test_append_active_text() {
        let mut state = State::new("X");
        let cmd = Command::new("AppendVar").with_arg("Log");
        state.run(BuiltinOp::AppendVar, cmd.clone()).unwrap();
        state.run(BuiltinOp::AppendVar, cmd).unwrap();
        assert_eq!(state.variables.get("Log").unwrap(), "XX");
        assert_eq!(state.text, "X");
    }

    #[test]
    fn test_now_formats() {
        let mut state = State::new("old");
        state.run(BuiltinOp::Now, Command::new("Now")).unwrap();
        assert_eq!(state.text, "Wednesday, February 25, 2015 3:04 PM");

        state
            .run(BuiltinOp::Now, Command::new("Now").with_arg("%a %-d %b"))
            .unwrap();
        assert_eq!(state.text, "Wed 25 Feb");
    }

    #[test]
    fn test_now_rejects_format_that_fails_when_rendered() {
        let mut state = State::new("old");
        let err = state
            .run(BuiltinOp::Now, Command::new("Now").with_arg("%#z"))
            .unwrap_err();
        assert!(err.is_invalid_argument());
        assert_eq!(state.text, "old");
    }

    #[test]
    fn test_now_rejects_bad_format() {
        let mut state = State::new("old");
        let err = state
            .run(BuiltinOp::Now, Command::new("Now").with_arg("%Q"))
            .unwrap_err();
        assert!(err.is_invalid_argument());
        assert_eq!(state.text, "old");
    }
}
