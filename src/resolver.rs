//! `$variable` expansion inside command arguments

use crate::command::Command;
use crate::error::Result;
use crate::variables::VariableStore;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use tracing::trace;

// `$$` is an escaped dollar; `$name` is a reference.
static VAR_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$\$|\$([A-Za-z_][A-Za-z0-9_]*)").expect("Invalid regex pattern")
});

/// Expand every `$name` in a single value, in one pass
///
/// Substituted values are not scanned again, so a variable holding `$other`
/// is inserted literally.
pub fn expand_string(value: &str, store: &VariableStore) -> Result<String> {
    if !value.contains('$') {
        return Ok(value.to_string());
    }

    let mut result = String::with_capacity(value.len());
    let mut last_end = 0;

    for cap in VAR_REGEX.captures_iter(value) {
        let Some(full) = cap.get(0) else { continue };
        result.push_str(&value[last_end..full.start()]);
        match cap.get(1) {
            Some(name) => {
                let resolved = store.get(name.as_str())?;
                trace!(variable = name.as_str(), "expanded variable reference");
                result.push_str(&resolved);
            }
            None => result.push('$'),
        }
        last_end = full.end();
    }
    result.push_str(&value[last_end..]);

    Ok(result)
}

/// Return a copy of `command` with variable references expanded
///
/// When `resolves_variables` is false the arguments pass through untouched;
/// filters whose arguments are themselves variable names rely on this.
pub fn resolve(command: &Command, store: &VariableStore, resolves_variables: bool) -> Result<Command> {
    if !resolves_variables {
        return Ok(command.clone());
    }

    let args = command
        .args
        .iter()
        .map(|arg| expand_string(arg, store))
        .collect::<Result<Vec<_>>>()?;

    let named: HashMap<String, String> = command
        .named
        .iter()
        .map(|(key, value)| expand_string(value, store).map(|expanded| (key.clone(), expanded)))
        .collect::<Result<_>>()?;

    Ok(Command {
        filter: command.filter.clone(),
        args,
        named,
        output: command.output.clone(),
    })
}
