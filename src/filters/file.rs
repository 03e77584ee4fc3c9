//! File category: reading and writing files, optionally confined to a sandbox

use crate::command::Command;
use crate::config::SANDBOX_VARIABLE;
use crate::error::{PipelineError, Result};
use crate::registry::capability::FILESYSTEM;
use crate::registry::FilterDescriptor;
use crate::variables::GlobalVariables;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

const CATEGORY: &str = "File";

/// Resolve `requested` against the sandbox root, rejecting escapes
fn confine(filter: &str, root: Option<&Path>, requested: &str) -> Result<PathBuf> {
    let path = Path::new(requested);
    let Some(root) = root else {
        return Ok(path.to_path_buf());
    };

    let escapes = path.components().any(|c| {
        matches!(
            c,
            Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    });
    if escapes {
        return Err(PipelineError::filter(
            filter,
            format!("path '{requested}' is outside the sandbox"),
        ));
    }
    Ok(root.join(path))
}

fn target_path(command: &Command) -> Result<&str> {
    command
        .named_arg("file")
        .or_else(|| command.arg(0))
        .filter(|p| !p.is_empty())
        .ok_or_else(|| PipelineError::invalid_argument(&command.filter, "missing -file"))
}

fn read(root: Option<&Path>, command: &Command) -> Result<String> {
    let path = confine(&command.filter, root, target_path(command)?)?;
    debug!(path = %path.display(), "reading file");
    std::fs::read_to_string(&path).map_err(|e| {
        PipelineError::filter_io(
            &command.filter,
            format!("cannot read {}", path.display()),
            e,
        )
    })
}

fn write(root: Option<&Path>, text: &str, command: &Command) -> Result<String> {
    let path = confine(&command.filter, root, target_path(command)?)?;
    debug!(path = %path.display(), bytes = text.len(), "writing file");
    std::fs::write(&path, text).map_err(|e| {
        PipelineError::filter_io(
            &command.filter,
            format!("cannot write {}", path.display()),
            e,
        )
    })?;
    Ok(text.to_string())
}

/// Sandbox root currently published in the global tier, if any
fn sandbox_root(globals: &GlobalVariables) -> Option<PathBuf> {
    globals
        .get(SANDBOX_VARIABLE)
        .filter(|root| !root.is_empty())
        .map(PathBuf::from)
}

/// File filters; paths are confined to the `__sandbox_root` global when set
///
/// The root is read on every call, so setting the global variable after the
/// registry is built still takes effect.
pub fn descriptors(globals: GlobalVariables) -> Vec<FilterDescriptor> {
    let read_globals = globals.clone();
    let write_globals = globals;

    vec![
        FilterDescriptor::external(CATEGORY, "Read", move |_, command| {
            read(sandbox_root(&read_globals).as_deref(), command)
        })
        .description("Replaces the active text with the contents of a file.")
        .argument(1, "File", true, "Path to read (or -file:).")
        .sample("", "File.Read -file:data.xml", "(contents of data.xml)")
        .requires(FILESYSTEM),
        FilterDescriptor::external(CATEGORY, "Write", move |text, command| {
            write(sandbox_root(&write_globals).as_deref(), text, command)
        })
        .description("Writes the active text to a file. The active text is unchanged.")
        .argument(1, "File", true, "Path to write (or -file:).")
        .sample("James Bond", "File.Write -file:name.txt", "James Bond")
        .requires(FILESYSTEM),
    ]
}
