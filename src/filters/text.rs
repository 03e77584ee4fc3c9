//! Text category: simple string transforms

use crate::command::Command;
use crate::error::{PipelineError, Result};
use crate::registry::FilterDescriptor;

const CATEGORY: &str = "Text";

fn required_arg<'a>(command: &'a Command, index: usize, what: &str) -> Result<&'a str> {
    command
        .arg(index)
        .ok_or_else(|| PipelineError::invalid_argument(&command.filter, format!("missing {what}")))
}

fn append(text: &str, command: &Command) -> Result<String> {
    let suffix = required_arg(command, 0, "text to append")?;
    Ok(format!("{text}{suffix}"))
}

fn prepend(text: &str, command: &Command) -> Result<String> {
    let prefix = required_arg(command, 0, "text to prepend")?;
    Ok(format!("{prefix}{text}"))
}

fn replace(text: &str, command: &Command) -> Result<String> {
    let find = command
        .named_arg("find")
        .or_else(|| command.arg(0))
        .ok_or_else(|| PipelineError::invalid_argument(&command.filter, "missing -find"))?;
    if find.is_empty() {
        return Err(PipelineError::invalid_argument(
            &command.filter,
            "-find must not be empty",
        ));
    }
    let replacement = command
        .named_arg("replace")
        .or_else(|| command.arg(1))
        .unwrap_or("");
    Ok(text.replace(find, replacement))
}

pub fn descriptors() -> Vec<FilterDescriptor> {
    vec![
        FilterDescriptor::external(CATEGORY, "Upper", |text, _| Ok(text.to_uppercase()))
            .description("Converts the active text to upper case.")
            .sample("James Bond", "Text.Upper", "JAMES BOND"),
        FilterDescriptor::external(CATEGORY, "Lower", |text, _| Ok(text.to_lowercase()))
            .description("Converts the active text to lower case.")
            .sample("James Bond", "Text.Lower", "james bond"),
        FilterDescriptor::external(CATEGORY, "Trim", |text, _| Ok(text.trim().to_string()))
            .description("Removes leading and trailing whitespace.")
            .sample("  James  ", "Text.Trim", "James"),
        FilterDescriptor::external(CATEGORY, "Length", |text, _| {
            Ok(text.chars().count().to_string())
        })
        .description("Replaces the active text with its length in characters.")
        .sample("James", "Text.Length", "5"),
        FilterDescriptor::external(CATEGORY, "Append", append)
            .description("Adds text to the end of the active text.")
            .argument(1, "Text", true, "Text to add.")
            .sample("James", "Text.Append \" Bond\"", "James Bond"),
        FilterDescriptor::external(CATEGORY, "Prepend", prepend)
            .description("Adds text to the start of the active text.")
            .argument(1, "Text", true, "Text to add.")
            .sample("Bond", "Text.Prepend \"James \"", "James Bond"),
        FilterDescriptor::external(CATEGORY, "Replace", replace)
            .description("Replaces every occurrence of one string with another.")
            .argument(1, "Find", true, "Text to search for (or -find:).")
            .argument(2, "Replace", false, "Replacement (or -replace:); empty when omitted.")
            .sample("James Bond", "Text.Replace -find:James -replace:Jimmy", "Jimmy Bond"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_command;

    fn run(filter: &str, text: &str, line: &str) -> Result<String> {
        let descriptor = descriptors()
            .into_iter()
            .find(|d| d.name == filter)
            .expect("filter exists");
        let command = parse_command(line)?;
        match descriptor.kind {
            crate::registry::FilterKind::External(handler) => handler(text, &command),
            crate::registry::FilterKind::Builtin(_) => unreachable!(),
        }
    }

    #[test]
    fn test_case_and_trim() {
        assert_eq!(run("Upper", "abc", "Text.Upper").unwrap(), "ABC");
        assert_eq!(run("Lower", "ABC", "Text.Lower").unwrap(), "abc");
        assert_eq!(run("Trim", " x ", "Text.Trim").unwrap(), "x");
        assert_eq!(run("Length", "héllo", "Text.Length").unwrap(), "5");
    }

    #[test]
    fn test_append_and_prepend() {
        assert_eq!(
            run("Append", "James", "Text.Append \" Bond\"").unwrap(),
            "James Bond"
        );
        assert_eq!(
            run("Prepend", "Bond", "Text.Prepend \"James \"").unwrap(),
            "James Bond"
        );
        assert!(run("Append", "x", "Text.Append")
            .unwrap_err()
            .is_invalid_argument());
    }

    #[test]
    fn test_replace_named_and_positional() {
        assert_eq!(
            run("Replace", "a-b-c", "Text.Replace -find:- -replace:+").unwrap(),
            "a+b+c"
        );
        assert_eq!(run("Replace", "a-b-c", "Text.Replace b").unwrap(), "a--c");
        assert!(run("Replace", "abc", "Text.Replace -find:")
            .unwrap_err()
            .is_invalid_argument());
    }
}
