//! Core category: pipeline and variable operations
//!
//! Every filter here except the diagnostic one is a built-in opcode; the
//! registry only holds their metadata and the executor does the work.

use crate::registry::{BuiltinOp, FilterDescriptor};

const CATEGORY: &str = "Core";

pub fn descriptors() -> Vec<FilterDescriptor> {
    vec![
        FilterDescriptor::builtin(CATEGORY, "Clear", BuiltinOp::Clear)
            .description("Empties the active text.")
            .sample("(any text)", "Clear", ""),
        FilterDescriptor::builtin(CATEGORY, "ReadFrom", BuiltinOp::ReadFrom)
            .description("Replaces the active text with the value of a variable.")
            .argument(1, "Variable Name", true, "Variable to read.")
            .sample("", "SetVar Name \"James Bond\"\nReadFrom Name", "James Bond")
            .no_variable_resolution(),
        FilterDescriptor::builtin(CATEGORY, "WriteTo", BuiltinOp::WriteTo)
            .description("Stores the active text in a variable. The active text is unchanged.")
            .argument(1, "Variable Name", true, "Variable to write.")
            .sample("James Bond", "WriteTo Name", "James Bond")
            .no_variable_resolution(),
        FilterDescriptor::builtin(CATEGORY, "SetVar", BuiltinOp::SetVar)
            .description("Sets a variable to the given value. The active text is unchanged.")
            .argument(1, "Variable Name", true, "Variable to set.")
            .argument(2, "Value", false, "New value; an empty string when omitted.")
            .sample("", "SetVar Name \"James Bond\"\nReadFrom Name", "James Bond")
            .no_variable_resolution(),
        FilterDescriptor::builtin(CATEGORY, "InitVar", BuiltinOp::InitVar)
            .description("Initializes one or more variables to empty strings.")
            .argument(1, "Variable Name", true, "Variables to initialize; more may follow.")
            .sample("", "InitVar Name Address City", "")
            .no_variable_resolution(),
        FilterDescriptor::builtin(CATEGORY, "AppendVar", BuiltinOp::AppendVar)
            .description("Appends a value, or the active text when no value is given, to a variable.")
            .argument(1, "Variable Name", true, "Variable to append to.")
            .argument(2, "Value", false, "Text to append; defaults to the active text.")
            .sample("", "SetVar Name James\nAppendVar Name \" Bond\"\nReadFrom Name", "James Bond"),
        FilterDescriptor::builtin(CATEGORY, "Now", BuiltinOp::Now)
            .description("Replaces the active text with the current local date and time.")
            .argument(1, "Format", false, "strftime format string.")
            .sample("", "Now \"%a %-d %b\"", "Wed 25 Feb"),
    ]
}

/// Diagnostic filters, registered only when enabled in configuration
pub fn test_descriptors() -> Vec<FilterDescriptor> {
    vec![FilterDescriptor::external(CATEGORY, "FakeTest", |text, _| {
        Ok(text.to_string())
    })
    .description("Passes text through; depends on a capability that is never provided.")
    .requires("SomeFakeClass")]
}
