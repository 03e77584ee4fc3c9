use thiserror::Error;

pub mod codes;

pub use codes::{describe_error_code, ErrorCode};

/// The unified error type for parsing and running pipelines
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("[E{code:04}] Parse error: {message} (in `{line}`)")]
    Parse {
        code: u16,
        line: String,
        message: String,
    },

    #[error("[E{code:04}] Unknown filter: {name}")]
    UnknownFilter { code: u16, name: String },

    #[error("[E{code:04}] Variable '{name}' has not been initialized")]
    MissingVariable { code: u16, name: String },

    #[error("[E{code:04}] Invalid argument for {filter}: {message}")]
    InvalidArgument {
        code: u16,
        filter: String,
        message: String,
    },

    #[error("[E{code:04}] Filter {filter} requires unavailable capability '{capability}'")]
    DependencyUnavailable {
        code: u16,
        filter: String,
        capability: String,
    },

    #[error("[E{code:04}] Filter {filter} failed: {message}")]
    Filter {
        code: u16,
        filter: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Command {index} (`{line}`) failed: {source}")]
    Command {
        index: usize,
        line: String,
        #[source]
        source: Box<PipelineError>,
    },
}

impl PipelineError {
    /// Create a parse error with a specific code
    pub fn parse_with_code(code: u16, line: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            code,
            line: line.into(),
            message: message.into(),
        }
    }

    pub fn unknown_filter(name: impl Into<String>) -> Self {
        Self::UnknownFilter {
            code: ErrorCode::FILTER_UNKNOWN,
            name: name.into(),
        }
    }

    pub fn missing_variable(name: impl Into<String>) -> Self {
        Self::MissingVariable {
            code: ErrorCode::VARIABLE_MISSING,
            name: name.into(),
        }
    }

    pub fn invalid_argument(filter: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            code: ErrorCode::ARGUMENT_INVALID,
            filter: filter.into(),
            message: message.into(),
        }
    }

    pub fn dependency_unavailable(filter: impl Into<String>, capability: impl Into<String>) -> Self {
        Self::DependencyUnavailable {
            code: ErrorCode::FILTER_DEPENDENCY_UNAVAILABLE,
            filter: filter.into(),
            capability: capability.into(),
        }
    }

    /// Create a failure reported by an external filter handler
    pub fn filter(filter: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Filter {
            code: ErrorCode::FILTER_FAILED,
            filter: filter.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Create an I/O failure reported by an external filter handler
    pub fn filter_io(filter: impl Into<String>, message: impl Into<String>, err: std::io::Error) -> Self {
        Self::Filter {
            code: ErrorCode::FILTER_IO,
            filter: filter.into(),
            message: message.into(),
            source: Some(Box::new(err)),
        }
    }

    /// Attach the location of the failing command
    pub fn at_command(self, index: usize, line: impl Into<String>) -> Self {
        Self::Command {
            index,
            line: line.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error, skipping command location wrappers
    pub fn root(&self) -> &PipelineError {
        match self {
            Self::Command { source, .. } => source.root(),
            other => other,
        }
    }

    /// 1-based index of the command that failed, if known
    pub fn command_index(&self) -> Option<usize> {
        match self {
            Self::Command { index, .. } => Some(*index),
            _ => None,
        }
    }

    /// Literal source line of the command that failed, if known
    pub fn command_line(&self) -> Option<&str> {
        match self {
            Self::Command { line, .. } => Some(line),
            _ => None,
        }
    }

    /// Get the error code
    pub fn code(&self) -> u16 {
        match self {
            Self::Parse { code, .. }
            | Self::UnknownFilter { code, .. }
            | Self::MissingVariable { code, .. }
            | Self::InvalidArgument { code, .. }
            | Self::DependencyUnavailable { code, .. }
            | Self::Filter { code, .. } => *code,
            Self::Command { source, .. } => source.code(),
        }
    }

    pub fn is_parse(&self) -> bool {
        matches!(self.root(), Self::Parse { .. })
    }

    pub fn is_unknown_filter(&self) -> bool {
        matches!(self.root(), Self::UnknownFilter { .. })
    }

    pub fn is_missing_variable(&self) -> bool {
        matches!(self.root(), Self::MissingVariable { .. })
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self.root(), Self::InvalidArgument { .. })
    }

    pub fn is_dependency_unavailable(&self) -> bool {
        matches!(self.root(), Self::DependencyUnavailable { .. })
    }

    /// Name of the missing variable, when this is a missing-variable error
    pub fn missing_variable_name(&self) -> Option<&str> {
        match self.root() {
            Self::MissingVariable { name, .. } => Some(name),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_includes_code() {
        let err = PipelineError::missing_variable("Name");
        assert_eq!(
            err.to_string(),
            "[E3001] Variable 'Name' has not been initialized"
        );
    }

    #[test]
    fn test_command_wrapper_exposes_location() {
        let err = PipelineError::unknown_filter("Frobnicate").at_command(2, "Frobnicate foo");

        assert_eq!(err.command_index(), Some(2));
        assert_eq!(err.command_line(), Some("Frobnicate foo"));
        assert!(err.is_unknown_filter());
        assert_eq!(err.code(), ErrorCode::FILTER_UNKNOWN);
        assert!(err.to_string().starts_with("Command 2 (`Frobnicate foo`) failed"));
    }

    #[test]
    fn test_root_unwraps_nested_wrappers() {
        let err = PipelineError::missing_variable("X")
            .at_command(1, "ReadFrom X")
            .at_command(4, "outer");
        assert_eq!(err.missing_variable_name(), Some("X"));
        assert_eq!(err.command_index(), Some(4));
    }

    #[test]
    fn test_filter_io_keeps_source() {
        use std::error::Error as _;

        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = PipelineError::filter_io("File.Read", "cannot read data.xml", io);
        assert_eq!(err.code(), ErrorCode::FILTER_IO);
        assert!(err.source().is_some());
    }
}
