/// Error code registry for textpipe
///
/// Error codes are organized by category:
/// - 1000-1999: Script parsing errors
/// - 2000-2999: Filter lookup and availability errors
/// - 3000-3999: Variable errors
/// - 4000-4999: Argument errors
/// - 5000-5999: Filter execution errors
/// - 9000-9999: Other errors
pub struct ErrorCode;

impl ErrorCode {
    // Parsing errors (1000-1999)
    pub const PARSE_EMPTY_LINE: u16 = 1001;
    pub const PARSE_UNTERMINATED_QUOTE: u16 = 1002;
    pub const PARSE_BAD_REDIRECT: u16 = 1003;
    pub const PARSE_BAD_FILTER_NAME: u16 = 1004;
    pub const PARSE_LINE_BREAK: u16 = 1005;

    // Filter errors (2000-2999)
    pub const FILTER_UNKNOWN: u16 = 2001;
    pub const FILTER_DEPENDENCY_UNAVAILABLE: u16 = 2002;

    // Variable errors (3000-3999)
    pub const VARIABLE_MISSING: u16 = 3001;

    // Argument errors (4000-4999)
    pub const ARGUMENT_INVALID: u16 = 4001;

    // Filter execution errors (5000-5999)
    pub const FILTER_FAILED: u16 = 5001;
    pub const FILTER_IO: u16 = 5002;
}

/// Returns a short human-readable description for an error code
pub fn describe_error_code(code: u16) -> &'static str {
    match code {
        ErrorCode::PARSE_EMPTY_LINE => "Script line contains no command",
        ErrorCode::PARSE_UNTERMINATED_QUOTE => "Quoted value is missing its closing quote",
        ErrorCode::PARSE_BAD_REDIRECT => "Output redirection must be `=> $name` at end of line",
        ErrorCode::PARSE_BAD_FILTER_NAME => "Filter name is not a valid identifier",
        ErrorCode::PARSE_LINE_BREAK => "A single command cannot span several lines",
        ErrorCode::FILTER_UNKNOWN => "No filter is registered under that name",
        ErrorCode::FILTER_DEPENDENCY_UNAVAILABLE => "Filter requires a capability this runtime lacks",
        ErrorCode::VARIABLE_MISSING => "Variable was read before it was initialized",
        ErrorCode::ARGUMENT_INVALID => "Required argument missing or malformed",
        ErrorCode::FILTER_FAILED => "Filter reported a failure",
        ErrorCode::FILTER_IO => "Filter failed while performing I/O",
        _ => "Unknown error",
    }
}
