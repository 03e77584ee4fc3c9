//! Script line parser
//!
//! Grammar, one command per line:
//!
//! ```text
//! FilterName (-key:value | value)* (=> $outVar)?
//! ```
//!
//! Values are bare tokens or double-quoted strings (which may contain
//! whitespace and the escapes `\"` and `\\`). A token may mix bare and quoted
//! parts, e.g. `-template:"Value: {.}"`. Filter existence is not checked here;
//! that happens at dispatch time.

use crate::command::{fold_key, Command};
use crate::error::{ErrorCode, PipelineError, Result};
use once_cell::sync::Lazy;
use regex::Regex;

static IDENT_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("Invalid regex pattern"));

static FILTER_NAME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)*$")
        .expect("Invalid regex pattern")
});

const REDIRECT: &str = "=>";

/// One whitespace-delimited token after quote processing
#[derive(Debug, Clone, PartialEq)]
struct Token {
    text: String,
    /// Byte length of the leading part of `text` that was not inside quotes
    bare_prefix: usize,
    quoted: bool,
}

impl Token {
    fn is_bare(&self) -> bool {
        !self.quoted
    }
}

/// Split a line into tokens, honoring double quotes
fn tokenize(line: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = line.chars().peekable();

    loop {
        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        if chars.peek().is_none() {
            break;
        }

        let mut text = String::new();
        let mut bare_prefix = None;
        let mut quoted = false;

        while let Some(&c) = chars.peek() {
            if c.is_whitespace() {
                break;
            }
            chars.next();
            if c != '"' {
                text.push(c);
                continue;
            }

            quoted = true;
            bare_prefix.get_or_insert(text.len());
            let mut closed = false;
            while let Some(q) = chars.next() {
                match q {
                    '"' => {
                        closed = true;
                        break;
                    }
                    '\\' => match chars.peek() {
                        Some(&next @ ('"' | '\\')) => {
                            chars.next();
                            text.push(next);
                        }
                        _ => text.push('\\'),
                    },
                    other => text.push(other),
                }
            }
            if !closed {
                return Err(PipelineError::parse_with_code(
                    ErrorCode::PARSE_UNTERMINATED_QUOTE,
                    line,
                    "unterminated quoted value",
                ));
            }
        }

        let bare_prefix = bare_prefix.unwrap_or(text.len());
        tokens.push(Token {
            text,
            bare_prefix,
            quoted,
        });
    }

    Ok(tokens)
}

/// Returns true for names usable as variables (`[A-Za-z_][A-Za-z0-9_]*`)
pub fn is_identifier(name: &str) -> bool {
    IDENT_REGEX.is_match(name)
}

/// Try to read a token as `-key:value`; the key must be outside any quotes
fn as_named_arg(token: &Token) -> Option<(String, String)> {
    let bare = &token.text[..token.bare_prefix];
    let rest = bare.strip_prefix('-')?;
    let colon = rest.find(':')?;
    if colon == 0 {
        return None;
    }
    let key = &rest[..colon];
    let value = &token.text[1 + colon + 1..];
    Some((key.to_string(), value.to_string()))
}

fn parse_redirect_target(line: &str, token: &Token) -> Result<String> {
    let bad = |message: &str| {
        PipelineError::parse_with_code(ErrorCode::PARSE_BAD_REDIRECT, line, message.to_string())
    };

    if !token.is_bare() {
        return Err(bad("redirection target must not be quoted"));
    }
    let name = token
        .text
        .strip_prefix('$')
        .ok_or_else(|| bad("redirection target must be written as $name"))?;
    if !is_identifier(name) {
        return Err(bad("redirection target is not a valid variable name"));
    }
    Ok(name.to_string())
}

/// Parse one script line into a structured [`Command`]
pub fn parse_command(line: &str) -> Result<Command> {
    if line.contains(['\n', '\r']) {
        return Err(PipelineError::parse_with_code(
            ErrorCode::PARSE_LINE_BREAK,
            line,
            "a command must fit on one line",
        ));
    }

    let tokens = tokenize(line)?;
    let mut tokens = tokens.into_iter();

    let head = tokens.next().ok_or_else(|| {
        PipelineError::parse_with_code(ErrorCode::PARSE_EMPTY_LINE, line, "empty command")
    })?;
    if !head.is_bare() || !FILTER_NAME_REGEX.is_match(&head.text) {
        return Err(PipelineError::parse_with_code(
            ErrorCode::PARSE_BAD_FILTER_NAME,
            line,
            format!("'{}' is not a valid filter name", head.text),
        ));
    }

    let mut cmd = Command::new(head.text);
    let rest: Vec<Token> = tokens.collect();
    let mut i = 0;

    while i < rest.len() {
        let token = &rest[i];

        if token.is_bare() && token.text.starts_with(REDIRECT) {
            let target = if token.text.len() > REDIRECT.len() {
                // `=>$name` written without a space
                let attached = Token {
                    text: token.text[REDIRECT.len()..].to_string(),
                    bare_prefix: token.text.len() - REDIRECT.len(),
                    quoted: false,
                };
                i += 1;
                parse_redirect_target(line, &attached)?
            } else {
                let next = rest.get(i + 1).ok_or_else(|| {
                    PipelineError::parse_with_code(
                        ErrorCode::PARSE_BAD_REDIRECT,
                        line,
                        "missing variable after =>",
                    )
                })?;
                i += 2;
                parse_redirect_target(line, next)?
            };

            if i < rest.len() {
                return Err(PipelineError::parse_with_code(
                    ErrorCode::PARSE_BAD_REDIRECT,
                    line,
                    "output redirection must end the line",
                ));
            }
            cmd.output = Some(target);
            break;
        }

        match as_named_arg(token) {
            Some((key, value)) => {
                // Keys are case-insensitive; a repeated key keeps the last value
                cmd.named.insert(fold_key(&key), value);
            }
            None => cmd.args.push(token.text.clone()),
        }
        i += 1;
    }

    Ok(cmd)
}

/// Lines skipped by script loading: blank lines and `#` comments
pub fn is_ignorable_line(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.is_empty() || trimmed.starts_with('#')
}
