//! Source positions and syntax errors shared by every language front-end.

use serde::Serialize;
use thiserror::Error;

/// Position of a token or node in the source text (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        SourceLocation { line, column }
    }
}

/// A malformed program. Produced by a lexer or parser; never by execution.
///
/// `message` follows the `Kind: key: value` shape learners see in the
/// editor, e.g. `MissingEndAfterBlock: type: if`.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[error("Syntax error at line {}, column {}: {message}", location.line, location.column)]
pub struct SyntaxError {
    pub message: String,
    pub location: SourceLocation,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, location: SourceLocation) -> Self {
        SyntaxError {
            message: message.into(),
            location,
        }
    }

    /// The error kind, i.e. the message up to the first `:`.
    pub fn kind(&self) -> &str {
        self.message
            .split_once(':')
            .map(|(kind, _)| kind)
            .unwrap_or(&self.message)
    }
}

/// Return the trimmed text of a 1-based source line, used as a frame's code.
/// Line 0 marks a synthetic node and has no text.
pub fn line_text(source: &str, line: usize) -> String {
    if line == 0 {
        return String::new();
    }
    source
        .lines()
        .nth(line.saturating_sub(1))
        .map(|text| text.trim().to_string())
        .unwrap_or_default()
}
