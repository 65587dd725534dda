//! Diagnostic types for every stage of the pipeline.
//!
//! Each stage has its own error value whose `Display` output is the exact
//! user-facing diagnostic line. Library code only collects these; printing
//! is the driver's job.

use thiserror::Error;

use crate::lexer::token::Token;

/// A lexical diagnostic. The lexer records these and keeps going.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Error at line {line}, column {column}: {message}")]
pub struct LexError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl LexError {
    pub fn new(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            column,
            message: message.into(),
        }
    }
}

/// A syntax diagnostic, attributed to a token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Parse error at line {line}, column {column}: {message}")]
pub struct ParseError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl ParseError {
    pub fn new(message: impl Into<String>, token: &Token) -> Self {
        Self {
            line: token.line,
            column: token.column,
            message: message.into(),
        }
    }
}

/// A semantic diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Error: {message}")]
pub struct SemanticError {
    pub message: String,
}

impl SemanticError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Aggregate error for a whole compilation: the front-end stage that failed,
/// with every diagnostic it collected. `Display` renders one diagnostic per
/// line, ready for stderr.
#[derive(Debug, Clone, Error)]
pub enum HelioError {
    #[error("{}", join_lines(.0))]
    Parse(Vec<ParseError>),
    #[error("{}", join_lines(.0))]
    Semantic(Vec<SemanticError>),
}

fn join_lines<T: std::fmt::Display>(errors: &[T]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}
