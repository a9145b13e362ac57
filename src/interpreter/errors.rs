//! Runtime Errors
//!
//! A single error type covers every semantic failure: undefined or
//! redeclared variables, assignment to immutables, type mismatches,
//! arity mismatches, bad indexing and division by zero. There is no
//! recovery and no user-visible exception facility; the first runtime
//! error terminates the run.

use std::fmt;
use thiserror::Error;

/// Error raised while evaluating the AST.
#[derive(Debug, Clone, Error)]
pub struct RuntimeError {
    pub message: String,
    /// Populated when the failing operation carries an operator token;
    /// the AST holds no spans elsewhere.
    pub line: Option<usize>,
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "[line {}] {}", line, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl RuntimeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            line: None,
        }
    }

    pub fn at_line(message: impl Into<String>, line: usize) -> Self {
        Self {
            message: message.into(),
            line: Some(line),
        }
    }
}
