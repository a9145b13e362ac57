//! Diagnostics
//!
//! Every lexical, syntactic and runtime failure is funneled through a
//! `Diagnostic` carrying the phase, the source line when known, a
//! human-readable message and the process exit code the surrounding
//! collaborator should use. Consumers implement `DiagnosticSink`;
//! the crate ships a collecting sink for tests and a printing sink for
//! the CLI.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Exit code for command line misuse.
pub const EXIT_USAGE: i32 = 64;
/// Exit code for any source-level error (lexical, parse or runtime).
pub const EXIT_SOURCE_ERROR: i32 = 65;

/// Pipeline stage a diagnostic originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Scan,
    Parse,
    Runtime,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scan => "scan",
            Self::Parse => "parse",
            Self::Runtime => "runtime",
        }
    }
}

/// A reported error with enough context to print and to exit with.
#[derive(Debug, Clone, Error, Serialize)]
pub struct Diagnostic {
    pub phase: Phase,
    pub line: Option<usize>,
    pub message: String,
    pub exit_code: i32,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(
                f,
                "[line {}] Error ({}): {}",
                line,
                self.phase.as_str(),
                self.message
            ),
            None => write!(f, "Error ({}): {}", self.phase.as_str(), self.message),
        }
    }
}

impl Diagnostic {
    pub fn scan(line: usize, message: impl Into<String>) -> Self {
        Self {
            phase: Phase::Scan,
            line: Some(line),
            message: message.into(),
            exit_code: EXIT_SOURCE_ERROR,
        }
    }

    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self {
            phase: Phase::Parse,
            line: Some(line),
            message: message.into(),
            exit_code: EXIT_SOURCE_ERROR,
        }
    }

    pub fn runtime(line: Option<usize>, message: impl Into<String>) -> Self {
        Self {
            phase: Phase::Runtime,
            line,
            message: message.into(),
            exit_code: EXIT_SOURCE_ERROR,
        }
    }
}

/// Consumer of reported diagnostics.
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

/// Sink that accumulates diagnostics in memory.
#[derive(Debug, Default)]
pub struct CollectingSink {
    pub diagnostics: Vec<Diagnostic>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

impl DiagnosticSink for CollectingSink {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }
}

/// Sink that prints each diagnostic to stderr as it arrives.
#[derive(Debug, Default)]
pub struct PrintingSink;

impl DiagnosticSink for PrintingSink {
    fn report(&mut self, diagnostic: Diagnostic) {
        eprintln!("{}", diagnostic);
    }
}

// ============================================================================
// Tests
// ============================================================================
