//! mutex-lang - The Mutex scripting language
//!
//! This library provides the complete front-end (scanner + Pratt
//! parser) and tree-walking evaluator for Mutex: a small dynamically
//! typed language with first-class functions, closures, mutable arrays
//! and compound assignment.

pub mod ast;
pub mod diagnostics;
pub mod interpreter;
pub mod mutex;
pub mod parser;

pub use ast::types::{Expr, Stmt};
pub use diagnostics::{
    CollectingSink, Diagnostic, DiagnosticSink, Phase, PrintingSink, EXIT_SOURCE_ERROR, EXIT_USAGE,
};
pub use interpreter::environment::{EnvRef, Environment};
pub use interpreter::errors::RuntimeError;
pub use interpreter::values::Value;
pub use mutex::Mutex;
pub use parser::{parse, ParseException, Scanner, Token, TokenType};
