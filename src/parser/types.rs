//! Parser Types
//!
//! Binding powers, handler signatures and the parse error type shared
//! across parser modules.

use std::fmt;
use thiserror::Error;

use crate::ast::types::{Expr, Stmt};
use crate::parser::parser::Parser;

/// Operator binding power, ascending. The Pratt main loop keeps
/// consuming infix operators while their binding power is strictly
/// greater than the caller's.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum BindingPower {
    Default,
    Comma,
    Assignment,
    Logical,
    Relational,
    Additive,
    Multiplicative,
    Unary,
    Postfix,
    Call,
    Member,
    Primary,
}

/// Parses a token in prefix position.
pub type NudHandler = fn(&mut Parser) -> Result<Expr, ParseException>;

/// Parses a token in infix/postfix position, given the already-parsed
/// left operand and the operator's binding power.
pub type LedHandler = fn(&mut Parser, Expr, BindingPower) -> Result<Expr, ParseException>;

/// Parses a statement dispatched on its leading keyword.
pub type StatementHandler = fn(&mut Parser) -> Result<Stmt, ParseException>;

/// Error raised when the parser encounters invalid syntax. There is no
/// recovery; the first error aborts the parse.
#[derive(Debug, Clone, Error)]
pub struct ParseException {
    pub message: String,
    pub line: usize,
}

impl fmt::Display for ParseException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Parse error at line {}: {}", self.line, self.message)
    }
}

impl ParseException {
    pub fn new(message: impl Into<String>, line: usize) -> Self {
        Self {
            message: message.into(),
            line,
        }
    }
}
