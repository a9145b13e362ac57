//! Evaluation Context
//!
//! Capabilities the evaluator threads through every call: currently the
//! output stream `echo` writes to. Keeping it out of the environment
//! lets the facade capture program output (tests, REPL) without any
//! global state.

use std::io::Write;

/// Context passed to evaluation functions and native callables.
pub struct EvalContext<'a> {
    pub out: &'a mut dyn Write,
}

impl<'a> EvalContext<'a> {
    pub fn new(out: &'a mut dyn Write) -> Self {
        Self { out }
    }
}
