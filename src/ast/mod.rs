//! Abstract Syntax Tree (AST) Types for Mutex
//!
//! This module defines the AST structure produced by the parser.
//!
//! Architecture:
//!   Source → Scanner → Parser → AST → Interpreter → Value

pub mod types;
