//! Mutex Runtime Facade
//!
//! Ties the pipeline together: scan → parse → evaluate against a
//! per-instance global environment. Every error is reported to the
//! caller's diagnostic sink and the first one aborts the run. The REPL
//! keeps one `Mutex` instance alive so top-level bindings persist
//! across lines; batch execution creates a fresh instance per run.

use std::io::{self, Write};

use tracing::debug;

use crate::ast::types::Stmt;
use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::interpreter::context::EvalContext;
use crate::interpreter::environment::{EnvRef, Environment};
use crate::interpreter::statements::eval_stmt;
use crate::interpreter::values::Value;
use crate::parser::lexer::Scanner;
use crate::parser::parser::parse;

/// The Mutex interpreter with its global environment.
pub struct Mutex {
    globals: EnvRef,
}

impl Default for Mutex {
    fn default() -> Self {
        Self::new()
    }
}

impl Mutex {
    /// Create an interpreter with a freshly seeded global environment.
    pub fn new() -> Self {
        Self {
            globals: Environment::global(),
        }
    }

    /// Run a source text. Program output (`echo`) goes to `out`; every
    /// diagnostic is reported to `sink` and the first one is returned.
    /// On success the result is the value of the last top-level
    /// statement.
    pub fn run(
        &mut self,
        source: &str,
        out: &mut dyn Write,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<Value, Diagnostic> {
        let tokens = Scanner::new(source).scan_tokens(sink)?;
        debug!(tokens = tokens.len(), "scan complete");

        let ast = match parse(tokens) {
            Ok(ast) => ast,
            Err(e) => {
                let diagnostic = Diagnostic::parse(e.line, e.message);
                sink.report(diagnostic.clone());
                return Err(diagnostic);
            }
        };

        // Top-level statements run directly against the global scope so
        // declarations persist across REPL lines.
        let body = match ast {
            Stmt::Block { body } => body,
            other => vec![other],
        };
        debug!(statements = body.len(), "parse complete");

        let mut ctx = EvalContext::new(out);
        let mut last = Value::Nil;

        for statement in &body {
            match eval_stmt(statement, &self.globals, &mut ctx) {
                Ok(flow) => last = flow.into_value(),
                Err(e) => {
                    let diagnostic = Diagnostic::runtime(e.line, e.message);
                    sink.report(diagnostic.clone());
                    return Err(diagnostic);
                }
            }
        }

        debug!("evaluation complete");
        Ok(last)
    }

    /// Run with program output going to stdout.
    pub fn run_to_stdout(
        &mut self,
        source: &str,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<Value, Diagnostic> {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        self.run(source, &mut out, sink)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{CollectingSink, Phase, EXIT_SOURCE_ERROR};

    fn run_capture(source: &str) -> (Result<Value, Diagnostic>, String) {
        let mut mutex = Mutex::new();
        let mut sink = CollectingSink::new();
        let mut out = Vec::new();
        let result = mutex.run(source, &mut out, &mut sink);
        (result, String::from_utf8(out).expect("output should be utf-8"))
    }

    fn run_output(source: &str) -> String {
        let (result, output) = run_capture(source);
        result.expect("program should run cleanly");
        output
    }

    fn run_error(source: &str) -> Diagnostic {
        let (result, _) = run_capture(source);
        result.expect_err("program should fail")
    }

    // ------------------------------------------------------------------
    // End-to-end scenarios
    // ------------------------------------------------------------------

    #[test]
    fn test_scenario_precedence() {
        assert_eq!(run_output("var imm x = 1 + 2 * 3; echo(x);"), "7\n");
    }

    #[test]
    fn test_scenario_array_push() {
        assert_eq!(
            run_output("var mut a = [1,2,3]; push(a, 4); echo(a[3]);"),
            "4\n"
        );
    }

    #[test]
    fn test_scenario_closure_counter() {
        let source = "
            fn make(n) {
                fn inc() {
                    n += 1;
                    return n;
                }
                return inc;
            }
            var imm f = make(10);
            echo(f());
            echo(f());
        ";
        assert_eq!(run_output(source), "11\n12\n");
    }

    #[test]
    fn test_scenario_while_increment() {
        assert_eq!(run_output("var mut i = 0; while i < 3 { i++; } echo(i);"), "3\n");
    }

    #[test]
    fn test_scenario_for_loop() {
        assert_eq!(
            run_output("for (var mut i = 0; i < 5; i += 1) { echo(i); }"),
            "0\n1\n2\n3\n4\n"
        );
    }

    #[test]
    fn test_scenario_immutable_reassignment() {
        let diagnostic = run_error("var imm k = 1; k = 2;");
        assert_eq!(diagnostic.phase, Phase::Runtime);
        assert_eq!(diagnostic.exit_code, EXIT_SOURCE_ERROR);
        assert_eq!(
            diagnostic.message,
            "Cannot re-assign constant variable \"k\""
        );
    }

    // ------------------------------------------------------------------
    // Invariants
    // ------------------------------------------------------------------

    #[test]
    fn test_short_circuit_and_skips_rhs() {
        let source = "
            var mut calls = 0;
            fn bump() { calls += 1; return true; }
            var imm r = false and bump();
            echo(r);
            echo(calls);
        ";
        assert_eq!(run_output(source), "false\n0\n");
    }

    #[test]
    fn test_short_circuit_or_skips_rhs() {
        let source = "
            var mut calls = 0;
            fn bump() { calls += 1; return true; }
            var imm r = true or bump();
            echo(r);
            echo(calls);
        ";
        assert_eq!(run_output(source), "true\n0\n");
    }

    #[test]
    fn test_logical_operators_coerce_to_boolean() {
        assert_eq!(run_output("echo(1 and 2);"), "true\n");
        assert_eq!(run_output("echo(0 or \"\");"), "false\n");
    }

    #[test]
    fn test_immutable_postfix_increment_fails_and_leaves_value() {
        let (result, _) = run_capture("var imm x = 1; x++;");
        let diagnostic = result.expect_err("x++ on an immutable should fail");
        assert_eq!(
            diagnostic.message,
            "Cannot re-assign constant variable \"x\""
        );

        // A fresh run confirms the read works and the error happens on
        // the write, after the old value was read.
        assert_eq!(run_output("var mut y = 1; echo(y++); echo(y);"), "1\n2\n");
    }

    #[test]
    fn test_immutable_compound_assignment_fails() {
        let diagnostic = run_error("var imm x = 1; x += 1;");
        assert_eq!(
            diagnostic.message,
            "Cannot re-assign constant variable \"x\""
        );
    }

    #[test]
    fn test_array_aliasing() {
        let source = "
            var imm a = [1];
            var imm b = a;
            push(a, 2);
            b[0] = 9;
            echo(b[1]);
            echo(a[0]);
        ";
        assert_eq!(run_output(source), "2\n9\n");
    }

    #[test]
    fn test_closures_share_their_scope() {
        let source = "
            fn make() {
                var mut n = 0;
                fn up() { n += 1; return n; }
                fn read() { return n; }
                return [up, read];
            }
            var imm pair = make();
            var imm up = pair[0];
            var imm read = pair[1];
            up();
            up();
            echo(read());
        ";
        assert_eq!(run_output(source), "2\n");
    }

    #[test]
    fn test_return_propagates_through_nesting() {
        let source = "
            fn find() {
                for (var mut i = 0; i < 10; i += 1) {
                    if i == 3 {
                        while true {
                            return i;
                        }
                    }
                }
                return -1;
            }
            echo(find());
        ";
        assert_eq!(run_output(source), "3\n");
    }

    #[test]
    fn test_function_without_return_yields_nil() {
        assert_eq!(run_output("fn noop() { 1 + 1; } echo(noop());"), "nil\n");
    }

    #[test]
    fn test_bare_return_yields_nil() {
        assert_eq!(run_output("fn f() { return; } echo(f());"), "nil\n");
    }

    #[test]
    fn test_block_scope_shadowing() {
        let source = "
            var mut x = 1;
            if true {
                var mut x = 2;
                echo(x);
            }
            echo(x);
        ";
        assert_eq!(run_output(source), "2\n1\n");
    }

    #[test]
    fn test_for_initializer_is_scoped_to_the_loop() {
        let diagnostic = run_error("for (var mut i = 0; i < 1; i += 1) { } echo(i);");
        assert_eq!(
            diagnostic.message,
            "Cannot resolve variable \"i\" as it does not exist in the current/outer scopes"
        );
    }

    #[test]
    fn test_assignment_reaches_enclosing_scope() {
        let source = "
            var mut x = 1;
            if true { x = 5; }
            echo(x);
        ";
        assert_eq!(run_output(source), "5\n");
    }

    // ------------------------------------------------------------------
    // Expression semantics
    // ------------------------------------------------------------------

    #[test]
    fn test_string_concatenation_and_equality() {
        assert_eq!(run_output("echo(\"foo\" + \"bar\");"), "\"foobar\"\n");
        assert_eq!(run_output("echo(\"a\" == \"a\");"), "true\n");
        assert_eq!(run_output("echo(\"a\" != \"b\");"), "true\n");
    }

    #[test]
    fn test_mixed_type_equality_is_an_error() {
        let diagnostic = run_error("echo(1 == \"1\");");
        assert_eq!(
            diagnostic.message,
            "Cannot perform operation == on incompatible types"
        );
    }

    #[test]
    fn test_string_ordering_is_an_error() {
        let diagnostic = run_error("echo(\"a\" < \"b\");");
        assert_eq!(diagnostic.message, "Unsupported string operator: <");
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(run_error("echo(1 / 0);").message, "Division by zero");
        assert_eq!(run_error("echo(1 % 0);").message, "Modulo by zero");
    }

    #[test]
    fn test_modulo_follows_fmod() {
        assert_eq!(run_output("echo(7 % 3);"), "1\n");
        assert_eq!(run_output("echo(-7 % 3);"), "-1\n");
        assert_eq!(run_output("echo(7.5 % 2);"), "1.5\n");
    }

    #[test]
    fn test_unary_minus_requires_number() {
        assert_eq!(
            run_error("echo(-\"x\");").message,
            "Unary minus requires numeric operand"
        );
    }

    #[test]
    fn test_not_uses_truthiness() {
        assert_eq!(run_output("echo(not 0); echo(not \"x\"); echo(not nil);"), "true\nfalse\ntrue\n");
    }

    #[test]
    fn test_index_out_of_bounds() {
        assert_eq!(
            run_error("var imm a = [1, 2]; echo(a[2]);").message,
            "Array index 2 out of bounds (array length: 2)"
        );
        assert_eq!(
            run_error("var imm a = [1, 2]; echo(a[-1]);").message,
            "Array index -1 out of bounds (array length: 2)"
        );
    }

    #[test]
    fn test_index_truncates_fractional_indices() {
        assert_eq!(run_output("var imm a = [10, 20]; echo(a[1.9]);"), "20\n");
    }

    #[test]
    fn test_index_requires_array_and_number() {
        assert_eq!(
            run_error("echo(1[0]);").message,
            "Cannot index into type 'number', expected array"
        );
        assert_eq!(
            run_error("var imm a = [1]; echo(a[\"0\"]);").message,
            "Array index must be a number, got 'string'"
        );
    }

    #[test]
    fn test_index_assignment_evaluates_to_nil() {
        assert_eq!(
            run_output("var imm a = [1]; echo(a[0] = 5); echo(a[0]);"),
            "nil\n5\n"
        );
    }

    #[test]
    fn test_compound_index_assignment() {
        assert_eq!(
            run_output("var imm a = [10]; a[0] += 5; echo(a[0]);"),
            "15\n"
        );
    }

    #[test]
    fn test_arity_mismatch() {
        assert_eq!(
            run_error("fn f(a, b) { return a; } f(1);").message,
            "Function 'f' expects 2 arguments but got 1"
        );
    }

    #[test]
    fn test_calling_a_non_function() {
        assert_eq!(
            run_error("var imm x = 1; x();").message,
            "Cannot call non-function value of type 'number'"
        );
    }

    #[test]
    fn test_undefined_variable() {
        assert_eq!(
            run_error("echo(missing);").message,
            "Cannot resolve variable \"missing\" as it does not exist in the current/outer scopes"
        );
    }

    #[test]
    fn test_redeclaration_in_same_scope() {
        assert_eq!(
            run_error("var mut x = 1; var mut x = 2;").message,
            "Cannot declare variable \"x\" as it is already defined"
        );
    }

    #[test]
    fn test_function_name_is_immutable() {
        assert_eq!(
            run_error("fn f() { } f = 1;").message,
            "Cannot re-assign constant variable \"f\""
        );
    }

    #[test]
    fn test_typeof_builtin() {
        let source = "
            echo(typeof(nil));
            echo(typeof(true));
            echo(typeof(1));
            echo(typeof(\"s\"));
            echo(typeof([]));
            fn f() { }
            echo(typeof(f));
            echo(typeof(echo));
        ";
        assert_eq!(
            run_output(source),
            "\"nil\"\n\"boolean\"\n\"number\"\n\"string\"\n\"array\"\n\"function\"\n\"native_function\"\n"
        );
    }

    #[test]
    fn test_conversions_end_to_end() {
        assert_eq!(run_output("echo(int(\"42\") + 1);"), "43\n");
        assert_eq!(run_output("echo(float(\"2.5\") * 2);"), "5\n");
        assert_eq!(run_output("echo(string(7) + \"!\");"), "\"7!\"\n");
        assert_eq!(run_output("echo(bool(\"\"));"), "false\n");
    }

    #[test]
    fn test_multiline_string() {
        assert_eq!(run_output("echo(`a\nb`);"), "\"a\nb\"\n");
    }

    #[test]
    fn test_echo_formats_values() {
        assert_eq!(
            run_output("echo(1, \"two\", nil, true, [1, \"x\"]);"),
            "1 \"two\" nil true [1, \"x\"]\n"
        );
    }

    // ------------------------------------------------------------------
    // Pipeline behavior
    // ------------------------------------------------------------------

    #[test]
    fn test_run_returns_last_statement_value() {
        let (result, _) = run_capture("1 + 2; 3 * 4;");
        assert!(matches!(result, Ok(Value::Number(n)) if n == 12.0));
    }

    #[test]
    fn test_empty_program_yields_nil() {
        let (result, _) = run_capture("");
        assert!(matches!(result, Ok(Value::Nil)));
    }

    #[test]
    fn test_scan_errors_accumulate_before_aborting() {
        let mut mutex = Mutex::new();
        let mut sink = CollectingSink::new();
        let mut out = Vec::new();
        let result = mutex.run("@ #", &mut out, &mut sink);

        let diagnostic = result.expect_err("scan should fail");
        assert_eq!(diagnostic.phase, Phase::Scan);
        assert_eq!(sink.diagnostics.len(), 2);
    }

    #[test]
    fn test_parse_error_phase_and_exit_code() {
        let diagnostic = run_error("var mut = 1;");
        assert_eq!(diagnostic.phase, Phase::Parse);
        assert_eq!(diagnostic.exit_code, EXIT_SOURCE_ERROR);
    }

    #[test]
    fn test_no_output_after_runtime_error() {
        let (result, output) = run_capture("echo(1); echo(2 / 0); echo(3);");
        assert!(result.is_err());
        assert_eq!(output, "1\n");
    }

    #[test]
    fn test_state_persists_across_runs() {
        let mut mutex = Mutex::new();
        let mut sink = CollectingSink::new();
        let mut out = Vec::new();

        mutex
            .run("var mut x = 1;", &mut out, &mut sink)
            .expect("declaration should succeed");
        mutex
            .run("x += 41; echo(x);", &mut out, &mut sink)
            .expect("second line should succeed");

        assert_eq!(String::from_utf8(out).expect("utf-8"), "42\n");
    }

    #[test]
    fn test_fresh_instances_do_not_share_state() {
        let (result, _) = run_capture("var mut x = 1;");
        result.expect("declaration should succeed");
        let (result, _) = run_capture("echo(x);");
        assert!(result.is_err());
    }
}
