//! Native Functions
//!
//! Host-provided callables seeded into the global environment along
//! with the `nil`/`true`/`false` constants: printing, type inspection,
//! in-place array mutation and the value conversions.

use crate::interpreter::context::EvalContext;
use crate::interpreter::environment::EnvRef;
use crate::interpreter::errors::RuntimeError;
use crate::interpreter::values::{is_truthy, NativeFn, NativeFunction, Value};

const NATIVE_FUNCTIONS: &[(&str, NativeFn)] = &[
    ("echo", native_echo),
    ("typeof", native_typeof),
    ("push", native_push),
    ("pop", native_pop),
    ("shift", native_shift),
    ("unshift", native_unshift),
    ("string", native_string),
    ("int", native_int),
    ("float", native_float),
    ("bool", native_bool),
];

/// Seed the built-in constants and native functions. All of them are
/// immutable bindings.
pub fn declare_native_bindings(env: &EnvRef) {
    let mut scope = env.borrow_mut();

    scope.define_builtin("nil", Value::Nil);
    scope.define_builtin("true", Value::Boolean(true));
    scope.define_builtin("false", Value::Boolean(false));

    for &(name, call) in NATIVE_FUNCTIONS {
        scope.define_builtin(name, Value::NativeFunction(NativeFunction { name, call }));
    }
}

/// Print the arguments separated by spaces, then a newline.
fn native_echo(args: &[Value], ctx: &mut EvalContext) -> Result<Value, RuntimeError> {
    let rendered: Vec<String> = args.iter().map(|arg| arg.to_string()).collect();
    writeln!(ctx.out, "{}", rendered.join(" "))
        .map_err(|e| RuntimeError::new(format!("echo: failed to write output: {}", e)))?;

    Ok(Value::Nil)
}

fn native_typeof(args: &[Value], _ctx: &mut EvalContext) -> Result<Value, RuntimeError> {
    if args.len() != 1 {
        return Err(RuntimeError::new(format!(
            "typeof() expects 1 argument but got {} instead...",
            args.len()
        )));
    }

    Ok(Value::Str(args[0].type_name().to_string()))
}

fn native_push(args: &[Value], _ctx: &mut EvalContext) -> Result<Value, RuntimeError> {
    if args.len() < 2 {
        return Err(RuntimeError::new(
            "push() expects at least 2 arguments (array, value)",
        ));
    }

    let array = match &args[0] {
        Value::Array(array) => array,
        other => {
            return Err(RuntimeError::new(format!(
                "push() expects an array as first argument, got '{}'",
                other.type_name()
            )))
        }
    };

    array.borrow_mut().extend(args[1..].iter().cloned());

    Ok(Value::Nil)
}

fn native_pop(args: &[Value], _ctx: &mut EvalContext) -> Result<Value, RuntimeError> {
    if args.len() != 1 {
        return Err(RuntimeError::new("pop() expects exactly 1 argument (array)"));
    }

    let array = match &args[0] {
        Value::Array(array) => array,
        other => {
            return Err(RuntimeError::new(format!(
                "pop() expects an array, got '{}'",
                other.type_name()
            )))
        }
    };

    match array.borrow_mut().pop() {
        Some(value) => Ok(value),
        None => Err(RuntimeError::new("pop() called on empty array")),
    }
}

fn native_shift(args: &[Value], _ctx: &mut EvalContext) -> Result<Value, RuntimeError> {
    if args.len() != 1 {
        return Err(RuntimeError::new(
            "shift() expects exactly 1 argument (array)",
        ));
    }

    let array = match &args[0] {
        Value::Array(array) => array,
        other => {
            return Err(RuntimeError::new(format!(
                "shift() expects an array, got '{}'",
                other.type_name()
            )))
        }
    };

    let mut elements = array.borrow_mut();
    if elements.is_empty() {
        return Err(RuntimeError::new("shift() called on empty array"));
    }

    Ok(elements.remove(0))
}

fn native_unshift(args: &[Value], _ctx: &mut EvalContext) -> Result<Value, RuntimeError> {
    if args.len() < 2 {
        return Err(RuntimeError::new(
            "unshift() expects at least 2 arguments (array, value)",
        ));
    }

    let array = match &args[0] {
        Value::Array(array) => array,
        other => {
            return Err(RuntimeError::new(format!(
                "unshift() expects an array as first argument, got '{}'",
                other.type_name()
            )))
        }
    };

    // Prepended values keep their argument order.
    let mut elements = array.borrow_mut();
    for (offset, value) in args[1..].iter().enumerate() {
        elements.insert(offset, value.clone());
    }

    Ok(Value::Nil)
}

/// Convert to string. Unlike `echo`, a string argument converts to its
/// bare content with no surrounding quotes.
fn native_string(args: &[Value], _ctx: &mut EvalContext) -> Result<Value, RuntimeError> {
    if args.len() != 1 {
        return Err(RuntimeError::new("string() expects exactly 1 argument"));
    }

    let rendered = match &args[0] {
        Value::Str(s) => s.clone(),
        other => other.to_string(),
    };

    Ok(Value::Str(rendered))
}

fn native_int(args: &[Value], _ctx: &mut EvalContext) -> Result<Value, RuntimeError> {
    if args.len() != 1 {
        return Err(RuntimeError::new("int() expects exactly 1 argument"));
    }

    match &args[0] {
        Value::Number(n) => Ok(Value::Number(n.trunc())),
        Value::Str(s) => match s.parse::<f64>() {
            Ok(parsed) => Ok(Value::Number(parsed.trunc())),
            Err(_) => Err(RuntimeError::new(format!(
                "Cannot convert string '{}' to int",
                s
            ))),
        },
        Value::Boolean(b) => Ok(Value::Number(if *b { 1.0 } else { 0.0 })),
        other => Err(RuntimeError::new(format!(
            "Cannot convert type '{}' to int",
            other.type_name()
        ))),
    }
}

fn native_float(args: &[Value], _ctx: &mut EvalContext) -> Result<Value, RuntimeError> {
    if args.len() != 1 {
        return Err(RuntimeError::new("float() expects exactly 1 argument"));
    }

    match &args[0] {
        Value::Number(n) => Ok(Value::Number(*n)),
        Value::Str(s) => match s.parse::<f64>() {
            Ok(parsed) => Ok(Value::Number(parsed)),
            Err(_) => Err(RuntimeError::new(format!(
                "Cannot convert string '{}' to float",
                s
            ))),
        },
        Value::Boolean(b) => Ok(Value::Number(if *b { 1.0 } else { 0.0 })),
        other => Err(RuntimeError::new(format!(
            "Cannot convert type '{}' to float",
            other.type_name()
        ))),
    }
}

fn native_bool(args: &[Value], _ctx: &mut EvalContext) -> Result<Value, RuntimeError> {
    if args.len() != 1 {
        return Err(RuntimeError::new("bool() expects exactly 1 argument"));
    }

    Ok(Value::Boolean(is_truthy(&args[0])))
}

// ============================================================================
// Tests
// ============================================================================
