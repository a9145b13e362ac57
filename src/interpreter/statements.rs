//! Statement Evaluation
//!
//! `eval_stmt` dispatches over the statement variants and returns a
//! `Flow`: either the statement's ordinary value or a `Return` marker
//! travelling up from a `return` statement. Blocks, conditionals and
//! loops pass the marker through untouched; only function calls unwrap
//! it, so a `return` exits the nearest enclosing function regardless of
//! nesting depth.

use std::rc::Rc;

use crate::ast::types::Stmt;
use crate::interpreter::context::EvalContext;
use crate::interpreter::environment::{EnvRef, Environment};
use crate::interpreter::errors::RuntimeError;
use crate::interpreter::expressions::eval_expr;
use crate::interpreter::values::{is_truthy, Function, Value};

/// Result of evaluating a statement.
#[derive(Debug)]
pub enum Flow {
    /// Ordinary completion with the statement's value.
    Value(Value),
    /// A `return` bubbling up to the nearest function call.
    Return(Value),
}

impl Flow {
    /// The carried value, ignoring whether this was a return.
    pub fn into_value(self) -> Value {
        match self {
            Flow::Value(value) | Flow::Return(value) => value,
        }
    }
}

pub fn eval_stmt(stmt: &Stmt, env: &EnvRef, ctx: &mut EvalContext) -> Result<Flow, RuntimeError> {
    match stmt {
        Stmt::Block { body } => eval_block_statement(body, env, ctx),
        Stmt::Expression { expression } => Ok(Flow::Value(eval_expr(expression, env, ctx)?)),
        Stmt::VarDecl {
            is_mutable,
            name,
            value,
        } => eval_variable_declaration(*is_mutable, name, value.as_ref(), env, ctx),
        Stmt::If {
            condition,
            consequent,
            alternate,
        } => eval_if_statement(condition, consequent, alternate.as_deref(), env, ctx),
        Stmt::While { condition, body } => eval_while_statement(condition, body, env, ctx),
        Stmt::For {
            initializer,
            condition,
            increment,
            body,
        } => eval_for_statement(initializer, condition, increment, body, env, ctx),
        Stmt::FunctionDecl {
            name,
            parameters,
            body,
        } => eval_function_declaration(name, parameters, body, env),
        Stmt::Return { value } => {
            let value = match value {
                Some(expr) => eval_expr(expr, env, ctx)?,
                None => Value::Nil,
            };
            Ok(Flow::Return(value))
        }
    }
}

/// A block runs in a fresh child scope. Its value is the last
/// statement's value, or nil when empty.
fn eval_block_statement(
    body: &[Stmt],
    env: &EnvRef,
    ctx: &mut EvalContext,
) -> Result<Flow, RuntimeError> {
    let block_env = Environment::child(env);
    let mut last = Value::Nil;

    for statement in body {
        match eval_stmt(statement, &block_env, ctx)? {
            Flow::Return(value) => return Ok(Flow::Return(value)),
            Flow::Value(value) => last = value,
        }
    }

    Ok(Flow::Value(last))
}

fn eval_variable_declaration(
    is_mutable: bool,
    name: &str,
    value: Option<&crate::ast::types::Expr>,
    env: &EnvRef,
    ctx: &mut EvalContext,
) -> Result<Flow, RuntimeError> {
    let value = match value {
        Some(expr) => eval_expr(expr, env, ctx)?,
        None => Value::Nil,
    };

    env.borrow_mut().declare(name, value, !is_mutable)?;

    Ok(Flow::Value(Value::Nil))
}

fn eval_if_statement(
    condition: &crate::ast::types::Expr,
    consequent: &Stmt,
    alternate: Option<&Stmt>,
    env: &EnvRef,
    ctx: &mut EvalContext,
) -> Result<Flow, RuntimeError> {
    let condition = eval_expr(condition, env, ctx)?;

    if is_truthy(&condition) {
        eval_stmt(consequent, env, ctx)
    } else if let Some(alternate) = alternate {
        eval_stmt(alternate, env, ctx)
    } else {
        Ok(Flow::Value(Value::Nil))
    }
}

fn eval_while_statement(
    condition: &crate::ast::types::Expr,
    body: &Stmt,
    env: &EnvRef,
    ctx: &mut EvalContext,
) -> Result<Flow, RuntimeError> {
    loop {
        let value = eval_expr(condition, env, ctx)?;
        if !is_truthy(&value) {
            break;
        }

        if let Flow::Return(value) = eval_stmt(body, env, ctx)? {
            return Ok(Flow::Return(value));
        }
    }

    Ok(Flow::Value(Value::Nil))
}

/// The whole `for` runs inside a dedicated loop scope so the
/// initializer's binding is not visible after the loop.
fn eval_for_statement(
    initializer: &Stmt,
    condition: &crate::ast::types::Expr,
    increment: &crate::ast::types::Expr,
    body: &Stmt,
    env: &EnvRef,
    ctx: &mut EvalContext,
) -> Result<Flow, RuntimeError> {
    let loop_env = Environment::child(env);

    if let Flow::Return(value) = eval_stmt(initializer, &loop_env, ctx)? {
        return Ok(Flow::Return(value));
    }

    loop {
        let value = eval_expr(condition, &loop_env, ctx)?;
        if !is_truthy(&value) {
            break;
        }

        if let Flow::Return(value) = eval_stmt(body, &loop_env, ctx)? {
            return Ok(Flow::Return(value));
        }

        eval_expr(increment, &loop_env, ctx)?;
    }

    Ok(Flow::Value(Value::Nil))
}

/// A function declaration closes over the environment it is declared
/// in and binds its name immutably in that same environment.
fn eval_function_declaration(
    name: &str,
    parameters: &[String],
    body: &Stmt,
    env: &EnvRef,
) -> Result<Flow, RuntimeError> {
    let function = Value::Function(Rc::new(Function {
        name: name.to_string(),
        parameters: parameters.to_vec(),
        body: body.clone(),
        closure: Rc::clone(env),
    }));

    env.borrow_mut().declare(name, function, true)?;

    Ok(Flow::Value(Value::Nil))
}
