//! Expression Evaluation
//!
//! `eval_expr` dispatches over the expression variants. Logical
//! operators short-circuit and always coerce to a boolean; every other
//! binary operator requires both operands to be strings or both to be
//! numbers. Array indexing truncates the numeric index and bounds
//! checks it.

use crate::ast::types::Expr;
use crate::interpreter::context::EvalContext;
use crate::interpreter::environment::{EnvRef, Environment};
use crate::interpreter::errors::RuntimeError;
use crate::interpreter::statements::{eval_stmt, Flow};
use crate::interpreter::values::{is_truthy, Value};
use crate::parser::lexer::{Token, TokenType};

pub fn eval_expr(expr: &Expr, env: &EnvRef, ctx: &mut EvalContext) -> Result<Value, RuntimeError> {
    match expr {
        Expr::Number(value) => Ok(Value::Number(*value)),
        Expr::Str(value) => Ok(Value::Str(value.clone())),
        Expr::Symbol(name) => Environment::lookup(env, name),
        Expr::Binary {
            left,
            right,
            operator,
        } => eval_binary_expression(left, right, operator, env, ctx),
        Expr::Unary { operator, operand } => eval_unary_expression(operator, operand, env, ctx),
        Expr::Postfix { operator, operand } => {
            eval_postfix_expression(operator, operand, env, ctx)
        }
        Expr::Assignment {
            assignee,
            new_value,
        } => eval_assignment_expression(assignee, new_value, env, ctx),
        Expr::Array { elements } => eval_array_expression(elements, env, ctx),
        Expr::Index { object, index } => eval_index_expression(object, index, env, ctx),
        Expr::IndexAssign {
            object,
            index,
            new_value,
        } => eval_index_assignment_expression(object, index, new_value, env, ctx),
        Expr::Call { callee, arguments } => eval_call_expression(callee, arguments, env, ctx),
    }
}

fn eval_binary_expression(
    left: &Expr,
    right: &Expr,
    operator: &Token,
    env: &EnvRef,
    ctx: &mut EvalContext,
) -> Result<Value, RuntimeError> {
    // Logical operators short-circuit and always yield a boolean.
    if operator.token_type == TokenType::And {
        let lhs = eval_expr(left, env, ctx)?;
        if !is_truthy(&lhs) {
            return Ok(Value::Boolean(false));
        }
        let rhs = eval_expr(right, env, ctx)?;
        return Ok(Value::Boolean(is_truthy(&rhs)));
    }

    if operator.token_type == TokenType::Or {
        let lhs = eval_expr(left, env, ctx)?;
        if is_truthy(&lhs) {
            return Ok(Value::Boolean(true));
        }
        let rhs = eval_expr(right, env, ctx)?;
        return Ok(Value::Boolean(is_truthy(&rhs)));
    }

    let lhs = eval_expr(left, env, ctx)?;
    let rhs = eval_expr(right, env, ctx)?;

    match (&lhs, &rhs) {
        (Value::Str(l), Value::Str(r)) => eval_string_binary(l, r, operator),
        (Value::Number(l), Value::Number(r)) => eval_numeric_binary(*l, *r, operator),
        _ => Err(RuntimeError::at_line(
            format!(
                "Cannot perform operation {} on incompatible types",
                operator.lexeme
            ),
            operator.line,
        )),
    }
}

fn eval_string_binary(lhs: &str, rhs: &str, operator: &Token) -> Result<Value, RuntimeError> {
    match operator.token_type {
        TokenType::Plus => Ok(Value::Str(format!("{}{}", lhs, rhs))),
        TokenType::EqualTo => Ok(Value::Boolean(lhs == rhs)),
        TokenType::NotEqual => Ok(Value::Boolean(lhs != rhs)),
        _ => Err(RuntimeError::at_line(
            format!("Unsupported string operator: {}", operator.lexeme),
            operator.line,
        )),
    }
}

fn eval_numeric_binary(lhs: f64, rhs: f64, operator: &Token) -> Result<Value, RuntimeError> {
    match operator.token_type {
        TokenType::Plus => Ok(Value::Number(lhs + rhs)),
        TokenType::Minus => Ok(Value::Number(lhs - rhs)),
        TokenType::Star => Ok(Value::Number(lhs * rhs)),
        TokenType::Slash => {
            if rhs == 0.0 {
                return Err(RuntimeError::at_line("Division by zero", operator.line));
            }
            Ok(Value::Number(lhs / rhs))
        }
        TokenType::Modulo => {
            if rhs == 0.0 {
                return Err(RuntimeError::at_line("Modulo by zero", operator.line));
            }
            // f64's remainder matches C fmod: the result takes the
            // dividend's sign.
            Ok(Value::Number(lhs % rhs))
        }
        TokenType::Less => Ok(Value::Boolean(lhs < rhs)),
        TokenType::LessEqual => Ok(Value::Boolean(lhs <= rhs)),
        TokenType::Greater => Ok(Value::Boolean(lhs > rhs)),
        TokenType::GreaterEqual => Ok(Value::Boolean(lhs >= rhs)),
        TokenType::EqualTo => Ok(Value::Boolean(lhs == rhs)),
        TokenType::NotEqual => Ok(Value::Boolean(lhs != rhs)),
        _ => Err(RuntimeError::at_line(
            format!("Unsupported binary operator: {}", operator.lexeme),
            operator.line,
        )),
    }
}

fn eval_unary_expression(
    operator: &Token,
    operand: &Expr,
    env: &EnvRef,
    ctx: &mut EvalContext,
) -> Result<Value, RuntimeError> {
    let value = eval_expr(operand, env, ctx)?;

    match operator.token_type {
        TokenType::Not => Ok(Value::Boolean(!is_truthy(&value))),
        TokenType::Minus => match value {
            Value::Number(n) => Ok(Value::Number(-n)),
            _ => Err(RuntimeError::at_line(
                "Unary minus requires numeric operand",
                operator.line,
            )),
        },
        _ => Err(RuntimeError::at_line(
            format!("Unknown unary operator: {}", operator.lexeme),
            operator.line,
        )),
    }
}

/// Postfix `++`/`--`: read the binding, write back the stepped value,
/// yield the original (post-increment semantics).
fn eval_postfix_expression(
    operator: &Token,
    operand: &Expr,
    env: &EnvRef,
    _ctx: &mut EvalContext,
) -> Result<Value, RuntimeError> {
    let name = match operand {
        Expr::Symbol(name) => name,
        _ => {
            return Err(RuntimeError::at_line(
                "Postfix operators can only be applied to variables",
                operator.line,
            ))
        }
    };

    let current = Environment::lookup(env, name)?;
    let number = match current {
        Value::Number(n) => n,
        _ => {
            return Err(RuntimeError::at_line(
                format!("Postfix operator {} requires numeric operand", operator.lexeme),
                operator.line,
            ))
        }
    };

    let stepped = match operator.token_type {
        TokenType::PlusPlus => number + 1.0,
        TokenType::MinusMinus => number - 1.0,
        _ => {
            return Err(RuntimeError::at_line(
                format!("Unknown postfix operator: {}", operator.lexeme),
                operator.line,
            ))
        }
    };

    Environment::assign(env, name, Value::Number(stepped))?;

    Ok(Value::Number(number))
}

fn eval_assignment_expression(
    assignee: &Expr,
    new_value: &Expr,
    env: &EnvRef,
    ctx: &mut EvalContext,
) -> Result<Value, RuntimeError> {
    match assignee {
        Expr::Symbol(name) => {
            let value = eval_expr(new_value, env, ctx)?;
            Environment::assign(env, name, value)?;
            Ok(Value::Nil)
        }
        _ => Err(RuntimeError::new("Invalid assignment target")),
    }
}

fn eval_array_expression(
    elements: &[Expr],
    env: &EnvRef,
    ctx: &mut EvalContext,
) -> Result<Value, RuntimeError> {
    let mut values = Vec::with_capacity(elements.len());
    for element in elements {
        values.push(eval_expr(element, env, ctx)?);
    }
    Ok(Value::array(values))
}

/// Resolve an (object, index) pair to the backing array and a bounds
/// checked element position.
fn resolve_index(
    object: Value,
    index: Value,
) -> Result<(crate::interpreter::values::ArrayRef, usize), RuntimeError> {
    let array = match object {
        Value::Array(array) => array,
        other => {
            return Err(RuntimeError::new(format!(
                "Cannot index into type '{}', expected array",
                other.type_name()
            )))
        }
    };

    let number = match index {
        Value::Number(n) => n,
        other => {
            return Err(RuntimeError::new(format!(
                "Array index must be a number, got '{}'",
                other.type_name()
            )))
        }
    };

    let idx = number as i64;
    let length = array.borrow().len();
    if idx < 0 || idx as usize >= length {
        return Err(RuntimeError::new(format!(
            "Array index {} out of bounds (array length: {})",
            idx, length
        )));
    }

    Ok((array, idx as usize))
}

fn eval_index_expression(
    object: &Expr,
    index: &Expr,
    env: &EnvRef,
    ctx: &mut EvalContext,
) -> Result<Value, RuntimeError> {
    let object = eval_expr(object, env, ctx)?;
    let index = eval_expr(index, env, ctx)?;

    let (array, idx) = resolve_index(object, index)?;
    let value = array.borrow()[idx].clone();
    Ok(value)
}

fn eval_index_assignment_expression(
    object: &Expr,
    index: &Expr,
    new_value: &Expr,
    env: &EnvRef,
    ctx: &mut EvalContext,
) -> Result<Value, RuntimeError> {
    let object = eval_expr(object, env, ctx)?;
    let index = eval_expr(index, env, ctx)?;
    let value = eval_expr(new_value, env, ctx)?;

    let (array, idx) = resolve_index(object, index)?;
    array.borrow_mut()[idx] = value;

    Ok(Value::Nil)
}

fn eval_call_expression(
    callee: &Expr,
    arguments: &[Expr],
    env: &EnvRef,
    ctx: &mut EvalContext,
) -> Result<Value, RuntimeError> {
    let callee = eval_expr(callee, env, ctx)?;

    let mut args = Vec::with_capacity(arguments.len());
    for argument in arguments {
        args.push(eval_expr(argument, env, ctx)?);
    }

    match callee {
        Value::NativeFunction(native) => (native.call)(&args, ctx),
        Value::Function(function) => {
            if args.len() != function.parameters.len() {
                return Err(RuntimeError::new(format!(
                    "Function '{}' expects {} arguments but got {}",
                    function.name,
                    function.parameters.len(),
                    args.len()
                )));
            }

            // The call environment chains to the function's closure,
            // not to the caller's scope.
            let call_env = Environment::child(&function.closure);
            for (parameter, argument) in function.parameters.iter().zip(args) {
                call_env.borrow_mut().declare(parameter, argument, false)?;
            }

            match eval_stmt(&function.body, &call_env, ctx)? {
                Flow::Return(value) => Ok(value),
                Flow::Value(_) => Ok(Value::Nil),
            }
        }
        other => Err(RuntimeError::new(format!(
            "Cannot call non-function value of type '{}'",
            other.type_name()
        ))),
    }
}
