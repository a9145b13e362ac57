//! Runtime Values
//!
//! The closed set of values a Mutex program can produce. `Number`,
//! `Boolean`, `Str` and `Nil` are immutable value-like; `Array` and
//! `Function` are shared handles, so two bindings to the same array
//! observe each other's mutations and a closure keeps its defining
//! environment alive.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::ast::types::Stmt;
use crate::interpreter::context::EvalContext;
use crate::interpreter::environment::EnvRef;
use crate::interpreter::errors::RuntimeError;

/// Shared mutable backing store for array values.
pub type ArrayRef = Rc<RefCell<Vec<Value>>>;

/// Signature of native function implementations.
pub type NativeFn = fn(&[Value], &mut EvalContext) -> Result<Value, RuntimeError>;

/// A user-defined function together with its defining environment.
pub struct Function {
    pub name: String,
    pub parameters: Vec<String>,
    pub body: Stmt,
    pub closure: EnvRef,
}

// The closure handle leads back to the environment that holds this
// function, so Debug must not follow it.
impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.name)
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}

/// A built-in callable provided by the host.
#[derive(Debug, Clone, Copy)]
pub struct NativeFunction {
    pub name: &'static str,
    pub call: NativeFn,
}

/// Union of all runtime value types.
#[derive(Debug, Clone)]
pub enum Value {
    Nil,
    Boolean(bool),
    Number(f64),
    Str(String),
    Array(ArrayRef),
    Function(Rc<Function>),
    NativeFunction(NativeFunction),
}

impl Value {
    /// Construct a fresh array value from evaluated elements.
    pub fn array(elements: Vec<Value>) -> Self {
        Self::Array(Rc::new(RefCell::new(elements)))
    }

    /// The variant name reported by `typeof`.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Nil => "nil",
            Self::Boolean(_) => "boolean",
            Self::Number(_) => "number",
            Self::Str(_) => "string",
            Self::Array(_) => "array",
            Self::Function(_) => "function",
            Self::NativeFunction(_) => "native_function",
        }
    }
}

/// Truthiness used by conditionals and the logical operators: `nil` and
/// `false` are false, zero and the empty string are false, everything
/// else is true.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Nil => false,
        Value::Boolean(b) => *b,
        Value::Number(n) => *n != 0.0,
        Value::Str(s) => !s.is_empty(),
        _ => true,
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nil => write!(f, "nil"),
            Self::Boolean(b) => write!(f, "{}", b),
            Self::Number(n) => write!(f, "{}", n),
            Self::Str(s) => write!(f, "\"{}\"", s),
            Self::Array(elements) => {
                let elements = elements.borrow();
                if elements.is_empty() {
                    return write!(f, "[]");
                }
                let rendered: Vec<String> = elements.iter().map(|e| e.to_string()).collect();
                write!(f, "[{}]", rendered.join(", "))
            }
            Self::Function(function) => write!(f, "[ ...function '{}'... ]", function.name),
            Self::NativeFunction(native) => {
                write!(f, "[ ...native function '{}'... ]", native.name)
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_names() {
        assert_eq!(Value::Nil.type_name(), "nil");
        assert_eq!(Value::Boolean(true).type_name(), "boolean");
        assert_eq!(Value::Number(1.0).type_name(), "number");
        assert_eq!(Value::Str("x".to_string()).type_name(), "string");
        assert_eq!(Value::array(vec![]).type_name(), "array");
    }

    #[test]
    fn test_truthiness() {
        assert!(!is_truthy(&Value::Nil));
        assert!(!is_truthy(&Value::Boolean(false)));
        assert!(is_truthy(&Value::Boolean(true)));
        assert!(!is_truthy(&Value::Number(0.0)));
        assert!(is_truthy(&Value::Number(-1.5)));
        assert!(!is_truthy(&Value::Str(String::new())));
        assert!(is_truthy(&Value::Str("x".to_string())));
        assert!(is_truthy(&Value::array(vec![])));
    }

    #[test]
    fn test_number_rendering() {
        assert_eq!(Value::Number(7.0).to_string(), "7");
        assert_eq!(Value::Number(3.5).to_string(), "3.5");
        assert_eq!(Value::Number(-2.0).to_string(), "-2");
    }

    #[test]
    fn test_string_rendering_is_quoted() {
        assert_eq!(Value::Str("hi".to_string()).to_string(), "\"hi\"");
    }

    #[test]
    fn test_array_rendering() {
        assert_eq!(Value::array(vec![]).to_string(), "[]");
        let array = Value::array(vec![
            Value::Number(1.0),
            Value::Str("two".to_string()),
            Value::Nil,
        ]);
        assert_eq!(array.to_string(), "[1, \"two\", nil]");
    }

    #[test]
    fn test_array_values_alias() {
        let array = Value::array(vec![Value::Number(1.0)]);
        let alias = array.clone();
        if let Value::Array(elements) = &array {
            elements.borrow_mut().push(Value::Number(2.0));
        }
        assert_eq!(alias.to_string(), "[1, 2]");
    }
}
