//! Lexical Environments
//!
//! An environment is one node in a parent-pointer chain: a variable
//! map, the set of names declared immutable in this scope, and an
//! optional parent. Block scopes form a tree; closures keep extra
//! handles into it, so nodes are reference counted.

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use crate::interpreter::errors::RuntimeError;
use crate::interpreter::natives::declare_native_bindings;
use crate::interpreter::values::Value;
use std::cell::RefCell;

/// Shared handle to an environment node.
pub type EnvRef = Rc<RefCell<Environment>>;

#[derive(Debug)]
pub struct Environment {
    variables: HashMap<String, Value>,
    immutable_names: HashSet<String>,
    parent: Option<EnvRef>,
}

impl Environment {
    /// The global environment, pre-populated with the built-in
    /// constants and native functions.
    pub fn global() -> EnvRef {
        let env = Rc::new(RefCell::new(Self {
            variables: HashMap::new(),
            immutable_names: HashSet::new(),
            parent: None,
        }));
        declare_native_bindings(&env);
        env
    }

    /// A fresh scope whose parent is `parent`.
    pub fn child(parent: &EnvRef) -> EnvRef {
        Rc::new(RefCell::new(Self {
            variables: HashMap::new(),
            immutable_names: HashSet::new(),
            parent: Some(Rc::clone(parent)),
        }))
    }

    /// Declare a new variable in this scope. Shadowing an ancestor's
    /// binding is allowed; redeclaring a name in the same scope is not.
    pub fn declare(
        &mut self,
        name: &str,
        value: Value,
        is_constant: bool,
    ) -> Result<(), RuntimeError> {
        if self.variables.contains_key(name) {
            return Err(RuntimeError::new(format!(
                "Cannot declare variable \"{}\" as it is already defined",
                name
            )));
        }

        if is_constant {
            self.immutable_names.insert(name.to_string());
        }
        self.variables.insert(name.to_string(), value);

        Ok(())
    }

    /// Seed a built-in binding. Only used while constructing the global
    /// environment, where names cannot collide.
    pub(crate) fn define_builtin(&mut self, name: &str, value: Value) {
        self.immutable_names.insert(name.to_string());
        self.variables.insert(name.to_string(), value);
    }

    /// Assign to the nearest scope that defines `name`. Assigning to an
    /// undefined name or to an immutable binding is an error.
    pub fn assign(env: &EnvRef, name: &str, value: Value) -> Result<(), RuntimeError> {
        let mut current = Rc::clone(env);

        loop {
            {
                let mut scope = current.borrow_mut();
                if scope.variables.contains_key(name) {
                    if scope.immutable_names.contains(name) {
                        return Err(RuntimeError::new(format!(
                            "Cannot re-assign constant variable \"{}\"",
                            name
                        )));
                    }
                    scope.variables.insert(name.to_string(), value);
                    return Ok(());
                }
            }

            let parent = current.borrow().parent.clone();
            match parent {
                Some(parent) => current = parent,
                None => {
                    return Err(RuntimeError::new(format!(
                        "Cannot resolve variable \"{}\" as it does not exist in the current/outer scopes",
                        name
                    )))
                }
            }
        }
    }

    /// Read `name` from the nearest scope that defines it.
    pub fn lookup(env: &EnvRef, name: &str) -> Result<Value, RuntimeError> {
        let mut current = Rc::clone(env);

        loop {
            {
                let scope = current.borrow();
                if let Some(value) = scope.variables.get(name) {
                    return Ok(value.clone());
                }
            }

            let parent = current.borrow().parent.clone();
            match parent {
                Some(parent) => current = parent,
                None => {
                    return Err(RuntimeError::new(format!(
                        "Cannot resolve variable \"{}\" as it does not exist in the current/outer scopes",
                        name
                    )))
                }
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
