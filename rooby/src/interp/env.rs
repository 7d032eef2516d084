//! Environment for variable bindings

use super::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Shared reference to an environment
pub type EnvRef = Rc<RefCell<Environment>>;

/// Environment holding variable bindings
#[derive(Debug, Clone, Default)]
pub struct Environment {
    /// Variable bindings in this scope
    bindings: HashMap<String, Value>,
    /// Enclosing environment for lexical lookup
    parent: Option<EnvRef>,
}

impl Environment {
    /// Create a new top-level environment
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new environment with a parent
    pub fn with_parent(parent: EnvRef) -> Self {
        Environment {
            bindings: HashMap::new(),
            parent: Some(parent),
        }
    }

    /// Wrap in Rc<RefCell<>>
    pub fn into_ref(self) -> EnvRef {
        Rc::new(RefCell::new(self))
    }

    /// Define (or overwrite) a variable in this scope
    pub fn define(&mut self, name: impl Into<String>, value: Value) {
        self.bindings.insert(name.into(), value);
    }

    /// Look up a variable in the scope chain
    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.bindings.get(name) {
            Some(value.clone())
        } else if let Some(parent) = &self.parent {
            parent.borrow().get(name)
        } else {
            None
        }
    }

    /// Update the nearest existing binding; false if there is none
    pub fn set(&mut self, name: &str, value: Value) -> bool {
        if let Some(slot) = self.bindings.get_mut(name) {
            *slot = value;
            true
        } else if let Some(parent) = &self.parent {
            parent.borrow_mut().set(name, value)
        } else {
            false
        }
    }

    /// Check if a variable exists in the scope chain
    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
            || self
                .parent
                .as_ref()
                .is_some_and(|parent| parent.borrow().contains(name))
    }

    /// Bindings of this scope only
    pub fn bindings(&self) -> &HashMap<String, Value> {
        &self.bindings
    }
}

/// Create a child environment from a parent reference
pub fn child_env(parent: &EnvRef) -> EnvRef {
    Environment::with_parent(Rc::clone(parent)).into_ref()
}

/// Child of `parent` pre-populated with `bindings`, in order
pub fn extend<I>(parent: &EnvRef, bindings: I) -> EnvRef
where
    I: IntoIterator<Item = (String, Value)>,
{
    let mut env = Environment::with_parent(Rc::clone(parent));
    for (name, value) in bindings {
        env.define(name, value);
    }
    env.into_ref()
}
