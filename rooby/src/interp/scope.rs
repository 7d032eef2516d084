//! Evaluation scope: the current receiver paired with its environment

use super::env::{child_env, EnvRef};
use super::Value;

/// `self` plus the active variable environment.
///
/// Created per method invocation and per class body; cheap to clone since
/// both halves are reference-counted.
#[derive(Debug, Clone)]
pub struct Scope {
    pub self_value: Value,
    pub env: EnvRef,
}

impl Scope {
    pub fn new(self_value: Value, env: EnvRef) -> Self {
        Scope { self_value, env }
    }

    /// Scope with a different receiver and a fresh child environment
    pub fn nested(&self, self_value: Value) -> Self {
        Scope {
            self_value,
            env: child_env(&self.env),
        }
    }

    pub fn lookup(&self, name: &str) -> Option<Value> {
        self.env.borrow().get(name)
    }

    pub fn define(&self, name: impl Into<String>, value: Value) {
        self.env.borrow_mut().define(name, value);
    }
}
