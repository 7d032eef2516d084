//! Abstract Syntax Tree definitions

mod node;
mod span;

pub use node::*;
pub use span::*;

use serde::{Deserialize, Serialize};
use std::rc::Rc;

/// A program is the root statement sequence
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Program {
    pub statements: Vec<Spanned<Node>>,
}

impl Program {
    pub fn new(statements: Vec<Spanned<Node>>) -> Self {
        Program { statements }
    }
}

/// Statement sequence nested in a control body, class body or method body.
///
/// Shared through `Rc` so that a method value can keep its body alive after
/// the defining tree is gone.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Block {
    pub statements: Vec<Spanned<Node>>,
}

impl Block {
    pub fn new(statements: Vec<Spanned<Node>>) -> Rc<Self> {
        Rc::new(Block { statements })
    }
}

/// `class Name < Super ... end`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassDef {
    pub name: Spanned<String>,
    pub superclass: Option<Spanned<String>>,
    pub body: Rc<Block>,
}

/// `def name(params) ... end`, or `def self.name ...` when `singleton` is set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodDef {
    pub name: Spanned<String>,
    pub params: Vec<Spanned<String>>,
    pub body: Rc<Block>,
    pub singleton: bool,
}

/// Left-hand side of an assignment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssignTarget {
    Identifier(String),
    Constant(String),
    InstanceVariable(String),
}

impl AssignTarget {
    pub fn name(&self) -> &str {
        match self {
            AssignTarget::Identifier(name)
            | AssignTarget::Constant(name)
            | AssignTarget::InstanceVariable(name) => name,
        }
    }
}
