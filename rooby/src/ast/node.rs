//! Syntax tree nodes

use super::{AssignTarget, Block, ClassDef, MethodDef, Program, Spanned};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;

/// Every node kind the evaluator dispatches on
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Node {
    /// Root statement sequence
    Program(Program),
    /// Expression evaluated for its value in statement position
    ExpressionStatement(Box<Spanned<Node>>),
    /// Nested statement sequence (if bodies, method bodies)
    BlockStatement(Rc<Block>),
    /// `return expr`
    ReturnStatement(Box<Spanned<Node>>),
    /// `target = value`
    AssignStatement {
        target: AssignTarget,
        value: Box<Spanned<Node>>,
    },
    ClassStatement(ClassDef),
    DefStatement(MethodDef),

    /// Local variable (or receiverless zero-argument call)
    Identifier(String),
    /// Capitalised name, e.g. a class
    Constant(String),
    /// `@name`
    InstanceVariable(String),

    /// `if condition ... else ... end`
    IfExpression {
        condition: Box<Spanned<Node>>,
        consequence: Rc<Block>,
        alternative: Option<Rc<Block>>,
    },
    /// `receiver.method(arguments)`
    CallExpression {
        receiver: Box<Spanned<Node>>,
        method: String,
        arguments: Vec<Spanned<Node>>,
    },
    PrefixExpression {
        operator: PrefixOp,
        operand: Box<Spanned<Node>>,
    },
    InfixExpression {
        left: Box<Spanned<Node>>,
        operator: InfixOp,
        right: Box<Spanned<Node>>,
    },
    /// `self`
    SelfExpression,

    IntegerLiteral(i64),
    StringLiteral(String),
    Boolean(bool),
}

/// Prefix operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrefixOp {
    /// `!`
    Not,
    /// `-`
    Neg,
}

impl fmt::Display for PrefixOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrefixOp::Not => write!(f, "!"),
            PrefixOp::Neg => write!(f, "-"),
        }
    }
}

/// Infix operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InfixOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    NotEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
}

impl fmt::Display for InfixOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self {
            InfixOp::Add => "+",
            InfixOp::Sub => "-",
            InfixOp::Mul => "*",
            InfixOp::Div => "/",
            InfixOp::Mod => "%",
            InfixOp::Eq => "==",
            InfixOp::NotEq => "!=",
            InfixOp::Lt => "<",
            InfixOp::Gt => ">",
            InfixOp::LtEq => "<=",
            InfixOp::GtEq => ">=",
        };
        write!(f, "{op}")
    }
}

impl Node {
    /// Short kind name, used in trace output
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Program(_) => "Program",
            Node::ExpressionStatement(_) => "ExpressionStatement",
            Node::BlockStatement(_) => "BlockStatement",
            Node::ReturnStatement(_) => "ReturnStatement",
            Node::AssignStatement { .. } => "AssignStatement",
            Node::ClassStatement(_) => "ClassStatement",
            Node::DefStatement(_) => "DefStatement",
            Node::Identifier(_) => "Identifier",
            Node::Constant(_) => "Constant",
            Node::InstanceVariable(_) => "InstanceVariable",
            Node::IfExpression { .. } => "IfExpression",
            Node::CallExpression { .. } => "CallExpression",
            Node::PrefixExpression { .. } => "PrefixExpression",
            Node::InfixExpression { .. } => "InfixExpression",
            Node::SelfExpression => "SelfExpression",
            Node::IntegerLiteral(_) => "IntegerLiteral",
            Node::StringLiteral(_) => "StringLiteral",
            Node::Boolean(_) => "Boolean",
        }
    }
}
