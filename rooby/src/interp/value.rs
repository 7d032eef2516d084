//! Runtime values for the interpreter

use super::object::{ClassRef, InstanceRef, Method, NativeMethod};
use std::fmt;
use std::rc::Rc;

/// Payload of the two boolean singletons
#[derive(Debug)]
pub struct BooleanObject {
    value: bool,
}

impl BooleanObject {
    pub fn value(&self) -> bool {
        self.value
    }
}

/// The one `true` value; every `true` in a program refers to this object
pub static TRUE: BooleanObject = BooleanObject { value: true };
/// The one `false` value
pub static FALSE: BooleanObject = BooleanObject { value: false };

/// Runtime value
#[derive(Clone)]
pub enum Value {
    Integer(i64),
    String(Rc<str>),
    /// Always `&TRUE` or `&FALSE`
    Boolean(&'static BooleanObject),
    /// The defined "no value"
    Nil,
    Class(ClassRef),
    Instance(InstanceRef),
    /// User-defined method
    Method(Rc<Method>),
    NativeMethod(NativeMethod),
}

impl Value {
    /// Select one of the boolean singletons
    pub fn from_bool(b: bool) -> Self {
        if b {
            Value::Boolean(&TRUE)
        } else {
            Value::Boolean(&FALSE)
        }
    }

    pub fn string(s: &str) -> Self {
        Value::String(Rc::from(s))
    }

    /// `false` and `nil` are falsy, everything else is truthy
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Boolean(b) => b.value(),
            Value::Nil => false,
            _ => true,
        }
    }

    /// Get type name for error messages
    pub fn type_name(&self) -> &str {
        match self {
            Value::Integer(_) => "Integer",
            Value::String(_) => "String",
            Value::Boolean(_) => "Boolean",
            Value::Nil => "Nil",
            Value::Class(_) => "Class",
            Value::Instance(instance) => instance.class().name(),
            Value::Method(_) | Value::NativeMethod(_) => "Method",
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(b.value()),
            _ => None,
        }
    }

    pub fn as_class(&self) -> Option<&ClassRef> {
        match self {
            Value::Class(class) => Some(class),
            _ => None,
        }
    }

    pub fn as_instance(&self) -> Option<&InstanceRef> {
        match self {
            Value::Instance(instance) => Some(instance),
            _ => None,
        }
    }

    /// Identity comparison: the same object, not merely an equal one.
    ///
    /// Integers and nil are immediates and identical whenever equal.
    pub fn same(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Nil, Value::Nil) => true,
            (Value::Boolean(a), Value::Boolean(b)) => std::ptr::eq(*a, *b),
            (Value::String(a), Value::String(b)) => Rc::ptr_eq(a, b),
            (Value::Class(a), Value::Class(b)) => Rc::ptr_eq(a, b),
            (Value::Instance(a), Value::Instance(b)) => Rc::ptr_eq(a, b),
            (Value::Method(a), Value::Method(b)) => Rc::ptr_eq(a, b),
            (Value::NativeMethod(a), Value::NativeMethod(b)) => a.name == b.name,
            _ => false,
        }
    }

    /// Value equality as seen by `==`: integers and strings by content,
    /// everything else by identity
    pub fn equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::String(a), Value::String(b)) => a == b,
            _ => self.same(other),
        }
    }

    /// Text written by `puts`: strings without quotes, nil as nothing
    pub fn to_display_string(&self) -> String {
        match self {
            Value::String(s) => s.to_string(),
            Value::Nil => String::new(),
            other => other.to_string(),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

/// Inspect form
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(n) => write!(f, "{n}"),
            Value::String(s) => write!(f, "{s:?}"),
            Value::Boolean(b) => write!(f, "{}", b.value()),
            Value::Nil => write!(f, "nil"),
            Value::Class(class) => write!(f, "{}", class.name()),
            Value::Instance(instance) => write!(f, "#<{}>", instance.class().name()),
            Value::Method(method) => write!(f, "#<Method: {}>", method.name),
            Value::NativeMethod(native) => write!(f, "#<Method: {}(native)>", native.name),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}
