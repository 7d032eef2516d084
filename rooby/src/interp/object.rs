//! Object model: classes, instances and method values

use super::env::EnvRef;
use super::error::{EvalResult, RuntimeError};
use super::eval::Interpreter;
use super::Value;
use crate::ast::Block;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Shared reference to a class
pub type ClassRef = Rc<Class>;

/// Shared reference to an instance
pub type InstanceRef = Rc<Instance>;

/// Native method body: receiver is bound as the first argument
pub type NativeFn = fn(&mut Interpreter, &Value, &[Value]) -> EvalResult;

/// A class with instance- and class-level method tables.
///
/// Method tables only ever hold `Value::Method` or `Value::NativeMethod`.
pub struct Class {
    name: String,
    superclass: Option<ClassRef>,
    instance_methods: RefCell<HashMap<String, Value>>,
    class_methods: RefCell<HashMap<String, Value>>,
}

impl Class {
    pub fn new(name: impl Into<String>, superclass: Option<ClassRef>) -> ClassRef {
        Rc::new(Class {
            name: name.into(),
            superclass,
            instance_methods: RefCell::new(HashMap::new()),
            class_methods: RefCell::new(HashMap::new()),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn superclass(&self) -> Option<&ClassRef> {
        self.superclass.as_ref()
    }

    /// This class followed by its superclass chain
    pub fn ancestors(&self) -> impl Iterator<Item = &Class> {
        std::iter::successors(Some(self), |class| class.superclass.as_deref())
    }

    /// Whether `other` is this class or one of its ancestors
    pub fn is_a(&self, other: &Class) -> bool {
        self.ancestors().any(|class| std::ptr::eq(class, other))
    }

    pub fn define_instance_method(&self, name: impl Into<String>, method: Value) {
        self.instance_methods.borrow_mut().insert(name.into(), method);
    }

    pub fn define_class_method(&self, name: impl Into<String>, method: Value) {
        self.class_methods.borrow_mut().insert(name.into(), method);
    }

    /// Ancestor-aware instance method search
    pub fn find_instance_method(&self, name: &str) -> Option<Value> {
        self.ancestors()
            .find_map(|class| class.instance_methods.borrow().get(name).cloned())
    }

    /// Ancestor-aware class method search
    pub fn find_class_method(&self, name: &str) -> Option<Value> {
        self.ancestors()
            .find_map(|class| class.class_methods.borrow().get(name).cloned())
    }

    /// Instance method lookup; a miss is an undefined-method error naming
    /// the method and an instance of this class
    pub fn lookup_instance_method(&self, name: &str) -> Result<Value, RuntimeError> {
        self.find_instance_method(name).ok_or_else(|| {
            let visible = self.instance_method_names();
            let candidates: Vec<&str> = visible.iter().map(String::as_str).collect();
            RuntimeError::undefined_method(name, &format!("#<{}>", self.name), &candidates)
        })
    }

    /// Class method lookup; a miss is an undefined-method error naming the
    /// method and this class
    pub fn lookup_class_method(&self, name: &str) -> Result<Value, RuntimeError> {
        self.find_class_method(name).ok_or_else(|| {
            let visible = self.class_method_names();
            let candidates: Vec<&str> = visible.iter().map(String::as_str).collect();
            RuntimeError::undefined_method(name, &format!("{}:Class", self.name), &candidates)
        })
    }

    /// Instance method names visible through the ancestor chain, sorted
    pub fn instance_method_names(&self) -> Vec<String> {
        collect_names(self.ancestors().map(|class| &class.instance_methods))
    }

    /// Class method names visible through the ancestor chain, sorted
    pub fn class_method_names(&self) -> Vec<String> {
        collect_names(self.ancestors().map(|class| &class.class_methods))
    }
}

fn collect_names<'a>(tables: impl Iterator<Item = &'a RefCell<HashMap<String, Value>>>) -> Vec<String> {
    let mut names: Vec<String> = tables
        .flat_map(|table| table.borrow().keys().cloned().collect::<Vec<_>>())
        .collect();
    names.sort();
    names.dedup();
    names
}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Class")
            .field("name", &self.name)
            .field("superclass", &self.superclass.as_ref().map(|s| s.name()))
            .finish_non_exhaustive()
    }
}

/// An object: a class reference plus instance-variable bindings.
///
/// Instance-variable keys keep their leading `@`.
#[derive(Debug)]
pub struct Instance {
    class: ClassRef,
    ivars: RefCell<HashMap<String, Value>>,
}

impl Instance {
    pub fn new(class: ClassRef) -> InstanceRef {
        Rc::new(Instance {
            class,
            ivars: RefCell::new(HashMap::new()),
        })
    }

    pub fn class(&self) -> &ClassRef {
        &self.class
    }

    pub fn get_ivar(&self, name: &str) -> Option<Value> {
        self.ivars.borrow().get(name).cloned()
    }

    pub fn set_ivar(&self, name: impl Into<String>, value: Value) {
        self.ivars.borrow_mut().insert(name.into(), value);
    }

    pub fn ivar_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.ivars.borrow().keys().cloned().collect();
        names.sort();
        names
    }
}

/// User-defined method
pub struct Method {
    pub name: String,
    pub params: Vec<String>,
    pub body: Rc<Block>,
    /// Environment the `def` was evaluated in
    pub closure: EnvRef,
}

impl Method {
    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

impl fmt::Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Method")
            .field("name", &self.name)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// Built-in method implemented in Rust
#[derive(Clone, Copy)]
pub struct NativeMethod {
    pub name: &'static str,
    pub func: NativeFn,
}

impl fmt::Debug for NativeMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeMethod({})", self.name)
    }
}
