//! Call dispatch and method invocation

use super::env::extend;
use super::error::{EvalResult, FatalError, RuntimeError, Signal};
use super::eval::{Interpreter, SequenceMode};
use super::object::{ClassRef, Method, NativeMethod};
use super::scope::Scope;
use super::Value;
use std::rc::Rc;
use tracing::trace;

impl Interpreter {
    /// Resolve `name` on `receiver` and call it.
    ///
    /// Classes dispatch through their class-method tables, instances through
    /// their class's instance-method tables; nothing else is a receiver. A
    /// `return` inside the callee surfaces here as a plain value.
    #[tracing::instrument(level = "trace", skip_all, fields(method = name))]
    pub fn dispatch(&mut self, receiver: &Value, name: &str, args: &[Value]) -> EvalResult {
        trace!(receiver = receiver.type_name(), argc = args.len(), "dispatch");
        let result = match receiver {
            Value::Class(class) => self.call_class_method(class, receiver, name, args),
            Value::Instance(instance) => {
                let method = instance.class().lookup_instance_method(name)?;
                self.call_method_value(receiver, name, method, args)
            }
            other => Err(RuntimeError::not_dispatchable(&other.to_string()).into()),
        };
        unwrap_return(result)
    }

    fn call_class_method(
        &mut self,
        class: &ClassRef,
        receiver: &Value,
        name: &str,
        args: &[Value],
    ) -> EvalResult {
        let method = class.lookup_class_method(name)?;
        match method {
            Value::NativeMethod(native) if name == "new" => self.construct(receiver, native, args),
            method => self.call_method_value(receiver, name, method, args),
        }
    }

    fn call_method_value(
        &mut self,
        receiver: &Value,
        name: &str,
        method: Value,
        args: &[Value],
    ) -> EvalResult {
        match method {
            Value::Method(method) => self.invoke_method(receiver, &method, args),
            Value::NativeMethod(native) => (native.func)(self, receiver, args),
            other => Err(RuntimeError::unknown_method_kind(name, other.type_name()).into()),
        }
    }

    /// Native `new` followed by the class's user-defined `initialize`, if
    /// any, with the same arguments. The result is always the new instance.
    fn construct(&mut self, class: &Value, native: NativeMethod, args: &[Value]) -> EvalResult {
        let instance = (native.func)(self, class, args)?;
        let initializer = match &instance {
            Value::Instance(object) => object.class().find_instance_method("initialize"),
            _ => None,
        };
        match initializer {
            Some(Value::Method(init)) => match self.invoke_method(&instance, &init, args) {
                Ok(_) | Err(Signal::Return(_)) => {}
                Err(signal) => return Err(signal),
            },
            _ if !args.is_empty() => {
                return Err(RuntimeError::arity_mismatch("initialize", 0, args.len()).into());
            }
            _ => {}
        }
        Ok(instance)
    }

    /// Bind arguments and run a user-defined method body with `self` set to
    /// `receiver`.
    ///
    /// The raw body result is returned, so a `return` is still wrapped.
    pub fn invoke_method(&mut self, receiver: &Value, method: &Method, args: &[Value]) -> EvalResult {
        if method.arity() != args.len() {
            return Err(RuntimeError::arity_mismatch(&method.name, method.arity(), args.len()).into());
        }
        if self.call_depth >= self.config.max_call_depth {
            return Err(FatalError::StackExhausted {
                limit: self.config.max_call_depth,
            }
            .into());
        }
        trace!(method = %method.name, depth = self.call_depth, "invoke");

        let env = extend(
            &method.closure,
            method.params.iter().cloned().zip(args.iter().cloned()),
        );
        let scope = Scope::new(receiver.clone(), env);

        self.call_depth += 1;
        let (red_zone, grow_size) = (self.config.stack_red_zone, self.config.stack_grow_size);
        let result = stacker::maybe_grow(red_zone, grow_size, || {
            self.eval_sequence(&method.body.statements, &scope, SequenceMode::Block)
        });
        self.call_depth -= 1;
        result
    }

    /// Whether a call of `name` on `value` would find a method
    pub fn responds_to(&self, value: &Value, name: &str) -> bool {
        match value {
            Value::Class(class) => class.find_class_method(name).is_some(),
            Value::Instance(instance) => instance.class().find_instance_method(name).is_some(),
            _ => false,
        }
    }
}

/// Turn a method's pending `return` into its plain value
pub fn unwrap_return(result: EvalResult) -> EvalResult {
    match result {
        Err(Signal::Return(value)) => Ok(value),
        other => other,
    }
}

/// Convenience for native methods that hold a class
pub(super) fn class_value(class: &ClassRef) -> Value {
    Value::Class(Rc::clone(class))
}
