//! Built-in native methods installed on `Object`

use super::dispatch::class_value;
use super::error::{EvalResult, RuntimeError};
use super::eval::Interpreter;
use super::object::{Class, Instance, NativeMethod};
use super::Value;
use crate::util::is_instance_variable_name;
use std::rc::Rc;

/// Class methods, inherited by every class
const CLASS_METHODS: &[NativeMethod] = &[
    NativeMethod { name: "new", func: class_new },
    NativeMethod { name: "name", func: class_name },
    NativeMethod { name: "superclass", func: class_superclass },
    NativeMethod { name: "puts", func: object_puts },
    NativeMethod { name: "print", func: object_print },
    NativeMethod { name: "to_s", func: object_to_s },
    NativeMethod { name: "inspect", func: object_inspect },
    NativeMethod { name: "respond_to?", func: object_respond_to },
    NativeMethod { name: "send", func: object_send },
];

/// Instance methods, inherited by every object
const INSTANCE_METHODS: &[NativeMethod] = &[
    NativeMethod { name: "class", func: object_class },
    NativeMethod { name: "puts", func: object_puts },
    NativeMethod { name: "print", func: object_print },
    NativeMethod { name: "to_s", func: object_to_s },
    NativeMethod { name: "inspect", func: object_inspect },
    NativeMethod { name: "respond_to?", func: object_respond_to },
    NativeMethod { name: "send", func: object_send },
    NativeMethod { name: "instance_variable_get", func: object_ivar_get },
    NativeMethod { name: "instance_variable_set", func: object_ivar_set },
];

/// Register the built-in methods on the root class
pub fn install(object: &Class) {
    for native in CLASS_METHODS {
        object.define_class_method(native.name, Value::NativeMethod(*native));
    }
    for native in INSTANCE_METHODS {
        object.define_instance_method(native.name, Value::NativeMethod(*native));
    }
}

fn expect_args(method: &str, args: &[Value], expected: usize) -> Result<(), RuntimeError> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(RuntimeError::arity_mismatch(method, expected, args.len()))
    }
}

fn string_arg<'a>(method: &str, value: &'a Value) -> Result<&'a str, RuntimeError> {
    value.as_str().ok_or_else(|| {
        RuntimeError::argument_error(format!(
            "{method}: expected a String, got {}",
            value.type_name()
        ))
    })
}

fn ivar_name_arg<'a>(method: &str, value: &'a Value) -> Result<&'a str, RuntimeError> {
    let name = string_arg(method, value)?;
    if is_instance_variable_name(name) {
        Ok(name)
    } else {
        Err(RuntimeError::argument_error(format!(
            "`{name}' is not allowed as an instance variable name"
        )))
    }
}

fn receiver_class<'a>(method: &str, receiver: &'a Value) -> Result<&'a Rc<Class>, RuntimeError> {
    receiver
        .as_class()
        .ok_or_else(|| RuntimeError::invalid_self(method, &receiver.to_string()))
}

fn receiver_instance<'a>(method: &str, receiver: &'a Value) -> Result<&'a Rc<Instance>, RuntimeError> {
    receiver
        .as_instance()
        .ok_or_else(|| RuntimeError::invalid_self(method, &receiver.to_string()))
}

// ============================================
// Class methods
// ============================================

/// Allocation only; the dispatcher checks arguments and runs `initialize`
fn class_new(_: &mut Interpreter, receiver: &Value, _args: &[Value]) -> EvalResult {
    let class = receiver_class("new", receiver)?;
    Ok(Value::Instance(Instance::new(Rc::clone(class))))
}

fn class_name(_: &mut Interpreter, receiver: &Value, args: &[Value]) -> EvalResult {
    expect_args("name", args, 0)?;
    let class = receiver_class("name", receiver)?;
    Ok(Value::string(class.name()))
}

fn class_superclass(_: &mut Interpreter, receiver: &Value, args: &[Value]) -> EvalResult {
    expect_args("superclass", args, 0)?;
    let class = receiver_class("superclass", receiver)?;
    Ok(class.superclass().map_or(Value::Nil, class_value))
}

// ============================================
// Object methods
// ============================================

fn object_class(_: &mut Interpreter, receiver: &Value, args: &[Value]) -> EvalResult {
    expect_args("class", args, 0)?;
    let instance = receiver_instance("class", receiver)?;
    Ok(class_value(instance.class()))
}

fn object_puts(interp: &mut Interpreter, _receiver: &Value, args: &[Value]) -> EvalResult {
    if args.is_empty() {
        interp.write_output("\n")?;
    }
    for arg in args {
        let mut line = arg.to_display_string();
        if !line.ends_with('\n') {
            line.push('\n');
        }
        interp.write_output(&line)?;
    }
    Ok(Value::Nil)
}

fn object_print(interp: &mut Interpreter, _receiver: &Value, args: &[Value]) -> EvalResult {
    let text: String = args.iter().map(Value::to_display_string).collect();
    interp.write_output(&text)?;
    Ok(Value::Nil)
}

fn object_to_s(_: &mut Interpreter, receiver: &Value, args: &[Value]) -> EvalResult {
    expect_args("to_s", args, 0)?;
    Ok(Value::string(&receiver.to_display_string()))
}

fn object_inspect(_: &mut Interpreter, receiver: &Value, args: &[Value]) -> EvalResult {
    expect_args("inspect", args, 0)?;
    Ok(Value::string(&receiver.to_string()))
}

fn object_respond_to(interp: &mut Interpreter, receiver: &Value, args: &[Value]) -> EvalResult {
    expect_args("respond_to?", args, 1)?;
    let name = string_arg("respond_to?", &args[0])?;
    Ok(Value::from_bool(interp.responds_to(receiver, name)))
}

/// `send(name, *args)`: dynamic call through the dispatcher
fn object_send(interp: &mut Interpreter, receiver: &Value, args: &[Value]) -> EvalResult {
    let Some((name, rest)) = args.split_first() else {
        return Err(RuntimeError::argument_error("send: no method name given").into());
    };
    let name = string_arg("send", name)?;
    interp.dispatch(receiver, name, rest)
}

fn object_ivar_get(_: &mut Interpreter, receiver: &Value, args: &[Value]) -> EvalResult {
    expect_args("instance_variable_get", args, 1)?;
    let name = ivar_name_arg("instance_variable_get", &args[0])?;
    let instance = receiver_instance("instance_variable_get", receiver)?;
    Ok(instance.get_ivar(name).unwrap_or(Value::Nil))
}

fn object_ivar_set(_: &mut Interpreter, receiver: &Value, args: &[Value]) -> EvalResult {
    expect_args("instance_variable_set", args, 2)?;
    let name = ivar_name_arg("instance_variable_set", &args[0])?;
    let instance = receiver_instance("instance_variable_set", receiver)?;
    instance.set_ivar(name, args[1].clone());
    Ok(args[1].clone())
}
