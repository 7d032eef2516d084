//! Tree-walking interpreter for rooby programs

mod builtins;
mod dispatch;
mod env;
mod error;
mod eval;
mod object;
mod operators;
mod scope;
mod value;

pub use dispatch::unwrap_return;
pub use env::{child_env, extend, EnvRef, Environment};
pub use error::{ErrorKind, EvalResult, FatalError, RuntimeError, Signal};
pub use eval::{Interpreter, SequenceMode, SharedOutput};
pub use object::{Class, ClassRef, Instance, InstanceRef, Method, NativeFn, NativeMethod};
pub use operators::{eval_infix, eval_prefix};
pub use scope::Scope;
pub use value::{BooleanObject, Value, FALSE, TRUE};
