//! Node evaluator

use super::builtins;
use super::env::{EnvRef, Environment};
use super::error::{EvalResult, RuntimeError, Signal};
use super::object::{Class, ClassRef, Instance, Method};
use super::operators;
use super::scope::Scope;
use super::value::Value;
use crate::ast::{AssignTarget, Block, ClassDef, MethodDef, Node, Program, Spanned};
use crate::config::Config;
use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;
use tracing::debug;

/// How a statement sequence treats an early `return`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceMode {
    /// Top level: a return ends the program with its unwrapped value
    Program,
    /// Nested body: a return stays wrapped until the method boundary
    Block,
}

/// The interpreter
pub struct Interpreter {
    pub(super) config: Config,
    /// Root of every class hierarchy; holds the built-in methods
    object_class: ClassRef,
    /// `self` at top level
    main_object: Value,
    /// Top-level environment
    globals: EnvRef,
    /// Sink for `puts` and `print`
    output: Box<dyn Write>,
    /// Current method-call nesting
    pub(super) call_depth: usize,
}

impl Interpreter {
    /// Create a new interpreter writing to stdout
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        let object_class = Class::new("Object", None);
        builtins::install(&object_class);

        let globals = Environment::new().into_ref();
        {
            let mut globals = globals.borrow_mut();
            globals.define("Object", Value::Class(Rc::clone(&object_class)));
            // No literal node for nil; the name resolves through the globals
            globals.define("nil", Value::Nil);
        }

        let main_object = Value::Instance(Instance::new(Rc::clone(&object_class)));

        Interpreter {
            config,
            object_class,
            main_object,
            globals,
            output: Box::new(io::stdout()),
            call_depth: 0,
        }
    }

    /// Redirect `puts`/`print` output
    pub fn with_output<W: Write + 'static>(mut self, output: W) -> Self {
        self.output = Box::new(output);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn object_class(&self) -> &ClassRef {
        &self.object_class
    }

    pub fn globals(&self) -> &EnvRef {
        &self.globals
    }

    /// Scope for top-level code: `self` is the main object
    pub fn top_scope(&self) -> Scope {
        Scope::new(self.main_object.clone(), Rc::clone(&self.globals))
    }

    /// Run a program at top level.
    ///
    /// Globals persist between calls, so a REPL can feed one program per line.
    pub fn run(&mut self, program: &Program) -> EvalResult {
        let scope = self.top_scope();
        self.eval_sequence(&program.statements, &scope, SequenceMode::Program)
    }

    /// Evaluate a node with automatic stack growth for deep nesting
    pub fn evaluate(&mut self, node: &Spanned<Node>, scope: &Scope) -> EvalResult {
        let (red_zone, grow_size) = (self.config.stack_red_zone, self.config.stack_grow_size);
        stacker::maybe_grow(red_zone, grow_size, || self.eval_node(node, scope))
    }

    fn eval_node(&mut self, node: &Spanned<Node>, scope: &Scope) -> EvalResult {
        match &node.node {
            Node::Program(program) => {
                self.eval_sequence(&program.statements, scope, SequenceMode::Program)
            }
            Node::BlockStatement(block) => self.eval_block(block, scope),
            Node::ExpressionStatement(expr) => self.evaluate(expr, scope),
            Node::ReturnStatement(expr) => {
                let value = self.evaluate(expr, scope)?;
                Err(Signal::Return(value))
            }

            Node::AssignStatement { target, value } => self.eval_assign(target, value, scope),
            Node::ClassStatement(class_def) => self.eval_class(class_def, scope),
            Node::DefStatement(method_def) => self.eval_def(method_def, scope),
            Node::Identifier(name) => self.eval_identifier(name, scope),
            Node::Constant(name) => self.eval_constant(name, scope),
            Node::InstanceVariable(name) => self.eval_instance_variable(name, scope),
            Node::IfExpression {
                condition,
                consequence,
                alternative,
            } => {
                let condition = self.evaluate(condition, scope)?;
                if condition.is_truthy() {
                    self.eval_block(consequence, scope)
                } else if let Some(alternative) = alternative {
                    self.eval_block(alternative, scope)
                } else {
                    Ok(Value::Nil)
                }
            }

            Node::CallExpression {
                receiver,
                method,
                arguments,
            } => {
                let receiver = self.evaluate(receiver, scope)?;
                let args = self.eval_args(arguments, scope)?;
                self.dispatch(&receiver, method, &args)
            }

            Node::PrefixExpression { operator, operand } => {
                let operand = self.evaluate(operand, scope)?;
                Ok(operators::eval_prefix(*operator, &operand)?)
            }
            Node::InfixExpression {
                left,
                operator,
                right,
            } => {
                let left = self.evaluate(left, scope)?;
                let right = self.evaluate(right, scope)?;
                Ok(operators::eval_infix(*operator, &left, &right)?)
            }

            Node::SelfExpression => Ok(scope.self_value.clone()),
            Node::IntegerLiteral(n) => Ok(Value::Integer(*n)),
            Node::StringLiteral(s) => Ok(Value::string(s)),
            Node::Boolean(b) => Ok(Value::from_bool(*b)),
        }
    }

    /// Run statements in order against one scope.
    ///
    /// Errors stop the sequence. A return stops it too and is unwrapped in
    /// `Program` mode but kept as a signal in `Block` mode. An empty
    /// sequence yields nil.
    pub fn eval_sequence(
        &mut self,
        statements: &[Spanned<Node>],
        scope: &Scope,
        mode: SequenceMode,
    ) -> EvalResult {
        let mut result = Value::Nil;
        for statement in statements {
            match self.evaluate(statement, scope) {
                Ok(value) => result = value,
                Err(Signal::Return(value)) if mode == SequenceMode::Program => return Ok(value),
                Err(signal) => return Err(signal),
            }
        }
        Ok(result)
    }

    fn eval_block(&mut self, block: &Block, scope: &Scope) -> EvalResult {
        self.eval_sequence(&block.statements, scope, SequenceMode::Block)
    }

    /// Evaluate call arguments left to right; the first failure is the result
    pub fn eval_args(&mut self, arguments: &[Spanned<Node>], scope: &Scope) -> EvalResult<Vec<Value>> {
        arguments.iter().map(|arg| self.evaluate(arg, scope)).collect()
    }

    fn eval_assign(&mut self, target: &AssignTarget, value: &Spanned<Node>, scope: &Scope) -> EvalResult {
        let value = self.evaluate(value, scope)?;
        match target {
            AssignTarget::Identifier(name) | AssignTarget::Constant(name) => {
                scope.define(name.clone(), value.clone());
            }
            AssignTarget::InstanceVariable(name) => match &scope.self_value {
                Value::Instance(instance) => instance.set_ivar(name.clone(), value.clone()),
                other => {
                    return Err(RuntimeError::invalid_self(
                        "instance variable assignment",
                        &other.to_string(),
                    )
                    .into());
                }
            },
        }
        Ok(value)
    }

    fn eval_identifier(&mut self, name: &str, scope: &Scope) -> EvalResult {
        if let Some(value) = scope.lookup(name) {
            return Ok(value);
        }
        // A bare name may be a zero-argument call on self
        if self.responds_to(&scope.self_value, name) {
            return self.dispatch(&scope.self_value, name, &[]);
        }
        Err(RuntimeError::undefined_variable(name, &scope.self_value.to_string()).into())
    }

    fn eval_constant(&mut self, name: &str, scope: &Scope) -> EvalResult {
        scope
            .lookup(name)
            .ok_or_else(|| RuntimeError::uninitialized_constant(name).into())
    }

    fn eval_instance_variable(&mut self, name: &str, scope: &Scope) -> EvalResult {
        match &scope.self_value {
            Value::Instance(instance) => Ok(instance.get_ivar(name).unwrap_or(Value::Nil)),
            other => Err(RuntimeError::invalid_self(
                &format!("instance variable {name}"),
                &other.to_string(),
            )
            .into()),
        }
    }

    /// Resolve a constant that must name a class
    fn resolve_class(&self, name: &str, scope: &Scope) -> EvalResult<ClassRef> {
        match scope.lookup(name) {
            Some(Value::Class(class)) => Ok(class),
            Some(other) => Err(RuntimeError::not_a_class(name, other.type_name()).into()),
            None => Err(RuntimeError::uninitialized_constant(name).into()),
        }
    }

    fn eval_class(&mut self, class_def: &ClassDef, scope: &Scope) -> EvalResult {
        let name = &class_def.name.node;
        let superclass = match &class_def.superclass {
            Some(superclass) => Some(self.resolve_class(&superclass.node, scope)?),
            None => None,
        };

        let class = match scope.lookup(name) {
            Some(Value::Class(existing)) => {
                if let Some(superclass) = &superclass {
                    let same_parent = existing
                        .superclass()
                        .is_some_and(|parent| Rc::ptr_eq(parent, superclass));
                    if !same_parent {
                        return Err(RuntimeError::superclass_mismatch(name).into());
                    }
                }
                debug!(class = %name, "reopening class");
                existing
            }
            Some(other) => return Err(RuntimeError::not_a_class(name, other.type_name()).into()),
            None => {
                let parent = superclass.unwrap_or_else(|| Rc::clone(&self.object_class));
                debug!(class = %name, superclass = %parent.name(), "defining class");
                let class = Class::new(name.clone(), Some(parent));
                scope.define(name.clone(), Value::Class(Rc::clone(&class)));
                class
            }
        };

        let body_scope = scope.nested(Value::Class(Rc::clone(&class)));
        self.eval_block(&class_def.body, &body_scope)?;
        Ok(Value::Class(class))
    }

    fn eval_def(&mut self, method_def: &MethodDef, scope: &Scope) -> EvalResult {
        let name = method_def.name.node.clone();
        let method = Value::Method(Rc::new(Method {
            name: name.clone(),
            params: method_def.params.iter().map(|p| p.node.clone()).collect(),
            body: Rc::clone(&method_def.body),
            closure: Rc::clone(&scope.env),
        }));

        match (&scope.self_value, method_def.singleton) {
            (Value::Class(class), true) => {
                debug!(class = %class.name(), method = %name, "defining class method");
                class.define_class_method(name, method.clone());
            }
            (Value::Class(class), false) => {
                debug!(class = %class.name(), method = %name, "defining instance method");
                class.define_instance_method(name, method.clone());
            }
            (Value::Instance(instance), false) => {
                let class = instance.class();
                debug!(class = %class.name(), method = %name, "defining instance method");
                class.define_instance_method(name, method.clone());
            }
            (other, singleton) => {
                let what = if singleton {
                    "singleton method definition"
                } else {
                    "method definition"
                };
                return Err(RuntimeError::invalid_self(what, &other.to_string()).into());
            }
        }
        Ok(method)
    }

    /// Write to the output sink
    pub fn write_output(&mut self, text: &str) -> Result<(), RuntimeError> {
        self.output
            .write_all(text.as_bytes())
            .and_then(|()| self.output.flush())
            .map_err(|e| RuntimeError::io_error(&e.to_string()))
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

/// In-memory output sink whose contents stay readable after the
/// interpreter takes ownership of a clone
#[derive(Debug, Clone, Default)]
pub struct SharedOutput(Rc<RefCell<Vec<u8>>>);

impl SharedOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }
}

impl Write for SharedOutput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{InfixOp, PrefixOp};
    use crate::interp::error::{ErrorKind, FatalError};

    fn spanned(node: Node) -> Spanned<Node> {
        Spanned::synthetic(node)
    }

    fn int(n: i64) -> Spanned<Node> {
        spanned(Node::IntegerLiteral(n))
    }

    fn string(s: &str) -> Spanned<Node> {
        spanned(Node::StringLiteral(s.to_string()))
    }

    fn ident(name: &str) -> Spanned<Node> {
        spanned(Node::Identifier(name.to_string()))
    }

    fn constant(name: &str) -> Spanned<Node> {
        spanned(Node::Constant(name.to_string()))
    }

    fn stmt(expr: Spanned<Node>) -> Spanned<Node> {
        spanned(Node::ExpressionStatement(Box::new(expr)))
    }

    fn ret(expr: Spanned<Node>) -> Spanned<Node> {
        spanned(Node::ReturnStatement(Box::new(expr)))
    }

    fn call(receiver: Spanned<Node>, method: &str, arguments: Vec<Spanned<Node>>) -> Spanned<Node> {
        spanned(Node::CallExpression {
            receiver: Box::new(receiver),
            method: method.to_string(),
            arguments,
        })
    }

    fn puts(arg: Spanned<Node>) -> Spanned<Node> {
        stmt(call(spanned(Node::SelfExpression), "puts", vec![arg]))
    }

    fn infix(left: Spanned<Node>, operator: InfixOp, right: Spanned<Node>) -> Spanned<Node> {
        spanned(Node::InfixExpression {
            left: Box::new(left),
            operator,
            right: Box::new(right),
        })
    }

    fn assign(target: AssignTarget, value: Spanned<Node>) -> Spanned<Node> {
        spanned(Node::AssignStatement {
            target,
            value: Box::new(value),
        })
    }

    fn def(name: &str, params: &[&str], body: Vec<Spanned<Node>>) -> Spanned<Node> {
        spanned(Node::DefStatement(MethodDef {
            name: Spanned::synthetic(name.to_string()),
            params: params.iter().map(|p| Spanned::synthetic(p.to_string())).collect(),
            body: Block::new(body),
            singleton: false,
        }))
    }

    fn class(name: &str, body: Vec<Spanned<Node>>) -> Spanned<Node> {
        spanned(Node::ClassStatement(ClassDef {
            name: Spanned::synthetic(name.to_string()),
            superclass: None,
            body: Block::new(body),
        }))
    }

    fn if_then(condition: Spanned<Node>, consequence: Vec<Spanned<Node>>) -> Spanned<Node> {
        stmt(spanned(Node::IfExpression {
            condition: Box::new(condition),
            consequence: Block::new(consequence),
            alternative: None,
        }))
    }

    fn interp() -> (Interpreter, SharedOutput) {
        let output = SharedOutput::new();
        (Interpreter::new().with_output(output.clone()), output)
    }

    fn run(interp: &mut Interpreter, statements: Vec<Spanned<Node>>) -> EvalResult {
        interp.run(&Program::new(statements))
    }

    fn error_of(result: EvalResult) -> RuntimeError {
        match result {
            Err(Signal::Error(err)) => err,
            other => panic!("expected error, got {other:?}"),
        }
    }

    #[test]
    fn test_eval_literals() {
        let (mut interp, _) = interp();
        let scope = interp.top_scope();
        assert_eq!(interp.evaluate(&int(42), &scope).unwrap(), Value::Integer(42));
        assert_eq!(interp.evaluate(&string("hi"), &scope).unwrap(), Value::string("hi"));
        assert!(matches!(
            interp.evaluate(&spanned(Node::SelfExpression), &scope).unwrap(),
            Value::Instance(_)
        ));
    }

    #[test]
    fn test_literal_evaluation_is_repeatable() {
        let (mut interp, _) = interp();
        let scope = interp.top_scope();
        let node = int(42);
        for _ in 0..3 {
            assert_eq!(interp.evaluate(&node, &scope).unwrap(), Value::Integer(42));
        }
    }

    #[test]
    fn test_true_is_always_the_same_object() {
        let (mut interp, _) = interp();
        let scope = interp.top_scope();
        let node = spanned(Node::Boolean(true));
        let first = interp.evaluate(&node, &scope).unwrap();
        let second = interp.evaluate(&node, &scope).unwrap();
        assert!(first.same(&second));
        assert!(first.same(&Value::from_bool(true)));
    }

    #[test]
    fn test_one_plus_two() {
        let (mut interp, _) = interp();
        let result = run(&mut interp, vec![stmt(infix(int(1), InfixOp::Add, int(2)))]);
        assert_eq!(result.unwrap(), Value::Integer(3));
    }

    #[test]
    fn test_empty_program_is_nil() {
        let (mut interp, _) = interp();
        assert_eq!(run(&mut interp, vec![]).unwrap(), Value::Nil);
    }

    #[test]
    fn test_top_level_return_stops_program() {
        let (mut interp, output) = interp();
        let result = run(
            &mut interp,
            vec![puts(string("before")), ret(int(7)), puts(string("after"))],
        );
        assert_eq!(result.unwrap(), Value::Integer(7));
        assert_eq!(output.contents(), "before\n");
    }

    #[test]
    fn test_block_mode_keeps_return_wrapped() {
        let (mut interp, _) = interp();
        let scope = interp.top_scope();
        let statements = vec![ret(int(1)), stmt(int(2))];
        match interp.eval_sequence(&statements, &scope, SequenceMode::Block) {
            Err(Signal::Return(value)) => assert_eq!(value, Value::Integer(1)),
            other => panic!("expected return signal, got {other:?}"),
        }
        let result = interp.eval_sequence(&statements, &scope, SequenceMode::Program);
        assert_eq!(result.unwrap(), Value::Integer(1));
    }

    #[test]
    fn test_return_inside_if_leaves_method() {
        let (mut interp, output) = interp();
        let method = def(
            "pick",
            &[],
            vec![
                if_then(spanned(Node::Boolean(true)), vec![ret(int(10))]),
                puts(string("unreachable")),
                stmt(int(20)),
            ],
        );
        let result = run(
            &mut interp,
            vec![method, stmt(call(spanned(Node::SelfExpression), "pick", vec![]))],
        );
        assert_eq!(result.unwrap(), Value::Integer(10));
        assert_eq!(output.contents(), "");
    }

    #[test]
    fn test_failed_return_expression_is_an_error() {
        let (mut interp, output) = interp();
        let scope = interp.top_scope();
        let statements = vec![ret(ident("nope")), puts(string("after"))];
        match interp.eval_sequence(&statements, &scope, SequenceMode::Block) {
            Err(Signal::Error(err)) => assert_eq!(err.kind, ErrorKind::UndefinedVariable),
            other => panic!("expected error signal, got {other:?}"),
        }
        let result = interp.eval_sequence(&statements, &scope, SequenceMode::Program);
        assert_eq!(error_of(result).kind, ErrorKind::UndefinedVariable);
        assert_eq!(output.contents(), "");
    }

    #[test]
    fn test_failed_return_in_method_is_not_unwrapped() {
        let (mut interp, _) = interp();
        let method = def("m", &[], vec![ret(ident("nope")), stmt(int(1))]);
        let result = run(
            &mut interp,
            vec![method, stmt(call(spanned(Node::SelfExpression), "m", vec![]))],
        );
        let err = error_of(result);
        assert_eq!(err.kind, ErrorKind::UndefinedVariable);
        assert!(err.message.contains("nope"), "{}", err.message);
        assert_eq!(interp.call_depth, 0);
    }

    #[test]
    fn test_error_stops_sequence() {
        let (mut interp, output) = interp();
        let result = run(
            &mut interp,
            vec![stmt(ident("missing")), puts(string("after"))],
        );
        assert_eq!(error_of(result).kind, ErrorKind::UndefinedVariable);
        assert_eq!(output.contents(), "");
    }

    #[test]
    fn test_argument_error_skips_invocation() {
        let (mut interp, output) = interp();
        let expected = {
            let scope = interp.top_scope();
            error_of(interp.evaluate(&ident("nope"), &scope))
        };

        let method = def("shout", &["a", "b"], vec![puts(string("entered"))]);
        let call_site = stmt(call(
            spanned(Node::SelfExpression),
            "shout",
            vec![int(1), ident("nope"), puts(string("third argument"))],
        ));
        let err = error_of(run(&mut interp, vec![method, call_site]));
        assert_eq!(err, expected);
        assert_eq!(output.contents(), "");
    }

    #[test]
    fn test_arity_error_before_body() {
        let (mut interp, output) = interp();
        let method = def("pair", &["a", "b"], vec![puts(string("entered"))]);
        let call_site = stmt(call(spanned(Node::SelfExpression), "pair", vec![int(1)]));
        let err = error_of(run(&mut interp, vec![method, call_site]));
        assert_eq!(err.kind, ErrorKind::ArityMismatch);
        assert!(err.message.contains("expected 2, got 1"));
        assert_eq!(output.contents(), "");
    }

    #[test]
    fn test_new_runs_initializer_once() {
        let (mut interp, output) = interp();
        let point = class(
            "Point",
            vec![def(
                "initialize",
                &["x", "y"],
                vec![
                    puts(string("init")),
                    assign(AssignTarget::InstanceVariable("@x".into()), ident("x")),
                    assign(AssignTarget::InstanceVariable("@y".into()), ident("y")),
                ],
            )],
        );
        let make = stmt(call(constant("Point"), "new", vec![int(3), int(4)]));
        let result = run(&mut interp, vec![point, make]).unwrap();

        let instance = result.as_instance().expect("new returns an instance").clone();
        assert_eq!(instance.class().name(), "Point");
        assert_eq!(instance.get_ivar("@x"), Some(Value::Integer(3)));
        assert_eq!(instance.get_ivar("@y"), Some(Value::Integer(4)));
        assert_eq!(output.contents(), "init\n");
    }

    #[test]
    fn test_initializer_return_value_is_discarded() {
        let (mut interp, _) = interp();
        let thing = class("Thing", vec![def("initialize", &[], vec![ret(int(99))])]);
        let make = stmt(call(constant("Thing"), "new", vec![]));
        let result = run(&mut interp, vec![thing, make]).unwrap();
        assert!(matches!(result, Value::Instance(_)));
    }

    #[test]
    fn test_undefined_method_names_method() {
        let (mut interp, _) = interp();
        let empty = class("Empty", vec![]);
        let call_site = stmt(call(
            call(constant("Empty"), "new", vec![]),
            "foo",
            vec![],
        ));
        let err = error_of(run(&mut interp, vec![empty, call_site]));
        assert_eq!(err.kind, ErrorKind::UndefinedMethod);
        assert!(err.message.contains("`foo'"), "{}", err.message);
    }

    #[test]
    fn test_integer_receiver_not_dispatchable() {
        let (mut interp, _) = interp();
        let err = error_of(run(&mut interp, vec![stmt(call(int(5), "foo", vec![]))]));
        assert_eq!(err.kind, ErrorKind::NotDispatchable);
    }

    #[test]
    fn test_receiver_error_propagates_unchanged() {
        let (mut interp, _) = interp();
        let err = error_of(run(
            &mut interp,
            vec![stmt(call(constant("Nowhere"), "new", vec![]))],
        ));
        assert_eq!(err.kind, ErrorKind::UninitializedConstant);
    }

    #[test]
    fn test_operand_error_propagates() {
        let (mut interp, _) = interp();
        let negated = spanned(Node::PrefixExpression {
            operator: PrefixOp::Neg,
            operand: Box::new(ident("ghost")),
        });
        let err = error_of(run(&mut interp, vec![stmt(infix(int(1), InfixOp::Add, negated))]));
        assert_eq!(err.kind, ErrorKind::UndefinedVariable);
        assert!(err.message.contains("ghost"));
    }

    #[test]
    fn test_assignment_yields_value() {
        let (mut interp, _) = interp();
        let result = run(
            &mut interp,
            vec![
                assign(AssignTarget::Identifier("x".into()), int(5)),
                stmt(infix(ident("x"), InfixOp::Mul, int(2))),
            ],
        );
        assert_eq!(result.unwrap(), Value::Integer(10));
    }

    #[test]
    fn test_bare_identifier_calls_method() {
        let (mut interp, _) = interp();
        let result = run(
            &mut interp,
            vec![def("answer", &[], vec![stmt(int(42))]), stmt(ident("answer"))],
        );
        assert_eq!(result.unwrap(), Value::Integer(42));
    }

    #[test]
    fn test_unset_instance_variable_is_nil() {
        let (mut interp, _) = interp();
        let result = run(&mut interp, vec![stmt(spanned(Node::InstanceVariable("@x".into())))]);
        assert_eq!(result.unwrap(), Value::Nil);
    }

    #[test]
    fn test_instance_variable_requires_instance_self() {
        let (mut interp, _) = interp();
        let body = vec![stmt(spanned(Node::InstanceVariable("@x".into())))];
        let err = error_of(run(&mut interp, vec![class("Holder", body)]));
        assert_eq!(err.kind, ErrorKind::InvalidSelf);
    }

    #[test]
    fn test_runaway_recursion_is_fatal() {
        let config = Config {
            max_call_depth: 50,
            ..Config::default()
        };
        let mut interp = Interpreter::with_config(config).with_output(SharedOutput::new());
        let forever = def("forever", &[], vec![stmt(ident("forever"))]);
        match run(&mut interp, vec![forever, stmt(ident("forever"))]) {
            Err(Signal::Fatal(FatalError::StackExhausted { limit })) => assert_eq!(limit, 50),
            other => panic!("expected fatal signal, got {other:?}"),
        }
        assert_eq!(interp.call_depth, 0);
    }
}
