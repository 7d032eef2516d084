//! Integration tests for the rooby interpreter
//!
//! Each test lexes, parses and runs a complete program, then checks the
//! result value, the error raised, or what the program printed.

use pretty_assertions::assert_eq;
use rooby::interp::{ErrorKind, EvalResult, FatalError, Interpreter, RuntimeError, SharedOutput, Signal, Value};
use rooby::Config;

/// Run a program, capturing its output
fn run_with(config: Config, source: &str) -> (EvalResult, String) {
    let program = rooby::parse_source("test.rb", source).expect("program should parse");
    let output = SharedOutput::new();
    let mut interp = Interpreter::with_config(config).with_output(output.clone());
    let result = interp.run(&program);
    (result, output.contents())
}

fn run(source: &str) -> (EvalResult, String) {
    run_with(Config::default(), source)
}

/// Run and expect success
fn run_ok(source: &str) -> Value {
    match run(source).0 {
        Ok(value) => value,
        Err(signal) => panic!("program failed: {signal}"),
    }
}

/// Run and return what was printed
fn output_of(source: &str) -> String {
    let (result, output) = run(source);
    if let Err(signal) = result {
        panic!("program failed: {signal}");
    }
    output
}

/// Run and expect a runtime error
fn run_err(source: &str) -> RuntimeError {
    match run(source).0 {
        Err(Signal::Error(err)) => err,
        other => panic!("expected runtime error, got {other:?}"),
    }
}

// ============================================
// Expressions
// ============================================

#[test]
fn test_integer_addition() {
    assert_eq!(run_ok("1 + 2"), Value::Integer(3));
}

#[test]
fn test_precedence_and_grouping() {
    assert_eq!(run_ok("2 + 3 * 4"), Value::Integer(14));
    assert_eq!(run_ok("(2 + 3) * 4"), Value::Integer(20));
    assert_eq!(run_ok("-(2 + 3) * 2"), Value::Integer(-10));
}

#[test]
fn test_string_operations() {
    assert_eq!(run_ok(r#""foo" + "bar""#), Value::string("foobar"));
    assert_eq!(run_ok(r#""ab" * 2 == "abab""#), Value::from_bool(true));
}

#[test]
fn test_boolean_literals_are_singletons() {
    let first = run_ok("true");
    let second = run_ok("1 < 2");
    assert!(first.same(&second));
    assert!(run_ok("!nil").same(&Value::from_bool(true)));
}

#[test]
fn test_equality_and_truthiness() {
    assert_eq!(run_ok("1 == 1"), Value::from_bool(true));
    assert_eq!(run_ok("1 != 1"), Value::from_bool(false));
    assert_eq!(run_ok(r#""a" == "a""#), Value::from_bool(true));
    assert_eq!(run_ok("!0"), Value::from_bool(false));
}

#[test]
fn test_division_by_zero_is_an_error() {
    let err = run_err("10 / 0");
    assert_eq!(err.kind, ErrorKind::DivisionByZero);
}

#[test]
fn test_type_mismatch() {
    let err = run_err(r#"1 + "one""#);
    assert_eq!(err.kind, ErrorKind::TypeMismatch);
}

// ============================================
// Variables and control flow
// ============================================

#[test]
fn test_local_variables() {
    assert_eq!(run_ok("x = 4\ny = x * 2\ny + 1"), Value::Integer(9));
}

#[test]
fn test_if_else_branches() {
    let source = "
def sign(n)
  if n < 0
    -1
  else
    if n == 0
      0
    else
      1
    end
  end
end
sign(-5) + sign(0) * 10 + sign(7) * 100
";
    assert_eq!(run_ok(source), Value::Integer(99));
}

#[test]
fn test_if_without_else_is_nil() {
    assert_eq!(run_ok("if false\n  1\nend"), Value::Nil);
}

#[test]
fn test_undefined_variable() {
    let err = run_err("y + 1");
    assert_eq!(err.kind, ErrorKind::UndefinedVariable);
    assert!(err.message.contains("`y'"));
}

#[test]
fn test_top_level_return_ends_program() {
    let (result, output) = run("puts \"one\"\nreturn 5\nputs \"two\"");
    assert_eq!(result.unwrap(), Value::Integer(5));
    assert_eq!(output, "one\n");
}

// ============================================
// Methods
// ============================================

#[test]
fn test_top_level_method() {
    let source = "
def add(a, b)
  a + b
end
add(2, 3)
";
    assert_eq!(run_ok(source), Value::Integer(5));
}

#[test]
fn test_recursion() {
    let source = "
def fact(n)
  if n <= 1
    return 1
  end
  n * fact(n - 1)
end
fact(10)
";
    assert_eq!(run_ok(source), Value::Integer(3_628_800));
}

#[test]
fn test_return_inside_if_leaves_method() {
    let source = r#"
def check(n)
  if n > 10
    return "big"
  end
  puts "still here"
  "small"
end
puts check(50)
puts check(1)
"#;
    assert_eq!(output_of(source), "big\nstill here\nsmall\n");
}

#[test]
fn test_failed_return_expression_propagates_error() {
    let (result, output) = run("def m\n  return nope\n  puts \"after\"\nend\nm\nputs \"done\"");
    match result {
        Err(Signal::Error(err)) => {
            assert_eq!(err.kind, ErrorKind::UndefinedVariable);
            assert!(err.message.contains("`nope'"), "{}", err.message);
        }
        other => panic!("expected runtime error, got {other:?}"),
    }
    assert_eq!(output, "");
}

#[test]
fn test_huge_string_repeat_is_an_error() {
    let err = run_err(&format!("\"ab\" * {}", i64::MAX));
    assert_eq!(err.kind, ErrorKind::ArgumentError);
}

#[test]
fn test_method_result_is_last_statement() {
    assert_eq!(run_ok("def five\n  2\n  5\nend\nfive"), Value::Integer(5));
}

#[test]
fn test_empty_method_returns_nil() {
    assert_eq!(run_ok("def nothing\nend\nnothing"), Value::Nil);
}

#[test]
fn test_arity_error_skips_body() {
    let (result, output) = run(r#"
def pair(a, b)
  puts "entered"
end
pair(1)
"#);
    let err = result.unwrap_err();
    let err = err.as_error().expect("runtime error");
    assert_eq!(err.kind, ErrorKind::ArityMismatch);
    assert_eq!(err.message, "wrong number of arguments for `pair' (expected 2, got 1)");
    assert_eq!(output, "");
}

#[test]
fn test_argument_error_skips_call_and_later_arguments() {
    let (result, output) = run(r#"
def show(a, b, c)
  puts "entered"
end
show(1, missing, puts("third"))
"#);
    let err = result.unwrap_err();
    let err = err.as_error().expect("runtime error");
    assert_eq!(err.kind, ErrorKind::UndefinedVariable);
    assert!(err.message.contains("`missing'"));
    assert_eq!(output, "");
}

#[test]
fn test_methods_do_not_see_caller_locals() {
    let source = "
def peek
  secret
end
def hide
  secret = 1
  peek
end
hide
";
    assert_eq!(run_err(source).kind, ErrorKind::UndefinedVariable);
}

#[test]
fn test_parameters_shadow_globals() {
    let source = "
x = 1
def f(x)
  x * 10
end
f(5) + x
";
    assert_eq!(run_ok(source), Value::Integer(51));
}

#[test]
fn test_runaway_recursion_is_fatal() {
    let config = Config {
        max_call_depth: 200,
        ..Config::default()
    };
    let (result, _) = run_with(config, "def down(n)\n  down(n + 1)\nend\ndown(0)");
    match result {
        Err(Signal::Fatal(FatalError::StackExhausted { limit })) => assert_eq!(limit, 200),
        other => panic!("expected fatal signal, got {other:?}"),
    }
}

#[test]
fn test_deep_but_finite_recursion() {
    let source = "
def count(n)
  if n == 0
    return 0
  end
  1 + count(n - 1)
end
count(2000)
";
    assert_eq!(run_ok(source), Value::Integer(2000));
}

// ============================================
// Classes and objects
// ============================================

#[test]
fn test_new_runs_initialize_once() {
    let source = r#"
class Point
  def initialize(x, y)
    puts "init"
    @x = x
    @y = y
  end

  def x
    @x
  end

  def sum
    @x + @y
  end
end
p = Point.new(3, 4)
puts p.x
puts p.sum
"#;
    assert_eq!(output_of(source), "init\n3\n7\n");
}

#[test]
fn test_new_returns_instance_even_if_initialize_returns() {
    let source = "
class Thing
  def initialize
    return 5
  end
end
Thing.new
";
    let value = run_ok(source);
    insta::assert_snapshot!(value.to_string(), @"#<Thing>");
}

#[test]
fn test_initialize_errors_propagate() {
    let source = "
class Broken
  def initialize
    nope
  end
end
Broken.new
";
    assert_eq!(run_err(source).kind, ErrorKind::UndefinedVariable);
}

#[test]
fn test_new_checks_initialize_arity() {
    let source = "
class Pair
  def initialize(a, b)
  end
end
Pair.new(1)
";
    let err = run_err(source);
    assert_eq!(err.kind, ErrorKind::ArityMismatch);
    assert!(err.message.contains("`initialize'"));
}

#[test]
fn test_inheritance_and_override() {
    let source = r#"
class Animal
  def speak
    "..."
  end

  def describe
    name + " says " + speak
  end

  def name
    "animal"
  end
end

class Dog < Animal
  def speak
    "woof"
  end

  def name
    "dog"
  end
end

puts Animal.new.describe
puts Dog.new.describe
"#;
    assert_eq!(output_of(source), "animal says ...\ndog says woof\n");
}

#[test]
fn test_class_methods() {
    let source = "
class Counter
  def self.start
    new.bump(10)
  end

  def bump(n)
    @count = n + 1
    self
  end

  def count
    @count
  end
end
Counter.start.count
";
    assert_eq!(run_ok(source), Value::Integer(11));
}

#[test]
fn test_class_methods_are_inherited() {
    let source = r#"
class Base
  def self.kind
    "base"
  end
end
class Derived < Base
end
Derived.kind
"#;
    assert_eq!(run_ok(source), Value::string("base"));
}

#[test]
fn test_undefined_method_names_method() {
    let source = "
class Empty
end
Empty.new.foo
";
    let err = run_err(source);
    assert_eq!(err.kind, ErrorKind::UndefinedMethod);
    insta::assert_snapshot!(err.message, @"undefined method `foo' for #<Empty>");
}

#[test]
fn test_undefined_method_suggestion() {
    let source = "
class Dog
  def bark
    1
  end
end
Dog.new.brak
";
    let err = run_err(source);
    assert!(err.message.ends_with("(did you mean `bark`?)"), "{}", err.message);
}

#[test]
fn test_integer_receiver_is_not_dispatchable() {
    let err = run_err("5.times");
    assert_eq!(err.kind, ErrorKind::NotDispatchable);
}

#[test]
fn test_reopen_class_adds_methods() {
    let source = "
class Box
  def one
    1
  end
end
class Box
  def two
    2
  end
end
b = Box.new
b.one + b.two
";
    assert_eq!(run_ok(source), Value::Integer(3));
}

#[test]
fn test_superclass_mismatch() {
    let source = "
class A
end
class B
end
class C < A
end
class C < B
end
";
    assert_eq!(run_err(source).kind, ErrorKind::SuperclassMismatch);
}

#[test]
fn test_superclass_must_be_a_class() {
    assert_eq!(run_err("X = 1\nclass Y < X\nend").kind, ErrorKind::NotAClass);
    assert_eq!(run_err("class Y < Missing\nend").kind, ErrorKind::UninitializedConstant);
}

#[test]
fn test_unset_instance_variable_is_nil() {
    let source = "
class Lazy
  def value
    @value
  end
end
Lazy.new.value
";
    assert_eq!(run_ok(source), Value::Nil);
}

#[test]
fn test_instances_compare_by_identity() {
    let source = "
class Token
end
a = Token.new
b = Token.new
if a == a
  if a == b
    1
  else
    2
  end
else
  3
end
";
    assert_eq!(run_ok(source), Value::Integer(2));
}

#[test]
fn test_global_methods_visible_inside_classes() {
    let source = r#"
def shout(s)
  s + "!"
end
class Greeter
  def greet
    shout("hi")
  end
end
Greeter.new.greet
"#;
    assert_eq!(run_ok(source), Value::string("hi!"));
}

// ============================================
// Built-in methods
// ============================================

#[test]
fn test_puts_and_print() {
    let source = r#"
print "a", "b"
puts
puts "c", 1, true, nil
"#;
    assert_eq!(output_of(source), "ab\nc\n1\ntrue\n\n");
}

#[test]
fn test_class_introspection() {
    let source = "
class Animal
end
class Cat < Animal
end
puts Cat.new.class.name
puts Cat.superclass.name
puts Animal.superclass
";
    assert_eq!(output_of(source), "Cat\nAnimal\nObject\n");
}

#[test]
fn test_inspect_forms() {
    insta::assert_snapshot!(run_ok(r#""hi""#).to_string(), @r#""hi""#);
    insta::assert_snapshot!(run_ok("nil").to_string(), @"nil");
    insta::assert_snapshot!(run_ok("Object").to_string(), @"Object");
}

#[test]
fn test_send_and_respond_to() {
    let source = r#"
class Calc
  def add(a, b)
    a + b
  end
end
c = Calc.new
if c.respond_to?("add")
  c.send("add", 4, 5)
else
  0
end
"#;
    assert_eq!(run_ok(source), Value::Integer(9));
}

#[test]
fn test_send_unwraps_return() {
    let source = r#"
class Early
  def go
    return 7
    8
  end
end
Early.new.send("go") + 1
"#;
    assert_eq!(run_ok(source), Value::Integer(8));
}

#[test]
fn test_instance_variable_get_and_set() {
    let source = r#"
class Bag
end
bag = Bag.new
bag.instance_variable_set("@weight", 12)
bag.instance_variable_get("@weight")
"#;
    assert_eq!(run_ok(source), Value::Integer(12));
}

#[test]
fn test_to_s_and_inspect() {
    let source = r#"
class Pet
end
puts Pet.new.to_s
puts Pet.new.inspect
puts "quoted".inspect
"#;
    let (result, output) = run(source);
    assert_eq!(output, "#<Pet>\n#<Pet>\n");
    let err = result.unwrap_err();
    assert_eq!(err.as_error().map(|e| e.kind), Some(ErrorKind::NotDispatchable));
}
