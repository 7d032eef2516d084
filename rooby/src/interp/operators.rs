//! Prefix and infix operator semantics

use super::error::RuntimeError;
use super::Value;
use crate::ast::{InfixOp, PrefixOp};
use std::mem::discriminant;

/// Longest string `String * Integer` may build, in bytes
pub const MAX_STRING_LEN: usize = 1 << 28;

/// Apply a prefix operator to an already evaluated operand
pub fn eval_prefix(op: PrefixOp, operand: &Value) -> Result<Value, RuntimeError> {
    match (op, operand) {
        (PrefixOp::Not, value) => Ok(Value::from_bool(!value.is_truthy())),
        (PrefixOp::Neg, Value::Integer(n)) => n
            .checked_neg()
            .map(Value::Integer)
            .ok_or_else(|| RuntimeError::integer_overflow(&format!("-({n})"))),
        (PrefixOp::Neg, other) => Err(RuntimeError::unknown_operator(&format!(
            "-{}",
            other.type_name()
        ))),
    }
}

/// Apply an infix operator to already evaluated operands
pub fn eval_infix(op: InfixOp, left: &Value, right: &Value) -> Result<Value, RuntimeError> {
    match (left, right) {
        (Value::Integer(a), Value::Integer(b)) => integer_infix(op, *a, *b),
        (Value::String(a), Value::String(b)) => string_infix(op, a, b),
        (Value::String(s), Value::Integer(n)) if op == InfixOp::Mul => repeat(s, *n),
        _ => match op {
            InfixOp::Eq => Ok(Value::from_bool(left.equals(right))),
            InfixOp::NotEq => Ok(Value::from_bool(!left.equals(right))),
            _ if discriminant(left) != discriminant(right) => Err(RuntimeError::type_mismatch(
                left.type_name(),
                &op.to_string(),
                right.type_name(),
            )),
            _ => Err(unknown(left, op, right)),
        },
    }
}

fn unknown(left: &Value, op: InfixOp, right: &Value) -> RuntimeError {
    RuntimeError::unknown_operator(&format!("{} {op} {}", left.type_name(), right.type_name()))
}

fn integer_infix(op: InfixOp, a: i64, b: i64) -> Result<Value, RuntimeError> {
    let overflow = || RuntimeError::integer_overflow(&format!("{a} {op} {b}"));
    let value = match op {
        InfixOp::Add => Value::Integer(a.checked_add(b).ok_or_else(overflow)?),
        InfixOp::Sub => Value::Integer(a.checked_sub(b).ok_or_else(overflow)?),
        InfixOp::Mul => Value::Integer(a.checked_mul(b).ok_or_else(overflow)?),
        InfixOp::Div => Value::Integer(floor_div(a, b)?.ok_or_else(overflow)?),
        InfixOp::Mod => Value::Integer(floor_mod(a, b)?),
        InfixOp::Eq => Value::from_bool(a == b),
        InfixOp::NotEq => Value::from_bool(a != b),
        InfixOp::Lt => Value::from_bool(a < b),
        InfixOp::Gt => Value::from_bool(a > b),
        InfixOp::LtEq => Value::from_bool(a <= b),
        InfixOp::GtEq => Value::from_bool(a >= b),
    };
    Ok(value)
}

/// Division rounding toward negative infinity; `None` on overflow
fn floor_div(a: i64, b: i64) -> Result<Option<i64>, RuntimeError> {
    if b == 0 {
        return Err(RuntimeError::division_by_zero());
    }
    Ok(a.checked_div(b).map(|q| if a % b != 0 && (a < 0) != (b < 0) { q - 1 } else { q }))
}

/// Remainder taking the sign of the divisor
fn floor_mod(a: i64, b: i64) -> Result<i64, RuntimeError> {
    if b == 0 {
        return Err(RuntimeError::division_by_zero());
    }
    // i64::MIN % -1 overflows in checked_rem but the remainder is 0
    let r = a.checked_rem(b).unwrap_or(0);
    Ok(if r != 0 && (r < 0) != (b < 0) { r + b } else { r })
}

fn string_infix(op: InfixOp, a: &str, b: &str) -> Result<Value, RuntimeError> {
    let value = match op {
        InfixOp::Add => Value::String(format!("{a}{b}").into()),
        InfixOp::Eq => Value::from_bool(a == b),
        InfixOp::NotEq => Value::from_bool(a != b),
        InfixOp::Lt => Value::from_bool(a < b),
        InfixOp::Gt => Value::from_bool(a > b),
        InfixOp::LtEq => Value::from_bool(a <= b),
        InfixOp::GtEq => Value::from_bool(a >= b),
        InfixOp::Sub | InfixOp::Mul | InfixOp::Div | InfixOp::Mod => {
            return Err(RuntimeError::unknown_operator(&format!("String {op} String")));
        }
    };
    Ok(value)
}

fn repeat(s: &str, n: i64) -> Result<Value, RuntimeError> {
    let count = usize::try_from(n)
        .map_err(|_| RuntimeError::argument_error(format!("negative argument: {n}")))?;
    match s.len().checked_mul(count) {
        Some(len) if len <= MAX_STRING_LEN => Ok(Value::String(s.repeat(count).into())),
        _ => Err(RuntimeError::argument_error(format!("argument too big: {n}"))),
    }
}
