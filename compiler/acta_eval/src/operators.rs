//! Binary and unary operator implementations for the evaluator.
//!
//! Direct enum-based dispatch over the closed `Value` set. Integers widen to
//! floats when mixed with them. Arithmetic on `null` yields `null`, and
//! ordering comparisons against `null` are false.
//!
//! `and`/`or` short-circuit in the interpreter; the versions here only see
//! operands that were both evaluated.

use std::cmp::Ordering;

use acta_ir::{BinaryOp, UnaryOp};
use chrono::TimeDelta;

use crate::errors::EvalErrorKind;
use crate::temporal::{duration_from_millis, parse_date, parse_time};
use crate::Value;

type OpResult = Result<Value, EvalErrorKind>;

#[inline]
fn invalid(op: BinaryOp, left: &Value, right: &Value) -> EvalErrorKind {
    EvalErrorKind::InvalidOperands {
        op: op.as_symbol(),
        left: left.kind(),
        right: right.kind(),
    }
}

/// Numeric view of a value, widening integers.
#[expect(
    clippy::cast_precision_loss,
    reason = "integer to float widening is the language's semantics"
)]
pub(crate) fn as_float(value: &Value) -> Option<f64> {
    match value {
        Value::Int(n) => Some(*n as f64),
        Value::Float(x) => Some(*x),
        _ => None,
    }
}

/// A duration in (fractional) seconds, for comparisons against numbers.
#[expect(
    clippy::cast_precision_loss,
    reason = "millisecond counts far below 2^52 in practice"
)]
fn seconds(delta: TimeDelta) -> f64 {
    delta.num_milliseconds() as f64 / 1000.0
}

#[expect(
    clippy::cast_precision_loss,
    reason = "millisecond counts far below 2^52 in practice"
)]
fn millis(delta: TimeDelta) -> f64 {
    delta.num_milliseconds() as f64
}

/// Ordering between two values, if they are comparable.
///
/// Durations compare with numbers as seconds; dates and times compare with
/// strings by parsing the string as a literal.
pub fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
        (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        (Value::Date(a), Value::Date(b)) => Some(a.cmp(b)),
        (Value::Time(a), Value::Time(b)) => Some(a.cmp(b)),
        (Value::Duration(a), Value::Duration(b)) => Some(a.cmp(b)),
        (Value::Duration(d), n) => seconds(*d).partial_cmp(&as_float(n)?),
        (n, Value::Duration(d)) => as_float(n)?.partial_cmp(&seconds(*d)),
        (Value::Date(d), Value::Str(s)) => parse_date(s).map(|other| d.cmp(&other)),
        (Value::Str(s), Value::Date(d)) => parse_date(s).map(|other| other.cmp(d)),
        (Value::Time(t), Value::Str(s)) => parse_time(s).map(|other| t.cmp(&other)),
        (Value::Str(s), Value::Time(t)) => parse_time(s).map(|other| other.cmp(t)),
        _ => as_float(left)?.partial_cmp(&as_float(right)?),
    }
}

/// Total order used for sorting rows: `null` first, incomparable values tie.
pub fn sort_order(left: &Value, right: &Value) -> Ordering {
    match (left.is_null(), right.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => compare(left, right).unwrap_or(Ordering::Equal),
    }
}

/// Equality as the `==` operator sees it: with numeric widening and the
/// same implicit conversions as [`compare`].
pub fn loose_eq(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Int(_), Value::Float(_))
        | (Value::Float(_), Value::Int(_))
        | (Value::Duration(_), Value::Int(_) | Value::Float(_))
        | (Value::Int(_) | Value::Float(_), Value::Duration(_))
        | (Value::Date(_) | Value::Time(_), Value::Str(_))
        | (Value::Str(_), Value::Date(_) | Value::Time(_)) => {
            compare(left, right) == Some(Ordering::Equal)
        }
        (Value::Array(a), Value::Array(b)) => {
            a.elements.len() == b.elements.len()
                && a.elements.iter().zip(&b.elements).all(|(x, y)| loose_eq(x, y))
        }
        _ => left == right,
    }
}

/// Evaluate a binary operation on two evaluated operands.
pub fn evaluate_binary(op: BinaryOp, left: &Value, right: &Value) -> OpResult {
    match op {
        BinaryOp::Eq => Ok(Value::Bool(loose_eq(left, right))),
        BinaryOp::NotEq => Ok(Value::Bool(!loose_eq(left, right))),
        BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq => {
            if left.is_null() || right.is_null() {
                return Ok(Value::Bool(false));
            }
            let ordering = compare(left, right).ok_or_else(|| invalid(op, left, right))?;
            Ok(Value::Bool(match op {
                BinaryOp::Lt => ordering.is_lt(),
                BinaryOp::LtEq => ordering.is_le(),
                BinaryOp::Gt => ordering.is_gt(),
                _ => ordering.is_ge(),
            }))
        }
        BinaryOp::And | BinaryOp::Or => match (left, right) {
            (Value::Bool(a), Value::Bool(b)) => Ok(Value::Bool(if op == BinaryOp::And {
                *a && *b
            } else {
                *a || *b
            })),
            _ => Err(invalid(op, left, right)),
        },
        BinaryOp::In => membership(left, right),
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => {
            arithmetic(op, left, right)
        }
    }
}

fn membership(needle: &Value, haystack: &Value) -> OpResult {
    let found = match (needle, haystack) {
        (_, Value::Null) => false,
        (_, Value::Array(array)) => array.elements.iter().any(|e| loose_eq(needle, e)),
        (Value::Str(part), Value::Str(whole)) => whole.contains(part.as_str()),
        (_, Value::SqlResult(result)) => result
            .rows
            .iter()
            .filter_map(|row| row.first())
            .any(|first| loose_eq(needle, first)),
        _ => return Err(invalid(BinaryOp::In, needle, haystack)),
    };
    Ok(Value::Bool(found))
}

fn arithmetic(op: BinaryOp, left: &Value, right: &Value) -> OpResult {
    let overflow = || EvalErrorKind::IntegerOverflow(op.as_symbol());
    match (left, right) {
        (Value::Null, _) | (_, Value::Null) => Ok(Value::Null),
        (Value::Int(a), Value::Int(b)) => int_arithmetic(op, *a, *b),
        (Value::Int(_) | Value::Float(_), Value::Int(_) | Value::Float(_)) => {
            match (as_float(left), as_float(right)) {
                (Some(a), Some(b)) => float_arithmetic(op, a, b),
                _ => Err(invalid(op, left, right)),
            }
        }
        (Value::Str(_), _) | (_, Value::Str(_)) if op == BinaryOp::Add => {
            Ok(Value::Str(format!("{left}{right}")))
        }
        (Value::Date(date), Value::Duration(delta)) if op == BinaryOp::Add => date
            .checked_add_signed(*delta)
            .map(Value::Date)
            .ok_or_else(overflow),
        (Value::Duration(delta), Value::Date(date)) if op == BinaryOp::Add => date
            .checked_add_signed(*delta)
            .map(Value::Date)
            .ok_or_else(overflow),
        (Value::Date(date), Value::Duration(delta)) if op == BinaryOp::Sub => date
            .checked_sub_signed(*delta)
            .map(Value::Date)
            .ok_or_else(overflow),
        (Value::Time(time), Value::Duration(delta)) | (Value::Duration(delta), Value::Time(time))
            if op == BinaryOp::Add =>
        {
            Ok(Value::Time(time.overflowing_add_signed(*delta).0))
        }
        (Value::Time(time), Value::Duration(delta)) if op == BinaryOp::Sub => {
            Ok(Value::Time(time.overflowing_sub_signed(*delta).0))
        }
        (Value::Date(a), Value::Date(b)) if op == BinaryOp::Sub => {
            Ok(Value::Duration(a.signed_duration_since(*b)))
        }
        (Value::Time(a), Value::Time(b)) if op == BinaryOp::Sub => {
            Ok(Value::Duration(a.signed_duration_since(*b)))
        }
        (Value::Duration(a), Value::Duration(b)) => match op {
            BinaryOp::Add => a.checked_add(b).map(Value::Duration).ok_or_else(overflow),
            BinaryOp::Sub => a.checked_sub(b).map(Value::Duration).ok_or_else(overflow),
            BinaryOp::Div if b.is_zero() => Err(EvalErrorKind::DivisionByZero),
            BinaryOp::Div => Ok(Value::Float(millis(*a) / millis(*b))),
            _ => Err(invalid(op, left, right)),
        },
        (Value::Duration(delta), n) | (n, Value::Duration(delta)) if op == BinaryOp::Mul => {
            let factor = as_float(n).ok_or_else(|| invalid(op, left, right))?;
            duration_from_millis(millis(*delta) * factor)
                .map(Value::Duration)
                .ok_or_else(overflow)
        }
        (Value::Duration(delta), n) if op == BinaryOp::Div => {
            let divisor = as_float(n).ok_or_else(|| invalid(op, left, right))?;
            if divisor == 0.0 {
                return Err(EvalErrorKind::DivisionByZero);
            }
            duration_from_millis(millis(*delta) / divisor)
                .map(Value::Duration)
                .ok_or_else(overflow)
        }
        _ => Err(invalid(op, left, right)),
    }
}

fn int_arithmetic(op: BinaryOp, a: i64, b: i64) -> OpResult {
    let result = match op {
        BinaryOp::Add => a.checked_add(b),
        BinaryOp::Sub => a.checked_sub(b),
        BinaryOp::Mul => a.checked_mul(b),
        BinaryOp::Div | BinaryOp::Mod if b == 0 => return Err(EvalErrorKind::DivisionByZero),
        BinaryOp::Div => a.checked_div(b),
        BinaryOp::Mod => a.checked_rem(b),
        _ => None,
    };
    result
        .map(Value::Int)
        .ok_or(EvalErrorKind::IntegerOverflow(op.as_symbol()))
}

fn float_arithmetic(op: BinaryOp, a: f64, b: f64) -> OpResult {
    let result = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div | BinaryOp::Mod if b == 0.0 => return Err(EvalErrorKind::DivisionByZero),
        BinaryOp::Div => a / b,
        BinaryOp::Mod => a % b,
        _ => {
            return Err(EvalErrorKind::InvalidOperands {
                op: op.as_symbol(),
                left: crate::ValueKind::Float,
                right: crate::ValueKind::Float,
            })
        }
    };
    Ok(Value::Float(result))
}

/// Evaluate a unary operation.
pub fn evaluate_unary(op: UnaryOp, operand: &Value) -> OpResult {
    match (op, operand) {
        (_, Value::Null) => Ok(Value::Null),
        (UnaryOp::Neg, Value::Int(n)) => n
            .checked_neg()
            .map(Value::Int)
            .ok_or(EvalErrorKind::IntegerOverflow("-")),
        (UnaryOp::Neg, Value::Float(x)) => Ok(Value::Float(-x)),
        (UnaryOp::Neg, Value::Duration(d)) => Ok(Value::Duration(-*d)),
        (UnaryOp::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
        _ => Err(EvalErrorKind::InvalidOperand {
            op: op.as_symbol(),
            operand: operand.kind(),
        }),
    }
}

#[cfg(test)]
mod tests;
