//! Expression evaluation: literals, operators, access and assignment.

use std::rc::Rc;

use acta_ir::{BinaryOp, Expr, ExprKind, Span};
use acta_stack::ensure_sufficient_stack;

use super::Interpreter;
use crate::errors::{fail, ControlFlow, EvalErrorKind, EvalResult, WithSpan};
use crate::operators::{evaluate_binary, evaluate_unary};
use crate::temporal::{self, parse_date, parse_time};
use crate::value::ArrayValue;
use crate::Value;

impl Interpreter<'_> {
    pub(crate) fn eval(&mut self, expr: &Expr) -> EvalResult {
        ensure_sufficient_stack(|| self.eval_inner(expr))
    }

    fn eval_inner(&mut self, expr: &Expr) -> EvalResult {
        let span = expr.span;
        match &expr.kind {
            ExprKind::Int(n) => Ok(Value::Int(*n)),
            ExprKind::Float(x) => Ok(Value::Float(*x)),
            ExprKind::Str(s) => Ok(Value::Str(s.clone())),
            ExprKind::Bool(b) => Ok(Value::Bool(*b)),
            ExprKind::Null => Ok(Value::Null),
            ExprKind::Date(text) => match parse_date(text) {
                Some(date) => Ok(Value::Date(date)),
                None => fail(
                    EvalErrorKind::InvalidLiteral {
                        kind: "date",
                        text: text.clone(),
                    },
                    span,
                ),
            },
            ExprKind::Time(text) => match parse_time(text) {
                Some(time) => Ok(Value::Time(time)),
                None => fail(
                    EvalErrorKind::InvalidLiteral {
                        kind: "time",
                        text: text.clone(),
                    },
                    span,
                ),
            },
            ExprKind::Duration { value, unit } => match temporal::duration(*value, *unit) {
                Some(delta) => Ok(Value::Duration(delta)),
                None => fail(
                    EvalErrorKind::InvalidLiteral {
                        kind: "duration",
                        text: format!("{value}{}", unit.suffix()),
                    },
                    span,
                ),
            },
            ExprKind::Ident(name) => self.resolve(name, span),
            ExprKind::Array(items) => {
                let elements = items
                    .iter()
                    .map(|item| self.eval(item))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Value::array(elements))
            }
            ExprKind::Binary { op, left, right } => self.eval_binary(*op, left, right, span),
            ExprKind::Unary { op, operand } => {
                let operand = self.eval(operand)?;
                evaluate_unary(*op, &operand).at(span)
            }
            ExprKind::Assign { target, value } => {
                let value = self.eval(value)?;
                self.assign(target, value.clone())?;
                Ok(value)
            }
            ExprKind::Call { callee, args } => self.eval_call(callee, args, span),
            ExprKind::Index { target, index } => {
                let target = self.eval(target)?;
                let index = self.eval(index)?;
                index_value(&target, &index).at(span)
            }
            ExprKind::Field { target, field } => {
                let target = self.eval(target)?;
                field_value(&target, field).at(span)
            }
            ExprKind::IsNull { operand, negated } => {
                let operand = self.eval(operand)?;
                Ok(Value::Bool(operand.is_null() != *negated))
            }
            ExprKind::Query(query) => {
                let result = self.eval_query(query)?;
                Ok(Value::SqlResult(Rc::new(result)))
            }
        }
    }

    fn eval_binary(&mut self, op: BinaryOp, left: &Expr, right: &Expr, span: Span) -> EvalResult {
        match op {
            BinaryOp::And => {
                let value = self.condition(left, "operand of `and`")?
                    && self.condition(right, "operand of `and`")?;
                Ok(Value::Bool(value))
            }
            BinaryOp::Or => {
                let value = self.condition(left, "operand of `or`")?
                    || self.condition(right, "operand of `or`")?;
                Ok(Value::Bool(value))
            }
            _ => {
                let left = self.eval(left)?;
                let right = self.eval(right)?;
                evaluate_binary(op, &left, &right).at(span)
            }
        }
    }

    /// Store `value` into an assignable place.
    ///
    /// Arrays and structs have value semantics, so `a[i].x = v` rebuilds
    /// `a[i]` and then `a` from the inside out.
    pub(crate) fn assign(&mut self, target: &Expr, value: Value) -> Result<(), ControlFlow> {
        match &target.kind {
            ExprKind::Ident(name) => {
                self.env.assign(name, value);
                Ok(())
            }
            ExprKind::Index {
                target: container,
                index,
            } => {
                let current = self.eval(container)?;
                let index = self.eval(index)?;
                let updated = store_index(current, &index, value).at(target.span)?;
                self.assign(container, updated)
            }
            ExprKind::Field {
                target: container,
                field,
            } => {
                let current = self.eval(container)?;
                let updated = store_field(current, field, value).at(target.span)?;
                self.assign(container, updated)
            }
            _ => fail(EvalErrorKind::InvalidAssignmentTarget, target.span),
        }
    }
}

fn position(index: &Value, len: usize) -> Result<usize, EvalErrorKind> {
    let Value::Int(index) = index else {
        return Err(EvalErrorKind::NonIntegerIndex(index.kind()));
    };
    usize::try_from(*index)
        .ok()
        .filter(|&i| i < len)
        .ok_or(EvalErrorKind::IndexOutOfBounds { index: *index, len })
}

fn index_value(target: &Value, index: &Value) -> Result<Value, EvalErrorKind> {
    match target {
        Value::Array(array) => {
            let i = position(index, array.elements.len())?;
            Ok(array.elements[i].clone())
        }
        Value::Str(text) => {
            let len = text.chars().count();
            let i = position(index, len)?;
            Ok(text
                .chars()
                .nth(i)
                .map_or(Value::Null, |c| Value::Str(c.to_string())))
        }
        Value::SqlResult(result) => {
            let i = position(index, result.len())?;
            Ok(result.row_struct(i).unwrap_or(Value::Null))
        }
        Value::Struct(_) => match index {
            Value::Str(field) => field_value(target, field),
            other => Err(EvalErrorKind::NonIntegerIndex(other.kind())),
        },
        other => Err(EvalErrorKind::NotIndexable(other.kind())),
    }
}

fn field_value(target: &Value, field: &str) -> Result<Value, EvalErrorKind> {
    let missing = |owner: &str| EvalErrorKind::NoSuchField {
        owner: owner.to_string(),
        field: field.to_string(),
    };
    match target {
        Value::Struct(s) => s.get(field).cloned().ok_or_else(|| missing(&s.name)),
        Value::Node(node) => match node.tree.field(node.id, field) {
            Some(value) => Ok(value.clone()),
            None if field == acta_ir::builtins::LEVEL_COLUMN => {
                Ok(Value::Int(i64::try_from(node.tree.level(node.id)).unwrap_or(i64::MAX)))
            }
            None => Err(missing("node")),
        },
        other => Err(missing(other.kind().name())),
    }
}

fn store_index(container: Value, index: &Value, value: Value) -> Result<Value, EvalErrorKind> {
    match container {
        Value::Array(mut array) => {
            let len = array.elements.len();
            // A dynamic array grows by one when written just past its end.
            if array.size.is_none() && matches!(index, Value::Int(i) if usize::try_from(*i) == Ok(len))
            {
                array.elements.push(value);
            } else {
                let capacity = array.size.map_or(len, |size| size.max(len));
                let i = position(index, capacity)?;
                if i >= len {
                    pad(&mut array, i);
                }
                array.elements[i] = value;
            }
            Ok(Value::Array(array))
        }
        Value::Struct(s) => match index {
            Value::Str(field) => store_field(Value::Struct(s), field, value),
            other => Err(EvalErrorKind::NonIntegerIndex(other.kind())),
        },
        other => Err(EvalErrorKind::NotIndexable(other.kind())),
    }
}

/// Extend a fixed-size array with nulls up to and including `index`.
fn pad(array: &mut ArrayValue, index: usize) {
    array.elements.resize(index + 1, Value::Null);
}

fn store_field(container: Value, field: &str, value: Value) -> Result<Value, EvalErrorKind> {
    match container {
        Value::Struct(mut s) => {
            if s.set(field, value) {
                Ok(Value::Struct(s))
            } else {
                Err(EvalErrorKind::NoSuchField {
                    owner: s.name,
                    field: field.to_string(),
                })
            }
        }
        other => Err(EvalErrorKind::NoSuchField {
            owner: other.kind().name().to_string(),
            field: field.to_string(),
        }),
    }
}
