//! Dead-code elimination for top-level expression statements.

use crate::const_fold::fold_binary;
use crate::pass::{Pass, PassKind, PassResult};
use acta_ir::builtins::{DATE_LITERAL_FORMATS, TIME_LITERAL_FORMATS};
use acta_ir::{BinaryOp, Expr, ExprKind, Program, Stmt, StmtKind};
use acta_stack::ensure_sufficient_stack;
use chrono::{NaiveDate, NaiveTime, TimeDelta};

/// Drops top-level expression statements that cannot have an effect.
///
/// The last top-level statement always stays: its value is the program
/// result. `let` statements are never removed.
pub struct DeadCodeElimination;

impl Pass for DeadCodeElimination {
    fn name(&self) -> &'static str {
        "dead_code"
    }

    fn kind(&self) -> PassKind {
        PassKind::DeadCode
    }

    fn can_apply(&self, program: &Program) -> bool {
        removable(program).any(|removable| removable)
    }

    fn apply(&self, program: &Program) -> PassResult {
        let mut removed = 0;
        let statements: Vec<Stmt> = program
            .statements
            .iter()
            .zip(removable(program))
            .filter_map(|(stmt, removable)| {
                if removable {
                    removed += 1;
                    None
                } else {
                    Some(stmt.clone())
                }
            })
            .collect();
        if removed == 0 {
            return PassResult::unchanged(program.clone());
        }
        PassResult::changed(Program::new(statements), removed)
    }
}

fn removable(program: &Program) -> impl Iterator<Item = bool> + '_ {
    let last = program.statements.len().saturating_sub(1);
    program
        .statements
        .iter()
        .enumerate()
        .map(move |(i, stmt)| i != last && is_pure_statement(stmt))
}

fn is_pure_statement(stmt: &Stmt) -> bool {
    matches!(&stmt.kind, StmtKind::Expr(expr) if is_pure(expr))
}

/// Literals and arithmetic that are known to evaluate without error.
fn is_pure(expr: &Expr) -> bool {
    known(expr).is_some()
}

/// Statically known outcome of a pure expression.
#[derive(Copy, Clone)]
enum Known {
    Int(i64),
    Float(f64),
    Str,
    Null,
    /// Valid on its own, but not an arithmetic operand.
    Other,
}

impl Known {
    #[expect(
        clippy::cast_precision_loss,
        reason = "integers widen to floats in mixed arithmetic"
    )]
    fn as_float(self) -> Option<f64> {
        match self {
            Known::Int(v) => Some(v as f64),
            Known::Float(v) => Some(v),
            _ => None,
        }
    }
}

/// What `expr` evaluates to, or `None` if it may fail or is not a
/// literal computation.
fn known(expr: &Expr) -> Option<Known> {
    ensure_sufficient_stack(|| match &expr.kind {
        ExprKind::Int(v) => Some(Known::Int(*v)),
        ExprKind::Float(v) => Some(Known::Float(*v)),
        ExprKind::Str(_) => Some(Known::Str),
        ExprKind::Null => Some(Known::Null),
        ExprKind::Bool(_) => Some(Known::Other),
        ExprKind::Date(text) => DATE_LITERAL_FORMATS
            .iter()
            .any(|format| NaiveDate::parse_from_str(text.trim(), format).is_ok())
            .then_some(Known::Other),
        ExprKind::Time(text) => TIME_LITERAL_FORMATS
            .iter()
            .any(|format| NaiveTime::parse_from_str(text.trim(), format).is_ok())
            .then_some(Known::Other),
        ExprKind::Duration { value, unit } => unit
            .to_millis(*value)
            .and_then(TimeDelta::try_milliseconds)
            .map(|_| Known::Other),
        ExprKind::Binary { op, left, right } if op.is_arithmetic() => {
            arithmetic(*op, known(left)?, known(right)?)
        }
        _ => None,
    })
}

fn arithmetic(op: BinaryOp, left: Known, right: Known) -> Option<Known> {
    match (left, right) {
        (Known::Null, _) | (_, Known::Null) => Some(Known::Null),
        (Known::Int(a), Known::Int(b)) => match op {
            BinaryOp::Div => a.checked_div(b).map(Known::Int),
            BinaryOp::Mod => a.checked_rem(b).map(Known::Int),
            _ => match fold_binary(op, &ExprKind::Int(a), &ExprKind::Int(b))? {
                ExprKind::Int(v) => Some(Known::Int(v)),
                _ => None,
            },
        },
        (Known::Int(_) | Known::Float(_), Known::Int(_) | Known::Float(_)) => {
            let (a, b) = (left.as_float()?, right.as_float()?);
            let value = match op {
                BinaryOp::Add => a + b,
                BinaryOp::Sub => a - b,
                BinaryOp::Mul => a * b,
                BinaryOp::Div | BinaryOp::Mod if b == 0.0 => return None,
                BinaryOp::Div => a / b,
                BinaryOp::Mod => a % b,
                _ => return None,
            };
            Some(Known::Float(value))
        }
        (Known::Str, _) | (_, Known::Str) if op == BinaryOp::Add => Some(Known::Str),
        _ => None,
    }
}
