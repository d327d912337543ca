//! Expression nodes.

use super::operators::{BinaryOp, DurationUnit, UnaryOp};
use super::query::Query;
use crate::Span;

/// Expression node.
#[derive(Clone, Debug, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

/// Expression variants.
#[derive(Clone, Debug, PartialEq)]
pub enum ExprKind {
    // Literals
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    Null,
    /// Raw body of a `date'...'` literal; parsed at evaluation time.
    Date(String),
    /// Raw body of a `time'...'` literal; parsed at evaluation time.
    Time(String),
    Duration {
        value: i64,
        unit: DurationUnit,
    },

    Ident(String),

    /// `[a, b, c]`
    Array(Vec<Expr>),

    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },

    /// `target = value`, where target is an identifier, index or field.
    Assign {
        target: Box<Expr>,
        value: Box<Expr>,
    },

    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    Index {
        target: Box<Expr>,
        index: Box<Expr>,
    },
    Field {
        target: Box<Expr>,
        field: String,
    },

    /// `operand is null` / `operand is not null`
    IsNull {
        operand: Box<Expr>,
        negated: bool,
    },

    /// A relational query used as an expression.
    Query(Box<Query>),
}

impl Expr {
    #[inline]
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Expr { kind, span }
    }

    pub fn int(value: i64) -> Self {
        Expr::new(ExprKind::Int(value), Span::DUMMY)
    }

    pub fn float(value: f64) -> Self {
        Expr::new(ExprKind::Float(value), Span::DUMMY)
    }

    pub fn bool(value: bool) -> Self {
        Expr::new(ExprKind::Bool(value), Span::DUMMY)
    }

    pub fn string(value: impl Into<String>) -> Self {
        Expr::new(ExprKind::Str(value.into()), Span::DUMMY)
    }

    pub fn ident(name: impl Into<String>) -> Self {
        Expr::new(ExprKind::Ident(name.into()), Span::DUMMY)
    }

    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Self {
        let span = left.span.merge(right.span);
        Expr::new(
            ExprKind::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            },
            span,
        )
    }

    pub fn unary(op: UnaryOp, operand: Expr) -> Self {
        let span = operand.span;
        Expr::new(
            ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
            span,
        )
    }

    pub fn call(callee: impl Into<String>, args: Vec<Expr>) -> Self {
        Expr::new(
            ExprKind::Call {
                callee: Box::new(Expr::ident(callee)),
                args,
            },
            Span::DUMMY,
        )
    }

    /// Literal scalar (no identifiers, no sub-expressions).
    pub fn is_literal(&self) -> bool {
        matches!(
            self.kind,
            ExprKind::Int(_)
                | ExprKind::Float(_)
                | ExprKind::Str(_)
                | ExprKind::Bool(_)
                | ExprKind::Null
                | ExprKind::Date(_)
                | ExprKind::Time(_)
                | ExprKind::Duration { .. }
        )
    }

    /// The identifier name if this is a bare identifier.
    pub fn as_ident(&self) -> Option<&str> {
        match &self.kind {
            ExprKind::Ident(name) => Some(name),
            _ => None,
        }
    }
}
