//! Type annotations as written in source.

use crate::Span;
use std::fmt;

/// A parsed type annotation: `integer`, `Point`, `float[]`, `string[10]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeExpr {
    pub kind: TypeExprKind,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeExprKind {
    Named(String),
    Array {
        element: Box<TypeExpr>,
        size: Option<usize>,
    },
}

impl TypeExpr {
    pub fn named(name: impl Into<String>) -> Self {
        TypeExpr {
            kind: TypeExprKind::Named(name.into()),
            span: Span::DUMMY,
        }
    }

    pub fn array(element: TypeExpr, size: Option<usize>) -> Self {
        TypeExpr {
            kind: TypeExprKind::Array {
                element: Box::new(element),
                size,
            },
            span: Span::DUMMY,
        }
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TypeExprKind::Named(name) => f.write_str(name),
            TypeExprKind::Array {
                element,
                size: Some(n),
            } => write!(f, "{element}[{n}]"),
            TypeExprKind::Array {
                element,
                size: None,
            } => write!(f, "{element}[]"),
        }
    }
}
