//! Host-supplied field visibility policy.

use std::fmt;

/// Relational operation a field is accessed for.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    Select,
    Insert,
    Update,
    Delete,
}

impl Operation {
    pub const fn as_str(self) -> &'static str {
        match self {
            Operation::Select => "select",
            Operation::Insert => "insert",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a visibility check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Visibility {
    Allowed,
    Denied(String),
}

/// Decides whether `operation` may touch `field` of `table`.
///
/// Row deletions are checked once with the field name `*`.
pub trait VisibilityPolicy {
    fn check(&self, table: &str, field: &str, operation: Operation) -> Visibility;
}

/// Policy that permits everything.
#[derive(Copy, Clone, Debug, Default)]
pub struct AllowAll;

impl VisibilityPolicy for AllowAll {
    fn check(&self, _table: &str, _field: &str, _operation: Operation) -> Visibility {
        Visibility::Allowed
    }
}

impl<F> VisibilityPolicy for F
where
    F: Fn(&str, &str, Operation) -> Visibility,
{
    fn check(&self, table: &str, field: &str, operation: Operation) -> Visibility {
        self(table, field, operation)
    }
}
