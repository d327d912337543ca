//! Evaluation errors and control signals.
//!
//! Every failure the evaluator can report is an [`EvalErrorKind`]; the
//! message text comes from its `thiserror` derive. An [`EvalError`] pairs the
//! kind with the span of the offending node.
//!
//! Non-local control flow (`break`, `continue`, `fallthrough`, `return`) and
//! errors travel together as [`ControlFlow`] on the `Err` side of
//! [`EvalResult`], so every sequencing point handles "value or signal" with a
//! single exhaustive match.

use acta_ir::Span;
use thiserror::Error;

use crate::value::{Value, ValueKind};

/// Result of evaluating an expression or statement.
pub type EvalResult = Result<Value, ControlFlow>;

/// Why evaluation failed.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum EvalErrorKind {
    // Names and calls
    #[error("undefined variable `{0}`")]
    UndefinedVariable(String),
    #[error("undefined function `{0}`")]
    UndefinedFunction(String),
    #[error("{0} is not callable")]
    NotCallable(ValueKind),
    #[error("function `{name}` expects {expected} argument(s), found {found}")]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
    },
    #[error("builtin `{name}`: {message}")]
    BuiltinArgument { name: &'static str, message: String },

    // Operators
    #[error("division by zero")]
    DivisionByZero,
    #[error("integer overflow in `{0}`")]
    IntegerOverflow(&'static str),
    #[error("operator `{op}` cannot be applied to {left} and {right}")]
    InvalidOperands {
        op: &'static str,
        left: ValueKind,
        right: ValueKind,
    },
    #[error("operator `{op}` cannot be applied to {operand}")]
    InvalidOperand { op: &'static str, operand: ValueKind },
    #[error("invalid {kind} literal '{text}'")]
    InvalidLiteral { kind: &'static str, text: String },
    #[error("{context} must be boolean, found {found}")]
    NonBoolean {
        context: &'static str,
        found: ValueKind,
    },

    // Access
    #[error("index {index} out of bounds for length {len}")]
    IndexOutOfBounds { index: i64, len: usize },
    #[error("cannot index into {0}")]
    NotIndexable(ValueKind),
    #[error("index must be an integer, found {0}")]
    NonIntegerIndex(ValueKind),
    #[error("{owner} has no field `{field}`")]
    NoSuchField { owner: String, field: String },
    #[error("cannot iterate over {0}")]
    NotIterable(ValueKind),
    #[error("invalid assignment target")]
    InvalidAssignmentTarget,
    #[error("array of fixed size {size} cannot grow")]
    FixedSizeArray { size: usize },
    #[error("expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: ValueKind,
    },
    #[error("`{0}` outside of a loop or switch")]
    StrayControl(&'static str),

    // Relational
    #[error("unknown table `{0}`")]
    UnknownTable(String),
    #[error("`{0}` is not a table")]
    NotATable(String),
    #[error("table `{table}` has no column `{column}`")]
    UnknownColumn { table: String, column: String },
    #[error("column `{column}` already exists in table `{table}`")]
    DuplicateColumn { table: String, column: String },
    #[error("table `{0}` declares more than one primary key")]
    MultiplePrimaryKeys(String),
    #[error("column `{table}.{column}` cannot be null")]
    NotNullViolation { table: String, column: String },
    #[error("duplicate value {value} for primary key `{table}.{column}`")]
    PrimaryKeyViolation {
        table: String,
        column: String,
        value: String,
    },
    #[error("duplicate value {value} for unique column `{table}.{column}`")]
    UniqueViolation {
        table: String,
        column: String,
        value: String,
    },
    #[error("duplicate key in unique index `{0}`")]
    UniqueIndexViolation(String),
    #[error("index `{0}` already exists")]
    DuplicateIndex(String),
    #[error("value {value} does not fit column `{table}.{column}` of type {column_type}")]
    ColumnTypeMismatch {
        table: String,
        column: String,
        column_type: String,
        value: String,
    },
    #[error("insert into `{table}` has {values} value(s) for {columns} column(s)")]
    InsertArity {
        table: String,
        values: usize,
        columns: usize,
    },
    #[error("union arms produce different column counts ({left} and {right})")]
    UnionArity { left: usize, right: usize },
    #[error("`{name}` names {named} column(s) but its query produces {produced}")]
    CteArity {
        name: String,
        named: usize,
        produced: usize,
    },
    #[error("recursive query `{name}` exceeded {limit} iterations")]
    RecursionLimit { name: String, limit: usize },
    #[error("unsupported window function `{0}`")]
    UnsupportedWindowFunction(String),
    #[error("hierarchy contains a cycle: {0} row(s) are unreachable from any root")]
    HierarchyCycle(usize),
    #[error("`{0}` requires a `from` table")]
    MissingFrom(&'static str),
    #[error("limit must be a non-negative integer, found {0}")]
    InvalidLimit(String),
}

/// An evaluation error with the span it was raised at.
#[derive(Clone, Debug, PartialEq, Error)]
#[error("{kind}")]
pub struct EvalError {
    pub kind: EvalErrorKind,
    pub span: Span,
}

impl EvalError {
    pub fn new(kind: EvalErrorKind, span: Span) -> Self {
        EvalError { kind, span }
    }

    /// Attach a span to an error raised without one.
    #[must_use]
    pub fn at(mut self, span: Span) -> Self {
        if self.span == Span::DUMMY {
            self.span = span;
        }
        self
    }
}

impl From<EvalErrorKind> for EvalError {
    fn from(kind: EvalErrorKind) -> Self {
        EvalError::new(kind, Span::DUMMY)
    }
}

/// Signal that interrupts ordinary sequencing.
#[derive(Clone, Debug, PartialEq)]
pub enum ControlFlow {
    Break,
    Continue,
    Fallthrough,
    Return(Value),
    Error(EvalError),
}

impl ControlFlow {
    /// Keyword that raised this signal, for stray-signal diagnostics.
    pub(crate) fn keyword(&self) -> &'static str {
        match self {
            ControlFlow::Break => "break",
            ControlFlow::Continue => "continue",
            ControlFlow::Fallthrough => "fallthrough",
            ControlFlow::Return(_) => "return",
            ControlFlow::Error(_) => "error",
        }
    }
}

impl From<EvalError> for ControlFlow {
    fn from(error: EvalError) -> Self {
        ControlFlow::Error(error)
    }
}

impl From<EvalErrorKind> for ControlFlow {
    fn from(kind: EvalErrorKind) -> Self {
        ControlFlow::Error(kind.into())
    }
}

/// Lift an error kind at `span` into the `Err` side of any result.
pub(crate) fn fail<T>(kind: EvalErrorKind, span: Span) -> Result<T, ControlFlow> {
    Err(ControlFlow::Error(EvalError::new(kind, span)))
}

/// Extension for attaching a span to kind-level results.
pub(crate) trait WithSpan<T> {
    fn at(self, span: Span) -> Result<T, ControlFlow>;
}

impl<T> WithSpan<T> for Result<T, EvalErrorKind> {
    fn at(self, span: Span) -> Result<T, ControlFlow> {
        self.map_err(|kind| ControlFlow::Error(EvalError::new(kind, span)))
    }
}
