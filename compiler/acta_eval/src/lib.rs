//! Acta Eval - tree-walking evaluator for Acta programs.
//!
//! # Architecture
//!
//! The evaluator uses:
//! - `Environment`: parent-linked scopes shared with function closures
//! - `evaluate_binary` / `evaluate_unary`: direct enum-based operator dispatch
//! - `Interpreter`: statement and expression walker, built with
//!   `InterpreterBuilder`
//! - `relational`: in-memory tables, queries, recursive CTEs, hierarchies
//!   and ranking windows
//!
//! Errors and non-local exits (`break`, `return`, ...) travel on the same
//! `Err` channel as [`ControlFlow`] signals; the public entry points turn
//! them back into an [`EvalError`].

mod environment;
pub mod errors;
pub mod interpreter;
mod operators;
mod print_handler;
pub mod relational;
mod temporal;
mod value;

pub use environment::{Environment, LocalScope, Scope};
pub use errors::{ControlFlow, EvalError, EvalErrorKind, EvalResult};
pub use interpreter::{EvalConfig, Interpreter, InterpreterBuilder, MAX_RECURSIVE_ITERATIONS};
pub use operators::{compare, evaluate_binary, evaluate_unary, loose_eq, sort_order};
pub use print_handler::{
    buffer_handler, silent_handler, stdout_handler, PrintHandler, SharedPrintHandler,
};
pub use relational::{NoRowFilter, RowFilter};
pub use temporal::format_duration;
pub use value::{
    ArrayValue, FunctionValue, NodeRef, ResultSet, StructValue, Value, ValueKind, ROW_STRUCT,
};
