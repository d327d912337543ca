//! Diagnostic system for error reporting.
//!
//! Every stage before evaluation reports problems as [`Diagnostic`] values
//! collected in a [`DiagnosticBag`]:
//! - Severity (error or warning)
//! - Clear message (what went wrong)
//! - Primary span (where it went wrong)
//! - Optional notes
//!
//! Hosts receive diagnostics as plain strings; [`Diagnostic::render`]
//! produces `line:col: message` using a [`LineOffsetTable`].

mod diagnostic;
pub mod span_utils;

pub use diagnostic::{Diagnostic, DiagnosticBag, Severity};
pub use span_utils::LineOffsetTable;
