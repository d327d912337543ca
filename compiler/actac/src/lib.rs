//! Acta host driver.
//!
//! Embedding hosts call [`run_program`] or [`compile_expression`], or build a
//! [`Session`] when they need non-default limits or a captured `print`
//! stream. The `acta` binary is a thin command-line front end over the same
//! pipeline:
//!
//! ```text
//! source ──► acta_parse ──► acta_sema ──► acta_opt ──► acta_eval ──► Value
//! ```
//!
//! Parse and semantic errors are fatal; semantic warnings are reported
//! alongside the result.

pub mod commands;
mod session;

pub use session::{type_of, RunConfig, RunError, RunOutput, Session, Stage};

use std::sync::Once;

use acta_eval::{RowFilter, Value};
use acta_ir::Expr;
use acta_sema::{TableSchema, VisibilityPolicy};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Call this once at startup. Safe to call multiple times.
/// Enable with `RUST_LOG=acta_eval=debug` or `RUST_LOG=acta_opt=trace`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        // Only initialize if RUST_LOG is set
        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(true)
                        .with_level(true),
                )
                .with(filter)
                .init();
        }
    });
}

/// Run a program with default limits, `print` going to stdout.
///
/// `parameters` are bound in the global scope before the program starts.
pub fn run_program(
    source: &str,
    policy: &dyn VisibilityPolicy,
    row_filter: &dyn RowFilter,
    parameters: &[(&str, Value)],
) -> RunOutput {
    parameters
        .iter()
        .fold(
            Session::default().policy(policy).row_filter(row_filter),
            |session, (name, value)| session.parameter(*name, value.clone()),
        )
        .run(source)
}

/// Parse a row predicate and check it against `schema`.
///
/// Columns resolve bare or as `alias.column`; each referenced column must be
/// visible to `select` under `policy`.
pub fn compile_expression(
    source: &str,
    schema: &TableSchema,
    alias: Option<&str>,
    policy: &dyn VisibilityPolicy,
) -> (Option<Expr>, Vec<String>) {
    Session::default()
        .policy(policy)
        .compile_expression(source, schema, alias)
}
