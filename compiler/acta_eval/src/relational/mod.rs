//! Relational extension: tables, queries, recursive CTEs, hierarchies and
//! ranking windows.
//!
//! The data structures ([`Table`], [`HierarchicalTree`]) and pure algorithms
//! ([`fixpoint`], [`rank_rows`]) live here; the statement and query
//! executors are `Interpreter` methods in `ddl`, `dml` and `query` because
//! they evaluate row expressions in the interpreter's environment.

mod cte;
mod ddl;
mod dml;
mod hierarchy;
mod query;
mod table;
mod window;

pub use cte::fixpoint;
pub use hierarchy::{HierarchicalTree, HierarchyNode, NodeId};
pub use table::{ColumnDef, IndexDef, Row, SharedTable, Table};
pub use window::{rank_rows, RankingFunction, WindowKeys};

use acta_ir::Expr;

/// Host hook for per-table row-level security filters.
///
/// Filters are registered by the host but not applied: queries over a
/// filtered table log that a filter exists and read every row.
pub trait RowFilter {
    fn has_row_filter(&self, table: &str) -> bool;

    /// Filter predicate for `table` when read under `alias`.
    fn row_filter(&self, table: &str, alias: &str) -> Option<Expr>;
}

/// No table has a row filter.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoRowFilter;

impl RowFilter for NoRowFilter {
    fn has_row_filter(&self, _table: &str) -> bool {
        false
    }

    fn row_filter(&self, _table: &str, _alias: &str) -> Option<Expr> {
        None
    }
}

#[cfg(test)]
mod tests;
