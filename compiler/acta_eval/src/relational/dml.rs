//! Data statements: `insert`, `update` and `delete`.
//!
//! `update` and `delete` evaluate every row expression against a snapshot
//! taken before the statement runs, then apply the changes. Expressions can
//! therefore read the table they modify.
//!
//! Writes are all-or-nothing: constraints are checked against the rows the
//! table would hold afterwards, and a violation leaves it untouched.

use acta_ir::{Delete, Insert, InsertSource, Span, Update};
use tracing::debug;

use super::table::SharedTable;
use crate::errors::{fail, EvalErrorKind, EvalResult, WithSpan};
use crate::interpreter::Interpreter;
use crate::Value;

fn count(n: usize) -> Value {
    Value::Int(i64::try_from(n).unwrap_or(i64::MAX))
}

/// Column names and row values of a table at this moment.
fn snapshot(table: &SharedTable) -> (String, Vec<String>, Vec<Vec<Value>>) {
    let table = table.borrow();
    let rows = (0..table.len()).map(|i| table.row_values(i)).collect();
    (table.name().to_string(), table.column_names(), rows)
}

impl Interpreter<'_> {
    pub(crate) fn exec_insert(&mut self, insert: &Insert, span: Span) -> EvalResult {
        let table = self.table_named(&insert.table, span)?;
        let columns = if insert.columns.is_empty() {
            table.borrow().column_names()
        } else {
            insert.columns.clone()
        };

        let rows = match &insert.source {
            InsertSource::Values(tuples) => tuples
                .iter()
                .map(|tuple| {
                    tuple
                        .iter()
                        .map(|expr| self.eval(expr))
                        .collect::<Result<Vec<_>, _>>()
                })
                .collect::<Result<Vec<_>, _>>()?,
            InsertSource::Query(query) => self.eval_query(query)?.rows,
        };

        let mut pending: Vec<Vec<(String, Value)>> = Vec::with_capacity(rows.len());
        for values in rows {
            if values.len() != columns.len() {
                return fail(
                    EvalErrorKind::InsertArity {
                        table: insert.table.clone(),
                        values: values.len(),
                        columns: columns.len(),
                    },
                    span,
                );
            }
            pending.push(columns.iter().cloned().zip(values).collect());
        }
        let inserted = table.borrow_mut().insert_rows(pending).at(span)?;
        debug!(table = %insert.table, rows = inserted, "inserted rows");
        Ok(count(inserted))
    }

    pub(crate) fn exec_update(&mut self, update: &Update, span: Span) -> EvalResult {
        let table = self.table_named(&update.table, span)?;
        let (name, columns, rows) = snapshot(&table);

        let mut changes = Vec::new();
        for (index, values) in rows.iter().enumerate() {
            let row_changes = self.with_env_scope(|this| {
                this.bind_row(&columns, values, &name, None);
                if let Some(filter) = &update.filter {
                    if !this.condition(filter, "where condition")? {
                        return Ok(None);
                    }
                }
                update
                    .assignments
                    .iter()
                    .map(|assignment| {
                        this.eval(&assignment.value)
                            .map(|value| (assignment.column.clone(), value))
                    })
                    .collect::<Result<Vec<_>, _>>()
                    .map(Some)
            })?;
            if let Some(row_changes) = row_changes {
                changes.push((index, row_changes));
            }
        }

        let updated = table.borrow_mut().update_rows(changes).at(span)?;
        debug!(table = %update.table, rows = updated, "updated rows");
        Ok(count(updated))
    }

    pub(crate) fn exec_delete(&mut self, delete: &Delete, span: Span) -> EvalResult {
        let table = self.table_named(&delete.table, span)?;
        let (name, columns, rows) = snapshot(&table);

        let doomed = match &delete.filter {
            Some(filter) => rows
                .iter()
                .map(|values| {
                    self.with_env_scope(|this| {
                        this.bind_row(&columns, values, &name, None);
                        this.condition(filter, "where condition")
                    })
                })
                .collect::<Result<Vec<_>, _>>()?,
            None => vec![true; rows.len()],
        };

        let deleted = table.borrow_mut().delete_rows(&doomed);
        debug!(table = %delete.table, rows = deleted, "deleted rows");
        Ok(count(deleted))
    }
}
