//! Schema statements: `create table`, `create index`, `drop table` and
//! `alter table`.

use acta_ir::{AlterAction, AlterTable, ColumnSpec, CreateIndex, CreateTable, Span};
use tracing::debug;

use super::table::{ColumnDef, IndexDef, SharedTable, Table};
use crate::environment::LocalScope;
use crate::errors::{fail, ControlFlow, EvalErrorKind, EvalResult, WithSpan};
use crate::interpreter::Interpreter;
use crate::Value;

impl Interpreter<'_> {
    /// The table bound to `name`.
    pub(crate) fn table_named(&self, name: &str, span: Span) -> Result<SharedTable, ControlFlow> {
        match self.env.lookup_relation(name) {
            Some(Value::Table(table)) => Ok(table),
            Some(_) => fail(EvalErrorKind::NotATable(name.to_string()), span),
            None => match self.env.lookup(name) {
                Some(Value::Null) | None => fail(EvalErrorKind::UnknownTable(name.to_string()), span),
                Some(_) => fail(EvalErrorKind::NotATable(name.to_string()), span),
            },
        }
    }

    fn column_def(&mut self, spec: &ColumnSpec) -> Result<ColumnDef, ControlFlow> {
        let mut column = ColumnDef::new(spec.name.clone(), spec.type_name.clone());
        column.primary_key = spec.primary_key;
        column.not_null = spec.not_null;
        column.unique = spec.unique;
        if let Some(default) = &spec.default {
            column.default = Some(self.eval(default)?);
        }
        Ok(column)
    }

    pub(crate) fn exec_create_table(&mut self, create: &CreateTable, span: Span) -> EvalResult {
        let columns = create
            .columns
            .iter()
            .map(|spec| self.column_def(spec))
            .collect::<Result<Vec<_>, _>>()?;
        let table = Table::new(create.name.clone(), columns).at(span)?;
        debug!(table = %create.name, columns = create.columns.len(), "created table");

        let table = Value::Table(LocalScope::new(table));
        self.env.define(create.name.clone(), table.clone());
        Ok(table)
    }

    pub(crate) fn exec_create_index(&mut self, create: &CreateIndex, span: Span) -> EvalResult {
        let table = self.table_named(&create.table, span)?;
        table
            .borrow_mut()
            .create_index(IndexDef {
                name: create.name.clone(),
                columns: create.columns.clone(),
                unique: create.unique,
            })
            .at(span)?;
        debug!(index = %create.name, table = %create.table, unique = create.unique, "created index");
        Ok(Value::Null)
    }

    pub(crate) fn exec_drop_table(&mut self, name: &str, span: Span) -> EvalResult {
        self.table_named(name, span)?;
        self.env.assign(name, Value::Null);
        debug!(table = %name, "dropped table");
        Ok(Value::Null)
    }

    pub(crate) fn exec_alter_table(&mut self, alter: &AlterTable, span: Span) -> EvalResult {
        let table = self.table_named(&alter.table, span)?;
        match &alter.action {
            AlterAction::AddColumn(spec) => {
                let column = self.column_def(spec)?;
                table.borrow_mut().add_column(column).at(span)?;
            }
            AlterAction::DropColumn(column) => {
                table.borrow_mut().drop_column(column).at(span)?;
            }
        }
        Ok(Value::Null)
    }
}
