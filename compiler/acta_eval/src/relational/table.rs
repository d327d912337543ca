//! In-memory tables with column constraints and indexes.

use acta_ir::builtins::ColumnType;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::environment::LocalScope;
use crate::errors::EvalErrorKind;
use crate::operators::as_float;
use crate::temporal::{parse_date, parse_time};
use crate::value::{hash_key, StructValue};
use crate::{ResultSet, Value};

/// A table shared by every binding that refers to it; mutated in place.
pub type SharedTable = LocalScope<Table>;

/// One stored row, keyed by column name.
pub type Row = FxHashMap<String, Value>;

#[derive(Clone, Debug, PartialEq)]
pub struct ColumnDef {
    pub name: String,
    /// Type as written (`varchar`, `integer`, ...).
    pub type_name: String,
    pub column_type: ColumnType,
    pub primary_key: bool,
    pub not_null: bool,
    pub unique: bool,
    pub default: Option<Value>,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        let type_name = type_name.into();
        ColumnDef {
            name: name.into(),
            column_type: ColumnType::from_name(&type_name),
            type_name,
            primary_key: false,
            not_null: false,
            unique: false,
            default: None,
        }
    }

    #[must_use]
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    #[must_use]
    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    #[must_use]
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    #[must_use]
    pub fn default_value(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct IndexDef {
    pub name: String,
    pub columns: Vec<String>,
    pub unique: bool,
}

impl IndexDef {
    fn key(&self, row: &Row) -> Vec<Value> {
        self.columns
            .iter()
            .map(|column| row.get(column).cloned().unwrap_or(Value::Null))
            .collect()
    }
}

#[derive(Debug)]
pub struct Table {
    name: String,
    columns: Vec<ColumnDef>,
    rows: Vec<Row>,
    indexes: FxHashMap<String, IndexDef>,
}

impl Table {
    pub fn new(name: impl Into<String>, columns: Vec<ColumnDef>) -> Result<Self, EvalErrorKind> {
        let name = name.into();
        let mut seen = FxHashSet::default();
        for column in &columns {
            if !seen.insert(column.name.as_str()) {
                return Err(EvalErrorKind::DuplicateColumn {
                    table: name,
                    column: column.name.clone(),
                });
            }
        }
        if columns.iter().filter(|c| c.primary_key).count() > 1 {
            return Err(EvalErrorKind::MultiplePrimaryKeys(name));
        }
        Ok(Table {
            name,
            columns,
            rows: Vec::new(),
            indexes: FxHashMap::default(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn index(&self, name: &str) -> Option<&IndexDef> {
        self.indexes.get(name)
    }

    /// Values of row `index` in column order.
    pub fn row_values(&self, index: usize) -> Vec<Value> {
        let Some(row) = self.rows.get(index) else {
            return Vec::new();
        };
        self.columns
            .iter()
            .map(|c| row.get(&c.name).cloned().unwrap_or(Value::Null))
            .collect()
    }

    /// Row `index` as a struct named after the table.
    pub fn row_struct(&self, index: usize) -> Option<Value> {
        (index < self.rows.len()).then(|| {
            let fields = self
                .column_names()
                .into_iter()
                .zip(self.row_values(index))
                .collect();
            Value::Struct(StructValue::new(self.name.clone(), fields))
        })
    }

    /// Snapshot of the whole table as a result set.
    pub fn to_result_set(&self) -> ResultSet {
        let rows = (0..self.rows.len()).map(|i| self.row_values(i)).collect();
        ResultSet::new(self.column_names(), rows)
    }

    fn unknown_column(&self, column: &str) -> EvalErrorKind {
        EvalErrorKind::UnknownColumn {
            table: self.name.clone(),
            column: column.to_string(),
        }
    }

    /// Convert `value` to the column's storage class.
    fn coerce(&self, column: &ColumnDef, value: Value) -> Result<Value, EvalErrorKind> {
        let mismatch = |value: &Value| EvalErrorKind::ColumnTypeMismatch {
            table: self.name.clone(),
            column: column.name.clone(),
            column_type: column.type_name.clone(),
            value: value.to_string(),
        };
        let stored = match (column.column_type, value) {
            (_, Value::Null) => Value::Null,
            (ColumnType::Any, value)
            | (ColumnType::Integer, value @ Value::Int(_))
            | (ColumnType::Float, value @ Value::Float(_))
            | (ColumnType::String, value @ Value::Str(_))
            | (ColumnType::Boolean, value @ Value::Bool(_))
            | (ColumnType::Date, value @ Value::Date(_))
            | (ColumnType::Time, value @ Value::Time(_))
            | (ColumnType::Duration, value @ Value::Duration(_)) => value,
            (ColumnType::Float, value @ Value::Int(_)) => {
                Value::Float(as_float(&value).ok_or_else(|| mismatch(&value))?)
            }
            (ColumnType::Date, Value::Str(text)) => match parse_date(&text) {
                Some(date) => Value::Date(date),
                None => return Err(mismatch(&Value::Str(text))),
            },
            (ColumnType::Time, Value::Str(text)) => match parse_time(&text) {
                Some(time) => Value::Time(time),
                None => return Err(mismatch(&Value::Str(text))),
            },
            (_, value) => return Err(mismatch(&value)),
        };
        Ok(stored)
    }

    /// Check column constraints and unique indexes over a complete row set.
    ///
    /// Callers pass the rows the table would hold after a statement, so
    /// changes are validated together and committed only if all pass.
    fn check_rows<'r>(
        &self,
        rows: impl IntoIterator<Item = &'r Row>,
    ) -> Result<(), EvalErrorKind> {
        let keyed: Vec<&ColumnDef> = self
            .columns
            .iter()
            .filter(|column| column.primary_key || column.unique)
            .collect();
        let unique_indexes: Vec<&IndexDef> =
            self.indexes.values().filter(|index| index.unique).collect();
        let mut column_keys = vec![FxHashSet::default(); keyed.len()];
        let mut index_keys = vec![FxHashSet::default(); unique_indexes.len()];

        for row in rows {
            for column in &self.columns {
                let missing = row.get(&column.name).map_or(true, Value::is_null);
                if missing && (column.not_null || column.primary_key) {
                    return Err(EvalErrorKind::NotNullViolation {
                        table: self.name.clone(),
                        column: column.name.clone(),
                    });
                }
            }

            for (column, seen) in keyed.iter().zip(&mut column_keys) {
                let Some(value) = row.get(&column.name).filter(|v| !v.is_null()) else {
                    continue;
                };
                if seen.insert(hash_key(std::slice::from_ref(value))) {
                    continue;
                }
                let primary = column.primary_key;
                let (table, value) = (self.name.clone(), value.to_string());
                let column = column.name.clone();
                return Err(if primary {
                    EvalErrorKind::PrimaryKeyViolation {
                        table,
                        column,
                        value,
                    }
                } else {
                    EvalErrorKind::UniqueViolation {
                        table,
                        column,
                        value,
                    }
                });
            }

            for (index, seen) in unique_indexes.iter().zip(&mut index_keys) {
                let values = index.key(row);
                // Rows with a null key part never conflict.
                if values.iter().any(Value::is_null) {
                    continue;
                }
                if !seen.insert(hash_key(&values)) {
                    return Err(EvalErrorKind::UniqueIndexViolation(index.name.clone()));
                }
            }
        }
        Ok(())
    }

    /// Build a stored row from `(column, value)` pairs. Missing columns take
    /// their default (or null); integers widen into float columns.
    fn build_row(&self, values: Vec<(String, Value)>) -> Result<Row, EvalErrorKind> {
        let mut row = Row::default();
        for (name, value) in values {
            let column = self.column(&name).ok_or_else(|| self.unknown_column(&name))?;
            let stored = self.coerce(column, value)?;
            row.insert(name, stored);
        }
        for column in &self.columns {
            if !row.contains_key(&column.name) {
                let default = column.default.clone().unwrap_or(Value::Null);
                let stored = self.coerce(column, default)?;
                row.insert(column.name.clone(), stored);
            }
        }
        Ok(row)
    }

    /// Insert one row.
    pub fn insert(&mut self, values: Vec<(String, Value)>) -> Result<(), EvalErrorKind> {
        self.insert_rows(vec![values]).map(|_| ())
    }

    /// Insert every row or none of them. Returns how many were inserted.
    pub fn insert_rows(
        &mut self,
        rows: Vec<Vec<(String, Value)>>,
    ) -> Result<usize, EvalErrorKind> {
        let added = rows
            .into_iter()
            .map(|values| self.build_row(values))
            .collect::<Result<Vec<_>, _>>()?;
        self.check_rows(self.rows.iter().chain(&added))?;
        let inserted = added.len();
        self.rows.extend(added);
        Ok(inserted)
    }

    /// Overwrite columns of the rows at the given positions.
    ///
    /// Constraints are checked against the final rows, so keys may shift
    /// (`id = id + 1`). On error the table is left unchanged.
    pub fn update_rows(
        &mut self,
        changes: Vec<(usize, Vec<(String, Value)>)>,
    ) -> Result<usize, EvalErrorKind> {
        let mut rows = self.rows.clone();
        let mut updated = 0;
        for (index, changes) in changes {
            let Some(row) = rows.get_mut(index) else {
                continue;
            };
            for (name, value) in changes {
                let column = self.column(&name).ok_or_else(|| self.unknown_column(&name))?;
                let stored = self.coerce(column, value)?;
                row.insert(name, stored);
            }
            updated += 1;
        }
        self.check_rows(&rows)?;
        self.rows = rows;
        Ok(updated)
    }

    /// Remove the rows whose entry in `doomed` is `true`. Returns how many
    /// were removed.
    pub fn delete_rows(&mut self, doomed: &[bool]) -> usize {
        let before = self.rows.len();
        let mut flags = doomed.iter().copied();
        self.rows.retain(|_| !flags.next().unwrap_or(false));
        before - self.rows.len()
    }

    pub fn add_column(&mut self, column: ColumnDef) -> Result<(), EvalErrorKind> {
        if self.column(&column.name).is_some() {
            return Err(EvalErrorKind::DuplicateColumn {
                table: self.name.clone(),
                column: column.name,
            });
        }
        if column.primary_key && self.columns.iter().any(|c| c.primary_key) {
            return Err(EvalErrorKind::MultiplePrimaryKeys(self.name.clone()));
        }
        let fill = self.coerce(&column, column.default.clone().unwrap_or(Value::Null))?;
        if fill.is_null() && (column.not_null || column.primary_key) && !self.rows.is_empty() {
            return Err(EvalErrorKind::NotNullViolation {
                table: self.name.clone(),
                column: column.name,
            });
        }
        let mut rows = self.rows.clone();
        for row in &mut rows {
            row.insert(column.name.clone(), fill.clone());
        }
        self.columns.push(column);
        if let Err(error) = self.check_rows(&rows) {
            self.columns.pop();
            return Err(error);
        }
        self.rows = rows;
        Ok(())
    }

    /// Drop a column and every index that covers it.
    pub fn drop_column(&mut self, name: &str) -> Result<(), EvalErrorKind> {
        let position = self
            .columns
            .iter()
            .position(|c| c.name == name)
            .ok_or_else(|| self.unknown_column(name))?;
        self.columns.remove(position);
        for row in &mut self.rows {
            row.remove(name);
        }
        self.indexes
            .retain(|_, index| !index.columns.iter().any(|c| c == name));
        Ok(())
    }

    pub fn create_index(&mut self, index: IndexDef) -> Result<(), EvalErrorKind> {
        if self.indexes.contains_key(&index.name) {
            return Err(EvalErrorKind::DuplicateIndex(index.name));
        }
        if let Some(missing) = index.columns.iter().find(|c| self.column(c).is_none()) {
            return Err(self.unknown_column(missing));
        }
        if index.unique {
            let mut seen = FxHashSet::default();
            for row in &self.rows {
                let values = index.key(row);
                if !values.iter().any(Value::is_null) && !seen.insert(hash_key(&values)) {
                    return Err(EvalErrorKind::UniqueIndexViolation(index.name));
                }
            }
        }
        self.indexes.insert(index.name.clone(), index);
        Ok(())
    }
}
