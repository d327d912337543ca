//! Table shapes known to the analyzer ahead of time.

use crate::types::TypeInfo;
use acta_ir::builtins::ColumnType;

/// Column layout of a host-provided table.
#[derive(Clone, Debug, PartialEq)]
pub struct TableSchema {
    pub name: String,
    pub columns: Vec<(String, ColumnType)>,
}

impl TableSchema {
    pub fn new(name: impl Into<String>) -> Self {
        TableSchema {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    /// Append a column; the type name uses the same spellings as
    /// `create table`.
    #[must_use]
    pub fn column(mut self, name: impl Into<String>, type_name: &str) -> Self {
        self.columns
            .push((name.into(), ColumnType::from_name(type_name)));
        self
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|(n, _)| n == name)
    }

    pub fn type_info(&self) -> TypeInfo {
        TypeInfo::Table {
            name: self.name.clone(),
            columns: self
                .columns
                .iter()
                .map(|(name, ty)| (name.clone(), TypeInfo::from_column(*ty)))
                .collect(),
        }
    }
}
