//! Static types used during analysis.

use acta_ir::builtins::{ColumnType, BUILTIN_TYPE_NAMES};
use rustc_hash::FxHashMap;
use std::fmt;

/// Inferred or declared type of an expression or symbol.
#[derive(Clone, Debug, PartialEq)]
pub enum TypeInfo {
    /// Unknown or deliberately unchecked; compatible with everything.
    Any,
    Integer,
    Float,
    String,
    Boolean,
    Date,
    Time,
    Duration,
    Null,
    /// Result of statements and calls that produce nothing.
    Void,
    Array {
        element: Box<TypeInfo>,
        size: Option<usize>,
    },
    Struct {
        name: String,
        fields: Vec<(String, TypeInfo)>,
    },
    Table {
        name: String,
        columns: Vec<(String, TypeInfo)>,
    },
    SqlResult,
    Function {
        params: Vec<TypeInfo>,
        ret: Box<TypeInfo>,
    },
    Tree,
    Node,
}

impl TypeInfo {
    pub fn array_of(element: TypeInfo) -> Self {
        TypeInfo::Array {
            element: Box::new(element),
            size: None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, TypeInfo::Integer | TypeInfo::Float)
    }

    pub fn is_any(&self) -> bool {
        matches!(self, TypeInfo::Any)
    }

    /// `true` when values of `self` may be used where `other` is expected
    /// and vice versa.
    pub fn is_compatible(&self, other: &TypeInfo) -> bool {
        match (self, other) {
            (TypeInfo::Any | TypeInfo::Null, _) | (_, TypeInfo::Any | TypeInfo::Null) => true,
            (a, b) if a.is_numeric() && b.is_numeric() => true,
            (TypeInfo::Array { element: a, .. }, TypeInfo::Array { element: b, .. }) => {
                a.is_compatible(b)
            }
            (TypeInfo::Struct { name: a, .. }, TypeInfo::Struct { name: b, .. })
            | (TypeInfo::Table { name: a, .. }, TypeInfo::Table { name: b, .. }) => a == b,
            (TypeInfo::Function { .. }, TypeInfo::Function { .. }) => true,
            (a, b) => std::mem::discriminant(a) == std::mem::discriminant(b),
        }
    }

    /// Type of a column with the given storage class.
    pub fn from_column(column: ColumnType) -> Self {
        match column {
            ColumnType::Integer => TypeInfo::Integer,
            ColumnType::Float => TypeInfo::Float,
            ColumnType::String => TypeInfo::String,
            ColumnType::Boolean => TypeInfo::Boolean,
            ColumnType::Date => TypeInfo::Date,
            ColumnType::Time => TypeInfo::Time,
            ColumnType::Duration => TypeInfo::Duration,
            ColumnType::Any => TypeInfo::Any,
        }
    }

    /// Type of a struct field or table column, if present.
    pub fn member(&self, name: &str) -> Option<&TypeInfo> {
        let members = match self {
            TypeInfo::Struct { fields, .. } => fields,
            TypeInfo::Table { columns, .. } => columns,
            _ => return None,
        };
        members.iter().find(|(n, _)| n == name).map(|(_, ty)| ty)
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeInfo::Any => f.write_str("any"),
            TypeInfo::Integer => f.write_str("integer"),
            TypeInfo::Float => f.write_str("float"),
            TypeInfo::String => f.write_str("string"),
            TypeInfo::Boolean => f.write_str("boolean"),
            TypeInfo::Date => f.write_str("date"),
            TypeInfo::Time => f.write_str("time"),
            TypeInfo::Duration => f.write_str("duration"),
            TypeInfo::Null => f.write_str("null"),
            TypeInfo::Void => f.write_str("void"),
            TypeInfo::Array {
                element,
                size: Some(n),
            } => write!(f, "{element}[{n}]"),
            TypeInfo::Array {
                element,
                size: None,
            } => write!(f, "{element}[]"),
            TypeInfo::Struct { name, .. } => f.write_str(name),
            TypeInfo::Table { name, .. } => write!(f, "table {name}"),
            TypeInfo::SqlResult => f.write_str("sql result"),
            TypeInfo::Function { params, ret } => {
                f.write_str("function(")?;
                for (i, param) in params.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{param}")?;
                }
                write!(f, "): {ret}")
            }
            TypeInfo::Tree => f.write_str("tree"),
            TypeInfo::Node => f.write_str("node"),
        }
    }
}

/// Immutable table of the built-in scalar types.
///
/// Built once by the host and handed to every [`Analyzer`](crate::Analyzer)
/// it creates.
#[derive(Clone, Debug)]
pub struct BuiltinTypes {
    types: FxHashMap<&'static str, TypeInfo>,
}

impl BuiltinTypes {
    pub fn new() -> Self {
        let mut types = FxHashMap::default();
        for &name in BUILTIN_TYPE_NAMES {
            let ty = match name {
                "integer" => TypeInfo::Integer,
                "float" => TypeInfo::Float,
                "string" => TypeInfo::String,
                "boolean" => TypeInfo::Boolean,
                "time" => TypeInfo::Time,
                "date" => TypeInfo::Date,
                "duration" => TypeInfo::Duration,
                _ => TypeInfo::Any,
            };
            types.insert(name, ty);
        }
        BuiltinTypes { types }
    }

    pub fn get(&self, name: &str) -> Option<&TypeInfo> {
        self.types.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl Default for BuiltinTypes {
    fn default() -> Self {
        Self::new()
    }
}
