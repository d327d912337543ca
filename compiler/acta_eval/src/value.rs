//! Runtime values.
//!
//! [`Value`] is a closed enum; every consumer matches it exhaustively.
//! Scalars and aggregates (arrays, structs) have value semantics and are
//! cloned on read. Tables are shared and mutated in place, while functions,
//! result sets and trees are shared immutably. Those compare by identity.

use std::fmt;
use std::rc::Rc;

use acta_ir::FunctionDecl;
use chrono::{NaiveDate, NaiveTime, TimeDelta};

use crate::environment::{LocalScope, Scope};
use crate::relational::{HierarchicalTree, NodeId, SharedTable};
use crate::temporal::format_duration;

/// A runtime value.
#[derive(Clone, Debug)]
pub enum Value {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    Date(NaiveDate),
    Time(NaiveTime),
    Duration(TimeDelta),
    Null,
    Array(ArrayValue),
    Struct(StructValue),
    Function(Rc<FunctionValue>),
    Builtin(&'static str),
    Table(SharedTable),
    SqlResult(Rc<ResultSet>),
    Tree(Rc<HierarchicalTree>),
    Node(NodeRef),
}

/// Discriminant of a [`Value`], used in error messages.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Int,
    Float,
    Str,
    Bool,
    Date,
    Time,
    Duration,
    Null,
    Array,
    Struct,
    Function,
    Builtin,
    Table,
    SqlResult,
    Tree,
    Node,
}

impl ValueKind {
    pub const fn name(self) -> &'static str {
        match self {
            ValueKind::Int => "integer",
            ValueKind::Float => "float",
            ValueKind::Str => "string",
            ValueKind::Bool => "boolean",
            ValueKind::Date => "date",
            ValueKind::Time => "time",
            ValueKind::Duration => "duration",
            ValueKind::Null => "null",
            ValueKind::Array => "array",
            ValueKind::Struct => "struct",
            ValueKind::Function => "function",
            ValueKind::Builtin => "builtin",
            ValueKind::Table => "table",
            ValueKind::SqlResult => "sql result",
            ValueKind::Tree => "tree",
            ValueKind::Node => "node",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Array with optional element type name and fixed size.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ArrayValue {
    pub elements: Vec<Value>,
    pub element_type: Option<String>,
    /// `Some(n)` for `T[n]` declarations; such arrays never grow.
    pub size: Option<usize>,
}

impl ArrayValue {
    pub fn new(elements: Vec<Value>) -> Self {
        ArrayValue {
            elements,
            element_type: None,
            size: None,
        }
    }
}

/// Struct instance; fields keep declaration order.
#[derive(Clone, Debug, PartialEq)]
pub struct StructValue {
    pub name: String,
    pub fields: Vec<(String, Value)>,
}

impl StructValue {
    pub fn new(name: impl Into<String>, fields: Vec<(String, Value)>) -> Self {
        StructValue {
            name: name.into(),
            fields,
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value)
    }

    /// Overwrite an existing field. Returns `false` if there is no such field.
    pub fn set(&mut self, field: &str, value: Value) -> bool {
        match self.fields.iter_mut().find(|(name, _)| name == field) {
            Some((_, slot)) => {
                *slot = value;
                true
            }
            None => false,
        }
    }
}

/// A user function closed over the scope it was declared in.
pub struct FunctionValue {
    pub decl: FunctionDecl,
    pub closure: LocalScope<Scope>,
}

impl FunctionValue {
    pub fn name(&self) -> &str {
        &self.decl.name
    }

    pub fn arity(&self) -> usize {
        self.decl.params.len()
    }
}

// The closure scope usually contains this function; printing it would recurse.
impl fmt::Debug for FunctionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionValue")
            .field("name", &self.decl.name)
            .field("arity", &self.arity())
            .finish_non_exhaustive()
    }
}

/// Materialized query output.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

/// Struct name given to rows read out of tables and result sets.
pub const ROW_STRUCT: &str = "row";

impl ResultSet {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        ResultSet { columns, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    /// Row `index` as a struct keyed by column name.
    pub fn row_struct(&self, index: usize) -> Option<Value> {
        let row = self.rows.get(index)?;
        let fields = self.columns.iter().cloned().zip(row.iter().cloned()).collect();
        Some(Value::Struct(StructValue::new(ROW_STRUCT, fields)))
    }
}

/// Handle to one node of a shared hierarchy.
#[derive(Clone, Debug)]
pub struct NodeRef {
    pub tree: Rc<HierarchicalTree>,
    pub id: NodeId,
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Int(_) => ValueKind::Int,
            Value::Float(_) => ValueKind::Float,
            Value::Str(_) => ValueKind::Str,
            Value::Bool(_) => ValueKind::Bool,
            Value::Date(_) => ValueKind::Date,
            Value::Time(_) => ValueKind::Time,
            Value::Duration(_) => ValueKind::Duration,
            Value::Null => ValueKind::Null,
            Value::Array(_) => ValueKind::Array,
            Value::Struct(_) => ValueKind::Struct,
            Value::Function(_) => ValueKind::Function,
            Value::Builtin(_) => ValueKind::Builtin,
            Value::Table(_) => ValueKind::Table,
            Value::SqlResult(_) => ValueKind::SqlResult,
            Value::Tree(_) => ValueKind::Tree,
            Value::Node(_) => ValueKind::Node,
        }
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn string(text: impl Into<String>) -> Self {
        Value::Str(text.into())
    }

    pub fn array(elements: Vec<Value>) -> Self {
        Value::Array(ArrayValue::new(elements))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            (Value::Time(a), Value::Time(b)) => a == b,
            (Value::Duration(a), Value::Duration(b)) => a == b,
            (Value::Null, Value::Null) => true,
            (Value::Array(a), Value::Array(b)) => a.elements == b.elements,
            (Value::Struct(a), Value::Struct(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Builtin(a), Value::Builtin(b)) => a == b,
            (Value::Table(a), Value::Table(b)) => a.ptr_eq(b),
            (Value::SqlResult(a), Value::SqlResult(b)) => a.rows == b.rows,
            (Value::Tree(a), Value::Tree(b)) => Rc::ptr_eq(a, b),
            (Value::Node(a), Value::Node(b)) => Rc::ptr_eq(&a.tree, &b.tree) && a.id == b.id,
            _ => false,
        }
    }
}

/// Render a float so that integral values keep a decimal point.
pub(crate) fn format_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

/// Canonical text for a tuple of values, equal for tuples that `==` treats
/// as equal. Used to hash rows for `distinct`, `union`, partitions and
/// hierarchy keys.
pub(crate) fn hash_key(values: &[Value]) -> String {
    use fmt::Write;

    let mut key = String::new();
    for value in values {
        // Writing into a String cannot fail.
        let _ = match value {
            Value::Int(n) => write!(key, "n{n};"),
            Value::Float(x) if x.fract() == 0.0 && x.abs() < 9e15 => {
                write!(key, "n{};", format_float(*x).trim_end_matches(".0"))
            }
            Value::Str(s) => write!(key, "s{}:{s};", s.len()),
            other => write!(key, "{}:{other};", other.kind()),
        };
    }
    key
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(x) => f.write_str(&format_float(*x)),
            Value::Str(s) => f.write_str(s),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Value::Time(t) => write!(f, "{}", t.format("%H:%M:%S")),
            Value::Duration(d) => f.write_str(&format_duration(*d)),
            Value::Null => f.write_str("null"),
            Value::Array(array) => {
                f.write_str("[")?;
                for (i, element) in array.elements.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{element}")?;
                }
                f.write_str("]")
            }
            Value::Struct(s) => {
                write!(f, "{} {{", s.name)?;
                for (i, (name, value)) in s.fields.iter().enumerate() {
                    let sep = if i == 0 { " " } else { ", " };
                    write!(f, "{sep}{name}: {value}")?;
                }
                f.write_str(" }")
            }
            Value::Function(func) => write!(f, "<function {}>", func.name()),
            Value::Builtin(name) => write!(f, "<builtin {name}>"),
            Value::Table(table) => write!(f, "<table {}>", table.borrow().name()),
            Value::SqlResult(result) => {
                write!(f, "{}", result.columns.join(" | "))?;
                for row in &result.rows {
                    f.write_str("\n")?;
                    for (i, value) in row.iter().enumerate() {
                        if i > 0 {
                            f.write_str(" | ")?;
                        }
                        write!(f, "{value}")?;
                    }
                }
                Ok(())
            }
            Value::Tree(tree) => write!(f, "<tree of {} node(s)>", tree.len()),
            Value::Node(node) => write!(f, "<node {}>", node.tree.key(node.id)),
        }
    }
}

#[cfg(test)]
mod tests;
