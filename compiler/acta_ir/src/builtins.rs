//! Catalog of built-in functions and type names.
//!
//! Shared by the analyzer (arity/type checks) and the evaluator (dispatch),
//! so both agree on what a bare call like `len(x)` refers to.

/// A built-in function's name and accepted argument count.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BuiltinFunction {
    pub name: &'static str,
    pub min_args: usize,
    /// `None` means variadic.
    pub max_args: Option<usize>,
}

impl BuiltinFunction {
    const fn fixed(name: &'static str, args: usize) -> Self {
        BuiltinFunction {
            name,
            min_args: args,
            max_args: Some(args),
        }
    }

    pub fn accepts(&self, count: usize) -> bool {
        count >= self.min_args && self.max_args.map_or(true, |max| count <= max)
    }
}

pub const BUILTIN_FUNCTIONS: &[BuiltinFunction] = &[
    BuiltinFunction::fixed("len", 1),
    BuiltinFunction::fixed("append", 2),
    BuiltinFunction {
        name: "print",
        min_args: 0,
        max_args: None,
    },
    BuiltinFunction::fixed("now", 0),
    BuiltinFunction::fixed("today", 0),
    BuiltinFunction::fixed("string", 1),
    BuiltinFunction::fixed("abs", 1),
    BuiltinFunction::fixed("columns", 1),
    BuiltinFunction::fixed("hierarchy", 3),
    BuiltinFunction::fixed("roots", 1),
    BuiltinFunction::fixed("children", 1),
    BuiltinFunction::fixed("parent", 1),
    BuiltinFunction::fixed("level", 1),
    BuiltinFunction::fixed("traverse", 1),
];

/// Look up a built-in function by name.
pub fn lookup_builtin(name: &str) -> Option<&'static BuiltinFunction> {
    BUILTIN_FUNCTIONS.iter().find(|builtin| builtin.name == name)
}

/// Ranking functions accepted in `... over (...)` projections.
pub const WINDOW_FUNCTIONS: &[&str] = &["row_number", "rank", "dense_rank"];

/// Scalar type names every program can use without declaring them.
pub const BUILTIN_TYPE_NAMES: &[&str] = &[
    "integer", "float", "string", "boolean", "time", "date", "duration", "any",
];

/// Column name exposed by hierarchical queries.
/// `chrono` layouts accepted by `date'...'` literals, tried in order.
pub const DATE_LITERAL_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y"];

/// `chrono` layouts accepted by `time'...'` literals, tried in order.
pub const TIME_LITERAL_FORMATS: &[&str] = &["%H:%M:%S", "%H:%M"];

pub const LEVEL_COLUMN: &str = "level";

/// Storage class of a table column, derived from its declared type name.
///
/// Common SQL spellings (`int`, `varchar`, `text`, `real`, …) map onto the
/// language's scalar types; anything unrecognized stores values unchanged.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ColumnType {
    Integer,
    Float,
    String,
    Boolean,
    Date,
    Time,
    Duration,
    Any,
}

impl ColumnType {
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "integer" | "int" | "bigint" | "smallint" => ColumnType::Integer,
            "float" | "real" | "double" | "decimal" | "numeric" => ColumnType::Float,
            "string" | "text" | "varchar" | "char" => ColumnType::String,
            "boolean" | "bool" => ColumnType::Boolean,
            "date" => ColumnType::Date,
            "time" => ColumnType::Time,
            "duration" => ColumnType::Duration,
            _ => ColumnType::Any,
        }
    }
}
