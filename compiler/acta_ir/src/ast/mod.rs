//! Syntax tree consumed by the analyzer, optimizer and evaluator.
//!
//! Trees are owned (`Box`/`Vec`) and compared structurally; the optimizer
//! builds new trees instead of mutating in place.

mod expr;
mod operators;
mod query;
mod stmt;
mod types;

pub use expr::{Expr, ExprKind};
pub use operators::{BinaryOp, DurationUnit, UnaryOp};
pub use query::{
    Cte, HierarchyClause, OrderItem, Query, Select, SelectItem, SetExpr, TableRef, UnionArm,
    WindowCall, WithClause,
};
pub use stmt::{
    AlterAction, AlterTable, Assignment, Block, ColumnSpec, CreateIndex, CreateTable, Delete,
    FunctionDecl, Insert, InsertSource, Param, Program, Stmt, StmtKind, StructDecl, StructField,
    SwitchCase, Update,
};
pub use types::{TypeExpr, TypeExprKind};

#[cfg(test)]
mod tests;
