//! Acta IR - syntax tree and source locations.
//!
//! This crate contains the data structures shared by every stage of the
//! Acta pipeline:
//! - Spans for source locations
//! - The syntax tree (statements, expressions, relational nodes)
//! - A read-only [`visitor`] for analyses that need whole-tree walks
//! - The catalog of built-in functions and type names
//!
//! The tree is produced by `acta_parse` (or built directly by a host) and
//! consumed read-only by the analyzer, optimizer and evaluator.

pub mod ast;
pub mod builtins;
mod span;
pub mod visitor;

pub use ast::*;
pub use span::Span;
