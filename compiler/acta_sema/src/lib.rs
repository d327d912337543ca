//! Semantic analysis for Acta.
//!
//! The [`Analyzer`] walks a parsed program once, depth first. It builds a
//! scope tree parallel to the program, resolves declared types against an
//! immutable [`BuiltinTypes`] table, infers a [`TypeInfo`] for every
//! expression and checks it against its context. Relational statements are
//! checked against known table shapes and a host [`VisibilityPolicy`].
//!
//! Analysis never stops early: every violation is recorded as an error
//! diagnostic, the offending expression is typed `any`, and the walk goes
//! on. Warnings (implicit conversions) are kept separately and never block
//! evaluation.

mod analyzer;
mod schema;
mod scope;
mod types;
mod visibility;

pub use analyzer::Analyzer;
pub use schema::TableSchema;
pub use scope::{ScopeId, ScopeKind, Scopes, Symbol, SymbolKind};
pub use types::{BuiltinTypes, TypeInfo};
pub use visibility::{AllowAll, Operation, Visibility, VisibilityPolicy};

#[cfg(test)]
mod tests;
