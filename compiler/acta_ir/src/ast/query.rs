//! Relational query nodes.

use super::expr::Expr;
use crate::Span;

/// `[with ...] select ... [union [all] select ...]`
#[derive(Clone, Debug, PartialEq)]
pub struct Query {
    pub with: Option<WithClause>,
    pub body: SetExpr,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct WithClause {
    pub recursive: bool,
    pub ctes: Vec<Cte>,
}

/// A named common table expression.
///
/// For recursive CTEs the first member of `body` is the anchor and the
/// remaining members form the recursive step.
#[derive(Clone, Debug, PartialEq)]
pub struct Cte {
    pub name: String,
    pub columns: Vec<String>,
    pub body: SetExpr,
    pub span: Span,
}

/// `select` chained with `union` / `union all`.
#[derive(Clone, Debug, PartialEq)]
pub struct SetExpr {
    pub first: Select,
    pub rest: Vec<UnionArm>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct UnionArm {
    /// `union all` keeps duplicates; plain `union` removes them.
    pub all: bool,
    pub select: Select,
}

impl SetExpr {
    pub fn single(select: Select) -> Self {
        SetExpr {
            first: select,
            rest: Vec::new(),
        }
    }

    /// All member selects in source order.
    pub fn selects(&self) -> impl Iterator<Item = &Select> {
        std::iter::once(&self.first).chain(self.rest.iter().map(|arm| &arm.select))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Select {
    pub distinct: bool,
    pub projection: Vec<SelectItem>,
    pub from: Option<TableRef>,
    pub hierarchy: Option<HierarchyClause>,
    pub filter: Option<Expr>,
    pub order_by: Vec<OrderItem>,
    pub limit: Option<Expr>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SelectItem {
    /// `*`
    Wildcard,
    Expr {
        expr: Expr,
        alias: Option<String>,
    },
    Window(WindowCall),
}

impl SelectItem {
    /// Output column name for this projection item.
    pub fn output_name(&self, position: usize) -> String {
        match self {
            SelectItem::Wildcard => "*".to_string(),
            SelectItem::Expr {
                alias: Some(alias), ..
            } => alias.clone(),
            SelectItem::Expr { expr, alias: None } => match &expr.kind {
                super::ExprKind::Ident(name) => name.clone(),
                super::ExprKind::Field { field, .. } => field.clone(),
                _ => format!("column{}", position + 1),
            },
            SelectItem::Window(window) => window
                .alias
                .clone()
                .unwrap_or_else(|| window.function.clone()),
        }
    }
}

/// `name(args) over (partition by ... order by ...)`
#[derive(Clone, Debug, PartialEq)]
pub struct WindowCall {
    pub function: String,
    pub args: Vec<Expr>,
    pub partition_by: Vec<Expr>,
    pub order_by: Vec<OrderItem>,
    pub alias: Option<String>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TableRef {
    pub name: String,
    pub alias: Option<String>,
    pub span: Span,
}

/// `hierarchy by key parent parent_key [start with cond]`
#[derive(Clone, Debug, PartialEq)]
pub struct HierarchyClause {
    pub key: String,
    pub parent: String,
    pub start_with: Option<Expr>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct OrderItem {
    pub expr: Expr,
    pub descending: bool,
}
