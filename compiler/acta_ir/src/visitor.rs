//! AST Visitor Pattern
//!
//! A single `Visitor` trait walks programs read-only. Default
//! implementations call the `walk_*` functions that traverse children;
//! override `visit_*` methods to add behavior at specific nodes.
//!
//! ```text
//! struct CountCalls {
//!     count: usize,
//! }
//!
//! impl<'ast> Visitor<'ast> for CountCalls {
//!     fn visit_expr(&mut self, expr: &'ast Expr) {
//!         if matches!(expr.kind, ExprKind::Call { .. }) {
//!             self.count += 1;
//!         }
//!         walk_expr(self, expr);
//!     }
//! }
//! ```

use crate::ast::{
    AlterAction, Block, Expr, ExprKind, InsertSource, Program, Query, Select, SelectItem, SetExpr,
    Stmt, StmtKind,
};

/// AST Visitor trait.
pub trait Visitor<'ast> {
    fn visit_program(&mut self, program: &'ast Program) {
        for stmt in &program.statements {
            self.visit_stmt(stmt);
        }
    }

    fn visit_stmt(&mut self, stmt: &'ast Stmt) {
        walk_stmt(self, stmt);
    }

    fn visit_block(&mut self, block: &'ast Block) {
        for stmt in &block.statements {
            self.visit_stmt(stmt);
        }
    }

    fn visit_expr(&mut self, expr: &'ast Expr) {
        walk_expr(self, expr);
    }

    fn visit_query(&mut self, query: &'ast Query) {
        walk_query(self, query);
    }
}

pub fn walk_stmt<'ast, V: Visitor<'ast> + ?Sized>(visitor: &mut V, stmt: &'ast Stmt) {
    match &stmt.kind {
        StmtKind::Let { init, .. } => {
            if let Some(init) = init {
                visitor.visit_expr(init);
            }
        }
        StmtKind::Expr(expr) => visitor.visit_expr(expr),
        StmtKind::Return(value) => {
            if let Some(value) = value {
                visitor.visit_expr(value);
            }
        }
        StmtKind::Block(block) => visitor.visit_block(block),
        StmtKind::If {
            cond,
            then_branch,
            else_branch,
        } => {
            visitor.visit_expr(cond);
            visitor.visit_block(then_branch);
            if let Some(else_branch) = else_branch {
                visitor.visit_stmt(else_branch);
            }
        }
        StmtKind::While { cond, body } => {
            visitor.visit_expr(cond);
            visitor.visit_block(body);
        }
        StmtKind::For {
            init,
            cond,
            update,
            body,
        } => {
            if let Some(init) = init {
                visitor.visit_stmt(init);
            }
            if let Some(cond) = cond {
                visitor.visit_expr(cond);
            }
            if let Some(update) = update {
                visitor.visit_expr(update);
            }
            visitor.visit_block(body);
        }
        StmtKind::ForIn { iterable, body, .. } => {
            visitor.visit_expr(iterable);
            visitor.visit_block(body);
        }
        StmtKind::Switch { subject, cases } => {
            visitor.visit_expr(subject);
            for case in cases {
                for value in &case.values {
                    visitor.visit_expr(value);
                }
                for stmt in &case.body {
                    visitor.visit_stmt(stmt);
                }
            }
        }
        StmtKind::Function(function) => visitor.visit_block(&function.body),
        StmtKind::CreateTable(create) => {
            for column in &create.columns {
                if let Some(default) = &column.default {
                    visitor.visit_expr(default);
                }
            }
        }
        StmtKind::AlterTable(alter) => {
            if let AlterAction::AddColumn(column) = &alter.action {
                if let Some(default) = &column.default {
                    visitor.visit_expr(default);
                }
            }
        }
        StmtKind::Insert(insert) => match &insert.source {
            InsertSource::Values(rows) => {
                for value in rows.iter().flatten() {
                    visitor.visit_expr(value);
                }
            }
            InsertSource::Query(query) => visitor.visit_query(query),
        },
        StmtKind::Update(update) => {
            for assignment in &update.assignments {
                visitor.visit_expr(&assignment.value);
            }
            if let Some(filter) = &update.filter {
                visitor.visit_expr(filter);
            }
        }
        StmtKind::Delete(delete) => {
            if let Some(filter) = &delete.filter {
                visitor.visit_expr(filter);
            }
        }
        StmtKind::Break
        | StmtKind::Continue
        | StmtKind::Fallthrough
        | StmtKind::Struct(_)
        | StmtKind::CreateIndex(_)
        | StmtKind::DropTable { .. } => {}
    }
}

pub fn walk_expr<'ast, V: Visitor<'ast> + ?Sized>(visitor: &mut V, expr: &'ast Expr) {
    match &expr.kind {
        ExprKind::Array(elements) => {
            for element in elements {
                visitor.visit_expr(element);
            }
        }
        ExprKind::Binary { left, right, .. } => {
            visitor.visit_expr(left);
            visitor.visit_expr(right);
        }
        ExprKind::Unary { operand, .. } | ExprKind::IsNull { operand, .. } => {
            visitor.visit_expr(operand);
        }
        ExprKind::Assign { target, value } => {
            visitor.visit_expr(target);
            visitor.visit_expr(value);
        }
        ExprKind::Call { callee, args } => {
            visitor.visit_expr(callee);
            for arg in args {
                visitor.visit_expr(arg);
            }
        }
        ExprKind::Index { target, index } => {
            visitor.visit_expr(target);
            visitor.visit_expr(index);
        }
        ExprKind::Field { target, .. } => visitor.visit_expr(target),
        ExprKind::Query(query) => visitor.visit_query(query),
        ExprKind::Int(_)
        | ExprKind::Float(_)
        | ExprKind::Str(_)
        | ExprKind::Bool(_)
        | ExprKind::Null
        | ExprKind::Date(_)
        | ExprKind::Time(_)
        | ExprKind::Duration { .. }
        | ExprKind::Ident(_) => {}
    }
}

pub fn walk_query<'ast, V: Visitor<'ast> + ?Sized>(visitor: &mut V, query: &'ast Query) {
    if let Some(with) = &query.with {
        for cte in &with.ctes {
            walk_set_expr(visitor, &cte.body);
        }
    }
    walk_set_expr(visitor, &query.body);
}

pub fn walk_set_expr<'ast, V: Visitor<'ast> + ?Sized>(visitor: &mut V, set: &'ast SetExpr) {
    for select in set.selects() {
        walk_select(visitor, select);
    }
}

pub fn walk_select<'ast, V: Visitor<'ast> + ?Sized>(visitor: &mut V, select: &'ast Select) {
    for item in &select.projection {
        match item {
            SelectItem::Wildcard => {}
            SelectItem::Expr { expr, .. } => visitor.visit_expr(expr),
            SelectItem::Window(window) => {
                for expr in window.args.iter().chain(&window.partition_by) {
                    visitor.visit_expr(expr);
                }
                for order in &window.order_by {
                    visitor.visit_expr(&order.expr);
                }
            }
        }
    }
    if let Some(hierarchy) = &select.hierarchy {
        if let Some(start_with) = &hierarchy.start_with {
            visitor.visit_expr(start_with);
        }
    }
    if let Some(filter) = &select.filter {
        visitor.visit_expr(filter);
    }
    for order in &select.order_by {
        visitor.visit_expr(&order.expr);
    }
    if let Some(limit) = &select.limit {
        visitor.visit_expr(limit);
    }
}
