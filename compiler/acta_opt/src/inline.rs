//! Function inlining.
//!
//! Small functions (weighted body size at most [`INLINE_THRESHOLD`]) are
//! candidates. Call sites are not rewritten yet, so a candidate is only
//! removed from the program when nothing references it.

use crate::pass::{Pass, PassKind, PassResult};
use acta_ir::visitor::{walk_expr, Visitor};
use acta_ir::{Block, Expr, ExprKind, FunctionDecl, Program, Stmt, StmtKind};
use rustc_hash::FxHashSet;

/// Largest weighted body size considered for inlining.
pub const INLINE_THRESHOLD: usize = 5;

pub struct FunctionInlining;

impl Pass for FunctionInlining {
    fn name(&self) -> &'static str {
        "function_inlining"
    }

    fn kind(&self) -> PassKind {
        PassKind::Inlining
    }

    fn can_apply(&self, program: &Program) -> bool {
        program
            .statements
            .iter()
            .any(|stmt| matches!(&stmt.kind, StmtKind::Function(decl) if is_small(decl)))
    }

    fn apply(&self, program: &Program) -> PassResult {
        let last = program.statements.len().saturating_sub(1);
        let mut elided = 0;
        let mut statements = Vec::with_capacity(program.statements.len());
        for (i, stmt) in program.statements.iter().enumerate() {
            if let StmtKind::Function(decl) = &stmt.kind {
                if i != last && is_small(decl) && !is_referenced(program, i, &decl.name) {
                    tracing::trace!(function = %decl.name, "eliding unreferenced small function");
                    elided += 1;
                    continue;
                }
            }
            statements.push(stmt.clone());
        }
        if elided == 0 {
            return PassResult::unchanged(program.clone());
        }
        PassResult::changed(Program::new(statements), elided)
    }
}

fn is_small(decl: &FunctionDecl) -> bool {
    block_weight(&decl.body) <= INLINE_THRESHOLD
}

/// Statement count, with nested bodies counted statement by statement.
pub(crate) fn block_weight(block: &Block) -> usize {
    block.statements.iter().map(stmt_weight).sum()
}

fn stmt_weight(stmt: &Stmt) -> usize {
    1 + match &stmt.kind {
        StmtKind::Block(block)
        | StmtKind::While { body: block, .. }
        | StmtKind::ForIn { body: block, .. } => block_weight(block),
        StmtKind::For { init, body, .. } => {
            init.as_deref().map_or(0, stmt_weight) + block_weight(body)
        }
        StmtKind::If {
            then_branch,
            else_branch,
            ..
        } => block_weight(then_branch) + else_branch.as_deref().map_or(0, stmt_weight),
        StmtKind::Switch { cases, .. } => cases
            .iter()
            .map(|case| case.body.iter().map(stmt_weight).sum::<usize>())
            .sum(),
        StmtKind::Function(decl) => block_weight(&decl.body),
        _ => 0,
    }
}

/// Whether any statement other than the declaration at `index` names `name`.
fn is_referenced(program: &Program, index: usize, name: &str) -> bool {
    let mut names = NameCollector::default();
    for (i, stmt) in program.statements.iter().enumerate() {
        if i != index {
            names.visit_stmt(stmt);
        }
    }
    names.names.contains(name)
}

#[derive(Default)]
struct NameCollector<'ast> {
    names: FxHashSet<&'ast str>,
}

impl<'ast> Visitor<'ast> for NameCollector<'ast> {
    fn visit_expr(&mut self, expr: &'ast Expr) {
        if let ExprKind::Ident(name) = &expr.kind {
            self.names.insert(name);
        }
        walk_expr(self, expr);
    }
}
