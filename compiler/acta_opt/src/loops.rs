//! Loop optimization.
//!
//! Rebuilds every `for` body. Hoisting loop-invariant statements out of the
//! body would happen here; today the body is copied verbatim and nothing is
//! counted.

use crate::pass::{Pass, PassKind, PassResult};
use acta_ir::{Block, Program, Stmt, StmtKind, SwitchCase};

pub struct LoopOptimization;

impl Pass for LoopOptimization {
    fn name(&self) -> &'static str {
        "loop_optimization"
    }

    fn kind(&self) -> PassKind {
        PassKind::Loops
    }

    fn can_apply(&self, program: &Program) -> bool {
        program.statements.iter().any(contains_for)
    }

    fn apply(&self, program: &Program) -> PassResult {
        let statements = program.statements.iter().map(rebuild).collect();
        PassResult::unchanged(Program::new(statements))
    }
}

fn contains_for(stmt: &Stmt) -> bool {
    match &stmt.kind {
        StmtKind::For { .. } => true,
        StmtKind::Block(block) | StmtKind::While { body: block, .. } => {
            block.statements.iter().any(contains_for)
        }
        StmtKind::ForIn { body, .. } => body.statements.iter().any(contains_for),
        StmtKind::Function(decl) => decl.body.statements.iter().any(contains_for),
        StmtKind::If {
            then_branch,
            else_branch,
            ..
        } => {
            then_branch.statements.iter().any(contains_for)
                || else_branch.as_deref().is_some_and(contains_for)
        }
        StmtKind::Switch { cases, .. } => cases
            .iter()
            .any(|case| case.body.iter().any(contains_for)),
        _ => false,
    }
}

fn rebuild_block(block: &Block) -> Block {
    Block::new(block.statements.iter().map(rebuild).collect(), block.span)
}

fn rebuild(stmt: &Stmt) -> Stmt {
    let kind = match &stmt.kind {
        StmtKind::For {
            init,
            cond,
            update,
            body,
        } => StmtKind::For {
            init: init.clone(),
            cond: cond.clone(),
            update: update.clone(),
            body: rebuild_block(body),
        },
        StmtKind::Block(block) => StmtKind::Block(rebuild_block(block)),
        StmtKind::While { cond, body } => StmtKind::While {
            cond: cond.clone(),
            body: rebuild_block(body),
        },
        StmtKind::ForIn {
            var,
            iterable,
            body,
        } => StmtKind::ForIn {
            var: var.clone(),
            iterable: iterable.clone(),
            body: rebuild_block(body),
        },
        StmtKind::Function(decl) => {
            let mut decl = decl.clone();
            decl.body = rebuild_block(&decl.body);
            StmtKind::Function(decl)
        }
        StmtKind::If {
            cond,
            then_branch,
            else_branch,
        } => StmtKind::If {
            cond: cond.clone(),
            then_branch: rebuild_block(then_branch),
            else_branch: else_branch.as_deref().map(|s| Box::new(rebuild(s))),
        },
        StmtKind::Switch { subject, cases } => StmtKind::Switch {
            subject: subject.clone(),
            cases: cases
                .iter()
                .map(|case| SwitchCase {
                    values: case.values.clone(),
                    body: case.body.iter().map(rebuild).collect(),
                    span: case.span,
                })
                .collect(),
        },
        other => other.clone(),
    };
    Stmt::new(kind, stmt.span)
}
