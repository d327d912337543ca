//! Constant folding.
//!
//! Literal operands are folded bottom-up. Only a small operator set is
//! folded; every other combination is left as written and evaluated at
//! run time:
//!
//! | operator | operands                 |
//! |----------|--------------------------|
//! | `+`      | int/int (checked), float/float, int/float |
//! | `-`      | int/int (checked)        |
//! | `*`      | int/int (checked), float/float |
//! | unary `-`| int (checked), float     |
//! | `!`      | bool                     |

use crate::pass::{Pass, PassKind, PassResult};
use acta_ir::visitor::{walk_expr, Visitor};
use acta_ir::{BinaryOp, Block, Expr, ExprKind, Program, Stmt, StmtKind, SwitchCase, UnaryOp};
use acta_stack::ensure_sufficient_stack;

pub struct ConstantFolding;

impl Pass for ConstantFolding {
    fn name(&self) -> &'static str {
        "constant_folding"
    }

    fn kind(&self) -> PassKind {
        PassKind::ConstantFolding
    }

    fn can_apply(&self, program: &Program) -> bool {
        let mut finder = OperatorFinder { found: false };
        finder.visit_program(program);
        finder.found
    }

    fn apply(&self, program: &Program) -> PassResult {
        let mut folder = Folder { folds: 0 };
        let statements = program.statements.iter().map(|s| folder.stmt(s)).collect();
        if folder.folds == 0 {
            return PassResult::unchanged(program.clone());
        }
        PassResult::changed(Program::new(statements), folder.folds)
    }
}

/// Looks for any operator expression at all.
struct OperatorFinder {
    found: bool,
}

impl<'ast> Visitor<'ast> for OperatorFinder {
    fn visit_expr(&mut self, expr: &'ast Expr) {
        if self.found {
            return;
        }
        if matches!(expr.kind, ExprKind::Binary { .. } | ExprKind::Unary { .. }) {
            self.found = true;
            return;
        }
        walk_expr(self, expr);
    }
}

struct Folder {
    folds: usize,
}

impl Folder {
    /// Only let, expression, return, block, loop and switch statements are
    /// rewritten; everything else is copied as is.
    fn stmt(&mut self, stmt: &Stmt) -> Stmt {
        let kind = match &stmt.kind {
            StmtKind::Let { name, ty, init } => StmtKind::Let {
                name: name.clone(),
                ty: ty.clone(),
                init: init.as_ref().map(|e| self.expr(e)),
            },
            StmtKind::Expr(expr) => StmtKind::Expr(self.expr(expr)),
            StmtKind::Return(value) => StmtKind::Return(value.as_ref().map(|e| self.expr(e))),
            StmtKind::Block(block) => StmtKind::Block(self.block(block)),
            StmtKind::For {
                init,
                cond,
                update,
                body,
            } => StmtKind::For {
                init: init.as_ref().map(|s| Box::new(self.stmt(s))),
                cond: cond.as_ref().map(|e| self.expr(e)),
                update: update.as_ref().map(|e| self.expr(e)),
                body: self.block(body),
            },
            StmtKind::ForIn {
                var,
                iterable,
                body,
            } => StmtKind::ForIn {
                var: var.clone(),
                iterable: self.expr(iterable),
                body: self.block(body),
            },
            StmtKind::Switch { subject, cases } => StmtKind::Switch {
                subject: self.expr(subject),
                cases: cases
                    .iter()
                    .map(|case| SwitchCase {
                        values: case.values.iter().map(|v| self.expr(v)).collect(),
                        body: case.body.iter().map(|s| self.stmt(s)).collect(),
                        span: case.span,
                    })
                    .collect(),
            },
            other => other.clone(),
        };
        Stmt::new(kind, stmt.span)
    }

    fn block(&mut self, block: &Block) -> Block {
        Block::new(
            block.statements.iter().map(|s| self.stmt(s)).collect(),
            block.span,
        )
    }

    fn expr(&mut self, expr: &Expr) -> Expr {
        ensure_sufficient_stack(|| self.expr_inner(expr))
    }

    fn expr_inner(&mut self, expr: &Expr) -> Expr {
        let kind = match &expr.kind {
            ExprKind::Binary { op, left, right } => {
                let left = self.expr(left);
                let right = self.expr(right);
                match fold_binary(*op, &left.kind, &right.kind) {
                    Some(folded) => {
                        self.folds += 1;
                        folded
                    }
                    None => ExprKind::Binary {
                        op: *op,
                        left: Box::new(left),
                        right: Box::new(right),
                    },
                }
            }
            ExprKind::Unary { op, operand } => {
                let operand = self.expr(operand);
                match fold_unary(*op, &operand.kind) {
                    Some(folded) => {
                        self.folds += 1;
                        folded
                    }
                    None => ExprKind::Unary {
                        op: *op,
                        operand: Box::new(operand),
                    },
                }
            }
            ExprKind::Array(elements) => {
                ExprKind::Array(elements.iter().map(|e| self.expr(e)).collect())
            }
            ExprKind::Assign { target, value } => ExprKind::Assign {
                target: Box::new(self.expr(target)),
                value: Box::new(self.expr(value)),
            },
            ExprKind::Call { callee, args } => ExprKind::Call {
                callee: callee.clone(),
                args: args.iter().map(|a| self.expr(a)).collect(),
            },
            ExprKind::Index { target, index } => ExprKind::Index {
                target: Box::new(self.expr(target)),
                index: Box::new(self.expr(index)),
            },
            ExprKind::Field { target, field } => ExprKind::Field {
                target: Box::new(self.expr(target)),
                field: field.clone(),
            },
            ExprKind::IsNull { operand, negated } => ExprKind::IsNull {
                operand: Box::new(self.expr(operand)),
                negated: *negated,
            },
            other => other.clone(),
        };
        Expr::new(kind, expr.span)
    }
}

/// Fold a binary operator over literal operands.
///
/// Returns `None` when the combination is not folded or integer
/// arithmetic would overflow.
#[expect(
    clippy::cast_precision_loss,
    reason = "mixed int/float `+` widens like the evaluator does"
)]
pub(crate) fn fold_binary(op: BinaryOp, left: &ExprKind, right: &ExprKind) -> Option<ExprKind> {
    match (op, left, right) {
        (BinaryOp::Add, ExprKind::Int(a), ExprKind::Int(b)) => a.checked_add(*b).map(ExprKind::Int),
        (BinaryOp::Sub, ExprKind::Int(a), ExprKind::Int(b)) => a.checked_sub(*b).map(ExprKind::Int),
        (BinaryOp::Mul, ExprKind::Int(a), ExprKind::Int(b)) => a.checked_mul(*b).map(ExprKind::Int),
        (BinaryOp::Add, ExprKind::Float(a), ExprKind::Float(b)) => Some(ExprKind::Float(a + b)),
        (BinaryOp::Mul, ExprKind::Float(a), ExprKind::Float(b)) => Some(ExprKind::Float(a * b)),
        (BinaryOp::Add, ExprKind::Int(a), ExprKind::Float(b)) => {
            Some(ExprKind::Float(*a as f64 + b))
        }
        (BinaryOp::Add, ExprKind::Float(a), ExprKind::Int(b)) => {
            Some(ExprKind::Float(a + *b as f64))
        }
        _ => None,
    }
}

pub(crate) fn fold_unary(op: UnaryOp, operand: &ExprKind) -> Option<ExprKind> {
    match (op, operand) {
        (UnaryOp::Neg, ExprKind::Int(v)) => v.checked_neg().map(ExprKind::Int),
        (UnaryOp::Neg, ExprKind::Float(v)) => Some(ExprKind::Float(-v)),
        (UnaryOp::Not, ExprKind::Bool(v)) => Some(ExprKind::Bool(!v)),
        _ => None,
    }
}
