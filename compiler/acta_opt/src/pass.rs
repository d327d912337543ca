//! The pass interface.

use acta_ir::Program;

/// Which counter a pass reports into.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PassKind {
    ConstantFolding,
    DeadCode,
    Loops,
    Inlining,
}

/// Output of one pass application.
#[derive(Clone, Debug, PartialEq)]
pub struct PassResult {
    /// The rewritten tree.
    pub program: Program,
    /// Number of rewrites the pass performed.
    pub transformed: usize,
}

impl PassResult {
    pub fn unchanged(program: Program) -> Self {
        PassResult {
            program,
            transformed: 0,
        }
    }

    pub fn changed(program: Program, transformed: usize) -> Self {
        PassResult {
            program,
            transformed,
        }
    }
}

/// A tree rewrite run once per optimizer round.
pub trait Pass {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    fn kind(&self) -> PassKind;

    /// Cheap pre-check; `apply` is skipped when this returns false.
    fn can_apply(&self, program: &Program) -> bool;

    /// Build a new tree from `program`.
    fn apply(&self, program: &Program) -> PassResult;
}

impl<T: Pass + ?Sized> Pass for Box<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn kind(&self) -> PassKind {
        (**self).kind()
    }

    fn can_apply(&self, program: &Program) -> bool {
        (**self).can_apply(program)
    }

    fn apply(&self, program: &Program) -> PassResult {
        (**self).apply(program)
    }
}
