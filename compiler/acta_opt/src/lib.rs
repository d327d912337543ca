//! Tree optimizer for Acta programs.
//!
//! The [`Optimizer`] runs rounds of rewrite passes until a round leaves the
//! program unchanged or the round cap is reached. Every pass builds a new
//! tree from the previous one; nothing is mutated in place.
//!
//! Passes, in order:
//! - constant folding
//! - dead-code elimination
//! - loop optimization
//! - function inlining

mod const_fold;
mod dead_code;
mod inline;
mod loops;
mod pass;

pub use const_fold::ConstantFolding;
pub use dead_code::DeadCodeElimination;
pub use inline::FunctionInlining;
pub use loops::LoopOptimization;
pub use pass::{Pass, PassKind, PassResult};

use acta_ir::Program;
use tracing::debug;

/// Upper bound on optimizer rounds.
pub const MAX_PASSES: usize = 10;

/// Optimizer settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OptimizerConfig {
    /// When false, `optimize` returns the program unchanged.
    pub enabled: bool,
    /// Round cap; values above [`MAX_PASSES`] are clamped.
    pub max_passes: usize,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        OptimizerConfig {
            enabled: true,
            max_passes: MAX_PASSES,
        }
    }
}

impl OptimizerConfig {
    #[must_use]
    pub fn disabled() -> Self {
        OptimizerConfig {
            enabled: false,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_max_passes(mut self, max_passes: usize) -> Self {
        self.max_passes = max_passes;
        self
    }
}

/// Rewrite counters, cumulative over every `optimize` call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OptimizerStats {
    pub constant_folds: usize,
    pub dead_code_removals: usize,
    pub inline_expansions: usize,
    pub loop_optimizations: usize,
    /// Rounds executed.
    pub rounds: usize,
}

impl OptimizerStats {
    fn record(&mut self, kind: PassKind, count: usize) {
        match kind {
            PassKind::ConstantFolding => self.constant_folds += count,
            PassKind::DeadCode => self.dead_code_removals += count,
            PassKind::Inlining => self.inline_expansions += count,
            PassKind::Loops => self.loop_optimizations += count,
        }
    }

    /// Total rewrites across all passes.
    pub fn total(&self) -> usize {
        self.constant_folds
            + self.dead_code_removals
            + self.inline_expansions
            + self.loop_optimizations
    }
}

/// Runs the pass pipeline to a fixpoint.
pub struct Optimizer {
    config: OptimizerConfig,
    passes: Vec<Box<dyn Pass>>,
    stats: OptimizerStats,
}

impl Default for Optimizer {
    fn default() -> Self {
        Self::new(OptimizerConfig::default())
    }
}

impl Optimizer {
    /// Optimizer with the standard pipeline.
    pub fn new(config: OptimizerConfig) -> Self {
        let passes: Vec<Box<dyn Pass>> = vec![
            Box::new(ConstantFolding),
            Box::new(DeadCodeElimination),
            Box::new(LoopOptimization),
            Box::new(FunctionInlining),
        ];
        Optimizer {
            config,
            passes,
            stats: OptimizerStats::default(),
        }
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    pub fn stats(&self) -> OptimizerStats {
        self.stats
    }

    /// Optimize `program`, returning the rewritten tree.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn optimize(&mut self, program: &Program) -> Program {
        let mut current = program.clone();
        if !self.config.enabled {
            return current;
        }

        let max_passes = self.config.max_passes.min(MAX_PASSES);
        for round in 1..=max_passes {
            let before = current.clone();
            for pass in &self.passes {
                if !pass.can_apply(&current) {
                    continue;
                }
                let result = pass.apply(&current);
                self.stats.record(pass.kind(), result.transformed);
                current = result.program;
            }
            self.stats.rounds += 1;

            let changed = current != before;
            debug!(round, changed, stats = ?self.stats, "optimizer round");
            if !changed {
                break;
            }
        }
        current
    }
}

#[cfg(test)]
mod tests;
