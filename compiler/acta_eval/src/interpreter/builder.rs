//! `InterpreterBuilder` for creating Interpreter instances with various configurations.

use super::{EvalConfig, Interpreter};
use crate::environment::Environment;
use crate::print_handler::{stdout_handler, SharedPrintHandler};
use crate::relational::{NoRowFilter, RowFilter};
use crate::Value;

/// Builder for creating Interpreter instances.
///
/// Defaults: the fixed evaluation limits, stdout printing, no row filters
/// and an empty global scope.
pub struct InterpreterBuilder<'a> {
    config: EvalConfig,
    print_handler: Option<SharedPrintHandler>,
    row_filter: &'a dyn RowFilter,
    parameters: Vec<(String, Value)>,
}

impl<'a> InterpreterBuilder<'a> {
    pub fn new() -> Self {
        InterpreterBuilder {
            config: EvalConfig::default(),
            print_handler: None,
            row_filter: &NoRowFilter,
            parameters: Vec::new(),
        }
    }

    #[must_use]
    pub fn config(mut self, config: EvalConfig) -> Self {
        self.config = config;
        self
    }

    /// Cap on recursive CTE iterations.
    #[must_use]
    pub fn max_recursive_iterations(mut self, limit: usize) -> Self {
        self.config.max_recursive_iterations = limit;
        self
    }

    /// Where `print(...)` output goes.
    #[must_use]
    pub fn print_handler(mut self, handler: SharedPrintHandler) -> Self {
        self.print_handler = Some(handler);
        self
    }

    #[must_use]
    pub fn row_filter(mut self, filter: &'a dyn RowFilter) -> Self {
        self.row_filter = filter;
        self
    }

    /// Pre-bind a host parameter in the global scope.
    #[must_use]
    pub fn parameter(mut self, name: impl Into<String>, value: Value) -> Self {
        self.parameters.push((name.into(), value));
        self
    }

    pub fn build(self) -> Interpreter<'a> {
        let mut env = Environment::new();
        for (name, value) in self.parameters {
            env.define_global(name, value);
        }
        Interpreter {
            env,
            config: self.config,
            print_handler: self.print_handler.unwrap_or_else(stdout_handler),
            row_filter: self.row_filter,
        }
    }
}

impl Default for InterpreterBuilder<'_> {
    fn default() -> Self {
        Self::new()
    }
}
