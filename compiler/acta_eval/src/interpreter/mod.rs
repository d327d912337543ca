//! Tree-walking interpreter for Acta.
//!
//! Statements and expressions are evaluated directly over the syntax tree.
//! Helper modules split the work:
//!
//! - `stmt` - declarations, blocks, loops and `switch`
//! - `expr` - literals, operators, indexing, field access and assignment
//! - `call` - user function calls
//! - `builtins` - the built-in function library
//!
//! Relational statements and queries are executed by `crate::relational`.
//!
//! Every recursive entry point goes through `ensure_sufficient_stack`, so
//! deeply nested programs grow the native stack instead of overflowing it.

mod builder;
mod builtins;
mod call;
mod expr;
mod stmt;

pub use builder::InterpreterBuilder;

use acta_ir::{Expr, Program, Span};
use tracing::debug;

use crate::environment::Environment;
use crate::errors::{fail, ControlFlow, EvalError, EvalErrorKind, EvalResult};
use crate::print_handler::SharedPrintHandler;
use crate::relational::RowFilter;
use crate::Value;

/// Iteration cap for recursive common table expressions.
pub const MAX_RECURSIVE_ITERATIONS: usize = 1000;

/// Evaluation limits.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct EvalConfig {
    pub max_recursive_iterations: usize,
}

impl Default for EvalConfig {
    fn default() -> Self {
        EvalConfig {
            max_recursive_iterations: MAX_RECURSIVE_ITERATIONS,
        }
    }
}

/// Tree-walking interpreter.
pub struct Interpreter<'a> {
    pub(crate) env: Environment,
    pub(crate) config: EvalConfig,
    pub(crate) print_handler: SharedPrintHandler,
    pub(crate) row_filter: &'a dyn RowFilter,
}

/// What a loop does after one run of its body.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum LoopAction {
    Next,
    Exit,
}

impl<'a> Interpreter<'a> {
    pub fn builder() -> InterpreterBuilder<'a> {
        InterpreterBuilder::new()
    }

    /// Interpreter with default settings, writing `print` output to stdout.
    pub fn new() -> Self {
        InterpreterBuilder::new().build()
    }

    pub fn config(&self) -> EvalConfig {
        self.config
    }

    pub fn print_handler(&self) -> &SharedPrintHandler {
        &self.print_handler
    }

    /// Bind a host parameter in the global scope.
    pub fn define_parameter(&mut self, name: impl Into<String>, value: Value) {
        self.env.define_global(name, value);
    }

    /// Look up a binding visible from the current scope.
    pub fn lookup(&self, name: &str) -> Option<Value> {
        self.env.lookup(name)
    }

    /// Run a program.
    ///
    /// Top-level statements run in order. A top-level `return` ends the
    /// program with its value; otherwise the program's value is that of its
    /// last statement (null for an empty program).
    #[tracing::instrument(level = "debug", skip_all, fields(statements = program.statements.len()))]
    pub fn eval_program(&mut self, program: &Program) -> Result<Value, EvalError> {
        let mut last = Value::Null;
        for stmt in &program.statements {
            match self.exec(stmt) {
                Ok(value) => last = value,
                Err(ControlFlow::Return(value)) => {
                    debug!("program returned early");
                    return Ok(value);
                }
                Err(ControlFlow::Error(error)) => return Err(error),
                Err(signal) => {
                    return Err(EvalError::new(
                        EvalErrorKind::StrayControl(signal.keyword()),
                        stmt.span,
                    ))
                }
            }
        }
        Ok(last)
    }

    /// Evaluate one expression in the global scope.
    pub fn eval_expression(&mut self, expr: &Expr) -> Result<Value, EvalError> {
        match self.eval(expr) {
            Ok(value) | Err(ControlFlow::Return(value)) => Ok(value),
            Err(ControlFlow::Error(error)) => Err(error),
            Err(signal) => Err(EvalError::new(
                EvalErrorKind::StrayControl(signal.keyword()),
                expr.span,
            )),
        }
    }

    /// Run `f` in a fresh child scope, popping it afterwards even when `f`
    /// raises a signal.
    pub(crate) fn with_env_scope<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, ControlFlow>,
    ) -> Result<T, ControlFlow> {
        self.env.push_scope();
        let result = f(self);
        self.env.pop_scope();
        result
    }

    /// Evaluate a condition. `null` counts as false.
    pub(crate) fn condition(&mut self, expr: &Expr, context: &'static str) -> Result<bool, ControlFlow> {
        match self.eval(expr)? {
            Value::Bool(b) => Ok(b),
            Value::Null => Ok(false),
            other => fail(
                EvalErrorKind::NonBoolean {
                    context,
                    found: other.kind(),
                },
                expr.span,
            ),
        }
    }

    /// Look up a name, falling back to the builtin of that name.
    pub(crate) fn resolve(&self, name: &str, span: Span) -> EvalResult {
        if let Some(value) = self.env.lookup(name) {
            return Ok(value);
        }
        match acta_ir::builtins::lookup_builtin(name) {
            Some(builtin) => Ok(Value::Builtin(builtin.name)),
            None => fail(EvalErrorKind::UndefinedVariable(name.to_string()), span),
        }
    }
}

impl Default for Interpreter<'_> {
    fn default() -> Self {
        Self::new()
    }
}

// Functions capture the scope they are declared in, and that scope binds
// them; clearing the global scope breaks those cycles.
impl Drop for Interpreter<'_> {
    fn drop(&mut self) {
        self.env.clear_global();
    }
}
