//! User function calls.

use std::rc::Rc;

use acta_ir::builtins::lookup_builtin;
use acta_ir::{Expr, Span};
use acta_stack::ensure_sufficient_stack;

use super::stmt::conform;
use super::Interpreter;
use crate::environment::{LocalScope, Scope};
use crate::errors::{fail, ControlFlow, EvalErrorKind, EvalResult};
use crate::value::FunctionValue;
use crate::Value;

impl Interpreter<'_> {
    pub(crate) fn eval_call(&mut self, callee: &Expr, args: &[Expr], span: Span) -> EvalResult {
        let function = match callee.as_ident() {
            Some(name) => self.resolve_callee(name, span)?,
            None => self.eval(callee)?,
        };
        let args = args
            .iter()
            .map(|arg| self.eval(arg))
            .collect::<Result<Vec<_>, _>>()?;
        self.call_value(&function, args, span)
    }

    /// A name in call position: a function binding, else the builtin of
    /// that name. Columns called like a builtin (`level`) do not hide it.
    fn resolve_callee(&self, name: &str, span: Span) -> EvalResult {
        let found = self.env.lookup(name);
        if let Some(function @ (Value::Function(_) | Value::Builtin(_))) = found {
            return Ok(function);
        }
        if let Some(builtin) = lookup_builtin(name) {
            return Ok(Value::Builtin(builtin.name));
        }
        match found {
            Some(other) => fail(EvalErrorKind::NotCallable(other.kind()), span),
            None => fail(EvalErrorKind::UndefinedFunction(name.to_string()), span),
        }
    }

    fn call_value(&mut self, function: &Value, args: Vec<Value>, span: Span) -> EvalResult {
        match function {
            Value::Function(function) => self.call_function(function, args, span),
            Value::Builtin(name) => self.call_builtin(*name, args, span),
            other => fail(EvalErrorKind::NotCallable(other.kind()), span),
        }
    }

    /// Run a user function in a fresh scope over its captured scope.
    fn call_function(&mut self, function: &Rc<FunctionValue>, args: Vec<Value>, span: Span) -> EvalResult {
        if args.len() != function.arity() {
            return fail(
                EvalErrorKind::ArityMismatch {
                    name: function.name().to_string(),
                    expected: function.arity(),
                    found: args.len(),
                },
                span,
            );
        }

        let scope = LocalScope::new(Scope::with_parent(function.closure.clone()));
        for (param, arg) in function.decl.params.iter().zip(args) {
            let arg = match &param.ty {
                Some(ty) => conform(arg, ty),
                None => arg,
            };
            scope.borrow_mut().define(param.name.clone(), arg);
        }

        let caller = self.env.enter(scope);
        let outcome =
            ensure_sufficient_stack(|| self.exec_statements(&function.decl.body.statements));
        self.env.restore(caller);

        match outcome {
            Ok(_) => Ok(Value::Null),
            Err(ControlFlow::Return(value)) => Ok(value),
            Err(ControlFlow::Error(error)) => Err(ControlFlow::Error(error)),
            Err(signal) => fail(EvalErrorKind::StrayControl(signal.keyword()), span),
        }
    }
}
