//! Statement execution: declarations, blocks, loops and `switch`.

use std::rc::Rc;

use acta_ir::{Block, Expr, Stmt, StmtKind, StructDecl, SwitchCase, TypeExpr, TypeExprKind};
use acta_stack::ensure_sufficient_stack;
use chrono::TimeDelta;

use super::{Interpreter, LoopAction};
use crate::errors::{fail, ControlFlow, EvalErrorKind, EvalResult};
use crate::operators::{as_float, loose_eq};
use crate::temporal;
use crate::value::{ArrayValue, FunctionValue, NodeRef, StructValue};
use crate::Value;

impl Interpreter<'_> {
    pub(crate) fn exec(&mut self, stmt: &Stmt) -> EvalResult {
        ensure_sufficient_stack(|| self.exec_inner(stmt))
    }

    fn exec_inner(&mut self, stmt: &Stmt) -> EvalResult {
        let span = stmt.span;
        match &stmt.kind {
            StmtKind::Let { name, ty, init } => {
                let value = match (init, ty) {
                    (Some(init), Some(ty)) => conform(self.eval(init)?, ty),
                    (Some(init), None) => self.eval(init)?,
                    (None, Some(ty)) => self.zero_value(ty),
                    (None, None) => Value::Null,
                };
                self.env.define(name.clone(), value.clone());
                Ok(value)
            }
            StmtKind::Expr(expr) => self.eval(expr),
            StmtKind::Return(value) => {
                let value = match value {
                    Some(expr) => self.eval(expr)?,
                    None => Value::Null,
                };
                Err(ControlFlow::Return(value))
            }
            StmtKind::Block(block) => self.exec_block(block),
            StmtKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                if self.condition(cond, "if condition")? {
                    self.exec_block(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.exec(else_branch)
                } else {
                    Ok(Value::Null)
                }
            }
            StmtKind::While { cond, body } => {
                while self.condition(cond, "while condition")? {
                    if self.run_loop_body(body)? == LoopAction::Exit {
                        break;
                    }
                }
                Ok(Value::Null)
            }
            StmtKind::For {
                init,
                cond,
                update,
                body,
            } => self.with_env_scope(|this| {
                if let Some(init) = init {
                    this.exec(init)?;
                }
                loop {
                    if let Some(cond) = cond {
                        if !this.condition(cond, "for condition")? {
                            break;
                        }
                    }
                    if this.run_loop_body(body)? == LoopAction::Exit {
                        break;
                    }
                    if let Some(update) = update {
                        this.eval(update)?;
                    }
                }
                Ok(Value::Null)
            }),
            StmtKind::ForIn {
                var,
                iterable,
                body,
            } => {
                let items = self.eval(iterable)?;
                for item in iteration_items(items, iterable)? {
                    let action = self.with_env_scope(|this| {
                        this.env.define(var.clone(), item);
                        this.run_loop_body(body)
                    })?;
                    if action == LoopAction::Exit {
                        break;
                    }
                }
                Ok(Value::Null)
            }
            StmtKind::Switch { subject, cases } => self.exec_switch(subject, cases),
            StmtKind::Break => Err(ControlFlow::Break),
            StmtKind::Continue => Err(ControlFlow::Continue),
            StmtKind::Fallthrough => Err(ControlFlow::Fallthrough),
            StmtKind::Function(decl) => {
                let function = Value::Function(Rc::new(FunctionValue {
                    decl: decl.clone(),
                    closure: self.env.current_scope(),
                }));
                self.env.define(decl.name.clone(), function.clone());
                Ok(function)
            }
            StmtKind::Struct(decl) => {
                let prototype = self.struct_prototype(decl);
                self.env.define(decl.name.clone(), prototype.clone());
                Ok(prototype)
            }
            StmtKind::CreateTable(create) => self.exec_create_table(create, span),
            StmtKind::CreateIndex(create) => self.exec_create_index(create, span),
            StmtKind::DropTable { name } => self.exec_drop_table(name, span),
            StmtKind::AlterTable(alter) => self.exec_alter_table(alter, span),
            StmtKind::Insert(insert) => self.exec_insert(insert, span),
            StmtKind::Update(update) => self.exec_update(update, span),
            StmtKind::Delete(delete) => self.exec_delete(delete, span),
        }
    }

    /// Run statements in order in the current scope. The value is that of
    /// the last statement; any signal stops the sequence.
    pub(crate) fn exec_statements(&mut self, statements: &[Stmt]) -> EvalResult {
        let mut last = Value::Null;
        for stmt in statements {
            last = self.exec(stmt)?;
        }
        Ok(last)
    }

    pub(crate) fn exec_block(&mut self, block: &Block) -> EvalResult {
        self.with_env_scope(|this| this.exec_statements(&block.statements))
    }

    /// Run one loop iteration and translate its signal into a loop action.
    fn run_loop_body(&mut self, body: &Block) -> Result<LoopAction, ControlFlow> {
        match self.exec_block(body) {
            Ok(_) | Err(ControlFlow::Continue) => Ok(LoopAction::Next),
            Err(ControlFlow::Break) => Ok(LoopAction::Exit),
            Err(ControlFlow::Fallthrough) => {
                fail(EvalErrorKind::StrayControl("fallthrough"), body.span)
            }
            Err(signal) => Err(signal),
        }
    }

    fn exec_switch(&mut self, subject: &Expr, cases: &[SwitchCase]) -> EvalResult {
        let subject = self.eval(subject)?;
        let start = match self.matching_case(&subject, cases)? {
            Some(index) => index,
            None => match cases.iter().position(SwitchCase::is_default) {
                Some(index) => index,
                None => return Ok(Value::Null),
            },
        };

        for case in &cases[start..] {
            match self.with_env_scope(|this| this.exec_statements(&case.body)) {
                Ok(value) => return Ok(value),
                Err(ControlFlow::Fallthrough) => {}
                Err(ControlFlow::Break) => return Ok(Value::Null),
                Err(signal) => return Err(signal),
            }
        }
        Ok(Value::Null)
    }

    fn matching_case(
        &mut self,
        subject: &Value,
        cases: &[SwitchCase],
    ) -> Result<Option<usize>, ControlFlow> {
        for (index, case) in cases.iter().enumerate() {
            for value in &case.values {
                if loose_eq(subject, &self.eval(value)?) {
                    return Ok(Some(index));
                }
            }
        }
        Ok(None)
    }

    fn struct_prototype(&self, decl: &StructDecl) -> Value {
        let fields = decl
            .fields
            .iter()
            .map(|field| (field.name.clone(), self.zero_value(&field.ty)))
            .collect();
        Value::Struct(StructValue::new(decl.name.clone(), fields))
    }

    /// Value a declaration without an initializer starts with.
    pub(crate) fn zero_value(&self, ty: &TypeExpr) -> Value {
        match &ty.kind {
            TypeExprKind::Named(name) => match name.as_str() {
                "integer" => Value::Int(0),
                "float" => Value::Float(0.0),
                "string" => Value::Str(String::new()),
                "boolean" => Value::Bool(false),
                "date" => Value::Date(temporal::today()),
                "time" => Value::Time(temporal::now()),
                "duration" => Value::Duration(TimeDelta::zero()),
                _ => match self.env.lookup(name) {
                    Some(prototype @ Value::Struct(_)) => prototype,
                    _ => Value::Null,
                },
            },
            TypeExprKind::Array { element, size } => {
                let elements = match size {
                    Some(n) => (0..*n).map(|_| self.zero_value(element)).collect(),
                    None => Vec::new(),
                };
                Value::Array(ArrayValue {
                    elements,
                    element_type: Some(element.to_string()),
                    size: *size,
                })
            }
        }
    }
}

/// Adjust a value to a declared type: integers widen to `float`, arrays
/// pick up the declared element type and size.
pub(crate) fn conform(value: Value, ty: &TypeExpr) -> Value {
    match (&ty.kind, value) {
        (TypeExprKind::Named(name), value @ Value::Int(_)) if name == "float" => {
            as_float(&value).map_or(value, Value::Float)
        }
        (TypeExprKind::Array { element, size }, Value::Array(mut array)) => {
            array.element_type = Some(element.to_string());
            if size.is_some() {
                array.size = *size;
            }
            Value::Array(array)
        }
        (_, value) => value,
    }
}

/// Items a `for ... in` loop visits.
fn iteration_items(value: Value, iterable: &Expr) -> Result<Vec<Value>, ControlFlow> {
    let items = match value {
        Value::Array(array) => array.elements,
        Value::Str(text) => text.chars().map(|c| Value::Str(c.to_string())).collect(),
        Value::SqlResult(result) => (0..result.len())
            .filter_map(|i| result.row_struct(i))
            .collect(),
        Value::Table(table) => {
            let table = table.borrow();
            (0..table.len()).filter_map(|i| table.row_struct(i)).collect()
        }
        Value::Tree(tree) => tree
            .traverse()
            .into_iter()
            .map(|id| Value::Node(NodeRef { tree: Rc::clone(&tree), id }))
            .collect(),
        Value::Node(node) => node
            .tree
            .children(node.id)
            .iter()
            .map(|&id| {
                Value::Node(NodeRef {
                    tree: Rc::clone(&node.tree),
                    id,
                })
            })
            .collect(),
        Value::Null => Vec::new(),
        other => return fail(EvalErrorKind::NotIterable(other.kind()), iterable.span),
    };
    Ok(items)
}
