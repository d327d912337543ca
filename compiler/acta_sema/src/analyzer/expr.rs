//! Expression typing.

use super::Analyzer;
use crate::scope::{Symbol, SymbolKind};
use crate::types::TypeInfo;
use crate::visibility::Operation;
use acta_ir::builtins::lookup_builtin;
use acta_ir::{BinaryOp, Expr, ExprKind, Span, UnaryOp};
use acta_stack::ensure_sufficient_stack;

impl Analyzer<'_> {
    /// Infer the type of `expr`, reporting violations along the way.
    pub(super) fn infer(&mut self, expr: &Expr) -> TypeInfo {
        ensure_sufficient_stack(|| self.infer_inner(expr))
    }

    fn infer_inner(&mut self, expr: &Expr) -> TypeInfo {
        match &expr.kind {
            ExprKind::Int(_) => TypeInfo::Integer,
            ExprKind::Float(_) => TypeInfo::Float,
            ExprKind::Str(_) => TypeInfo::String,
            ExprKind::Bool(_) => TypeInfo::Boolean,
            ExprKind::Null => TypeInfo::Null,
            ExprKind::Date(_) => TypeInfo::Date,
            ExprKind::Time(_) => TypeInfo::Time,
            ExprKind::Duration { .. } => TypeInfo::Duration,
            ExprKind::Ident(name) => self.resolve_ident(name, expr.span),
            ExprKind::Array(elements) => self.infer_array(elements),
            ExprKind::Binary { op, left, right } => {
                let left_ty = self.infer(left);
                let right_ty = self.infer(right);
                self.binary_type(*op, &left_ty, &right_ty, expr.span)
            }
            ExprKind::Unary { op, operand } => {
                let ty = self.infer(operand);
                self.unary_type(*op, ty, expr.span)
            }
            ExprKind::Assign { target, value } => self.infer_assign(target, value),
            ExprKind::Call { callee, args } => self.infer_call(callee, args, expr.span),
            ExprKind::Index { target, index } => {
                let target_ty = self.infer(target);
                let index_ty = self.infer(index);
                if !matches!(index_ty, TypeInfo::Integer | TypeInfo::Any | TypeInfo::Null) {
                    self.error(
                        format!("index must be an integer, found {index_ty}"),
                        index.span,
                    );
                }
                match target_ty {
                    TypeInfo::Array { element, .. } => *element,
                    TypeInfo::String => TypeInfo::String,
                    TypeInfo::SqlResult | TypeInfo::Any | TypeInfo::Null => TypeInfo::Any,
                    other => {
                        self.error(
                            format!("cannot index into a value of type {other}"),
                            target.span,
                        );
                        TypeInfo::Any
                    }
                }
            }
            ExprKind::Field { target, field } => self.infer_field(target, field, expr.span),
            ExprKind::IsNull { operand, .. } => {
                self.infer(operand);
                TypeInfo::Boolean
            }
            ExprKind::Query(query) => {
                self.check_query(query);
                TypeInfo::SqlResult
            }
        }
    }

    fn resolve_ident(&mut self, name: &str, span: Span) -> TypeInfo {
        if let Some(symbol) = self.scopes.lookup(name) {
            let ty = symbol.ty.clone();
            if let SymbolKind::Column { table } = &symbol.kind {
                let table = table.clone();
                self.check_visibility(&table, name, Operation::Select, span);
            }
            return ty;
        }
        if self.scopes.row().is_some_and(|(_, _, open)| open) {
            return TypeInfo::Any;
        }
        if lookup_builtin(name).is_some() {
            return TypeInfo::Function {
                params: Vec::new(),
                ret: Box::new(TypeInfo::Any),
            };
        }
        self.error(format!("undefined variable `{name}`"), span);
        TypeInfo::Any
    }

    fn infer_array(&mut self, elements: &[Expr]) -> TypeInfo {
        let mut element_ty: Option<TypeInfo> = None;
        for element in elements {
            let ty = self.infer(element);
            match &element_ty {
                None if ty != TypeInfo::Null => element_ty = Some(ty),
                Some(first) if !first.is_compatible(&ty) => {
                    let message =
                        format!("array elements have incompatible types {first} and {ty}");
                    self.error(message, element.span);
                }
                Some(TypeInfo::Integer) if ty == TypeInfo::Float => {
                    element_ty = Some(TypeInfo::Float);
                }
                _ => {}
            }
        }
        TypeInfo::array_of(element_ty.unwrap_or(TypeInfo::Any))
    }

    fn binary_type(
        &mut self,
        op: BinaryOp,
        left: &TypeInfo,
        right: &TypeInfo,
        span: Span,
    ) -> TypeInfo {
        if op.is_logical() {
            let boolish =
                |ty: &TypeInfo| matches!(ty, TypeInfo::Boolean | TypeInfo::Any | TypeInfo::Null);
            if !boolish(left) || !boolish(right) {
                self.error(
                    format!(
                        "operands of `{}` must be boolean, found {left} and {right}",
                        op.as_symbol()
                    ),
                    span,
                );
            }
            return TypeInfo::Boolean;
        }

        if op == BinaryOp::In {
            if !matches!(
                right,
                TypeInfo::Array { .. } | TypeInfo::String | TypeInfo::Any | TypeInfo::Null
            ) {
                self.error(
                    format!("right operand of `in` must be an array or string, found {right}"),
                    span,
                );
            }
            return TypeInfo::Boolean;
        }

        if op.is_comparison() {
            self.check_comparison(left, right, span);
            return TypeInfo::Boolean;
        }

        match arithmetic_type(op, left, right) {
            Some(ty) => ty,
            None => {
                self.error(
                    format!(
                        "operator `{}` cannot be applied to {left} and {right}",
                        op.as_symbol()
                    ),
                    span,
                );
                TypeInfo::Any
            }
        }
    }

    fn check_comparison(&mut self, left: &TypeInfo, right: &TypeInfo, span: Span) {
        match (left, right) {
            (TypeInfo::Duration, n) | (n, TypeInfo::Duration) if n.is_numeric() => {
                self.warning(
                    "comparing a duration with a number treats the number as seconds",
                    span,
                );
            }
            (moment @ (TypeInfo::Date | TypeInfo::Time), TypeInfo::String)
            | (TypeInfo::String, moment @ (TypeInfo::Date | TypeInfo::Time)) => {
                self.warning(
                    format!("comparing a {moment} with a string converts the string to a {moment}"),
                    span,
                );
            }
            _ if left.is_compatible(right) => {}
            _ => self.error(format!("cannot compare {left} with {right}"), span),
        }
    }

    fn unary_type(&mut self, op: UnaryOp, ty: TypeInfo, span: Span) -> TypeInfo {
        match op {
            UnaryOp::Neg => match ty {
                TypeInfo::Integer | TypeInfo::Float | TypeInfo::Duration | TypeInfo::Any => ty,
                TypeInfo::Null => TypeInfo::Any,
                other => {
                    self.error(format!("cannot negate a value of type {other}"), span);
                    TypeInfo::Any
                }
            },
            UnaryOp::Not => {
                if !matches!(ty, TypeInfo::Boolean | TypeInfo::Any | TypeInfo::Null) {
                    self.error(format!("operator `!` requires a boolean, found {ty}"), span);
                }
                TypeInfo::Boolean
            }
        }
    }

    fn infer_assign(&mut self, target: &Expr, value: &Expr) -> TypeInfo {
        let value_ty = self.infer(value);
        if let ExprKind::Ident(name) = &target.kind {
            let existing = self
                .scopes
                .lookup(name)
                .map(|symbol| (symbol.kind.clone(), symbol.ty.clone()));
            match existing {
                Some((
                    SymbolKind::Function | SymbolKind::Struct | SymbolKind::Type | SymbolKind::Table,
                    _,
                )) => {
                    self.error(format!("cannot assign to `{name}`"), target.span);
                }
                Some((_, ty)) => {
                    if !ty.is_compatible(&value_ty) {
                        self.error(
                            format!(
                                "cannot assign a value of type {value_ty} to `{name}` of type {ty}"
                            ),
                            value.span,
                        );
                    }
                }
                None => {
                    // Assignment to an unbound name defines it in the current scope.
                    let ty = match &value_ty {
                        TypeInfo::Null | TypeInfo::Void => TypeInfo::Any,
                        other => other.clone(),
                    };
                    self.scopes.define(Symbol::new(
                        name.clone(),
                        SymbolKind::Variable,
                        ty,
                        target.span,
                    ));
                }
            }
        } else {
            let target_ty = self.infer(target);
            if !target_ty.is_compatible(&value_ty) {
                self.error(
                    format!("cannot assign a value of type {value_ty} to a target of type {target_ty}"),
                    value.span,
                );
            }
        }
        value_ty
    }

    fn infer_field(&mut self, target: &Expr, field: &str, span: Span) -> TypeInfo {
        if let ExprKind::Ident(alias) = &target.kind {
            let row_table = self.scopes.lookup(alias).and_then(|symbol| match &symbol.kind {
                SymbolKind::RowAlias { table } => Some(table.clone()),
                _ => None,
            });
            if let Some(table) = row_table {
                self.check_visibility(&table, field, Operation::Select, span);
            }
        }

        match self.infer(target) {
            ty @ TypeInfo::Struct { .. } => match ty.member(field) {
                Some(member) => member.clone(),
                None => {
                    self.error(format!("`{ty}` has no field `{field}`"), span);
                    TypeInfo::Any
                }
            },
            TypeInfo::Node | TypeInfo::SqlResult | TypeInfo::Any | TypeInfo::Null => TypeInfo::Any,
            other => {
                self.error(
                    format!("cannot access field `{field}` on a value of type {other}"),
                    span,
                );
                TypeInfo::Any
            }
        }
    }

    fn infer_call(&mut self, callee: &Expr, args: &[Expr], span: Span) -> TypeInfo {
        let arg_types: Vec<TypeInfo> = args.iter().map(|arg| self.infer(arg)).collect();
        let Some(name) = callee.as_ident() else {
            self.infer(callee);
            return TypeInfo::Any;
        };

        let symbol = self
            .scopes
            .lookup(name)
            .map(|symbol| (symbol.kind.clone(), symbol.ty.clone()));
        match symbol {
            Some((_, TypeInfo::Function { params, ret })) => {
                if params.len() != arg_types.len() {
                    self.error(
                        format!(
                            "function `{name}` expects {} argument(s), found {}",
                            params.len(),
                            arg_types.len()
                        ),
                        span,
                    );
                } else {
                    for (i, (param, arg)) in params.iter().zip(&arg_types).enumerate() {
                        if !param.is_compatible(arg) {
                            self.error(
                                format!(
                                    "argument {} of `{name}` expects {param}, found {arg}",
                                    i + 1
                                ),
                                args[i].span,
                            );
                        }
                    }
                }
                *ret
            }
            Some((_, TypeInfo::Any)) => TypeInfo::Any,
            // Columns named like a builtin (`level`, `parent`) do not hide it.
            Some((SymbolKind::Column { .. }, _)) if lookup_builtin(name).is_some() => {
                self.infer_builtin_call(name, &arg_types, args, span)
            }
            Some(_) => {
                self.error(format!("`{name}` is not a function"), callee.span);
                TypeInfo::Any
            }
            None => self.infer_builtin_call(name, &arg_types, args, span),
        }
    }

    fn infer_builtin_call(
        &mut self,
        name: &str,
        arg_types: &[TypeInfo],
        args: &[Expr],
        span: Span,
    ) -> TypeInfo {
        let Some(builtin) = lookup_builtin(name) else {
            self.error(format!("undefined function `{name}`"), span);
            return TypeInfo::Any;
        };
        if !builtin.accepts(arg_types.len()) {
            let expected = match builtin.max_args {
                Some(max) if max == builtin.min_args => format!("{max}"),
                Some(max) => format!("{} to {max}", builtin.min_args),
                None => format!("at least {}", builtin.min_args),
            };
            self.error(
                format!(
                    "builtin `{name}` expects {expected} argument(s), found {}",
                    arg_types.len()
                ),
                span,
            );
            return TypeInfo::Any;
        }

        let first = arg_types.first().cloned().unwrap_or(TypeInfo::Any);
        match name {
            "len" => {
                if !matches!(
                    first,
                    TypeInfo::Array { .. }
                        | TypeInfo::String
                        | TypeInfo::SqlResult
                        | TypeInfo::Table { .. }
                        | TypeInfo::Any
                        | TypeInfo::Null
                ) {
                    self.error(
                        format!("`len` expects an array, string, table or sql result, found {first}"),
                        args[0].span,
                    );
                }
                TypeInfo::Integer
            }
            "append" => {
                if !matches!(first, TypeInfo::Array { .. } | TypeInfo::Any | TypeInfo::Null) {
                    self.error(
                        format!("`append` expects an array, found {first}"),
                        args[0].span,
                    );
                }
                first
            }
            "print" => TypeInfo::Void,
            "now" => TypeInfo::Time,
            "today" => TypeInfo::Date,
            "string" => TypeInfo::String,
            "abs" => match first {
                TypeInfo::Integer | TypeInfo::Float | TypeInfo::Duration => first,
                _ => TypeInfo::Any,
            },
            "columns" => TypeInfo::array_of(TypeInfo::String),
            "hierarchy" => {
                if !matches!(first, TypeInfo::Table { .. } | TypeInfo::Any | TypeInfo::Null) {
                    self.error(
                        format!("`hierarchy` expects a table, found {first}"),
                        args[0].span,
                    );
                }
                TypeInfo::Tree
            }
            "roots" | "children" | "traverse" => TypeInfo::array_of(TypeInfo::Node),
            "parent" => TypeInfo::Node,
            "level" => TypeInfo::Integer,
            _ => TypeInfo::Any,
        }
    }
}

/// Result type of an arithmetic operator, `None` when the operands do not
/// support it.
fn arithmetic_type(op: BinaryOp, left: &TypeInfo, right: &TypeInfo) -> Option<TypeInfo> {
    use BinaryOp::{Add, Div, Mod, Mul, Sub};
    use TypeInfo::{Any, Date, Duration, Float, Integer, Null, String, Time};

    let ty = match (op, left, right) {
        (_, Any | Null, _) | (_, _, Any | Null) => Any,
        (Add | Sub | Mul | Div | Mod, Integer, Integer) => Integer,
        (_, l, r) if l.is_numeric() && r.is_numeric() => Float,
        (Add, String, _) | (Add, _, String) => String,
        (Add | Sub, Date, Duration) | (Add, Duration, Date) => Date,
        (Add | Sub, Time, Duration) | (Add, Duration, Time) => Time,
        (Sub, Date, Date) | (Sub, Time, Time) => Duration,
        (Add | Sub, Duration, Duration) => Duration,
        (Mul, Duration, n) | (Mul, n, Duration) if n.is_numeric() => Duration,
        (Div, Duration, n) if n.is_numeric() => Duration,
        (Div, Duration, Duration) => Float,
        _ => return None,
    };
    Some(ty)
}
