//! Expression parsing: precedence climbing over `BinaryOp::precedence`.

use crate::{PResult, Parser};
use acta_diagnostic::Diagnostic;
use acta_ir::{BinaryOp, Expr, ExprKind, UnaryOp};
use acta_lexer::TokenKind;
use acta_stack::ensure_sufficient_stack;

/// Assignment sits below every binary operator.
const ASSIGN_LEVEL: u8 = 14;

/// `is [not] null` binds like the relational operators.
const IS_NULL_LEVEL: u8 = 7;

impl Parser {
    /// Parse any expression.
    pub(crate) fn expression(&mut self) -> PResult<Expr> {
        self.parse_precedence(ASSIGN_LEVEL)
    }

    /// Parse an expression in relational context (`=` compares).
    pub(crate) fn sql_expression(&mut self) -> PResult<Expr> {
        self.sql_depth += 1;
        let result = self.expression();
        self.sql_depth -= 1;
        result
    }

    fn parse_precedence(&mut self, max_prec: u8) -> PResult<Expr> {
        ensure_sufficient_stack(|| {
            let mut left = self.unary()?;

            if max_prec >= ASSIGN_LEVEL && self.sql_depth == 0 && self.check(&TokenKind::Eq) {
                if !matches!(
                    left.kind,
                    ExprKind::Ident(_) | ExprKind::Index { .. } | ExprKind::Field { .. }
                ) {
                    return Err(Diagnostic::error("invalid assignment target", left.span));
                }
                self.bump();
                let value = self.expression()?;
                let span = left.span.merge(value.span);
                return Ok(Expr::new(
                    ExprKind::Assign {
                        target: Box::new(left),
                        value: Box::new(value),
                    },
                    span,
                ));
            }

            loop {
                if self.check(&TokenKind::Is) && IS_NULL_LEVEL <= max_prec {
                    self.bump();
                    let negated = self.eat(&TokenKind::Not);
                    let end = self.expect(&TokenKind::Null)?;
                    let span = left.span.merge(end);
                    left = Expr::new(
                        ExprKind::IsNull {
                            operand: Box::new(left),
                            negated,
                        },
                        span,
                    );
                    continue;
                }

                let Some(op) = self.binary_op() else { break };
                let prec = op.precedence();
                if prec > max_prec {
                    break;
                }
                self.bump();
                // All binary operators are left-associative.
                let right = self.parse_precedence(prec - 1)?;
                left = Expr::binary(op, left, right);
            }

            Ok(left)
        })
    }

    fn binary_op(&self) -> Option<BinaryOp> {
        let op = match self.current_kind() {
            TokenKind::Plus => BinaryOp::Add,
            TokenKind::Minus => BinaryOp::Sub,
            TokenKind::Star => BinaryOp::Mul,
            TokenKind::Slash => BinaryOp::Div,
            TokenKind::Percent => BinaryOp::Mod,
            TokenKind::EqEq => BinaryOp::Eq,
            TokenKind::Eq if self.sql_depth > 0 => BinaryOp::Eq,
            TokenKind::NotEq => BinaryOp::NotEq,
            TokenKind::Lt => BinaryOp::Lt,
            TokenKind::LtEq => BinaryOp::LtEq,
            TokenKind::Gt => BinaryOp::Gt,
            TokenKind::GtEq => BinaryOp::GtEq,
            TokenKind::And | TokenKind::AmpAmp => BinaryOp::And,
            TokenKind::Or | TokenKind::PipePipe => BinaryOp::Or,
            TokenKind::In => BinaryOp::In,
            _ => return None,
        };
        Some(op)
    }

    fn unary(&mut self) -> PResult<Expr> {
        let op = match self.current_kind() {
            TokenKind::Minus => UnaryOp::Neg,
            TokenKind::Bang | TokenKind::Not => UnaryOp::Not,
            _ => return self.postfix(),
        };
        let start = self.bump();
        let operand = ensure_sufficient_stack(|| self.unary())?;
        let span = start.merge(operand.span);
        Ok(Expr::new(
            ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
            span,
        ))
    }

    /// Calls, indexing and field access.
    fn postfix(&mut self) -> PResult<Expr> {
        let mut expr = self.primary()?;
        loop {
            match self.current_kind() {
                TokenKind::LParen => {
                    self.bump();
                    let args = if self.check(&TokenKind::RParen) {
                        Vec::new()
                    } else {
                        self.comma_list(Parser::expression)?
                    };
                    let end = self.expect(&TokenKind::RParen)?;
                    let span = expr.span.merge(end);
                    expr = Expr::new(
                        ExprKind::Call {
                            callee: Box::new(expr),
                            args,
                        },
                        span,
                    );
                }
                TokenKind::LBracket => {
                    self.bump();
                    let index = self.expression()?;
                    let end = self.expect(&TokenKind::RBracket)?;
                    let span = expr.span.merge(end);
                    expr = Expr::new(
                        ExprKind::Index {
                            target: Box::new(expr),
                            index: Box::new(index),
                        },
                        span,
                    );
                }
                TokenKind::Dot => {
                    self.bump();
                    let (field, end) = self.ident("field name")?;
                    let span = expr.span.merge(end);
                    expr = Expr::new(
                        ExprKind::Field {
                            target: Box::new(expr),
                            field,
                        },
                        span,
                    );
                }
                _ => return Ok(expr),
            }
        }
    }

    fn primary(&mut self) -> PResult<Expr> {
        let span = self.current_span();
        let kind = match self.current_kind() {
            TokenKind::Int(n) => ExprKind::Int(*n),
            TokenKind::Float(f) => ExprKind::Float(*f),
            TokenKind::Str(s) => ExprKind::Str(s.clone()),
            TokenKind::Date(s) => ExprKind::Date(s.clone()),
            TokenKind::Time(s) => ExprKind::Time(s.clone()),
            TokenKind::Duration(value, unit) => ExprKind::Duration {
                value: *value,
                unit: *unit,
            },
            TokenKind::True => ExprKind::Bool(true),
            TokenKind::False => ExprKind::Bool(false),
            TokenKind::Null => ExprKind::Null,
            TokenKind::Ident(name) => ExprKind::Ident(name.clone()),
            // `hierarchy(table, key, parent)` is a builtin call, not a clause.
            TokenKind::Hierarchy if matches!(self.peek(1), TokenKind::LParen) => {
                ExprKind::Ident("hierarchy".to_string())
            }
            TokenKind::LParen => {
                self.bump();
                let inner = self.expression()?;
                self.expect(&TokenKind::RParen)?;
                return Ok(inner);
            }
            TokenKind::LBracket => return self.array_literal(),
            TokenKind::Select | TokenKind::With => {
                let query = self.query()?;
                let span = query.span;
                return Ok(Expr::new(ExprKind::Query(Box::new(query)), span));
            }
            _ => return Err(self.unexpected("expression")),
        };
        self.bump();
        Ok(Expr::new(kind, span))
    }

    fn array_literal(&mut self) -> PResult<Expr> {
        let start = self.bump();
        let mut elements = Vec::new();
        while !self.check(&TokenKind::RBracket) {
            elements.push(self.expression()?);
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        let end = self.expect(&TokenKind::RBracket)?;
        Ok(Expr::new(ExprKind::Array(elements), start.merge(end)))
    }
}
