//! Query parsing: `with`, `select`, `union`, hierarchy and window clauses.

use crate::{PResult, Parser};
use acta_diagnostic::Diagnostic;
use acta_ir::{
    Cte, ExprKind, HierarchyClause, OrderItem, Query, Select, SelectItem, SetExpr, TableRef,
    UnionArm, WindowCall, WithClause,
};
use acta_lexer::TokenKind;

impl Parser {
    pub(crate) fn query(&mut self) -> PResult<Query> {
        self.sql_depth += 1;
        let result = self.query_inner();
        self.sql_depth -= 1;
        result
    }

    fn query_inner(&mut self) -> PResult<Query> {
        let start = self.current_span();
        let with = if self.eat(&TokenKind::With) {
            let recursive = self.eat_word("recursive");
            let ctes = self.comma_list(Parser::cte)?;
            Some(WithClause { recursive, ctes })
        } else {
            None
        };
        let body = self.set_expr()?;
        Ok(Query {
            with,
            body,
            span: start.merge(self.prev_span()),
        })
    }

    /// `name [(col, …)] as ( select … [union [all] select …] )`
    fn cte(&mut self) -> PResult<Cte> {
        let (name, start) = self.ident("common table expression name")?;
        let columns = if self.eat(&TokenKind::LParen) {
            let columns = self.comma_list(|p| p.ident("column name").map(|(n, _)| n))?;
            self.expect(&TokenKind::RParen)?;
            columns
        } else {
            Vec::new()
        };
        self.expect(&TokenKind::As)?;
        self.expect(&TokenKind::LParen)?;
        let body = self.set_expr()?;
        let end = self.expect(&TokenKind::RParen)?;
        Ok(Cte {
            name,
            columns,
            body,
            span: start.merge(end),
        })
    }

    fn set_expr(&mut self) -> PResult<SetExpr> {
        let first = self.select()?;
        let mut rest = Vec::new();
        while self.eat(&TokenKind::Union) {
            let all = self.eat_word("all");
            let select = self.select()?;
            rest.push(UnionArm { all, select });
        }
        Ok(SetExpr { first, rest })
    }

    fn select(&mut self) -> PResult<Select> {
        let start = self.expect(&TokenKind::Select)?;
        let distinct = self.eat(&TokenKind::Distinct);
        let projection = self.comma_list(Parser::select_item)?;

        let from = if self.eat(&TokenKind::From) {
            let (name, span) = self.ident("table name")?;
            let alias = if self.eat(&TokenKind::As) {
                Some(self.ident("table alias")?.0)
            } else if matches!(self.current_kind(), TokenKind::Ident(_)) {
                Some(self.ident("table alias")?.0)
            } else {
                None
            };
            Some(TableRef {
                name,
                alias,
                span: span.merge(self.prev_span()),
            })
        } else {
            None
        };

        let hierarchy = if self.check(&TokenKind::Hierarchy) {
            Some(self.hierarchy_clause()?)
        } else {
            None
        };

        let filter = if self.eat(&TokenKind::Where) {
            Some(self.expression()?)
        } else {
            None
        };

        let order_by = if self.eat(&TokenKind::Order) {
            self.expect(&TokenKind::By)?;
            self.comma_list(Parser::order_item)?
        } else {
            Vec::new()
        };

        let limit = if self.eat(&TokenKind::Limit) {
            Some(self.expression()?)
        } else {
            None
        };

        Ok(Select {
            distinct,
            projection,
            from,
            hierarchy,
            filter,
            order_by,
            limit,
            span: start.merge(self.prev_span()),
        })
    }

    /// `hierarchy by <key> parent <parent key> [start with <cond>]`
    fn hierarchy_clause(&mut self) -> PResult<HierarchyClause> {
        let start = self.bump();
        self.expect(&TokenKind::By)?;
        let (key, _) = self.ident("key column")?;
        self.expect_word("parent")?;
        let (parent, _) = self.ident("parent column")?;
        let start_with = if self.eat(&TokenKind::Start) {
            self.expect(&TokenKind::With)?;
            Some(self.expression()?)
        } else {
            None
        };
        Ok(HierarchyClause {
            key,
            parent,
            start_with,
            span: start.merge(self.prev_span()),
        })
    }

    fn select_item(&mut self) -> PResult<SelectItem> {
        if self.eat(&TokenKind::Star) {
            return Ok(SelectItem::Wildcard);
        }
        let expr = self.expression()?;
        if self.check_word("over") {
            let ExprKind::Call { callee, args } = expr.kind else {
                return Err(Diagnostic::error(
                    "`over` must follow a function call",
                    expr.span,
                ));
            };
            let Some(function) = callee.as_ident().map(str::to_string) else {
                return Err(Diagnostic::error(
                    "window function name must be an identifier",
                    callee.span,
                ));
            };
            self.bump();
            self.expect(&TokenKind::LParen)?;
            let partition_by = if self.eat_word("partition") {
                self.expect(&TokenKind::By)?;
                self.comma_list(Parser::expression)?
            } else {
                Vec::new()
            };
            let order_by = if self.eat(&TokenKind::Order) {
                self.expect(&TokenKind::By)?;
                self.comma_list(Parser::order_item)?
            } else {
                Vec::new()
            };
            let end = self.expect(&TokenKind::RParen)?;
            let alias = self.select_alias()?;
            return Ok(SelectItem::Window(WindowCall {
                function,
                args,
                partition_by,
                order_by,
                alias,
                span: expr.span.merge(end),
            }));
        }
        let alias = self.select_alias()?;
        Ok(SelectItem::Expr { expr, alias })
    }

    fn select_alias(&mut self) -> PResult<Option<String>> {
        if self.eat(&TokenKind::As) {
            Ok(Some(self.ident("column alias")?.0))
        } else {
            Ok(None)
        }
    }

    fn order_item(&mut self) -> PResult<OrderItem> {
        let expr = self.expression()?;
        let descending = if self.eat_word("desc") {
            true
        } else {
            self.eat_word("asc");
            false
        };
        Ok(OrderItem { expr, descending })
    }
}
