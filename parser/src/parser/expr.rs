//! Expression parsing.
//!
//! Operators desugar to applications of named functions:
//! - Logical: `||` (or), `&&` (and), `!` (not)
//! - Comparison: `==` (equal), `!=` (not equal), `<`, `<=`, `>`, `>=`
//! - Additive: `+` (plus), `-` (minus)
//! - Multiplicative: `*` (times), `/` (divide)
//! - Postfix: property access (`.`), arrow application (`->`)
//! - Primary: literals, variables, applications, collections, element references

use super::Parser;
use crate::ast::*;
use crate::error::{ParseError, ParseResult};
use crate::lexer::TokenKind;
use weft_core::{Literal, Span};

impl Parser {
    /// Parse an expression.
    pub(crate) fn parse_expr(&mut self) -> ParseResult<Expr> {
        if self.check(&TokenKind::Let) {
            let start = self.advance().span;
            let name = self.expect_ident()?;
            self.expect(&TokenKind::Eq)?;
            let value = self.parse_expr()?;
            return Ok(Expr::Let {
                name,
                value: Box::new(value),
                span: self.span_from(start),
            });
        }
        self.parse_or()
    }

    fn binary(&self, function: &str, op_span: Span, left: Expr, right: Expr) -> Expr {
        let span = self.span_from(left.span());
        Expr::Application(Application {
            function: QualifiedName::new(function, op_span),
            arguments: vec![left, right],
            span,
        })
    }

    fn unary(function: &str, op_span: Span, operand: Expr, span: Span) -> Expr {
        Expr::Application(Application {
            function: QualifiedName::new(function, op_span),
            arguments: vec![operand],
            span,
        })
    }

    fn parse_or(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_and()?;
        while self.check(&TokenKind::OrOr) {
            let op = self.advance().span;
            let right = self.parse_and()?;
            left = self.binary("or", op, left, right);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_comparison()?;
        while self.check(&TokenKind::AndAnd) {
            let op = self.advance().span;
            let right = self.parse_comparison()?;
            left = self.binary("and", op, left, right);
        }
        Ok(left)
    }

    fn parse_comparison(&mut self) -> ParseResult<Expr> {
        let left = self.parse_additive()?;

        let function = match self.peek().kind {
            TokenKind::EqEq => "equal",
            TokenKind::NotEq => "equal",
            TokenKind::Lt => "lessThan",
            TokenKind::LtEq => "lessThanEqual",
            TokenKind::Gt => "greaterThan",
            TokenKind::GtEq => "greaterThanEqual",
            _ => return Ok(left),
        };
        let negate = self.check(&TokenKind::NotEq);
        let op = self.advance().span;
        let right = self.parse_additive()?;
        let comparison = self.binary(function, op, left, right);
        if negate {
            let span = comparison.span();
            Ok(Self::unary("not", op, comparison, span))
        } else {
            Ok(comparison)
        }
    }

    fn parse_additive(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let function = match self.peek().kind {
                TokenKind::Plus => "plus",
                TokenKind::Minus => "minus",
                _ => break,
            };
            let op = self.advance().span;
            let right = self.parse_multiplicative()?;
            left = self.binary(function, op, left, right);
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_unary()?;
        loop {
            let function = match self.peek().kind {
                TokenKind::Star => "times",
                TokenKind::Slash => "divide",
                _ => break,
            };
            let op = self.advance().span;
            let right = self.parse_unary()?;
            left = self.binary(function, op, left, right);
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> ParseResult<Expr> {
        let function = match self.peek().kind {
            TokenKind::Not => "not",
            TokenKind::Minus => "minus",
            _ => return self.parse_postfix(),
        };
        let op = self.advance().span;
        let operand = self.parse_unary()?;
        let span = self.span_from(op);
        Ok(Self::unary(function, op, operand, span))
    }

    fn parse_postfix(&mut self) -> ParseResult<Expr> {
        let mut expr = self.parse_primary()?;
        loop {
            if self.eat(&TokenKind::Dot) {
                let property = self.expect_ident()?;
                let span = self.span_from(expr.span());
                expr = Expr::PropertyAccess {
                    receiver: Box::new(expr),
                    property,
                    span,
                };
            } else if self.eat(&TokenKind::RightArrow) {
                let function = self.expect_qualified_name()?;
                let mut arguments = vec![expr];
                arguments.extend(self.parse_arguments()?);
                let span = self.span_from(arguments[0].span());
                expr = Expr::Application(Application {
                    function,
                    arguments,
                    span,
                });
            } else {
                return Ok(expr);
            }
        }
    }

    fn parse_primary(&mut self) -> ParseResult<Expr> {
        let token = self.peek().clone();
        match token.kind {
            TokenKind::String(s) => {
                self.advance();
                Ok(Expr::Literal(Literal::String(s), token.span))
            }
            TokenKind::Int(n) => {
                self.advance();
                Ok(Expr::Literal(Literal::Integer(n), token.span))
            }
            TokenKind::Float(f) => {
                self.advance();
                Ok(Expr::Literal(Literal::Float(f), token.span))
            }
            TokenKind::True | TokenKind::False => {
                self.advance();
                Ok(Expr::Literal(
                    Literal::Boolean(matches!(token.kind, TokenKind::True)),
                    token.span,
                ))
            }
            TokenKind::Dollar => {
                self.advance();
                let name = self.expect_ident()?;
                Ok(Expr::Variable(name, self.span_from(token.span)))
            }
            TokenKind::At => {
                self.advance();
                let name = self.expect_qualified_name()?;
                Ok(Expr::ElementRef(name))
            }
            TokenKind::LBracket => {
                self.advance();
                let mut values = Vec::new();
                if !self.check(&TokenKind::RBracket) {
                    values.push(self.parse_expr()?);
                    while self.eat(&TokenKind::Comma) {
                        values.push(self.parse_expr()?);
                    }
                }
                self.expect(&TokenKind::RBracket)?;
                Ok(Expr::Collection(values, self.span_from(token.span)))
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expr()?;
                self.expect(&TokenKind::RParen)?;
                Ok(inner)
            }
            TokenKind::Ident(_) => {
                let function = self.expect_qualified_name()?;
                if !self.check(&TokenKind::LParen) {
                    return Ok(Expr::ElementRef(function));
                }
                let arguments = self.parse_arguments()?;
                Ok(Expr::Application(Application {
                    function,
                    arguments,
                    span: self.span_from(token.span),
                }))
            }
            _ => Err(ParseError::unexpected_token(
                token.span,
                "expression",
                token.kind.name(),
            )),
        }
    }

    /// `(a, b, c)`
    fn parse_arguments(&mut self) -> ParseResult<Vec<Expr>> {
        self.expect(&TokenKind::LParen)?;
        let mut arguments = Vec::new();
        if !self.check(&TokenKind::RParen) {
            arguments.push(self.parse_expr()?);
            while self.eat(&TokenKind::Comma) {
                arguments.push(self.parse_expr()?);
            }
        }
        self.expect(&TokenKind::RParen)?;
        Ok(arguments)
    }
}
