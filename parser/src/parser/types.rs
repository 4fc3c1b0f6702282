//! Type and multiplicity parsing.

use super::Parser;
use crate::ast::*;
use crate::error::{ParseError, ParseResult};
use crate::lexer::TokenKind;

impl Parser {
    /// Parse a type: a named type with optional arguments, a function type
    /// `{A[1]->B[1]}` or a relation type `(a:A[1], b:B[*])`.
    pub(crate) fn parse_type(&mut self) -> ParseResult<TypeExpr> {
        let token = self.peek().clone();
        match token.kind {
            TokenKind::LBrace => self.parse_function_type(),
            TokenKind::LParen => self.parse_relation_type(),
            TokenKind::Ident(_) => self.parse_named_type(),
            _ => Err(ParseError::unexpected_token(token.span, "type", token.kind.name())),
        }
    }

    fn parse_named_type(&mut self) -> ParseResult<TypeExpr> {
        let start = self.peek().span;
        let name = self.expect_qualified_name()?;
        let mut type_arguments = Vec::new();
        let mut multiplicity_arguments = Vec::new();

        if self.eat(&TokenKind::Lt) {
            if !self.check(&TokenKind::Pipe) {
                type_arguments.push(self.parse_type()?);
                while self.eat(&TokenKind::Comma) {
                    type_arguments.push(self.parse_type()?);
                }
            }
            if self.eat(&TokenKind::Pipe) {
                multiplicity_arguments.push(self.parse_multiplicity_body()?);
                while self.eat(&TokenKind::Comma) {
                    multiplicity_arguments.push(self.parse_multiplicity_body()?);
                }
            }
            self.expect(&TokenKind::Gt)?;
        }

        Ok(TypeExpr::Named {
            name,
            type_arguments,
            multiplicity_arguments,
            span: self.span_from(start),
        })
    }

    fn parse_function_type(&mut self) -> ParseResult<TypeExpr> {
        let start = self.expect(&TokenKind::LBrace)?.span;
        let mut parameters = Vec::new();
        if !self.check(&TokenKind::RightArrow) {
            loop {
                let parameter_type = self.parse_type()?;
                let multiplicity = self.parse_multiplicity()?;
                parameters.push((parameter_type, multiplicity));
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(&TokenKind::RightArrow)?;
        let return_type = self.parse_type()?;
        let return_multiplicity = self.parse_multiplicity()?;
        self.expect(&TokenKind::RBrace)?;
        Ok(TypeExpr::Function {
            parameters,
            return_type: Box::new(return_type),
            return_multiplicity,
            span: self.span_from(start),
        })
    }

    fn parse_relation_type(&mut self) -> ParseResult<TypeExpr> {
        let start = self.expect(&TokenKind::LParen)?.span;
        let mut columns = Vec::new();
        if !self.check(&TokenKind::RParen) {
            loop {
                let column_start = self.peek().span;
                let name = self.expect_ident()?;
                self.expect(&TokenKind::Colon)?;
                let type_expr = self.parse_type()?;
                let multiplicity = self.parse_multiplicity()?;
                columns.push(ColumnDef {
                    name,
                    type_expr,
                    multiplicity,
                    span: self.span_from(column_start),
                });
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(&TokenKind::RParen)?;
        Ok(TypeExpr::Relation {
            columns,
            span: self.span_from(start),
        })
    }

    /// `[1]`, `[*]`, `[0..1]`, `[1..*]`, `[m]`
    pub(crate) fn parse_multiplicity(&mut self) -> ParseResult<MultiplicityExpr> {
        let start = self.expect(&TokenKind::LBracket)?.span;
        let inner = self.parse_multiplicity_body()?;
        self.expect(&TokenKind::RBracket)?;
        let span = self.span_from(start);
        Ok(match inner {
            MultiplicityExpr::Concrete { lower, upper, .. } => MultiplicityExpr::Concrete { lower, upper, span },
            MultiplicityExpr::Parameter { name, .. } => MultiplicityExpr::Parameter { name, span },
        })
    }

    /// A multiplicity without brackets, as written in `Type<|m>` arguments.
    fn parse_multiplicity_body(&mut self) -> ParseResult<MultiplicityExpr> {
        let token = self.peek().clone();
        match token.kind {
            TokenKind::Star => {
                self.advance();
                Ok(MultiplicityExpr::Concrete {
                    lower: 0,
                    upper: None,
                    span: token.span,
                })
            }
            TokenKind::Ident(name) => {
                self.advance();
                Ok(MultiplicityExpr::Parameter {
                    name,
                    span: token.span,
                })
            }
            TokenKind::Int(_) => {
                let lower = self.expect_u32()?;
                let upper = if self.eat(&TokenKind::Range) {
                    if self.eat(&TokenKind::Star) {
                        None
                    } else {
                        Some(self.expect_u32()?)
                    }
                } else {
                    Some(lower)
                };
                Ok(MultiplicityExpr::Concrete {
                    lower,
                    upper,
                    span: self.span_from(token.span),
                })
            }
            _ => Err(ParseError::unexpected_token(
                token.span,
                "multiplicity",
                token.kind.name(),
            )),
        }
    }
}
