//! Parser for model source text.
//!
//! This module is organized into submodules by parsing category:
//! - `element`: Top-level definitions (classes, associations, enumerations, functions)
//! - `types`: Types and multiplicities
//! - `expr`: Expressions in function and qualified-property bodies

mod element;
mod expr;
mod types;

use crate::ast::*;
use crate::error::{ParseError, ParseResult};
use crate::lexer::{Lexer, Token, TokenKind};
use crate::section::Section;
use weft_core::Span;

// ==================== PARSER STATE ====================

/// Parser state.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    eof: Token,
}

impl Parser {
    /// Create a new parser from source text.
    pub fn new(input: &str) -> ParseResult<Self> {
        Ok(Self::from_tokens(Lexer::new(input).tokenize()?))
    }

    /// Create a parser for one section of a larger unit.
    pub fn for_section(section: &Section<'_>) -> ParseResult<Self> {
        let tokens = Lexer::starting_at(section.text, section.offset, section.line).tokenize()?;
        Ok(Self::from_tokens(tokens))
    }

    fn from_tokens(tokens: Vec<Token>) -> Self {
        let eof = tokens
            .last()
            .cloned()
            .unwrap_or_else(|| Token::eof(0, 1, 1));
        Self {
            tokens,
            pos: 0,
            eof,
        }
    }
}

// ==================== TOKEN HELPERS ====================

impl Parser {
    pub(crate) fn peek(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&self.eof)
    }

    pub(crate) fn peek_nth(&self, n: usize) -> &Token {
        self.tokens.get(self.pos + n).unwrap_or(&self.eof)
    }

    pub(crate) fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(&self.peek().kind) == std::mem::discriminant(kind)
    }

    pub(crate) fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn expect(&mut self, kind: &TokenKind) -> ParseResult<Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            let token = self.peek();
            Err(ParseError::unexpected_token(
                token.span,
                kind.name(),
                token.kind.name(),
            ))
        }
    }

    pub(crate) fn expect_ident(&mut self) -> ParseResult<String> {
        match self.peek().kind.clone() {
            TokenKind::Ident(name) => {
                self.advance();
                Ok(name)
            }
            _ => {
                let token = self.peek();
                Err(ParseError::unexpected_token(
                    token.span,
                    "identifier",
                    token.kind.name(),
                ))
            }
        }
    }

    /// Parse `a::b::c`.
    pub(crate) fn expect_qualified_name(&mut self) -> ParseResult<QualifiedName> {
        let start = self.peek().span;
        let mut path = self.expect_ident()?;
        while self.check(&TokenKind::PathSep)
            && matches!(self.peek_nth(1).kind, TokenKind::Ident(_))
        {
            self.advance();
            path.push_str("::");
            path.push_str(&self.expect_ident()?);
        }
        Ok(QualifiedName::new(path, self.span_from(start)))
    }

    pub(crate) fn expect_u32(&mut self) -> ParseResult<u32> {
        let token = self.peek().clone();
        match token.kind {
            TokenKind::Int(n) => {
                self.advance();
                u32::try_from(n).map_err(|_| {
                    ParseError::new(format!("bound out of range: {}", n), token.span)
                })
            }
            _ => Err(ParseError::unexpected_token(
                token.span,
                "integer",
                token.kind.name(),
            )),
        }
    }

    pub(crate) fn span_from(&self, start: Span) -> Span {
        let end = match self.pos {
            0 => self.peek().span.end,
            pos => self.tokens.get(pos - 1).map_or(start.end, |t| t.span.end),
        };
        Span::new(start.start, end, start.line, start.column)
    }
}

// ==================== PUBLIC API ====================

/// Parse one section of model source text.
pub fn parse_section(input: &str) -> ParseResult<SectionAst> {
    Parser::new(input)?.parse_section()
}

/// Parse a section split out of a larger unit, keeping unit-relative spans.
pub fn parse_section_at(section: &Section<'_>) -> ParseResult<SectionAst> {
    Parser::for_section(section)?.parse_section()
}

/// Parse a single type expression followed by end of input.
pub fn parse_type(input: &str) -> ParseResult<TypeExpr> {
    let mut parser = Parser::new(input)?;
    let type_expr = parser.parse_type()?;
    parser.expect(&TokenKind::Eof)?;
    Ok(type_expr)
}

/// Parse a single expression followed by end of input.
pub fn parse_expr(input: &str) -> ParseResult<Expr> {
    let mut parser = Parser::new(input)?;
    let expr = parser.parse_expr()?;
    parser.expect(&TokenKind::Eof)?;
    Ok(expr)
}

// ==================== TESTS ====================
