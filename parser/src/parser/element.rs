//! Top-level definition parsing.
//!
//! Handles parsing of:
//! - Imports
//! - Class definitions (stereotypes, type parameters, generalizations, properties)
//! - Association definitions
//! - Enumeration definitions
//! - Function and native function definitions

use super::Parser;
use crate::ast::*;
use crate::error::{ParseError, ParseResult};
use crate::lexer::TokenKind;

impl Parser {
    /// Parse imports followed by element definitions until end of input.
    pub fn parse_section(&mut self) -> ParseResult<SectionAst> {
        let mut section = SectionAst::default();

        while self.check(&TokenKind::Import) {
            section.imports.push(self.parse_import()?);
        }
        while !self.check(&TokenKind::Eof) {
            section.elements.push(self.parse_element()?);
        }

        Ok(section)
    }

    /// Syntax: import a::b::*;
    fn parse_import(&mut self) -> ParseResult<QualifiedName> {
        self.expect(&TokenKind::Import)?;
        let package = self.expect_qualified_name()?;
        self.expect(&TokenKind::PathSep)?;
        self.expect(&TokenKind::Star)?;
        self.expect(&TokenKind::Semicolon)?;
        Ok(package)
    }

    fn parse_element(&mut self) -> ParseResult<Element> {
        let token = self.peek().clone();
        match &token.kind {
            TokenKind::Class => self.parse_class_def().map(Element::Class),
            TokenKind::Association => self.parse_association_def().map(Element::Association),
            TokenKind::Enum => self.parse_enum_def().map(Element::Enumeration),
            TokenKind::Function | TokenKind::Native => self.parse_function_def().map(Element::Function),
            _ => Err(ParseError::unexpected_token(
                token.span,
                "Class, Association, Enum, or function",
                token.kind.name(),
            )),
        }
    }

    // ==================== CLASS ====================

    /// Syntax: Class [<<s1, s2>>] path[<T, -U|m>] [extends A, B] { members }
    fn parse_class_def(&mut self) -> ParseResult<ClassDef> {
        let start = self.expect(&TokenKind::Class)?.span;
        let stereotypes = self.parse_stereotypes()?;
        let name = self.expect_qualified_name()?;
        let (type_parameters, multiplicity_parameters) = self.parse_type_parameters()?;

        let mut generalizations = Vec::new();
        if self.eat(&TokenKind::Extends) {
            generalizations.push(self.parse_type()?);
            while self.eat(&TokenKind::Comma) {
                generalizations.push(self.parse_type()?);
            }
        }

        self.expect(&TokenKind::LBrace)?;
        let mut properties = Vec::new();
        let mut qualified_properties = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.check(&TokenKind::Eof) {
            let member_start = self.peek().span;
            let member = self.expect_ident()?;
            if self.check(&TokenKind::LParen) {
                qualified_properties.push(self.parse_qualified_property(member, member_start)?);
            } else if self.check(&TokenKind::Colon) {
                properties.push(self.parse_property_rest(member, member_start)?);
            } else {
                let token = self.peek();
                return Err(ParseError::unexpected_token(
                    token.span,
                    "( or :",
                    token.kind.name(),
                ));
            }
        }
        self.expect(&TokenKind::RBrace)?;

        Ok(ClassDef {
            name,
            stereotypes,
            type_parameters,
            multiplicity_parameters,
            generalizations,
            properties,
            qualified_properties,
            span: self.span_from(start),
        })
    }

    /// `<<temporal>>`, written as two `<` and two `>` tokens.
    fn parse_stereotypes(&mut self) -> ParseResult<Vec<String>> {
        let mut stereotypes = Vec::new();
        if self.check(&TokenKind::Lt) && matches!(self.peek_nth(1).kind, TokenKind::Lt) {
            self.advance();
            self.advance();
            stereotypes.push(self.expect_ident()?);
            while self.eat(&TokenKind::Comma) {
                stereotypes.push(self.expect_ident()?);
            }
            self.expect(&TokenKind::Gt)?;
            self.expect(&TokenKind::Gt)?;
        }
        Ok(stereotypes)
    }

    /// `<T, -U|m, n>`; absent parameters yield empty lists.
    pub(crate) fn parse_type_parameters(&mut self) -> ParseResult<(Vec<TypeParameterDef>, Vec<String>)> {
        let mut type_parameters = Vec::new();
        let mut multiplicity_parameters = Vec::new();
        if !self.eat(&TokenKind::Lt) {
            return Ok((type_parameters, multiplicity_parameters));
        }

        if !self.check(&TokenKind::Pipe) {
            loop {
                let start = self.peek().span;
                let contravariant = self.eat(&TokenKind::Minus);
                let name = self.expect_ident()?;
                type_parameters.push(TypeParameterDef {
                    name,
                    contravariant,
                    span: self.span_from(start),
                });
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }
        if self.eat(&TokenKind::Pipe) {
            multiplicity_parameters.push(self.expect_ident()?);
            while self.eat(&TokenKind::Comma) {
                multiplicity_parameters.push(self.expect_ident()?);
            }
        }
        self.expect(&TokenKind::Gt)?;
        Ok((type_parameters, multiplicity_parameters))
    }

    /// Rest of `name: Type[m];` after the name.
    fn parse_property_rest(&mut self, name: String, start: weft_core::Span) -> ParseResult<PropertyDef> {
        self.expect(&TokenKind::Colon)?;
        let type_expr = self.parse_type()?;
        let multiplicity = self.parse_multiplicity()?;
        self.expect(&TokenKind::Semicolon)?;
        Ok(PropertyDef {
            name,
            type_expr,
            multiplicity,
            span: self.span_from(start),
        })
    }

    /// Rest of `name(params) { body }: Type[m];` after the name.
    fn parse_qualified_property(
        &mut self,
        name: String,
        start: weft_core::Span,
    ) -> ParseResult<QualifiedPropertyDef> {
        let parameters = self.parse_parameters()?;
        let body = self.parse_body()?;
        self.expect(&TokenKind::Colon)?;
        let return_type = self.parse_type()?;
        let return_multiplicity = self.parse_multiplicity()?;
        self.expect(&TokenKind::Semicolon)?;
        Ok(QualifiedPropertyDef {
            name,
            parameters,
            body,
            return_type,
            return_multiplicity,
            span: self.span_from(start),
        })
    }

    // ==================== ASSOCIATION ====================

    /// Syntax: Association path { a: A[1]; b: B[*]; }
    fn parse_association_def(&mut self) -> ParseResult<AssociationDef> {
        let start = self.expect(&TokenKind::Association)?.span;
        let name = self.expect_qualified_name()?;
        self.expect(&TokenKind::LBrace)?;
        let mut properties = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.check(&TokenKind::Eof) {
            let property_start = self.peek().span;
            let property = self.expect_ident()?;
            properties.push(self.parse_property_rest(property, property_start)?);
        }
        self.expect(&TokenKind::RBrace)?;
        Ok(AssociationDef {
            name,
            properties,
            span: self.span_from(start),
        })
    }

    // ==================== ENUMERATION ====================

    /// Syntax: Enum path { A, B, C }
    fn parse_enum_def(&mut self) -> ParseResult<EnumDef> {
        let start = self.expect(&TokenKind::Enum)?.span;
        let name = self.expect_qualified_name()?;
        self.expect(&TokenKind::LBrace)?;
        let mut values = Vec::new();
        while !self.check(&TokenKind::RBrace) {
            let span = self.peek().span;
            values.push((self.expect_ident()?, span));
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RBrace)?;
        Ok(EnumDef {
            name,
            values,
            span: self.span_from(start),
        })
    }

    // ==================== FUNCTION ====================

    /// Syntax: function path<T|m>(p: T[m]): R[1] { body }
    ///         native function path(p: T[1]): R[1];
    fn parse_function_def(&mut self) -> ParseResult<FunctionDef> {
        let start = self.peek().span;
        let native = self.eat(&TokenKind::Native);
        self.expect(&TokenKind::Function)?;
        let name = self.expect_qualified_name()?;
        let (type_parameters, multiplicity_parameters) = self.parse_type_parameters()?;
        let parameters = self.parse_parameters()?;
        self.expect(&TokenKind::Colon)?;
        let return_type = self.parse_type()?;
        let return_multiplicity = self.parse_multiplicity()?;

        let body = if native {
            self.expect(&TokenKind::Semicolon)?;
            Vec::new()
        } else {
            self.parse_body()?
        };

        Ok(FunctionDef {
            name,
            native,
            type_parameters,
            multiplicity_parameters,
            parameters,
            return_type,
            return_multiplicity,
            body,
            span: self.span_from(start),
        })
    }

    /// `(a: A[1], b: B[*])`
    fn parse_parameters(&mut self) -> ParseResult<Vec<ParameterDef>> {
        self.expect(&TokenKind::LParen)?;
        let mut parameters = Vec::new();
        if !self.check(&TokenKind::RParen) {
            loop {
                let start = self.peek().span;
                let name = self.expect_ident()?;
                self.expect(&TokenKind::Colon)?;
                let type_expr = self.parse_type()?;
                let multiplicity = self.parse_multiplicity()?;
                parameters.push(ParameterDef {
                    name,
                    type_expr,
                    multiplicity,
                    span: self.span_from(start),
                });
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(&TokenKind::RParen)?;
        Ok(parameters)
    }

    /// `{ expr; expr; expr }`; the last semicolon is optional.
    fn parse_body(&mut self) -> ParseResult<Vec<Expr>> {
        self.expect(&TokenKind::LBrace)?;
        let mut body = Vec::new();
        while !self.check(&TokenKind::RBrace) {
            body.push(self.parse_expr()?);
            if !self.eat(&TokenKind::Semicolon) {
                break;
            }
        }
        self.expect(&TokenKind::RBrace)?;
        Ok(body)
    }
}
