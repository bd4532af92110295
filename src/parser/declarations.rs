//! Declaration parsing implementation
//!
//! This module handles parsing of top-level declarations:
//!
//! - Function definitions: `fn name(params) -> type { ... }`
//! - Type definitions: `type Name { members }`
//! - Type expressions: base types with `*` (array) and `@` (pointer) suffixes
//! - Parameter lists and type members
//!
//! # Grammar
//!
//! ```text
//! function_def ::= "fn" identifier "(" params ")" ("->" type)? "{" block "}"
//! type_def     ::= "type" identifier "{" (type identifier ";")* "}"
//! type         ::= identifier ("*" | "@")*
//! params       ::= (param ("," param)*)?
//! param        ::= type identifier | identifier
//! ```
//!
//! Function and type definitions are parsed by a phase machine that can
//! re-enter any phase after recovery. Every declaration-level recovery
//! includes `fn` and `type` in its target set so that a malformed
//! declaration is abandoned at the start of the next one instead of
//! swallowing it.
//!
//! All parsing methods are implemented as `pub(crate)` methods on the
//! [`Parser`] struct.

use crate::parser::ast::{FunctionDef, TypeDef, TypeNode, Variable};
use crate::parser::errors::SyntaxError;
use crate::parser::lexer::TokenKind;
use crate::parser::parse::Parser;

/// Progress marker for the function definition phase machine.
enum FnPhase {
    Name,
    Params,
    ReturnType,
    Body,
}

impl Parser {
    /// Parse a function definition. The cursor must be at the `fn` keyword.
    ///
    /// Each phase either consumes what it expects or reports a diagnostic
    /// and resynchronizes. Stopping at `fn`, `type` or end of input
    /// abandons the rest of the declaration; whatever was recognized so
    /// far is kept.
    pub(crate) fn parse_function_definition(&mut self) -> FunctionDef {
        let keyword = self.consume();
        let mut function = FunctionDef::new(keyword.position);
        let mut phase = FnPhase::Name;

        loop {
            match phase {
                FnPhase::Name => {
                    if self.check(TokenKind::Ident) {
                        function.name = Some(self.consume().text);
                        phase = FnPhase::Params;
                        continue;
                    }
                    if self.check(TokenKind::LParen) {
                        let position = self.peek_position();
                        self.error(SyntaxError::MissingFunctionName, position);
                        phase = FnPhase::Params;
                        continue;
                    }
                    self.error(SyntaxError::InvalidFunctionDeclaration, function.position);
                    match self.consume_until(&[
                        TokenKind::Ident,
                        TokenKind::LParen,
                        TokenKind::LBrace,
                        TokenKind::Fn,
                        TokenKind::Type,
                    ]) {
                        TokenKind::Ident => {}
                        TokenKind::LParen => phase = FnPhase::Params,
                        TokenKind::LBrace => phase = FnPhase::Body,
                        _ => return function,
                    }
                }
                FnPhase::Params => {
                    if self.check(TokenKind::LParen) {
                        function.params = self.parse_parameter_list();
                        phase = FnPhase::ReturnType;
                        continue;
                    }
                    if self.check(TokenKind::LBrace) {
                        self.error(SyntaxError::MissingFunctionArguments, function.position);
                        phase = FnPhase::Body;
                        continue;
                    }
                    self.error(SyntaxError::InvalidFunctionDeclaration, function.position);
                    match self.consume_until(&[
                        TokenKind::LParen,
                        TokenKind::LBrace,
                        TokenKind::Fn,
                        TokenKind::Type,
                    ]) {
                        TokenKind::LParen => {}
                        TokenKind::LBrace => phase = FnPhase::Body,
                        _ => return function,
                    }
                }
                FnPhase::ReturnType => {
                    if self.check(TokenKind::LBrace) {
                        phase = FnPhase::Body;
                        continue;
                    }
                    if !self.check(TokenKind::Arrow) {
                        self.error(SyntaxError::InvalidFunctionDeclaration, function.position);
                        match self.consume_until(&[
                            TokenKind::Arrow,
                            TokenKind::LBrace,
                            TokenKind::Fn,
                            TokenKind::Type,
                        ]) {
                            TokenKind::Arrow => {}
                            TokenKind::LBrace => phase = FnPhase::Body,
                            _ => return function,
                        }
                        continue;
                    }
                    self.consume();
                    if self.check(TokenKind::Ident) {
                        function.return_type = self.parse_type();
                        phase = FnPhase::Body;
                        continue;
                    }
                    self.error(SyntaxError::InvalidFunctionDeclaration, function.position);
                    match self.consume_until(&[
                        TokenKind::Ident,
                        TokenKind::LBrace,
                        TokenKind::Fn,
                        TokenKind::Type,
                    ]) {
                        TokenKind::Ident => {
                            function.return_type = self.parse_type();
                            phase = FnPhase::Body;
                        }
                        TokenKind::LBrace => phase = FnPhase::Body,
                        _ => return function,
                    }
                }
                FnPhase::Body => {
                    if self.check(TokenKind::LBrace) {
                        function.body = self.parse_block();
                        return function;
                    }
                    self.error(SyntaxError::InvalidFunctionDeclaration, function.position);
                    match self.consume_until(&[TokenKind::LBrace, TokenKind::Fn, TokenKind::Type]) {
                        TokenKind::LBrace => {}
                        _ => return function,
                    }
                }
            }
        }
    }

    /// Parse a parenthesized parameter list. The cursor must be at `(`.
    ///
    /// A malformed parameter is discarded and the list resynchronizes at
    /// the next `,` or `)`. A missing `)` at end of input is reported as
    /// an unclosed delimiter anchored at the `(`.
    pub(crate) fn parse_parameter_list(&mut self) -> Vec<Variable> {
        let open_position = self.peek_position();
        self.consume();
        let mut params = Vec::new();

        while !matches!(self.peek_kind(), TokenKind::RParen | TokenKind::Eof) {
            let Some(param) = self.parse_parameter() else {
                continue;
            };
            params.push(param);

            match self.peek_kind() {
                TokenKind::Comma => {
                    self.consume();
                }
                TokenKind::RParen | TokenKind::Eof => {}
                _ => {
                    let token = self.peek().clone();
                    self.error(
                        SyntaxError::unexpected(&token, &[TokenKind::Comma, TokenKind::RParen]),
                        token.position,
                    );
                    if self.consume_until(&[TokenKind::Comma, TokenKind::RParen])
                        == TokenKind::Comma
                    {
                        self.consume();
                    }
                }
            }
        }

        if !self.match_kind(TokenKind::RParen) {
            self.error(
                SyntaxError::UnclosedDelimiter {
                    delimiter: "'('".to_string(),
                },
                open_position,
            );
        }

        params
    }

    /// Parse a single parameter, or `None` if it had to be abandoned.
    ///
    /// A parameter is a type followed by a name. A plain named type
    /// followed by `,` or `)` is reinterpreted as the parameter's name
    /// with the type left to inference, so `fn f(x)` parses without a
    /// diagnostic.
    fn parse_parameter(&mut self) -> Option<Variable> {
        let mut parameter = Variable::default();

        loop {
            if self.check(TokenKind::Ident) {
                parameter.ty = self.parse_type();
                break;
            }
            let token = self.peek().clone();
            self.error(
                SyntaxError::ExpectedType {
                    found: token.to_string(),
                },
                token.position,
            );
            match self.consume_until(&[TokenKind::RParen, TokenKind::Ident]) {
                TokenKind::Ident => {}
                _ => return None,
            }
        }

        loop {
            match self.peek_kind() {
                TokenKind::Ident => {
                    parameter.name = Some(self.consume().text);
                    return Some(parameter);
                }
                TokenKind::Comma | TokenKind::RParen => {
                    match std::mem::take(&mut parameter.ty) {
                        TypeNode::Named(name) => {
                            parameter.name = Some(name);
                            parameter.ty = TypeNode::Auto;
                        }
                        wrapped => {
                            // `fn f(int*)`: a wrapped type cannot be a name
                            parameter.ty = wrapped;
                            let position = self.peek_position();
                            self.error(SyntaxError::MissingVariableName, position);
                        }
                    }
                    return Some(parameter);
                }
                _ => {
                    let token = self.peek().clone();
                    self.error(
                        SyntaxError::unexpected(&token, &[TokenKind::Ident]),
                        token.position,
                    );
                    match self.consume_until(&[TokenKind::RParen, TokenKind::Ident]) {
                        TokenKind::Ident => {}
                        _ => return None,
                    }
                }
            }
        }
    }

    /// Parse a type expression. The cursor must be at an identifier.
    ///
    /// Suffixes bind left to right, so `int*@` is a pointer to an array
    /// of `int`.
    pub(crate) fn parse_type(&mut self) -> TypeNode {
        let mut ty = TypeNode::Named(self.consume().text);
        loop {
            match self.peek_kind() {
                TokenKind::Star => {
                    self.consume();
                    ty = TypeNode::Array(Box::new(ty));
                }
                TokenKind::At => {
                    self.consume();
                    ty = TypeNode::Pointer(Box::new(ty));
                }
                _ => return ty,
            }
        }
    }

    /// Parse a type definition. The cursor must be at the `type` keyword.
    pub(crate) fn parse_type_definition(&mut self) -> TypeDef {
        let keyword = self.consume();
        let mut definition = TypeDef::new(keyword.position);

        loop {
            if self.check(TokenKind::Ident) {
                definition.name = Some(self.consume().text);
                break;
            }
            if self.check(TokenKind::LBrace) {
                let position = self.peek_position();
                self.error(SyntaxError::MissingTypeName, position);
                break;
            }
            self.error(SyntaxError::InvalidTypeDeclaration, definition.position);
            match self.consume_until(&[
                TokenKind::Ident,
                TokenKind::LBrace,
                TokenKind::Fn,
                TokenKind::Type,
            ]) {
                TokenKind::Ident => {}
                TokenKind::LBrace => break,
                _ => return definition,
            }
        }

        if !self.check(TokenKind::LBrace) {
            self.error(SyntaxError::InvalidTypeDeclaration, definition.position);
            match self.consume_until(&[TokenKind::LBrace, TokenKind::Fn, TokenKind::Type]) {
                TokenKind::LBrace => {}
                _ => return definition,
            }
        }

        let open_position = self.peek_position();
        self.consume();

        while !matches!(self.peek_kind(), TokenKind::RBrace | TokenKind::Eof) {
            let Some(member) = self.parse_member() else {
                continue;
            };
            definition.members.push(member);

            match self.peek_kind() {
                TokenKind::Semicolon => {
                    self.consume();
                }
                TokenKind::RBrace | TokenKind::Eof => {}
                _ => {
                    // report and keep going; the next member is usually intact
                    let position = self.peek_position();
                    self.error(SyntaxError::MissingSemicolon, position);
                }
            }
        }

        if !self.match_kind(TokenKind::RBrace) {
            self.error(
                SyntaxError::UnclosedDelimiter {
                    delimiter: "'{'".to_string(),
                },
                open_position,
            );
        }

        definition
    }

    /// Parse a single type member, or `None` if it had to be abandoned.
    fn parse_member(&mut self) -> Option<Variable> {
        let mut member = Variable::default();

        loop {
            if self.check(TokenKind::Ident) {
                member.ty = self.parse_type();
                break;
            }
            let token = self.peek().clone();
            self.error(
                SyntaxError::ExpectedType {
                    found: token.to_string(),
                },
                token.position,
            );
            match self.consume_until(&[
                TokenKind::Ident,
                TokenKind::Semicolon,
                TokenKind::RBrace,
            ]) {
                TokenKind::Ident => {}
                TokenKind::Semicolon => {
                    self.consume();
                    return None;
                }
                _ => return None,
            }
        }

        loop {
            match self.peek_kind() {
                TokenKind::Ident => {
                    member.name = Some(self.consume().text);
                    return Some(member);
                }
                TokenKind::Semicolon | TokenKind::RBrace => {
                    let position = self.peek_position();
                    self.error(SyntaxError::MissingVariableName, position);
                    return Some(member);
                }
                _ => {
                    let token = self.peek().clone();
                    self.error(
                        SyntaxError::unexpected(&token, &[TokenKind::Ident]),
                        token.position,
                    );
                    match self.consume_until(&[
                        TokenKind::Ident,
                        TokenKind::Semicolon,
                        TokenKind::RBrace,
                    ]) {
                        TokenKind::Ident => {}
                        TokenKind::Semicolon => {
                            self.consume();
                            return None;
                        }
                        _ => return None,
                    }
                }
            }
        }
    }
}
