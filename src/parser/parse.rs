//! Core parser state and shared machinery
//!
//! The parser is split across several files, one per grammar family, all
//! extending the same [`Parser`] type:
//!
//! - `declarations.rs`: function definitions, type definitions, parameters
//! - `statements.rs`: blocks and the statements inside them
//! - `expressions.rs`: precedence climbing and accessor chains
//!
//! Errors never abort the parse. Every problem is recorded as a
//! [`Diagnostic`] and the parser resynchronizes on a nearby landmark token,
//! so one malformed construct cannot hide the rest of the file. The tree
//! that comes back is always complete; where source text was unusable it
//! contains degraded nodes (missing names, empty blocks) instead.

use crate::parser::ast::{Position, Program};
use crate::parser::errors::{Diagnostic, SyntaxError};
use crate::parser::lexer::{Lexer, Token, TokenKind};

/// The result of parsing one source file.
#[derive(Debug)]
pub struct ParseOutcome {
    /// The parsed program, including any degraded nodes.
    pub tree: Program,
    /// Every problem found, in source order.
    pub diagnostics: Vec<Diagnostic>,
    /// True when the source parsed without a single diagnostic.
    pub success: bool,
}

/// Recursive descent parser over a lazy token stream.
pub struct Parser {
    pub(crate) lexer: Lexer,
    pub(crate) diagnostics: Vec<Diagnostic>,
}

impl Parser {
    pub fn new(source: &str) -> Self {
        Self {
            lexer: Lexer::new(source),
            diagnostics: Vec::new(),
        }
    }

    /// Parse the whole input. Consumes the parser; one parse per instance.
    pub fn parse(mut self) -> ParseOutcome {
        let mut program = Program::new();

        loop {
            match self.peek_kind() {
                TokenKind::Eof => break,
                TokenKind::Fn => {
                    let function = self.parse_function_definition();
                    program.functions.push(function);
                }
                TokenKind::Type => {
                    let definition = self.parse_type_definition();
                    program.types.push(definition);
                }
                TokenKind::Let => {
                    let statement = self.parse_let();
                    program.globals.push(statement);
                    if !self.match_kind(TokenKind::Semicolon) {
                        let position = self.peek_position();
                        self.error(SyntaxError::MissingSemicolon, position);
                    }
                }
                _ => {
                    let token = self.peek().clone();
                    self.error(
                        SyntaxError::unexpected(
                            &token,
                            &[TokenKind::Fn, TokenKind::Type, TokenKind::Let],
                        ),
                        token.position,
                    );
                    // consume one token so the loop always makes progress
                    self.consume();
                }
            }
        }

        let success = self.diagnostics.is_empty();
        ParseOutcome {
            tree: program,
            diagnostics: self.diagnostics,
            success,
        }
    }

    /// Record a diagnostic.
    pub(crate) fn error(&mut self, error: SyntaxError, position: Position) {
        self.diagnostics.push(Diagnostic::new(error, position));
    }

    pub(crate) fn peek(&mut self) -> &Token {
        self.lexer.peek()
    }

    pub(crate) fn peek_kind(&mut self) -> TokenKind {
        self.lexer.peek().kind
    }

    pub(crate) fn peek_position(&mut self) -> Position {
        self.lexer.peek().position
    }

    pub(crate) fn consume(&mut self) -> Token {
        self.lexer.consume()
    }

    /// True when the next token has the given kind. Does not consume.
    pub(crate) fn check(&mut self, kind: TokenKind) -> bool {
        self.peek_kind() == kind
    }

    /// Consume the next token when it has the given kind.
    pub(crate) fn match_kind(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.consume();
            return true;
        }
        false
    }

    /// Skip forward until one of `targets` or end of input, leaving the
    /// stopping token unconsumed, and return its kind.
    ///
    /// Closing delimiters in `targets` are nesting aware: an opener passed
    /// over during the skip claims its closer, so the skip stops only at a
    /// closer belonging to the nesting level where it started. Non-delimiter
    /// targets stop the skip at their first occurrence.
    pub(crate) fn consume_until(&mut self, targets: &[TokenKind]) -> TokenKind {
        // one pending-closer counter per delimiter pair
        let mut pending = [0usize; 3];

        loop {
            let kind = self.peek_kind();
            if let Some(index) = closer_index_for_opener(kind) {
                pending[index] += 1;
            }
            if !targets.contains(&kind) && kind != TokenKind::Eof {
                self.consume();
                continue;
            }
            let Some(index) = closer_index(kind) else {
                return kind;
            };
            if pending[index] == 0 {
                return kind;
            }
            pending[index] -= 1;
            self.consume();
        }
    }

    /// Skip forward until the first occurrence of one of `targets` or end
    /// of input, with no nesting awareness. The stopping token is left
    /// unconsumed and its kind returned.
    pub(crate) fn consume_until_raw(&mut self, targets: &[TokenKind]) -> TokenKind {
        loop {
            let kind = self.peek_kind();
            if kind == TokenKind::Eof || targets.contains(&kind) {
                return kind;
            }
            self.consume();
        }
    }
}

fn closer_index_for_opener(kind: TokenKind) -> Option<usize> {
    match kind {
        TokenKind::LParen => Some(0),
        TokenKind::LBracket => Some(1),
        TokenKind::LBrace => Some(2),
        _ => None,
    }
}

fn closer_index(kind: TokenKind) -> Option<usize> {
    match kind {
        TokenKind::RParen => Some(0),
        TokenKind::RBracket => Some(1),
        TokenKind::RBrace => Some(2),
        _ => None,
    }
}
