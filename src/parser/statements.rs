//! Statement parsing implementation
//!
//! This module handles blocks and the statements inside them:
//!
//! - Variable declarations: `let int x = 42;`, `let x = 42;`
//! - Mutations: `mut x += 1;`
//! - Control flow: `if` / `else if` / `else`, `while`, `do while`
//! - Expression statements, including blocks-as-expressions
//!
//! A block line is terminated by `;`, except that the last line may omit it
//! to make its value the block's value (`returns_last`). `let` declarations
//! run through a phase machine (Type, Name, Assign, Init) whose recovery
//! re-enters at whichever phase the resynchronized token makes legal; one
//! token of lookahead decides whether `let x = ...` carries a type or a name.
//!
//! All parsing methods are implemented as `pub(crate)` methods on the
//! [`Parser`] struct.

use crate::parser::ast::{
    Block, BlockLine, ElseStmt, Expr, IfStmt, LetStmt, MutOp, MutateStmt, TypeNode, WhileStmt,
};
use crate::parser::errors::SyntaxError;
use crate::parser::lexer::TokenKind;
use crate::parser::parse::Parser;

/// Parse phases of a `let` declaration.
#[derive(Clone, Copy)]
enum LetPhase {
    Type,
    Name,
    Assign,
    Init,
}

impl MutOp {
    /// The mutation operator a token stands for, if any.
    pub(crate) fn from_token(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::Eq => Some(MutOp::Assign),
            TokenKind::PlusEq => Some(MutOp::AddAssign),
            TokenKind::MinusEq => Some(MutOp::SubAssign),
            TokenKind::StarEq => Some(MutOp::MulAssign),
            TokenKind::SlashEq => Some(MutOp::DivAssign),
            TokenKind::PercentEq => Some(MutOp::ModAssign),
            TokenKind::PercentPercentEq => Some(MutOp::ModFloorAssign),
            _ => None,
        }
    }
}

impl Parser {
    /// Parse a block. The cursor must be at the opening `{`.
    ///
    /// Lines are dispatched on their first token; a line no dispatch arm
    /// accepts gets one diagnostic and a skip to the next plausible line
    /// start. Control flow lines carry their own block and skip the
    /// terminator protocol. A missing `}` at end of input is reported once,
    /// anchored at the opening brace.
    pub(crate) fn parse_block(&mut self) -> Block {
        let open_position = self.peek_position();
        self.consume(); // {
        let mut block = Block::default();

        while !matches!(self.peek_kind(), TokenKind::RBrace | TokenKind::Eof) {
            match self.peek_kind() {
                TokenKind::Let => {
                    let statement = self.parse_let();
                    block.lines.push(BlockLine::Let(statement));
                }
                TokenKind::Mut => {
                    let statement = self.parse_mutation();
                    block.lines.push(BlockLine::Mutate(statement));
                }
                TokenKind::If => {
                    let statement = self.parse_if();
                    block.lines.push(BlockLine::If(statement));
                    continue;
                }
                TokenKind::Else => {
                    let line = self.parse_else();
                    block.lines.push(line);
                    continue;
                }
                TokenKind::While => {
                    let statement = self.parse_while();
                    block.lines.push(BlockLine::While(statement));
                    continue;
                }
                TokenKind::Do => {
                    let statement = self.parse_do_while();
                    block.lines.push(BlockLine::While(statement));
                    continue;
                }
                kind if kind.can_start_expression() => {
                    let expression = self.parse_expression();
                    block.lines.push(BlockLine::Expr(expression));
                }
                _ => {
                    let token = self.peek().clone();
                    self.error(
                        SyntaxError::UnexpectedLineBegin {
                            found: token.to_string(),
                        },
                        token.position,
                    );
                    while !self.peek_kind().can_start_line()
                        && !matches!(
                            self.peek_kind(),
                            TokenKind::Eof | TokenKind::Semicolon | TokenKind::RBrace
                        )
                    {
                        self.consume();
                    }
                    // a junk run is not a line; it cannot set returns_last
                    if self.check(TokenKind::RBrace) {
                        continue;
                    }
                }
            }

            match self.peek_kind() {
                TokenKind::RBrace => block.returns_last = true,
                TokenKind::Semicolon => {
                    self.consume();
                }
                // the unclosed report below covers the missing terminator
                TokenKind::Eof => {}
                _ => {
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

        block
    }

    /// Parse a block that must start here; if the `{` is missing, recover
    /// toward it or give back an empty degraded block.
    pub(crate) fn parse_braced_block(&mut self) -> Block {
        if self.check(TokenKind::LBrace) {
            return self.parse_block();
        }

        let token = self.peek().clone();
        self.error(
            SyntaxError::unexpected(&token, &[TokenKind::LBrace]),
            token.position,
        );
        let stop = self.consume_until(&[
            TokenKind::LBrace,
            TokenKind::Semicolon,
            TokenKind::RBrace,
        ]);
        if stop == TokenKind::LBrace {
            return self.parse_block();
        }
        Block::default()
    }

    /// Parse a `let` declaration (without its terminating `;`).
    ///
    /// After `let`, an identifier is first parsed as a type; when `=`
    /// follows instead of a name, a plain named type is reinterpreted as
    /// the variable's name with the type left to inference.
    pub(crate) fn parse_let(&mut self) -> LetStmt {
        let position = self.peek_position();
        self.consume(); // let
        let mut declaration = LetStmt {
            position,
            ty: TypeNode::None,
            name: None,
            init: None,
        };
        let mut phase = LetPhase::Type;

        loop {
            match phase {
                LetPhase::Type => {
                    if self.check(TokenKind::Ident) {
                        declaration.ty = self.parse_type();
                        phase = LetPhase::Name;
                        continue;
                    }

                    let token = self.peek().clone();
                    self.error(
                        SyntaxError::ExpectedType {
                            found: token.to_string(),
                        },
                        token.position,
                    );
                    self.consume_until_raw(&[
                        TokenKind::Ident,
                        TokenKind::Eq,
                        TokenKind::Semicolon,
                        TokenKind::RBrace,
                    ]);
                    match self.peek_kind() {
                        TokenKind::Ident => {} // retry this phase
                        TokenKind::Eq => phase = LetPhase::Assign,
                        _ => return declaration,
                    }
                }
                LetPhase::Name => match self.peek_kind() {
                    TokenKind::Ident => {
                        declaration.name = Some(self.consume().text);
                        phase = LetPhase::Assign;
                    }
                    TokenKind::Eq => {
                        match std::mem::take(&mut declaration.ty) {
                            TypeNode::Named(name) => {
                                declaration.name = Some(name);
                                declaration.ty = TypeNode::Auto;
                            }
                            wrapped => {
                                // `let int* = ...`: a wrapped type cannot be a name
                                declaration.ty = wrapped;
                                let position = self.peek_position();
                                self.error(SyntaxError::MissingVariableName, position);
                            }
                        }
                        phase = LetPhase::Assign;
                    }
                    _ => {
                        let position = self.peek_position();
                        self.error(SyntaxError::InvalidVariableDeclaration, position);
                        match self.consume_until(&[
                            TokenKind::Ident,
                            TokenKind::Eq,
                            TokenKind::Semicolon,
                            TokenKind::RBrace,
                        ]) {
                            TokenKind::Ident | TokenKind::Eq => {} // retry this phase
                            _ => return declaration,
                        }
                    }
                },
                LetPhase::Assign => {
                    if self.match_kind(TokenKind::Eq) {
                        phase = LetPhase::Init;
                        continue;
                    }

                    let position = self.peek_position();
                    self.error(SyntaxError::InvalidVariableDeclaration, position);
                    match self.consume_until(&[
                        TokenKind::Eq,
                        TokenKind::Semicolon,
                        TokenKind::RBrace,
                    ]) {
                        TokenKind::Eq => {} // retry this phase
                        _ => return declaration,
                    }
                }
                LetPhase::Init => {
                    if self.peek_kind().can_start_expression() {
                        declaration.init = Some(self.parse_expression());
                        return declaration;
                    }

                    let token = self.peek().clone();
                    self.error(
                        SyntaxError::ExpectedExpression {
                            found: token.to_string(),
                        },
                        token.position,
                    );
                    if !self.skip_to_expression_start() {
                        return declaration;
                    }
                    // retry this phase
                }
            }
        }
    }

    /// Parse a `mut` statement: `mut name op expression`.
    pub(crate) fn parse_mutation(&mut self) -> MutateStmt {
        self.consume(); // mut
        let mut mutation = MutateStmt::default();

        if !self.check(TokenKind::Ident) {
            let token = self.peek().clone();
            self.error(
                SyntaxError::unexpected(&token, &[TokenKind::Ident]),
                token.position,
            );
            self.consume_until_raw(&[
                TokenKind::Ident,
                TokenKind::Semicolon,
                TokenKind::RBrace,
            ]);
            if !self.check(TokenKind::Ident) {
                return mutation;
            }
        }
        mutation.name = Some(self.consume().text);

        let Some(op) = MutOp::from_token(self.peek_kind()) else {
            let token = self.peek().clone();
            self.error(
                SyntaxError::unexpected(
                    &token,
                    &[
                        TokenKind::Eq,
                        TokenKind::PlusEq,
                        TokenKind::MinusEq,
                        TokenKind::StarEq,
                        TokenKind::SlashEq,
                        TokenKind::PercentEq,
                        TokenKind::PercentPercentEq,
                    ],
                ),
                token.position,
            );
            self.consume_until_raw(&[TokenKind::Semicolon, TokenKind::RBrace]);
            return mutation;
        };
        self.consume();
        mutation.op = Some(op);

        loop {
            if self.peek_kind().can_start_expression() {
                mutation.expr = Some(self.parse_expression());
                return mutation;
            }

            let token = self.peek().clone();
            self.error(
                SyntaxError::ExpectedExpression {
                    found: token.to_string(),
                },
                token.position,
            );
            if !self.skip_to_expression_start() {
                return mutation;
            }
        }
    }

    /// Parse an `if` statement: `if condition { ... }`.
    fn parse_if(&mut self) -> IfStmt {
        self.consume(); // if
        let condition = self.parse_expression();
        let block = self.parse_braced_block();
        IfStmt { condition, block }
    }

    /// Parse an `else` line: `else if` reuses the if-parse, plain `else`
    /// takes a block. Whether the line actually follows an `if` is not
    /// checked here.
    fn parse_else(&mut self) -> BlockLine {
        self.consume(); // else
        if self.check(TokenKind::If) {
            return BlockLine::ElseIf(self.parse_if());
        }
        BlockLine::Else(ElseStmt {
            block: self.parse_braced_block(),
        })
    }

    /// Parse a `while` statement: `while condition { ... }`.
    fn parse_while(&mut self) -> WhileStmt {
        self.consume(); // while
        self.parse_while_tail(false)
    }

    /// Parse a `do while` statement: `do while condition { ... }`.
    fn parse_do_while(&mut self) -> WhileStmt {
        self.consume(); // do
        if self.match_kind(TokenKind::While) {
            return self.parse_while_tail(true);
        }

        let token = self.peek().clone();
        self.error(
            SyntaxError::unexpected(&token, &[TokenKind::While]),
            token.position,
        );
        match self.consume_until(&[
            TokenKind::While,
            TokenKind::LBrace,
            TokenKind::Semicolon,
            TokenKind::RBrace,
        ]) {
            TokenKind::While => {
                self.consume();
                self.parse_while_tail(true)
            }
            TokenKind::LBrace => WhileStmt {
                condition: Expr::empty_block(),
                block: self.parse_block(),
                is_do_while: true,
            },
            _ => WhileStmt {
                condition: Expr::empty_block(),
                block: Block::default(),
                is_do_while: true,
            },
        }
    }

    fn parse_while_tail(&mut self, is_do_while: bool) -> WhileStmt {
        let condition = self.parse_expression();
        let block = self.parse_braced_block();
        WhileStmt {
            condition,
            block,
            is_do_while,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ast::Literal;
    use crate::parser::errors::Diagnostic;

    fn parse_block(source: &str) -> (Block, Vec<Diagnostic>) {
        let mut parser = Parser::new(source);
        let block = parser.parse_block();
        (block, parser.diagnostics)
    }

    fn number(text: &str) -> Expr {
        Expr::Literal(Literal::Number(text.to_string()))
    }

    #[test]
    fn test_returns_last_without_trailing_semicolon() {
        let (block, diagnostics) = parse_block("{ let int x = 1; x }");
        assert!(diagnostics.is_empty());
        assert_eq!(block.lines.len(), 2);
        assert!(block.returns_last);
    }

    #[test]
    fn test_trailing_semicolon_clears_returns_last() {
        let (block, diagnostics) = parse_block("{ let int x = 1; x; }");
        assert!(diagnostics.is_empty());
        assert_eq!(block.lines.len(), 2);
        assert!(!block.returns_last);
    }

    #[test]
    fn test_let_with_explicit_type() {
        let (block, diagnostics) = parse_block("{ let int x = 5; }");
        assert!(diagnostics.is_empty());
        let BlockLine::Let(declaration) = &block.lines[0] else {
            panic!("expected a let line");
        };
        assert_eq!(declaration.ty, TypeNode::Named("int".to_string()));
        assert_eq!(declaration.name.as_deref(), Some("x"));
        assert_eq!(declaration.init, Some(number("5")));
    }

    #[test]
    fn test_let_name_reinterpreted_from_type() {
        let (block, diagnostics) = parse_block("{ let x = 5; }");
        assert!(diagnostics.is_empty());
        let BlockLine::Let(declaration) = &block.lines[0] else {
            panic!("expected a let line");
        };
        assert_eq!(declaration.ty, TypeNode::Auto);
        assert_eq!(declaration.name.as_deref(), Some("x"));
    }

    #[test]
    fn test_let_wrapped_type_cannot_become_name() {
        let (block, diagnostics) = parse_block("{ let int* = 5; }");
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains("missing a name"));
        let BlockLine::Let(declaration) = &block.lines[0] else {
            panic!("expected a let line");
        };
        assert_eq!(
            declaration.ty,
            TypeNode::Array(Box::new(TypeNode::Named("int".to_string())))
        );
        assert_eq!(declaration.name, None);
        assert_eq!(declaration.init, Some(number("5")));
    }

    #[test]
    fn test_let_missing_type_recovers_at_assign() {
        let (block, diagnostics) = parse_block("{ let = 1; }");
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains("expected a type"));
        let BlockLine::Let(declaration) = &block.lines[0] else {
            panic!("expected a let line");
        };
        assert_eq!(declaration.ty, TypeNode::None);
        assert_eq!(declaration.init, Some(number("1")));
    }

    #[test]
    fn test_mutation() {
        let (block, diagnostics) = parse_block("{ mut x += 1; }");
        assert!(diagnostics.is_empty());
        let BlockLine::Mutate(mutation) = &block.lines[0] else {
            panic!("expected a mut line");
        };
        assert_eq!(mutation.name.as_deref(), Some("x"));
        assert_eq!(mutation.op, Some(MutOp::AddAssign));
        assert_eq!(mutation.expr, Some(number("1")));
    }

    #[test]
    fn test_mutation_without_operator_degrades() {
        let (block, diagnostics) = parse_block("{ mut x 5; }");
        assert_eq!(diagnostics.len(), 1);
        let BlockLine::Mutate(mutation) = &block.lines[0] else {
            panic!("expected a mut line");
        };
        assert_eq!(mutation.name.as_deref(), Some("x"));
        assert_eq!(mutation.op, None);
        assert_eq!(mutation.expr, None);
    }

    #[test]
    fn test_if_else_chain() {
        let (block, diagnostics) = parse_block("{ if a { } else if b { } else { } }");
        assert!(diagnostics.is_empty());
        assert_eq!(block.lines.len(), 3);
        assert!(matches!(block.lines[0], BlockLine::If(_)));
        assert!(matches!(block.lines[1], BlockLine::ElseIf(_)));
        assert!(matches!(block.lines[2], BlockLine::Else(_)));
    }

    #[test]
    fn test_while_statement() {
        let (block, diagnostics) = parse_block("{ while a < 10 { mut a += 1; } }");
        assert!(diagnostics.is_empty());
        let BlockLine::While(statement) = &block.lines[0] else {
            panic!("expected a while line");
        };
        assert!(!statement.is_do_while);
        assert_eq!(statement.block.lines.len(), 1);
    }

    #[test]
    fn test_do_while_statement() {
        let (block, diagnostics) = parse_block("{ do while a { } }");
        assert!(diagnostics.is_empty());
        let BlockLine::While(statement) = &block.lines[0] else {
            panic!("expected a while line");
        };
        assert!(statement.is_do_while);
    }

    #[test]
    fn test_do_without_while_recovers_into_body() {
        let (block, diagnostics) = parse_block("{ do { } }");
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains("expected one of: 'while'"));
        let BlockLine::While(statement) = &block.lines[0] else {
            panic!("expected a while line");
        };
        assert!(statement.is_do_while);
        assert_eq!(statement.condition, Expr::empty_block());
    }

    #[test]
    fn test_missing_semicolon_does_not_stop_the_block() {
        let (block, diagnostics) = parse_block("{ a b; }");
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains("missing a semicolon"));
        assert_eq!(block.lines.len(), 2);
    }

    #[test]
    fn test_unexpected_line_begin_skips_junk() {
        let (block, diagnostics) = parse_block("{ + ; x }");
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains("cannot begin with"));
        assert_eq!(block.lines.len(), 1);
        assert!(block.returns_last);
    }

    #[test]
    fn test_unclosed_block_reported_at_opener() {
        let (block, diagnostics) = parse_block("{ let x = 1;");
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains("unclosed '{'"));
        assert_eq!(diagnostics[0].position.line, 1);
        assert_eq!(diagnostics[0].position.column, 1);
        assert_eq!(block.lines.len(), 1);
    }

    #[test]
    fn test_unterminated_last_line_reports_only_unclosed() {
        let (block, diagnostics) = parse_block("{ x");
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains("unclosed '{'"));
        assert_eq!(block.lines.len(), 1);
    }

    #[test]
    fn test_inner_block_does_not_end_statement_recovery() {
        let (block, diagnostics) = parse_block("{ let = { } ; g(); }");
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains("expected a type"));
        assert_eq!(block.lines.len(), 2);
        let BlockLine::Let(declaration) = &block.lines[0] else {
            panic!("expected a let line");
        };
        assert!(matches!(declaration.init, Some(Expr::Block(_))));
        assert!(matches!(&block.lines[1], BlockLine::Expr(Expr::Call { .. })));
    }
}
