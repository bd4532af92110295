//! Expression parsing implementation
//!
//! Binary operators are parsed by precedence climbing: after a leaf, the
//! parser keeps folding while the peeked operator binds strictly tighter
//! than the level it was entered at, so operators of equal precedence fold
//! left. Leaves are literals, blocks-as-expressions and the unary prefixes
//! `-` and `!`; a leaf can carry a postfix accessor chain of `@` (deref),
//! `.name` (member), `[index]` and `(args)` (call), folded left to right.
//!
//! All parsing methods are implemented as `pub(crate)` methods on the
//! [`Parser`] struct.

use crate::parser::ast::{BinOp, Expr, Literal, UnOp};
use crate::parser::errors::SyntaxError;
use crate::parser::lexer::TokenKind;
use crate::parser::parse::Parser;

impl BinOp {
    /// The binary operator a token stands for, if any.
    pub(crate) fn from_token(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::EqEq => Some(BinOp::Eq),
            TokenKind::NotEq => Some(BinOp::Ne),
            TokenKind::Lt => Some(BinOp::Lt),
            TokenKind::Le => Some(BinOp::Le),
            TokenKind::Gt => Some(BinOp::Gt),
            TokenKind::Ge => Some(BinOp::Ge),
            TokenKind::Plus => Some(BinOp::Add),
            TokenKind::Minus => Some(BinOp::Sub),
            TokenKind::Percent => Some(BinOp::Mod),
            TokenKind::PercentPercent => Some(BinOp::ModFloor),
            TokenKind::Star => Some(BinOp::Mul),
            TokenKind::Slash => Some(BinOp::Div),
            _ => None,
        }
    }

    /// Binding strength. Comparisons bind loosest, `*` and `/` tightest.
    pub(crate) fn precedence(self) -> i8 {
        match self {
            BinOp::Eq | BinOp::Ne | BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => 0,
            BinOp::Add | BinOp::Sub => 1,
            BinOp::Mod | BinOp::ModFloor => 2,
            BinOp::Mul | BinOp::Div => 3,
        }
    }
}

impl Parser {
    /// Parse one expression.
    pub(crate) fn parse_expression(&mut self) -> Expr {
        self.parse_expression_min(-1)
    }

    /// Precedence climbing. The operator is peeked first and consumed only
    /// once the climb is committed; equal precedence stops the climb, so
    /// ties fold left.
    fn parse_expression_min(&mut self, min: i8) -> Expr {
        let mut left = self.parse_leaf();

        while let Some(op) = BinOp::from_token(self.peek_kind()) {
            if op.precedence() <= min {
                break;
            }
            self.consume();
            let right = self.parse_expression_min(op.precedence());
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        left
    }

    /// Parse a leaf and any accessor chain hanging off it.
    ///
    /// When nothing at the cursor can start an expression, one diagnostic
    /// is recorded and the cursor skips forward; a usable starter retries
    /// the leaf, a statement boundary yields a degraded empty block.
    fn parse_leaf(&mut self) -> Expr {
        let leaf = loop {
            match self.peek_kind() {
                TokenKind::LBrace => break Expr::Block(self.parse_block()),
                TokenKind::Number => {
                    let token = self.consume();
                    break Expr::Literal(Literal::Number(token.text));
                }
                TokenKind::String => {
                    let token = self.consume();
                    break Expr::Literal(Literal::Str(token.text));
                }
                TokenKind::True => {
                    self.consume();
                    break Expr::Literal(Literal::Bool(true));
                }
                TokenKind::False => {
                    self.consume();
                    break Expr::Literal(Literal::Bool(false));
                }
                TokenKind::Ident => {
                    let token = self.consume();
                    break Expr::Literal(Literal::Ident(token.text));
                }
                TokenKind::Bang => {
                    self.consume();
                    break Expr::Unary {
                        op: UnOp::Not,
                        operand: Box::new(self.parse_leaf()),
                    };
                }
                TokenKind::Minus => {
                    self.consume();
                    break Expr::Unary {
                        op: UnOp::Neg,
                        operand: Box::new(self.parse_leaf()),
                    };
                }
                _ => {
                    let token = self.peek().clone();
                    self.error(
                        SyntaxError::ExpectedExpression {
                            found: token.to_string(),
                        },
                        token.position,
                    );
                    if !self.skip_to_expression_start() {
                        return Expr::empty_block();
                    }
                    // retry with the recovered starter
                }
            }
        };

        self.parse_accessors(leaf)
    }

    /// Skip to the next token that can start an expression without crossing
    /// a statement boundary. Returns false when the boundary came first.
    pub(crate) fn skip_to_expression_start(&mut self) -> bool {
        loop {
            let kind = self.peek_kind();
            if kind.can_start_expression() {
                return true;
            }
            if matches!(
                kind,
                TokenKind::Semicolon | TokenKind::RBrace | TokenKind::Eof
            ) {
                return false;
            }
            self.consume();
        }
    }

    /// Fold postfix accessors onto a parsed leaf, left to right.
    fn parse_accessors(&mut self, mut base: Expr) -> Expr {
        loop {
            match self.peek_kind() {
                TokenKind::At => {
                    self.consume();
                    base = Expr::Deref {
                        base: Box::new(base),
                    };
                }
                TokenKind::Dot => base = match self.parse_member_access(base) {
                    Ok(member) => member,
                    Err(abandoned) => return abandoned,
                },
                TokenKind::LBracket => base = match self.parse_index(base) {
                    Ok(index) => index,
                    Err(abandoned) => return abandoned,
                },
                TokenKind::LParen => base = match self.parse_call(base) {
                    Ok(call) => call,
                    Err(abandoned) => return abandoned,
                },
                _ => return base,
            }
        }
    }

    /// `.name` accessor. On a malformed member the skip stops at the next
    /// token that can resume the chain or end the statement; `Err` carries
    /// the base back out when the statement ended.
    fn parse_member_access(&mut self, base: Expr) -> Result<Expr, Expr> {
        self.consume();
        if self.check(TokenKind::Ident) {
            let name = self.consume().text;
            return Ok(Expr::Member {
                base: Box::new(base),
                name,
            });
        }

        let token = self.peek().clone();
        self.error(
            SyntaxError::unexpected(&token, &[TokenKind::Ident]),
            token.position,
        );
        self.consume_until_raw(&[
            TokenKind::Ident,
            TokenKind::RBrace,
            TokenKind::Semicolon,
            TokenKind::At,
            TokenKind::LParen,
            TokenKind::LBracket,
            TokenKind::Dot,
        ]);
        match self.peek_kind() {
            TokenKind::Ident => {
                let name = self.consume().text;
                Ok(Expr::Member {
                    base: Box::new(base),
                    name,
                })
            }
            TokenKind::RBrace | TokenKind::Semicolon | TokenKind::Eof => Err(base),
            // an accessor token resumes the chain with the member dropped
            _ => Ok(base),
        }
    }

    /// `[index]` accessor.
    fn parse_index(&mut self, base: Expr) -> Result<Expr, Expr> {
        self.consume();

        if !self.peek_kind().can_start_expression() {
            let token = self.peek().clone();
            self.error(
                SyntaxError::ExpectedExpression {
                    found: token.to_string(),
                },
                token.position,
            );
            loop {
                let kind = self.peek_kind();
                if kind.can_start_expression()
                    || matches!(
                        kind,
                        TokenKind::RBracket
                            | TokenKind::RBrace
                            | TokenKind::Semicolon
                            | TokenKind::Eof
                    )
                {
                    break;
                }
                self.consume();
            }
            match self.peek_kind() {
                // empty index dropped, chain continues
                TokenKind::RBracket => {
                    self.consume();
                    return Ok(base);
                }
                kind if kind.can_start_expression() => {}
                _ => return Err(base),
            }
        }

        let index = self.parse_expression();
        let indexed = Expr::Index {
            base: Box::new(base),
            index: Box::new(index),
        };
        if !self.match_kind(TokenKind::RBracket) {
            let token = self.peek().clone();
            self.error(
                SyntaxError::unexpected(&token, &[TokenKind::RBracket]),
                token.position,
            );
            let stop = self.consume_until(&[
                TokenKind::RBracket,
                TokenKind::RBrace,
                TokenKind::Semicolon,
            ]);
            if stop == TokenKind::RBracket {
                self.consume();
            }
        }
        Ok(indexed)
    }

    /// `(args)` accessor. A recovery that runs into a statement boundary
    /// abandons the whole call and hands the base back via `Err`.
    fn parse_call(&mut self, base: Expr) -> Result<Expr, Expr> {
        let open_position = self.peek_position();
        self.consume();
        let mut args = Vec::new();

        while !matches!(self.peek_kind(), TokenKind::RParen | TokenKind::Eof) {
            if self.peek_kind().can_start_expression() {
                args.push(self.parse_expression());

                match self.peek_kind() {
                    TokenKind::Comma => {
                        self.consume();
                    }
                    // end of input falls through to the unclosed check
                    TokenKind::RParen | TokenKind::Eof => {}
                    _ => {
                        let token = self.peek().clone();
                        self.error(
                            SyntaxError::unexpected(
                                &token,
                                &[TokenKind::Comma, TokenKind::RParen],
                            ),
                            token.position,
                        );
                        match self.consume_until(&[
                            TokenKind::Comma,
                            TokenKind::RParen,
                            TokenKind::Semicolon,
                            TokenKind::RBrace,
                        ]) {
                            TokenKind::Comma => {
                                self.consume();
                            }
                            TokenKind::RParen => {}
                            _ => return Err(base),
                        }
                    }
                }
            } else {
                let token = self.peek().clone();
                self.error(
                    SyntaxError::ExpectedExpression {
                        found: token.to_string(),
                    },
                    token.position,
                );
                loop {
                    let kind = self.peek_kind();
                    if kind.can_start_expression()
                        || matches!(
                            kind,
                            TokenKind::Comma
                                | TokenKind::RParen
                                | TokenKind::Semicolon
                                | TokenKind::RBrace
                                | TokenKind::Eof
                        )
                    {
                        break;
                    }
                    self.consume();
                }
                match self.peek_kind() {
                    // the broken argument is dropped
                    TokenKind::Comma => {
                        self.consume();
                    }
                    TokenKind::RParen => {}
                    kind if kind.can_start_expression() => {}
                    _ => return Err(base),
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
        Ok(Expr::Call {
            base: Box::new(base),
            args,
        })
    }
}
