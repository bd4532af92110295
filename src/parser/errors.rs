//! Syntax error taxonomy and the diagnostics the parser reports.

use crate::parser::ast::Position;
use crate::parser::lexer::{Token, TokenKind};
use std::fmt;
use thiserror::Error;

/// Everything the parser can complain about. Each variant renders the
/// message text of one diagnostic; the position is attached separately
/// when the diagnostic is recorded.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SyntaxError {
    #[error("unexpected {found}\n    expected one of: {expected}")]
    UnexpectedToken { found: String, expected: String },

    #[error("function definition is missing a name")]
    MissingFunctionName,

    #[error("function definition is missing its argument list")]
    MissingFunctionArguments,

    #[error("malformed function definition\n    expected: fn name(arguments) -> type {{ body }}")]
    InvalidFunctionDeclaration,

    #[error("malformed variable declaration\n    expected: let [type] name = value;")]
    InvalidVariableDeclaration,

    #[error("malformed type definition\n    expected: type name {{ members }}")]
    InvalidTypeDeclaration,

    #[error("type definition is missing a name")]
    MissingTypeName,

    #[error("variable declaration is missing a name")]
    MissingVariableName,

    #[error("expected a type, found {found}")]
    ExpectedType { found: String },

    #[error("expected an expression, found {found}")]
    ExpectedExpression { found: String },

    #[error("unclosed {delimiter}")]
    UnclosedDelimiter { delimiter: String },

    #[error("missing a semicolon; only the last line of a block can omit it to return a value")]
    MissingSemicolon,

    #[error("a line cannot begin with {found}")]
    UnexpectedLineBegin { found: String },
}

impl SyntaxError {
    /// Build a [`SyntaxError::UnexpectedToken`] from the offending token
    /// and the kinds that would have been accepted in its place.
    pub fn unexpected(found: &Token, expected: &[TokenKind]) -> Self {
        let expected = expected
            .iter()
            .map(|kind| kind.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        SyntaxError::UnexpectedToken {
            found: found.to_string(),
            expected,
        }
    }
}

/// One reported problem, anchored to the position where it was noticed.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub message: String,
    pub position: Position,
}

impl Diagnostic {
    pub fn new(error: SyntaxError, position: Position) -> Self {
        Self {
            message: error.to_string(),
            position,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n  at {}", self.message, self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unexpected_token_message() {
        let token = Token {
            kind: TokenKind::Semicolon,
            text: ";".to_string(),
            position: Position::new(1, 1),
        };
        let error = SyntaxError::unexpected(&token, &[TokenKind::Ident, TokenKind::LBrace]);
        assert_eq!(
            error.to_string(),
            "unexpected ';'\n    expected one of: identifier, '{'"
        );
    }

    #[test]
    fn test_diagnostic_carries_position() {
        let diagnostic = Diagnostic::new(SyntaxError::MissingSemicolon, Position::new(3, 7));
        let rendered = diagnostic.to_string();
        assert!(rendered.contains("missing a semicolon"));
        assert!(rendered.contains("line 3, column 7"));
    }
}
