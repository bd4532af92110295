//! Lexer (scanner) for Ember source code
//!
//! Tokens are produced lazily: [`Lexer::peek`] scans at most one token ahead
//! and memoizes it until [`Lexer::consume`] takes it, so the parser needs no
//! token buffer. The lexer never reports errors; anything it cannot classify
//! becomes a [`TokenKind::Invalid`] token and the parser decides what that
//! means where it appears.

use super::ast::Position;
use lazy_static::lazy_static;
use rustc_hash::FxHashMap;
use std::fmt;

/// All token kinds produced by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Keywords
    Let,
    Mut,
    Fn,
    If,
    Else,
    For,
    From,
    To,
    While,
    Do,
    True,
    False,
    Type,
    Return,

    // Literals
    Ident,
    Number,
    String,

    // Arithmetic
    Plus,    // +
    Minus,   // -
    Star,    // *
    Slash,   // /
    Percent, // %
    PercentPercent, // %%

    // Comparison
    EqEq,  // ==
    NotEq, // !=
    Lt,    // <
    Le,    // <=
    Gt,    // >
    Ge,    // >=

    // Assignment
    Eq,               // =
    PlusEq,           // +=
    MinusEq,          // -=
    StarEq,           // *=
    SlashEq,          // /=
    PercentEq,        // %=
    PercentPercentEq, // %%=

    // Other operators
    Bang,  // !
    Arrow, // ->
    At,    // @

    // Punctuation
    LParen,    // (
    RParen,    // )
    LBrace,    // {
    RBrace,    // }
    LBracket,  // [
    RBracket,  // ]
    Semicolon, // ;
    Comma,     // ,
    Dot,       // .

    /// A character the lexer could not classify, or an unterminated string.
    Invalid,
    /// End of input; scanning past it keeps returning this kind.
    Eof,
}

impl TokenKind {
    /// True for tokens that can begin an expression leaf.
    pub fn can_start_expression(self) -> bool {
        matches!(
            self,
            TokenKind::LBrace
                | TokenKind::Bang
                | TokenKind::Minus
                | TokenKind::Ident
                | TokenKind::Number
                | TokenKind::String
                | TokenKind::True
                | TokenKind::False
        )
    }

    /// True for tokens that can begin a block line.
    pub fn can_start_line(self) -> bool {
        self.can_start_expression()
            || matches!(
                self,
                TokenKind::Let
                    | TokenKind::Mut
                    | TokenKind::If
                    | TokenKind::Else
                    | TokenKind::While
                    | TokenKind::Do
            )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TokenKind::Let => "'let'",
            TokenKind::Mut => "'mut'",
            TokenKind::Fn => "'fn'",
            TokenKind::If => "'if'",
            TokenKind::Else => "'else'",
            TokenKind::For => "'for'",
            TokenKind::From => "'from'",
            TokenKind::To => "'to'",
            TokenKind::While => "'while'",
            TokenKind::Do => "'do'",
            TokenKind::True => "'true'",
            TokenKind::False => "'false'",
            TokenKind::Type => "'type'",
            TokenKind::Return => "'return'",
            TokenKind::Ident => "identifier",
            TokenKind::Number => "number literal",
            TokenKind::String => "string literal",
            TokenKind::Plus => "'+'",
            TokenKind::Minus => "'-'",
            TokenKind::Star => "'*'",
            TokenKind::Slash => "'/'",
            TokenKind::Percent => "'%'",
            TokenKind::PercentPercent => "'%%'",
            TokenKind::EqEq => "'=='",
            TokenKind::NotEq => "'!='",
            TokenKind::Lt => "'<'",
            TokenKind::Le => "'<='",
            TokenKind::Gt => "'>'",
            TokenKind::Ge => "'>='",
            TokenKind::Eq => "'='",
            TokenKind::PlusEq => "'+='",
            TokenKind::MinusEq => "'-='",
            TokenKind::StarEq => "'*='",
            TokenKind::SlashEq => "'/='",
            TokenKind::PercentEq => "'%='",
            TokenKind::PercentPercentEq => "'%%='",
            TokenKind::Bang => "'!'",
            TokenKind::Arrow => "'->'",
            TokenKind::At => "'@'",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::Semicolon => "';'",
            TokenKind::Comma => "','",
            TokenKind::Dot => "'.'",
            TokenKind::Invalid => "invalid token",
            TokenKind::Eof => "end of input",
        };
        write!(f, "{text}")
    }
}

/// One token. `text` carries the literal data (identifier name, number text,
/// cooked string content, the offending character for `Invalid`).
#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub position: Position,
}

// Two tokens are equal when they read the same; positions do not participate.
impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.text == other.text
    }
}

impl Eq for Token {}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Ident
            | TokenKind::Number
            | TokenKind::String
            | TokenKind::Invalid => write!(f, "{} '{}'", self.kind, self.text),
            _ => write!(f, "{}", self.kind),
        }
    }
}

lazy_static! {
    /// Exact-match keyword table; anything else that scans as a word is an
    /// identifier.
    static ref KEYWORDS: FxHashMap<&'static str, TokenKind> = {
        let mut keywords = FxHashMap::default();
        keywords.insert("let", TokenKind::Let);
        keywords.insert("mut", TokenKind::Mut);
        keywords.insert("fn", TokenKind::Fn);
        keywords.insert("if", TokenKind::If);
        keywords.insert("else", TokenKind::Else);
        keywords.insert("for", TokenKind::For);
        keywords.insert("from", TokenKind::From);
        keywords.insert("to", TokenKind::To);
        keywords.insert("while", TokenKind::While);
        keywords.insert("do", TokenKind::Do);
        keywords.insert("true", TokenKind::True);
        keywords.insert("false", TokenKind::False);
        keywords.insert("type", TokenKind::Type);
        keywords.insert("return", TokenKind::Return);
        keywords
    };
}

/// Characters that can start an operator token.
const OPERATOR_CHARS: &str = "+-*/%=!<>";

/// Characters allowed inside a number after the leading digit. Radix markers
/// and suffixes are collected without validation.
const NUMBER_CHARS: &str = "xbo._df";

// Operator tables, tried longest-window first (maximal munch).
const OPERATORS3: &[(&str, TokenKind)] = &[("%%=", TokenKind::PercentPercentEq)];

const OPERATORS2: &[(&str, TokenKind)] = &[
    ("+=", TokenKind::PlusEq),
    ("-=", TokenKind::MinusEq),
    ("*=", TokenKind::StarEq),
    ("/=", TokenKind::SlashEq),
    ("%=", TokenKind::PercentEq),
    ("%%", TokenKind::PercentPercent),
    ("==", TokenKind::EqEq),
    ("!=", TokenKind::NotEq),
    ("<=", TokenKind::Le),
    (">=", TokenKind::Ge),
    ("->", TokenKind::Arrow),
];

const OPERATORS1: &[(&str, TokenKind)] = &[
    ("+", TokenKind::Plus),
    ("-", TokenKind::Minus),
    ("*", TokenKind::Star),
    ("/", TokenKind::Slash),
    ("%", TokenKind::Percent),
    ("=", TokenKind::Eq),
    ("!", TokenKind::Bang),
    ("<", TokenKind::Lt),
    (">", TokenKind::Gt),
];

/// Lazy scanner over Ember source text.
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
    peeked: Option<Token>,
}

impl Lexer {
    /// Create a new lexer for the given source string.
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
            peeked: None,
        }
    }

    /// The next token, without consuming it. Scanned once and cached until
    /// [`Lexer::consume`] takes it.
    pub fn peek(&mut self) -> &Token {
        if self.peeked.is_none() {
            let token = self.next_token();
            self.peeked = Some(token);
        }
        match self.peeked.as_ref() {
            Some(token) => token,
            // the slot was filled just above
            None => unreachable!(),
        }
    }

    /// The next token, consuming it. At end of input this keeps returning
    /// the same `Eof` token.
    pub fn consume(&mut self) -> Token {
        match self.peeked.take() {
            Some(token) => token,
            None => self.next_token(),
        }
    }

    /// Scan one token from the cursor.
    fn next_token(&mut self) -> Token {
        self.skip_whitespace_and_comments();

        let position = self.current_position();
        let Some(ch) = self.peek_char() else {
            return Token {
                kind: TokenKind::Eof,
                text: String::new(),
                position,
            };
        };

        if ch.is_alphabetic() {
            return self.read_word();
        }
        if ch.is_ascii_digit() {
            return self.read_number();
        }
        if OPERATOR_CHARS.contains(ch) {
            return self.read_operator();
        }
        if ch == '"' {
            return self.read_string();
        }

        let kind = match ch {
            ';' => TokenKind::Semicolon,
            ',' => TokenKind::Comma,
            '.' => TokenKind::Dot,
            '@' => TokenKind::At,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            _ => TokenKind::Invalid,
        };
        self.advance();
        Token {
            kind,
            text: ch.to_string(),
            position,
        }
    }

    /// Skip whitespace and line comments.
    ///
    /// A comment ends at the first whitespace character rather than at the
    /// end of the line: `//word` hides `word`, but in `// word` the word is
    /// still tokenized.
    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.peek_char() {
                Some(ch) if ch.is_whitespace() => {
                    self.advance();
                }
                Some('/') if self.peek_ahead(1) == Some('/') => {
                    while let Some(ch) = self.peek_char() {
                        if ch.is_whitespace() {
                            break;
                        }
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }

    /// Scan an identifier or keyword.
    fn read_word(&mut self) -> Token {
        let position = self.current_position();
        let mut word = String::new();

        while let Some(ch) = self.peek_char() {
            if ch.is_alphanumeric() {
                word.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        let kind = KEYWORDS
            .get(word.as_str())
            .copied()
            .unwrap_or(TokenKind::Ident);
        Token {
            kind,
            text: word,
            position,
        }
    }

    /// Scan a number literal: a digit followed greedily by digits, radix
    /// markers, separators and suffixes. Not validated here.
    fn read_number(&mut self) -> Token {
        let position = self.current_position();
        let mut number = String::new();

        while let Some(ch) = self.peek_char() {
            if ch.is_ascii_digit() || NUMBER_CHARS.contains(ch) {
                number.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        Token {
            kind: TokenKind::Number,
            text: number,
            position,
        }
    }

    /// Scan an operator by maximal munch over the three window tables.
    fn read_operator(&mut self) -> Token {
        let position = self.current_position();

        for table in [OPERATORS3, OPERATORS2, OPERATORS1] {
            for (text, kind) in table {
                if self.matches_here(text) {
                    for _ in 0..text.chars().count() {
                        self.advance();
                    }
                    return Token {
                        kind: *kind,
                        text: (*text).to_string(),
                        position,
                    };
                }
            }
        }

        // every charset character appears in the one-character table
        unreachable!("operator character not covered by the operator tables")
    }

    /// Scan a string literal. Recognized escapes are cooked; an unknown
    /// escape drops both the backslash and the character after it. Running
    /// out of input yields an `Invalid` token carrying the partial content,
    /// positioned at the opening quote.
    fn read_string(&mut self) -> Token {
        let position = self.current_position();
        self.advance(); // opening quote

        let mut content = String::new();
        let mut escaped = false;

        while let Some(ch) = self.peek_char() {
            self.advance();

            if escaped {
                match ch {
                    '\\' => content.push('\\'),
                    '"' => content.push('"'),
                    'n' => content.push('\n'),
                    'r' => content.push('\r'),
                    't' => content.push('\t'),
                    _ => {}
                }
                escaped = false;
                continue;
            }

            match ch {
                '\\' => escaped = true,
                '"' => {
                    return Token {
                        kind: TokenKind::String,
                        text: content,
                        position,
                    }
                }
                _ => content.push(ch),
            }
        }

        Token {
            kind: TokenKind::Invalid,
            text: content,
            position,
        }
    }

    /// True when the characters at the cursor spell `text` exactly.
    fn matches_here(&self, text: &str) -> bool {
        text.chars()
            .enumerate()
            .all(|(offset, ch)| self.input.get(self.position + offset) == Some(&ch))
    }

    /// Peek at the current character without consuming.
    fn peek_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    /// Peek ahead n characters.
    fn peek_ahead(&self, n: usize) -> Option<char> {
        self.input.get(self.position + n).copied()
    }

    /// Advance to the next character, tracking line and column.
    fn advance(&mut self) -> Option<char> {
        let ch = self.input.get(self.position).copied()?;
        self.position += 1;

        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }

        Some(ch)
    }

    /// Current source position.
    fn current_position(&self) -> Position {
        Position::new(self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let mut lexer = Lexer::new(source);
        let mut kinds = Vec::new();
        loop {
            let token = lexer.consume();
            let kind = token.kind;
            kinds.push(kind);
            if kind == TokenKind::Eof {
                break;
            }
        }
        kinds
    }

    #[test]
    fn test_compound_assignment_maximal_munch() {
        assert_eq!(
            kinds("+= -= *= /= %= %%="),
            vec![
                TokenKind::PlusEq,
                TokenKind::MinusEq,
                TokenKind::StarEq,
                TokenKind::SlashEq,
                TokenKind::PercentEq,
                TokenKind::PercentPercentEq,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_modulo_family() {
        assert_eq!(
            kinds("% %% %= %%="),
            vec![
                TokenKind::Percent,
                TokenKind::PercentPercent,
                TokenKind::PercentEq,
                TokenKind::PercentPercentEq,
                TokenKind::Eof,
            ]
        );
        // adjacent runs still munch longest-first
        assert_eq!(
            kinds("%%=%%"),
            vec![
                TokenKind::PercentPercentEq,
                TokenKind::PercentPercent,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_arrow_and_comparisons() {
        assert_eq!(
            kinds("-> <= >= == != < >"),
            vec![
                TokenKind::Arrow,
                TokenKind::Le,
                TokenKind::Ge,
                TokenKind::EqEq,
                TokenKind::NotEq,
                TokenKind::Lt,
                TokenKind::Gt,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_eof_is_idempotent() {
        let mut lexer = Lexer::new("x");
        assert_eq!(lexer.consume().kind, TokenKind::Ident);

        let first = lexer.consume();
        assert_eq!(first.kind, TokenKind::Eof);

        let second = lexer.consume();
        assert_eq!(second.kind, TokenKind::Eof);
        assert_eq!(second.position, first.position);
        assert_eq!(lexer.peek().kind, TokenKind::Eof);
        assert_eq!(lexer.peek().position, first.position);
    }

    #[test]
    fn test_peek_is_memoized() {
        let mut lexer = Lexer::new("a b");
        let peeked = lexer.peek().clone();
        assert_eq!(lexer.peek().text, peeked.text);

        let consumed = lexer.consume();
        assert_eq!(consumed, peeked);
        assert_eq!(lexer.peek().text, "b");
    }

    #[test]
    fn test_keywords_and_identifiers() {
        assert_eq!(
            kinds("let letter fn fnord type do"),
            vec![
                TokenKind::Let,
                TokenKind::Ident,
                TokenKind::Fn,
                TokenKind::Ident,
                TokenKind::Type,
                TokenKind::Do,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_number_charset() {
        let mut lexer = Lexer::new("0xff 1_000_000 3.14 0b10 2f");
        for expected in ["0xff", "1_000_000", "3.14", "0b10", "2f"] {
            let token = lexer.consume();
            assert_eq!(token.kind, TokenKind::Number);
            assert_eq!(token.text, expected);
        }
    }

    #[test]
    fn test_string_escapes() {
        let mut lexer = Lexer::new(r#""a\nb" "q\"q" "back\\slash""#);
        assert_eq!(lexer.consume().text, "a\nb");
        assert_eq!(lexer.consume().text, "q\"q");
        assert_eq!(lexer.consume().text, "back\\slash");
    }

    #[test]
    fn test_unknown_escape_drops_both_characters() {
        let mut lexer = Lexer::new(r#""a\qb""#);
        let token = lexer.consume();
        assert_eq!(token.kind, TokenKind::String);
        assert_eq!(token.text, "ab");
    }

    #[test]
    fn test_unterminated_string_is_invalid() {
        let mut lexer = Lexer::new("  \"abc");
        let token = lexer.consume();
        assert_eq!(token.kind, TokenKind::Invalid);
        assert_eq!(token.text, "abc");
        assert_eq!(token.position, Position::new(1, 3));
    }

    #[test]
    fn test_comment_ends_at_whitespace() {
        // the comment swallows only its glued word
        assert_eq!(kinds("//hidden rest"), vec![TokenKind::Ident, TokenKind::Eof]);
        // a space after `//` means the next word survives
        assert_eq!(kinds("// word"), vec![TokenKind::Ident, TokenKind::Eof]);
        assert_eq!(kinds("//alone"), vec![TokenKind::Eof]);
    }

    #[test]
    fn test_positions_across_lines() {
        let mut lexer = Lexer::new("let x\n  y");
        assert_eq!(lexer.consume().position, Position::new(1, 1));
        assert_eq!(lexer.consume().position, Position::new(1, 5));
        assert_eq!(lexer.consume().position, Position::new(2, 3));
    }

    #[test]
    fn test_invalid_character() {
        let mut lexer = Lexer::new("#");
        let token = lexer.consume();
        assert_eq!(token.kind, TokenKind::Invalid);
        assert_eq!(token.text, "#");
    }

    #[test]
    fn test_accessor_tokens() {
        assert_eq!(
            kinds("a@.b[0](c)"),
            vec![
                TokenKind::Ident,
                TokenKind::At,
                TokenKind::Dot,
                TokenKind::Ident,
                TokenKind::LBracket,
                TokenKind::Number,
                TokenKind::RBracket,
                TokenKind::LParen,
                TokenKind::Ident,
                TokenKind::RParen,
                TokenKind::Eof,
            ]
        );
    }
}
