//! Ember source code parser
//!
//! This module transforms Ember source text into an abstract syntax tree:
//! - [`lexer`]: Tokenization (source text → tokens, one at a time)
//! - [`parse`]: Parsing (tokens → tree) and diagnostic collection
//! - [`ast`]: Tree node definitions
//! - [`errors`]: Syntax error catalog and positioned diagnostics
//!
//! # Supported Language
//!
//! - Declarations: `fn` definitions, `type` definitions, global `let`
//! - Statements: `let`, `mut`, `if`/`else`, `while`, `do while`
//! - Expressions: arithmetic, comparisons, blocks, member access, indexing,
//!   calls, pointer dereference (`@`)
//! - Blocks are expressions; a block whose last line has no trailing `;`
//!   returns that line's value
//!
//! # Parser Implementation
//!
//! Hand-written recursive descent with precedence climbing for binary
//! operators and a single token of lookahead. The parser never stops at a
//! syntax error: every error is recorded as a positioned diagnostic and
//! parsing resynchronizes at the nearest safe token, so one pass reports
//! everything wrong with a file.

pub mod ast;
pub mod errors;
pub mod lexer;
pub mod parse;

mod declarations;
mod expressions;
mod statements;
