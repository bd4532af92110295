//! # Introduction
//!
//! emberc is the front end for Ember, a small imperative language with
//! block expressions and explicit mutation. It turns source text into a
//! parse tree and a type table, collecting positioned diagnostics instead
//! of stopping at the first error, so a single pass reports everything
//! wrong with a file.
//!
//! ## Pipeline
//!
//! ```text
//! Source → Lexer → Parser → Tree → Analyzer → Type table
//! ```
//!
//! 1. [`parser`] — tokenises the source lazily and builds the tree. Every
//!    syntax error becomes a [`parser::errors::Diagnostic`] and parsing
//!    resynchronizes at the nearest safe token.
//! 2. [`analysis`] — read-only checks over the finished tree: duplicate
//!    names, globals without explicit types, and user type sizing.
//!
//! ## Supported language
//!
//! Declarations: `fn`, `type`, global `let`.
//! Statements: `let`, `mut`, `if/else`, `while`, `do while`.
//! Expressions: arithmetic, comparisons, member access, indexing, calls,
//! pointer dereference (`@`), and blocks whose last unterminated line is
//! the block's value.

pub mod analysis;
pub mod parser;
