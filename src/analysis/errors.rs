//! Static analysis error catalog
//!
//! Mirrors the parser's catalog: each variant carries its message text and
//! is attached to a tree position when reported.

use thiserror::Error;

/// Everything the analyzer can complain about.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    #[error("a function named \"{name}\" already exists")]
    DuplicateFunction { name: String },

    #[error("a type named \"{name}\" already exists")]
    DuplicateType { name: String },

    #[error("a global variable named \"{name}\" already exists")]
    DuplicateGlobal { name: String },

    #[error("global variables must have their types explicitly specified")]
    GlobalRequiresType,

    #[error("unknown type \"{name}\"")]
    UnknownType { name: String },
}
