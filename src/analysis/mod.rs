//! Static analysis
//!
//! This module checks a finished parse tree and builds the program's type
//! table:
//! - [`errors`]: Analysis error catalog
//! - [`types`]: Type table and sizing
//!
//! # Checks
//!
//! - Duplicate function, type and global variable names. The second
//!   occurrence is reported; nodes that lost their name to parse recovery
//!   are skipped so a degraded tree does not produce phantom duplicates.
//! - Global variables must carry an explicit type. Inference is only
//!   available inside function bodies.
//! - User types are sized in declaration order as the sum of their member
//!   sizes. A member of unknown named type is reported and falls back to
//!   one word so later definitions still get a usable size.
//!
//! Analysis is read-only over the tree and never stops early. Findings
//! are appended to the same diagnostic list the parser writes to.

pub mod errors;
pub mod types;

use rustc_hash::FxHashSet;

use crate::analysis::errors::AnalysisError;
use crate::analysis::types::{TypeInfo, TypeTable, WORD_SIZE};
use crate::parser::ast::{Position, Program, TypeNode, Variable};
use crate::parser::errors::Diagnostic;

/// Read-only checker for a parsed program.
pub struct Analyzer<'a> {
    tree: &'a Program,
    types: TypeTable,
}

impl<'a> Analyzer<'a> {
    pub fn new(tree: &'a Program) -> Self {
        Analyzer {
            tree,
            types: TypeTable::with_builtins(),
        }
    }

    /// Run every check, appending findings to `diagnostics`, and return
    /// the completed type table.
    pub fn analyze(mut self, diagnostics: &mut Vec<Diagnostic>) -> TypeTable {
        self.check_duplicate_functions(diagnostics);
        self.check_duplicate_types(diagnostics);
        self.check_duplicate_globals(diagnostics);
        self.check_global_types(diagnostics);
        self.build_type_table(diagnostics);
        self.types
    }

    fn check_duplicate_functions(&self, diagnostics: &mut Vec<Diagnostic>) {
        let mut seen = FxHashSet::default();
        for function in &self.tree.functions {
            let Some(name) = &function.name else { continue };
            if !seen.insert(name.as_str()) {
                report(
                    diagnostics,
                    AnalysisError::DuplicateFunction { name: name.clone() },
                    function.position,
                );
            }
        }
    }

    fn check_duplicate_types(&self, diagnostics: &mut Vec<Diagnostic>) {
        let mut seen = FxHashSet::default();
        for definition in &self.tree.types {
            let Some(name) = &definition.name else { continue };
            if !seen.insert(name.as_str()) {
                report(
                    diagnostics,
                    AnalysisError::DuplicateType { name: name.clone() },
                    definition.position,
                );
            }
        }
    }

    fn check_duplicate_globals(&self, diagnostics: &mut Vec<Diagnostic>) {
        let mut seen = FxHashSet::default();
        for global in &self.tree.globals {
            let Some(name) = &global.name else { continue };
            if !seen.insert(name.as_str()) {
                report(
                    diagnostics,
                    AnalysisError::DuplicateGlobal { name: name.clone() },
                    global.position,
                );
            }
        }
    }

    fn check_global_types(&self, diagnostics: &mut Vec<Diagnostic>) {
        for global in &self.tree.globals {
            // a missing type was already reported by the parser
            if global.ty == TypeNode::Auto {
                report(diagnostics, AnalysisError::GlobalRequiresType, global.position);
            }
        }
    }

    fn build_type_table(&mut self, diagnostics: &mut Vec<Diagnostic>) {
        for definition in &self.tree.types {
            let Some(name) = &definition.name else { continue };
            let size = definition
                .members
                .iter()
                .map(|member| self.member_size(member, definition.position, diagnostics))
                .sum();
            self.types.insert(TypeInfo {
                name: name.clone(),
                size,
            });
        }
    }

    fn member_size(
        &self,
        member: &Variable,
        position: Position,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> usize {
        match self.types.size_of(&member.ty) {
            Some(size) => size,
            None => {
                if let TypeNode::Named(name) = &member.ty {
                    report(
                        diagnostics,
                        AnalysisError::UnknownType { name: name.clone() },
                        position,
                    );
                }
                WORD_SIZE
            }
        }
    }
}

fn report(diagnostics: &mut Vec<Diagnostic>, error: AnalysisError, position: Position) {
    diagnostics.push(Diagnostic {
        message: error.to_string(),
        position,
    });
}
