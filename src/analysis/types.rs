//! Type table and sizing
//!
//! This module defines [`TypeInfo`] and [`TypeTable`], the name-indexed
//! registry of every type known to a program. The table starts from the
//! builtin types and is extended by the analyzer with user definitions.
//!
//! All sizes are in bytes. Every builtin occupies one machine word, and
//! pointers and arrays are word-sized references regardless of what they
//! point at, so only named user types need a table lookup.

use rustc_hash::FxHashMap;

use crate::parser::ast::TypeNode;

/// Machine word size in bytes.
pub const WORD_SIZE: usize = 8;

/// A named type and its size in bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeInfo {
    pub name: String,
    pub size: usize,
}

/// Name-indexed table of known types.
#[derive(Debug, Clone)]
pub struct TypeTable {
    entries: FxHashMap<String, TypeInfo>,
}

impl TypeTable {
    /// Create a table seeded with the builtin types.
    pub fn with_builtins() -> Self {
        let mut entries = FxHashMap::default();
        for name in ["int", "float", "bool", "string"] {
            entries.insert(
                name.to_string(),
                TypeInfo {
                    name: name.to_string(),
                    size: WORD_SIZE,
                },
            );
        }
        TypeTable { entries }
    }

    pub fn get(&self, name: &str) -> Option<&TypeInfo> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Register a type, replacing any previous entry with the same name.
    pub fn insert(&mut self, info: TypeInfo) {
        self.entries.insert(info.name.clone(), info);
    }

    /// Size in bytes of a value of the given parsed type, if known.
    ///
    /// Pointers and arrays are word-sized references, so their size never
    /// depends on the base type. `None` means the size cannot be
    /// determined from this table.
    pub fn size_of(&self, ty: &TypeNode) -> Option<usize> {
        match ty {
            TypeNode::Named(name) => self.get(name).map(|info| info.size),
            TypeNode::Pointer(_) | TypeNode::Array(_) => Some(WORD_SIZE),
            TypeNode::None | TypeNode::Auto => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_are_word_sized() {
        let table = TypeTable::with_builtins();
        for name in ["int", "float", "bool", "string"] {
            assert_eq!(table.get(name).map(|info| info.size), Some(WORD_SIZE));
        }
        assert!(!table.contains("Point"));
    }

    #[test]
    fn test_size_of_references_ignores_base() {
        let table = TypeTable::with_builtins();
        let missing = Box::new(TypeNode::Named("Missing".to_string()));
        assert_eq!(table.size_of(&TypeNode::Pointer(missing.clone())), Some(WORD_SIZE));
        assert_eq!(table.size_of(&TypeNode::Array(missing)), Some(WORD_SIZE));
    }

    #[test]
    fn test_size_of_unknown_named_type() {
        let table = TypeTable::with_builtins();
        assert_eq!(table.size_of(&TypeNode::Named("Missing".to_string())), None);
        assert_eq!(table.size_of(&TypeNode::Auto), None);
        assert_eq!(table.size_of(&TypeNode::None), None);
    }

    #[test]
    fn test_insert_replaces() {
        let mut table = TypeTable::with_builtins();
        table.insert(TypeInfo {
            name: "Point".to_string(),
            size: 16,
        });
        assert_eq!(table.get("Point").map(|info| info.size), Some(16));

        table.insert(TypeInfo {
            name: "Point".to_string(),
            size: 24,
        });
        assert_eq!(table.get("Point").map(|info| info.size), Some(24));
    }
}
