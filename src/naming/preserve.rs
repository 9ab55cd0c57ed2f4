//! Names that pass through the renamer untouched.
//!
//! A preserved name never consumes an allocator index and is never written
//! to the persisted mapping. The check runs before any table lookup.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Built-in scalar types, the entry point and the standard type aliases.
pub const DEFAULT_PRESERVED_NAMES: &[&str] = &[
    "int",
    "char",
    "void",
    "bool",
    "float",
    "double",
    "main",
    "ptrdiff_t",
    "size_t",
    "nullptr_t",
    "max_align_t",
    "NULL",
];

/// Qualified-name prefixes of the standard library.
pub const DEFAULT_FOREIGN_PREFIXES: &[&str] = &["std::"];

/// Decides whether a qualified name must be left as written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreservationPolicy {
    names: HashSet<String>,
    prefixes: Vec<String>,
}

impl Default for PreservationPolicy {
    fn default() -> Self {
        Self::new(
            DEFAULT_PRESERVED_NAMES.iter().copied(),
            DEFAULT_FOREIGN_PREFIXES.iter().copied(),
        )
    }
}

impl PreservationPolicy {
    /// Build a policy from exact names and namespace prefixes
    pub fn new<N, P>(names: N, prefixes: P) -> Self
    where
        N: IntoIterator,
        N::Item: Into<String>,
        P: IntoIterator,
        P::Item: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
            prefixes: prefixes
                .into_iter()
                .map(Into::into)
                .filter(|p: &String| !p.is_empty())
                .collect(),
        }
    }

    /// Whether `qualified_name` must never be renamed.
    pub fn must_preserve(&self, qualified_name: &str) -> bool {
        self.names.contains(qualified_name)
            || self
                .prefixes
                .iter()
                .any(|prefix| qualified_name.starts_with(prefix.as_str()))
    }

    /// Foreign namespace prefixes in configuration order
    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }
}
