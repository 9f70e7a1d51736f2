//! Abstract symbols and their resolution into target-language references.
//!
//! A [`Symbol`] is a language-neutral name such as `"string"` or
//! `"time"`. A [`SymbolResolver`] maps it, per target language, onto a
//! [`Reference`]: the identifier to write plus the import it needs.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Language-neutral symbol identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Symbol(String);

impl Symbol {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Symbol {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for Symbol {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A resolved, target-specific reference.
///
/// `local` is the identifier the import binds in the file (a Go package
/// name, a Java simple class name, or a builtin). `member`, when set, is
/// selected from it (`sql.Rows`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Reference {
    pub import: Option<String>,
    pub local: String,
    pub member: Option<String>,
}

impl Reference {
    /// A name that needs no import.
    pub fn builtin(name: impl Into<String>) -> Self {
        Self {
            import: None,
            local: name.into(),
            member: None,
        }
    }

    /// An import that binds `local` directly (e.g. a Java class).
    pub fn imported(import: impl Into<String>, local: impl Into<String>) -> Self {
        Self {
            import: Some(import.into()),
            local: local.into(),
            member: None,
        }
    }

    /// A member selected from an imported namespace (e.g. a Go package).
    pub fn member(
        import: impl Into<String>,
        local: impl Into<String>,
        member: impl Into<String>,
    ) -> Self {
        Self {
            import: Some(import.into()),
            local: local.into(),
            member: Some(member.into()),
        }
    }
}

/// Resolves abstract symbols for a target language.
///
/// Implementations must be pure: the renderer calls `resolve` repeatedly
/// (once per reference and per pass) and caches per file.
pub trait SymbolResolver: Send + Sync {
    fn resolve(&self, symbol: &Symbol, language: &str) -> Option<Reference>;
}

/// In-memory `(language, symbol) -> Reference` table.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    entries: HashMap<(String, String), Reference>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table pre-wired with primitive names for the built-in languages.
    pub fn builtins() -> Self {
        let mut table = Self::new();
        for name in ["string", "int", "int64", "float64", "bool", "byte", "any"] {
            table.insert("go", name, Reference::builtin(name));
        }
        table.insert("go", "time", Reference::member("time", "time", "Time"));

        for (name, java) in [
            ("string", "String"),
            ("int", "int"),
            ("int64", "long"),
            ("float64", "double"),
            ("bool", "boolean"),
            ("byte", "byte"),
            ("any", "Object"),
        ] {
            table.insert("java", name, Reference::builtin(java));
        }
        table.insert("java", "time", Reference::imported("java.time.Instant", "Instant"));
        table
    }

    pub fn insert(&mut self, language: &str, symbol: &str, reference: Reference) {
        self.entries
            .insert((language.to_string(), symbol.to_string()), reference);
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, language: &str, symbol: &str, reference: Reference) -> Self {
        self.insert(language, symbol, reference);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SymbolResolver for SymbolTable {
    fn resolve(&self, symbol: &Symbol, language: &str) -> Option<Reference> {
        self.entries
            .get(&(language.to_string(), symbol.as_str().to_string()))
            .cloned()
    }
}
