//! Render failures.

use crate::ast::MacroKind;
use crate::path::NodePath;

/// Taxonomy bucket of an [`EmitError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Structural,
    UnresolvedSymbol,
    UnsupportedLanguage,
    UnsupportedMacro,
    MacroContext,
    MacroExpansion,
    Cancelled,
}

/// Error that can occur while rendering a tree.
#[derive(Debug, Clone, thiserror::Error)]
pub enum EmitError {
    #[error("{path}: duplicate {scope} name `{name}`")]
    DuplicateName {
        path: NodePath,
        scope: &'static str,
        name: String,
    },

    #[error("{path}: {kind} has no name")]
    MissingName { path: NodePath, kind: &'static str },

    #[error("{path}: results must be either all named or all unnamed")]
    MixedResultNames { path: NodePath },

    #[error("{path}: conflicting package documentation from {first} and {second}")]
    ConflictingPackageDoc {
        path: NodePath,
        first: String,
        second: String,
    },

    #[error("{path}: struct embeds itself by value through {cycle}")]
    ValueCycle { path: NodePath, cycle: String },

    #[error("{path}: {message}")]
    InvalidDecl { path: NodePath, message: String },

    #[error("{path}: unresolved symbol `{symbol}` for language `{language}`")]
    UnresolvedSymbol {
        path: NodePath,
        symbol: String,
        language: String,
    },

    #[error("{path}: no renderer registered for language `{language}`")]
    UnsupportedLanguage { path: NodePath, language: String },

    #[error("{path}: no {kind} expansion registered for language `{language}`")]
    UnsupportedMacro {
        path: NodePath,
        kind: MacroKind,
        language: String,
    },

    #[error("{path}: {kind} used outside a valid context: {message}")]
    MacroContext {
        path: NodePath,
        kind: MacroKind,
        message: String,
    },

    #[error("{path}: cannot expand {kind}: {message}")]
    MacroExpansion {
        path: NodePath,
        kind: MacroKind,
        message: String,
    },

    #[error("render cancelled")]
    Cancelled,
}

impl EmitError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EmitError::DuplicateName { .. }
            | EmitError::MissingName { .. }
            | EmitError::MixedResultNames { .. }
            | EmitError::ConflictingPackageDoc { .. }
            | EmitError::ValueCycle { .. }
            | EmitError::InvalidDecl { .. } => ErrorKind::Structural,
            EmitError::UnresolvedSymbol { .. } => ErrorKind::UnresolvedSymbol,
            EmitError::UnsupportedLanguage { .. } => ErrorKind::UnsupportedLanguage,
            EmitError::UnsupportedMacro { .. } => ErrorKind::UnsupportedMacro,
            EmitError::MacroContext { .. } => ErrorKind::MacroContext,
            EmitError::MacroExpansion { .. } => ErrorKind::MacroExpansion,
            EmitError::Cancelled => ErrorKind::Cancelled,
        }
    }

    /// Path of the offending node; `None` only for cancellation.
    pub fn path(&self) -> Option<&NodePath> {
        match self {
            EmitError::DuplicateName { path, .. }
            | EmitError::MissingName { path, .. }
            | EmitError::MixedResultNames { path }
            | EmitError::ConflictingPackageDoc { path, .. }
            | EmitError::ValueCycle { path, .. }
            | EmitError::InvalidDecl { path, .. }
            | EmitError::UnresolvedSymbol { path, .. }
            | EmitError::UnsupportedLanguage { path, .. }
            | EmitError::UnsupportedMacro { path, .. }
            | EmitError::MacroContext { path, .. }
            | EmitError::MacroExpansion { path, .. } => Some(path),
            EmitError::Cancelled => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::NodeKind;

    #[test]
    fn test_message_carries_path() {
        let err = EmitError::DuplicateName {
            path: NodePath::root("demo").child(NodeKind::Struct, "HelloWorld"),
            scope: "field",
            name: "Hello".into(),
        };
        assert_eq!(err.kind(), ErrorKind::Structural);
        assert_eq!(
            err.to_string(),
            "{Project:demo}/{Struct:HelloWorld}: duplicate field name `Hello`"
        );
        assert!(EmitError::Cancelled.path().is_none());
    }
}
