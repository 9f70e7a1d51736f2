//! Registry of target-language bundles and macro expansions.

use crate::ast::MacroKind;
use crate::traits::{Language, MacroStrategy};

/// Maps language tags to bundles and `(tag, macro kind)` pairs to
/// expansions. Lookups fail closed: anything not registered is absent.
#[derive(Default, Clone)]
pub struct Registry {
    languages: Vec<&'static dyn Language>,
    macros: Vec<(&'static str, &'static dyn MacroStrategy)>,
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in bundle enabled by features.
    pub fn with_builtins() -> Self {
        #[allow(unused_mut)]
        let mut registry = Self::new();

        #[cfg(feature = "lang-go")]
        {
            registry.register_language(&crate::output::go::GO);
        }

        #[cfg(feature = "lang-java")]
        {
            registry.register_language(&crate::output::java::JAVA);
        }

        registry
    }

    /// Register a bundle together with the macro expansions it ships.
    ///
    /// Registering a tag again replaces the earlier bundle.
    pub fn register_language(&mut self, language: &'static dyn Language) {
        self.languages.retain(|l| l.tag() != language.tag());
        self.languages.push(language);
        for strategy in language.macros() {
            self.register_macro(language.tag(), *strategy);
        }
    }

    /// Register (or replace) the expansion of one macro kind for a language.
    pub fn register_macro(&mut self, language: &'static str, strategy: &'static dyn MacroStrategy) {
        self.macros
            .retain(|(tag, s)| !(*tag == language && s.kind() == strategy.kind()));
        self.macros.push((language, strategy));
    }

    /// Drop the expansion of one macro kind for a language; returns
    /// whether one was registered.
    pub fn remove_macro(&mut self, language: &str, kind: MacroKind) -> bool {
        let before = self.macros.len();
        self.macros.retain(|(tag, s)| !(*tag == language && s.kind() == kind));
        self.macros.len() != before
    }

    /// Get a bundle by language tag.
    pub fn language(&self, tag: &str) -> Option<&'static dyn Language> {
        self.languages.iter().find(|l| l.tag() == tag).copied()
    }

    /// Get the expansion for a macro kind in a language.
    pub fn macro_strategy(&self, language: &str, kind: MacroKind) -> Option<&'static dyn MacroStrategy> {
        self.macros
            .iter()
            .find(|(tag, s)| *tag == language && s.kind() == kind)
            .map(|(_, s)| *s)
    }

    /// All registered language tags, in registration order.
    pub fn language_tags(&self) -> Vec<&'static str> {
        self.languages.iter().map(|l| l.tag()).collect()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("languages", &self.language_tags())
            .field(
                "macros",
                &self
                    .macros
                    .iter()
                    .map(|(tag, s)| format!("{}:{}", tag, s.kind()))
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_language_is_absent() {
        let registry = Registry::with_builtins();
        assert!(registry.language("cobol").is_none());
        assert!(registry.macro_strategy("cobol", MacroKind::TryDefine).is_none());
        assert!(Registry::new().language_tags().is_empty());
    }

    #[test]
    #[cfg(feature = "lang-go")]
    fn test_go_lookup() {
        let registry = Registry::with_builtins();
        let go = registry.language("go").expect("go bundle");
        assert_eq!(go.extension(), "go");
        for kind in [MacroKind::Terminator, MacroKind::TryDefine, MacroKind::Fail] {
            assert_eq!(registry.macro_strategy("go", kind).map(|s| s.kind()), Some(kind));
        }
    }

    #[test]
    #[cfg(feature = "lang-go")]
    fn test_remove_macro() {
        let mut registry = Registry::with_builtins();
        assert!(registry.remove_macro("go", MacroKind::TryDefine));
        assert!(!registry.remove_macro("go", MacroKind::TryDefine));
        assert!(registry.macro_strategy("go", MacroKind::TryDefine).is_none());
        assert!(registry.macro_strategy("go", MacroKind::Fail).is_some());
    }

    #[test]
    #[cfg(feature = "lang-java")]
    fn test_java_lookup() {
        let registry = Registry::with_builtins();
        let java = registry.language("java").expect("java bundle");
        assert_eq!(java.extension(), "java");
        assert!(!java.supports_tags());
    }

    #[test]
    #[cfg(feature = "lang-go")]
    fn test_macro_override_replaces() {
        use crate::ast::{Macro, Statement};
        use crate::error::EmitError;
        use crate::render::FileCx;
        use crate::traits::MacroScope;

        struct Silent;
        impl MacroStrategy for Silent {
            fn kind(&self) -> MacroKind {
                MacroKind::Terminator
            }
            fn expand(
                &self,
                _: &Macro,
                _: &mut FileCx<'_>,
                _: &MacroScope<'_>,
            ) -> Result<Vec<Statement>, EmitError> {
                Ok(Vec::new())
            }
        }
        static SILENT: Silent = Silent;

        let mut registry = Registry::with_builtins();
        registry.register_macro("go", &SILENT);
        let count = registry
            .macros
            .iter()
            .filter(|(tag, s)| *tag == "go" && s.kind() == MacroKind::Terminator)
            .count();
        assert_eq!(count, 1);
    }
}
