//! Render options.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cooperative cancellation flag, shared between the caller and a render.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Per-language overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguageOptions {
    /// Indentation unit replacing the language default.
    pub indent: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Render files on the rayon pool. Output is identical either way.
    pub parallel: bool,
    /// Drop files that fail to render and report them instead of failing
    /// the whole render. Package- and module-level failures stay fatal.
    pub diagnostic_mode: bool,
    pub cancel: CancelToken,
    /// Keyed by language tag.
    pub languages: BTreeMap<String, LanguageOptions>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            parallel: true,
            diagnostic_mode: false,
            cancel: CancelToken::new(),
            languages: BTreeMap::new(),
        }
    }
}

impl RenderOptions {
    pub fn sequential() -> Self {
        Self {
            parallel: false,
            ..Self::default()
        }
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn language(&self, tag: &str) -> Option<&LanguageOptions> {
        self.languages.get(tag)
    }
}
