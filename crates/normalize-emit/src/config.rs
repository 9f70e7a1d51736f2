//! TOML configuration for rendering.
//!
//! Example emit.toml:
//! ```toml
//! [render]
//! parallel = true
//! diagnostic_mode = false
//!
//! [languages.java]
//! indent = "  "
//! ```

use crate::options::{LanguageOptions, RenderOptions};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// `[render]` section.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RenderSection {
    pub parallel: bool,
    pub diagnostic_mode: bool,
}

impl Default for RenderSection {
    fn default() -> Self {
        Self {
            parallel: true,
            diagnostic_mode: false,
        }
    }
}

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct EmitConfig {
    pub render: RenderSection,
    pub languages: BTreeMap<String, LanguageOptions>,
}

impl EmitConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            parallel: self.render.parallel,
            diagnostic_mode: self.render.diagnostic_mode,
            languages: self.languages.clone(),
            ..RenderOptions::default()
        }
    }
}
