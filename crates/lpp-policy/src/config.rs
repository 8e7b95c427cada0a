//! Policy generation configuration
//!
//! Example `.lpp/policy.toml`:
//! ```toml
//! header = "// myapp permissions"
//!
//! [[pattern]]
//! name = "app-logs"
//! anchor = { regex = "/var/log/myapp/[a-z]+-" }
//!
//! [[pattern]]
//! name = "uploads"
//! kind = "FilePermission"
//! anchor = { prefix = "/srv/uploads/" }
//! ```
//!
//! Patterns from the file are tried before the built-in table unless
//! `include_defaults = false`.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::consolidator::{Consolidator, DEFAULT_HEADER};
use crate::error::PolicyError;
use crate::generalizer::{check_wildcard, Generalizer, DEFAULT_WILDCARD};
use crate::pattern::{default_patterns, GeneralizationPattern};

/// Configuration for generalization and consolidation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Header comment line of the rendered policy.
    #[serde(default = "default_header")]
    pub header: String,

    /// Replacement for the volatile part of a target.
    #[serde(default = "default_wildcard")]
    pub wildcard: String,

    /// Append the built-in patterns after the configured ones.
    #[serde(default = "default_include_defaults")]
    pub include_defaults: bool,

    /// Configured patterns, evaluated in order.
    #[serde(default)]
    pub pattern: Vec<GeneralizationPattern>,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            header: default_header(),
            wildcard: default_wildcard(),
            include_defaults: default_include_defaults(),
            pattern: Vec::new(),
        }
    }
}

// Serde default functions
fn default_header() -> String {
    DEFAULT_HEADER.to_string()
}

fn default_wildcard() -> String {
    DEFAULT_WILDCARD.to_string()
}

fn default_include_defaults() -> bool {
    true
}

impl PolicyConfig {
    /// Load policy config from a TOML file.
    pub fn load(path: &Path) -> Result<Self, PolicyError> {
        let content = std::fs::read_to_string(path).map_err(|source| PolicyError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load config if the file exists, default otherwise. A file that
    /// exists but does not parse is still an error.
    pub fn load_or_default(path: &Path) -> Result<Self, PolicyError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Configured patterns followed by the built-in ones (if included).
    pub fn effective_patterns(&self) -> Vec<GeneralizationPattern> {
        let mut patterns = self.pattern.clone();
        if self.include_defaults {
            patterns.extend(default_patterns());
        }
        patterns
    }

    pub fn generalizer(&self) -> Result<Generalizer, PolicyError> {
        check_wildcard(&self.wildcard)?;
        Ok(Generalizer::new(&self.effective_patterns())?.with_wildcard(self.wildcard.clone()))
    }

    pub fn consolidator(&self) -> Consolidator {
        Consolidator::new().with_header(self.header.clone())
    }
}
