// error.rs: Error types for the policy tools.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while generalizing or consolidating rules.
#[derive(Debug, Error)]
pub enum PolicyError {
    /// A regex anchor in the pattern table does not compile.
    #[error("invalid pattern '{name}': {source}")]
    InvalidPattern {
        name: String,
        source: regex::Error,
    },

    /// The configured wildcard cannot be written into a grant rule.
    #[error("invalid wildcard {wildcard:?}: {reason}")]
    InvalidWildcard {
        wildcard: String,
        reason: &'static str,
    },

    /// Failed to read the rule log.
    #[error("failed to read rules from {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to write the policy document.
    #[error("failed to write policy to {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to read the policy config file.
    #[error("failed to read policy config at {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The policy config file is not valid TOML for [`crate::PolicyConfig`].
    #[error("failed to parse policy config: {0}")]
    ConfigParse(#[from] toml::de::Error),
}
