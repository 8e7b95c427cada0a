//! Profiler configuration structures

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ProfilerError;

/// Configuration for a [`crate::ProfilingEngine`], usually from `.lpp/profiler.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfilerConfig {
    /// Where observed rules are written, one per line.
    #[serde(default = "default_rule_log")]
    pub rule_log: PathBuf,

    /// Keep rules from earlier runs instead of truncating the log on start.
    #[serde(default)]
    pub append: bool,

    /// Mirror each newly recorded rule to stdout.
    #[serde(default = "default_console_trace")]
    pub console_trace: bool,

    /// Component name the engine uses for its own call stack frames.
    #[serde(default = "default_identity")]
    pub identity: String,

    /// Code origin of the profiler itself. Rules for this origin are never reported.
    #[serde(default)]
    pub self_origin: Option<String>,
}

impl Default for ProfilerConfig {
    fn default() -> Self {
        Self {
            rule_log: default_rule_log(),
            append: false,
            console_trace: default_console_trace(),
            identity: default_identity(),
            self_origin: None,
        }
    }
}

// Serde default functions
fn default_rule_log() -> PathBuf {
    PathBuf::from("policy-rules.txt")
}

fn default_console_trace() -> bool {
    true
}

fn default_identity() -> String {
    "lpp_profiler::ProfilingEngine".to_string()
}

impl ProfilerConfig {
    /// Load profiler config from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ProfilerError> {
        let content = std::fs::read_to_string(path).map_err(|source| ProfilerError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Try to load config, returning default if the file is missing or invalid.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(ProfilerError::ConfigRead { .. }) => Self::default(),
            Err(e) => {
                tracing::warn!("ignoring profiler config {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Set the rule log path.
    pub fn with_rule_log(mut self, path: impl Into<PathBuf>) -> Self {
        self.rule_log = path.into();
        self
    }

    /// Set the profiler's own code origin.
    pub fn with_self_origin(mut self, origin: impl Into<String>) -> Self {
        self.self_origin = Some(origin.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn defaults_match_original_file_names() {
        let config = ProfilerConfig::default();
        assert_eq!(config.rule_log, PathBuf::from("policy-rules.txt"));
        assert!(!config.append);
        assert!(config.console_trace);
        assert!(config.self_origin.is_none());
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: ProfilerConfig = toml::from_str(
            r#"
            rule_log = "out/rules.txt"
            self_origin = "file:/opt/lpp/profiler.so"
            "#,
        )
        .unwrap();
        assert_eq!(config.rule_log, PathBuf::from("out/rules.txt"));
        assert_eq!(
            config.self_origin.as_deref(),
            Some("file:/opt/lpp/profiler.so")
        );
        assert!(config.console_trace);
        assert_eq!(config.identity, "lpp_profiler::ProfilingEngine");
    }

    #[test]
    fn missing_file_falls_back_to_default() {
        let dir = tempdir().unwrap();
        let config = ProfilerConfig::load_or_default(&dir.path().join("nope.toml"));
        assert_eq!(config.rule_log, PathBuf::from("policy-rules.txt"));
    }

    #[test]
    fn invalid_file_is_an_error_for_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("profiler.toml");
        std::fs::write(&path, "append = \"sometimes\"").unwrap();
        assert!(matches!(
            ProfilerConfig::load(&path),
            Err(ProfilerError::ConfigParse(_))
        ));
        assert!(!ProfilerConfig::load_or_default(&path).append);
    }
}
