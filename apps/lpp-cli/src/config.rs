// config.rs: Where the CLI finds its inputs.
//
// `for_dir()` resolves the standard `.lpp/` layout: the profiler's config
// decides which rule log to read by default, the policy config supplies
// the header and pattern table.

use std::path::{Path, PathBuf};

use anyhow::Context;
use lpp_policy::PolicyConfig;
use lpp_profiler::ProfilerConfig;

/// Resolved CLI configuration.
#[derive(Debug, Clone)]
pub struct LppConfig {
    /// Rule log written by the profiler.
    pub rule_log: PathBuf,
    /// Generalization and rendering settings.
    pub policy: PolicyConfig,
    /// Where `policy` was (or would have been) loaded from.
    pub policy_path: PathBuf,
}

impl LppConfig {
    /// Load `profiler.toml` and `policy.toml` from `dir`. Missing files
    /// fall back to defaults; a policy.toml that doesn't parse is an error.
    pub fn for_dir(dir: &Path) -> anyhow::Result<Self> {
        let profiler = ProfilerConfig::load_or_default(&dir.join("profiler.toml"));
        let policy_path = dir.join("policy.toml");
        let policy = PolicyConfig::load_or_default(&policy_path)
            .with_context(|| format!("loading {}", policy_path.display()))?;
        Ok(Self {
            rule_log: profiler.rule_log,
            policy,
            policy_path,
        })
    }

    /// The rule log to read: explicit override or the profiler's.
    pub fn rules_path(&self, explicit: Option<&Path>) -> PathBuf {
        explicit
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.rule_log.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn empty_dir_gives_defaults() {
        let dir = tempdir().unwrap();
        let config = LppConfig::for_dir(dir.path()).unwrap();
        assert_eq!(config.rule_log, PathBuf::from("policy-rules.txt"));
        assert!(config.policy.include_defaults);
        assert_eq!(config.policy_path, dir.path().join("policy.toml"));
    }

    #[test]
    fn profiler_config_picks_rule_log() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("profiler.toml"),
            "rule_log = \"out/rules.txt\"\n",
        )
        .unwrap();
        let config = LppConfig::for_dir(dir.path()).unwrap();
        assert_eq!(config.rules_path(None), PathBuf::from("out/rules.txt"));
        assert_eq!(
            config.rules_path(Some(Path::new("other.txt"))),
            PathBuf::from("other.txt")
        );
    }

    #[test]
    fn broken_policy_config_is_an_error() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("policy.toml"), "[[pattern]]\nname = 1\n").unwrap();
        assert!(LppConfig::for_dir(dir.path()).is_err());
    }
}
