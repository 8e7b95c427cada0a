// generalizer.rs: Collapses volatile target suffixes into a wildcard.
//
// Patterns are tried in table order and the first one that applies wins,
// so a broad pattern ("/repositories/") never pre-empts a more precise one
// listed before it ("/archiveRepositories/"). Lines that are not grant
// rules, or that no pattern applies to, pass through unchanged.
//
// Generalizing an already generalized line is a no-op: the rewritten
// target still cuts at the same place and the remainder is already the
// wildcard.

use lpp_grant::GrantRule;

use crate::error::PolicyError;
use crate::pattern::{default_patterns, CompiledPattern, GeneralizationPattern};

/// Wildcard meaning "this directory and everything below it".
pub const DEFAULT_WILDCARD: &str = "-";

/// An ordered table of volatile-path patterns.
pub struct Generalizer {
    patterns: Vec<CompiledPattern>,
    wildcard: String,
}

impl Generalizer {
    /// Build a generalizer from `patterns`, evaluated in the given order.
    pub fn new(patterns: &[GeneralizationPattern]) -> Result<Self, PolicyError> {
        let patterns = patterns
            .iter()
            .map(CompiledPattern::compile)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            patterns,
            wildcard: DEFAULT_WILDCARD.to_string(),
        })
    }

    /// Replace the wildcard. Callers taking it from configuration should
    /// run [`check_wildcard`] first.
    pub fn with_wildcard(mut self, wildcard: impl Into<String>) -> Self {
        self.wildcard = wildcard.into();
        self
    }

    /// Names of the patterns, in evaluation order.
    pub fn pattern_names(&self) -> Vec<&str> {
        self.patterns.iter().map(CompiledPattern::name).collect()
    }

    /// Generalize one rule-log line.
    pub fn generalize(&self, line: &str) -> String {
        let Ok(rule) = GrantRule::parse(line) else {
            return line.to_string();
        };
        match self.rewrite(&rule) {
            Some((name, generalized)) if generalized != rule => {
                tracing::debug!(pattern = name, "wild card: {}", generalized.clause());
                generalized.to_string()
            }
            _ => line.to_string(),
        }
    }

    /// Generalize a parsed rule. Returns it unchanged when no pattern applies.
    pub fn generalize_rule(&self, rule: &GrantRule) -> GrantRule {
        match self.rewrite(rule) {
            Some((_, generalized)) => generalized,
            None => rule.clone(),
        }
    }

    /// Name of the pattern that would generalize `rule`, if any.
    pub fn matching_pattern(&self, rule: &GrantRule) -> Option<&str> {
        self.rewrite(rule).map(|(name, _)| name)
    }

    fn rewrite(&self, rule: &GrantRule) -> Option<(&str, GrantRule)> {
        let target = rule.target();
        self.patterns.iter().find_map(|pattern| {
            let cut = pattern.cut_point(rule.kind(), target, &self.wildcard)?;
            let generalized = format!("{}{}", &target[..cut], self.wildcard);
            Some((pattern.name(), rule.clone().with_target(generalized)))
        })
    }
}

/// Reject wildcards that would make a generalized line unparseable or
/// collapse to nothing. The wildcard is written into the escaped target
/// as-is.
pub fn check_wildcard(wildcard: &str) -> Result<(), PolicyError> {
    let reason = if wildcard.is_empty() {
        "must not be empty"
    } else if wildcard.contains(['"', '\\', '\r', '\n']) {
        "must not contain quotes, backslashes or line breaks"
    } else {
        return Ok(());
    };
    Err(PolicyError::InvalidWildcard {
        wildcard: wildcard.to_string(),
        reason,
    })
}

impl Default for Generalizer {
    /// The built-in table. It has no regex anchors, so nothing can fail to compile.
    fn default() -> Self {
        Self {
            patterns: default_patterns()
                .iter()
                .filter_map(|p| CompiledPattern::compile(p).ok())
                .collect(),
            wildcard: DEFAULT_WILDCARD.to_string(),
        }
    }
}

impl std::fmt::Debug for Generalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Generalizer")
            .field("patterns", &self.pattern_names())
            .field("wildcard", &self.wildcard)
            .finish()
    }
}
