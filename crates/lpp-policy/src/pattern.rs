// pattern.rs: Volatile-path patterns for the generalizer.
//
// Each pattern recognizes one shape of run-specific target (a temp file
// with a random suffix, a versioned artifact in a dependency cache, a
// timestamped journal) and names the cut point after which the target is
// volatile. Everything from the cut point on becomes the wildcard.
//
// Examples (with the default table):
//   "/tmp/abc123"                                   → "/tmp/-"
//   "/home/u/.m2/repository/joda-time/1.6/x.jar"    → "/home/u/.m2/repository/-"
//   "./journals/Rules-2010-01-25T14_06_16.jrnl"     → "./journals/-"

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::PolicyError;

/// Where the volatile part of a target begins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Anchor {
    /// The target starts with this text; the cut is right after it.
    Prefix(String),
    /// The target contains this text; the cut is after its first occurrence.
    Contains(String),
    /// The cut is at the end of the first match of this regex.
    Regex(String),
}

/// One entry of the generalization table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneralizationPattern {
    /// Short name shown in logs and `lpp patterns`.
    pub name: String,

    /// Only apply to rules of this permission kind.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    /// Text that must immediately follow the cut point.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub followed_by: Option<String>,

    pub anchor: Anchor,
}

impl GeneralizationPattern {
    pub fn new(name: impl Into<String>, anchor: Anchor) -> Self {
        Self {
            name: name.into(),
            kind: None,
            followed_by: None,
            anchor,
        }
    }

    pub fn followed_by(mut self, text: impl Into<String>) -> Self {
        self.followed_by = Some(text.into());
        self
    }

    pub fn for_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }
}

/// The built-in table, most specific first.
pub fn default_patterns() -> Vec<GeneralizationPattern> {
    vec![
        GeneralizationPattern::new("temp-files", Anchor::Prefix("/tmp/".into())),
        GeneralizationPattern::new(
            "executor-snippets",
            Anchor::Contains("/var/cache/executor-snippets/".into()),
        )
        .followed_by("junitvmwatcher"),
        GeneralizationPattern::new(
            "maven-repository",
            Anchor::Contains(".m2/repository/".into()),
        ),
        GeneralizationPattern::new("journals", Anchor::Prefix("./journals/".into())),
        GeneralizationPattern::new(
            "archived-repositories",
            Anchor::Contains("/archiveRepositories/".into()),
        ),
        GeneralizationPattern::new("repositories", Anchor::Contains("/repositories/".into())),
    ]
}

enum Matcher {
    Prefix(String),
    Contains(String),
    Regex(Regex),
}

/// A pattern ready to be evaluated.
pub(crate) struct CompiledPattern {
    name: String,
    kind: Option<String>,
    followed_by: Option<String>,
    matcher: Matcher,
}

impl CompiledPattern {
    pub(crate) fn compile(pattern: &GeneralizationPattern) -> Result<Self, PolicyError> {
        let matcher = match &pattern.anchor {
            Anchor::Prefix(text) => Matcher::Prefix(text.clone()),
            Anchor::Contains(text) => Matcher::Contains(text.clone()),
            Anchor::Regex(source) => {
                let regex = Regex::new(source).map_err(|source| PolicyError::InvalidPattern {
                    name: pattern.name.clone(),
                    source,
                })?;
                Matcher::Regex(regex)
            }
        };
        Ok(Self {
            name: pattern.name.clone(),
            kind: pattern.kind.clone(),
            followed_by: pattern.followed_by.clone(),
            matcher,
        })
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    /// Byte offset in `target` where the volatile remainder starts, if this
    /// pattern applies. A pattern with nothing left to collapse does not apply.
    /// A remainder that is already `wildcard` satisfies `followed_by`, so the
    /// pattern keeps claiming the targets it generalized.
    pub(crate) fn cut_point(&self, kind: &str, target: &str, wildcard: &str) -> Option<usize> {
        if let Some(only) = &self.kind {
            if only != kind {
                return None;
            }
        }

        let cut = match &self.matcher {
            Matcher::Prefix(text) => target.starts_with(text.as_str()).then_some(text.len())?,
            Matcher::Contains(text) => target.find(text.as_str()).map(|i| i + text.len())?,
            Matcher::Regex(regex) => regex.find(target).map(|m| m.end())?,
        };

        if let Some(next) = &self.followed_by {
            let rest = &target[cut..];
            if !rest.starts_with(next.as_str()) && rest != wildcard {
                return None;
            }
        }

        (cut < target.len()).then_some(cut)
    }
}
