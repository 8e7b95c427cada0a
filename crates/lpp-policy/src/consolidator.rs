// consolidator.rs: Groups rules by code origin into one policy document.
//
// One pass over the (generalized) rule lines builds a sorted map from
// codebase to the set of permission clauses granted to it. Set membership
// removes duplicates; BTree ordering makes the rendered document
// deterministic regardless of the order rules were observed in.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use lpp_grant::GrantRule;

use crate::error::PolicyError;
use crate::generalizer::Generalizer;

/// First line of every rendered policy.
pub const DEFAULT_HEADER: &str = "// Generated permissions";

/// Builds [`PolicyDocument`]s from rule lines.
#[derive(Debug, Clone)]
pub struct Consolidator {
    header: String,
}

impl Consolidator {
    pub fn new() -> Self {
        Self {
            header: DEFAULT_HEADER.to_string(),
        }
    }

    /// Replace the header comment line.
    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = header.into();
        self
    }

    /// Group rule lines by codebase. Blank lines are ignored; lines that
    /// are not grant rules are logged, counted and skipped.
    pub fn consolidate<I, S>(&self, lines: I) -> PolicyDocument
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut document = PolicyDocument::empty(&self.header);

        for (index, line) in lines.into_iter().enumerate() {
            let line = line.as_ref();
            if line.trim().is_empty() {
                continue;
            }
            match GrantRule::parse(line) {
                Ok(rule) => {
                    tracing::debug!(codebase = rule.codebase(), "permission: {}", rule.clause());
                    document.insert(&rule);
                }
                Err(e) => {
                    tracing::warn!("skipping line {}: {}", index + 1, e);
                    document.skipped += 1;
                }
            }
        }

        document
    }
}

impl Default for Consolidator {
    fn default() -> Self {
        Self::new()
    }
}

/// The consolidated policy: codebase → permission clauses, both sorted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyDocument {
    header: String,
    grants: BTreeMap<String, BTreeSet<String>>,
    skipped: usize,
}

impl PolicyDocument {
    fn empty(header: &str) -> Self {
        Self {
            header: header.to_string(),
            grants: BTreeMap::new(),
            skipped: 0,
        }
    }

    fn insert(&mut self, rule: &GrantRule) {
        self.grants
            .entry(rule.codebase().to_string())
            .or_default()
            .insert(rule.clause());
    }

    /// Codebases in ascending order.
    pub fn codebases(&self) -> impl Iterator<Item = &str> {
        self.grants.keys().map(String::as_str)
    }

    /// Clauses granted to `codebase`, in ascending order.
    pub fn clauses(&self, codebase: &str) -> Vec<&str> {
        self.grants
            .get(codebase)
            .map(|set| set.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Number of codebase groups.
    pub fn len(&self) -> usize {
        self.grants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }

    /// Total number of distinct clauses across all groups.
    pub fn clause_count(&self) -> usize {
        self.grants.values().map(BTreeSet::len).sum()
    }

    /// Lines that were not grant rules.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn header(&self) -> &str {
        &self.header
    }

    /// The policy file text.
    pub fn render(&self) -> String {
        self.to_string()
    }

    /// Write the rendered policy to `path`, replacing it.
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<(), PolicyError> {
        let path = path.as_ref();
        std::fs::write(path, self.render()).map_err(|source| PolicyError::WriteFailed {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl fmt::Display for PolicyDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.header)?;
        for (codebase, clauses) in &self.grants {
            writeln!(f, "grant codeBase \"{}\" {{", codebase)?;
            for clause in clauses {
                writeln!(f, "  {}", clause)?;
            }
            writeln!(f, "}};")?;
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Read the lines of a rule log.
///
/// A read error part way through is logged and ends the read; the lines
/// read so far are returned.
pub fn read_rule_lines(path: impl AsRef<Path>) -> Result<Vec<String>, PolicyError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| PolicyError::ReadFailed {
        path: path.to_path_buf(),
        source,
    })?;

    let mut lines = Vec::new();
    for line in BufReader::new(file).lines() {
        match line {
            Ok(line) => lines.push(line),
            Err(e) => {
                tracing::warn!(
                    "stopped reading {} after {} lines: {}",
                    path.display(),
                    lines.len(),
                    e
                );
                break;
            }
        }
    }
    Ok(lines)
}

/// Generalize and consolidate in one pass.
pub fn build_policy<I, S>(lines: I, generalizer: &Generalizer, consolidator: &Consolidator) -> PolicyDocument
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    consolidator.consolidate(
        lines
            .into_iter()
            .map(|line| generalizer.generalize(line.as_ref())),
    )
}
