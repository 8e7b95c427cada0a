// error.rs: Error types for the profiling subsystem.
//
// None of these ever reach the profiled program: the engine logs and
// swallows them. They exist so the building blocks (RuleLog, resolver,
// config) can be used and tested on their own.

use std::path::PathBuf;
use thiserror::Error;

/// The execution context did not expose the code domains it was asked for.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("execution context is not resolvable: {reason}")]
pub struct ResolutionError {
    pub reason: String,
}

impl ResolutionError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Errors that can occur during profiler operations.
#[derive(Debug, Error)]
pub enum ProfilerError {
    /// Failed to open or create the rule log file.
    #[error("failed to open rule log at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to write a rule to the log.
    #[error("failed to append rule: {0}")]
    WriteFailed(#[from] std::io::Error),

    /// The call chain could not be turned into provenances.
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    /// Failed to read the profiler config file.
    #[error("failed to read profiler config at {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The profiler config file is not valid TOML for [`crate::ProfilerConfig`].
    #[error("failed to parse profiler config: {0}")]
    ConfigParse(#[from] toml::de::Error),
}
