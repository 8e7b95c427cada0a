// rule_log.rs: Line-oriented rule log.
//
// The rule log is the handoff between a profiling run and the offline
// policy tools: one grant rule per line, UTF-8, newline-terminated. Each
// rule is flushed as soon as it is written so a crash of the profiled
// program loses nothing already observed.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::ProfilerError;

/// An append-only rule log.
///
/// `BufWriter` batches the bytes of a single line; we flush after every
/// rule for durability.
pub struct RuleLog {
    writer: BufWriter<Box<dyn Write + Send>>,
    path: Option<PathBuf>,
    lines: usize,
}

impl RuleLog {
    /// Create a fresh log at `path`, replacing any previous run's rules.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, ProfilerError> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path).map_err(|source| ProfilerError::OpenFailed {
            path: path.clone(),
            source,
        })?;
        Ok(Self::with_path(Box::new(file), path))
    }

    /// Open (or create) a log at `path`, keeping existing rules.
    pub fn append_to(path: impl AsRef<Path>) -> Result<Self, ProfilerError> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| ProfilerError::OpenFailed {
                path: path.clone(),
                source,
            })?;
        Ok(Self::with_path(Box::new(file), path))
    }

    /// Log into an arbitrary writer (pipes, in-memory buffers).
    pub fn from_writer(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: BufWriter::new(writer),
            path: None,
            lines: 0,
        }
    }

    fn with_path(writer: Box<dyn Write + Send>, path: PathBuf) -> Self {
        Self {
            writer: BufWriter::new(writer),
            path: Some(path),
            lines: 0,
        }
    }

    /// Append one rule line and flush.
    pub fn append(&mut self, rule: &str) -> Result<(), ProfilerError> {
        writeln!(self.writer, "{}", rule)?;
        self.writer.flush()?;
        self.lines += 1;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), ProfilerError> {
        self.writer.flush()?;
        Ok(())
    }

    /// Lines appended through this handle.
    pub fn lines_written(&self) -> usize {
        self.lines
    }

    /// Path of the backing file, if file-backed.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Read every rule line of a log file, oldest first. Blank lines are skipped.
    pub fn read_all(path: impl AsRef<Path>) -> Result<Vec<String>, ProfilerError> {
        let file = File::open(path.as_ref()).map_err(|source| ProfilerError::OpenFailed {
            path: path.as_ref().to_path_buf(),
            source,
        })?;
        let reader = BufReader::new(file);
        let mut rules = Vec::new();

        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            rules.push(line);
        }

        Ok(rules)
    }
}

impl std::fmt::Debug for RuleLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleLog")
            .field("path", &self.path)
            .field("lines", &self.lines)
            .finish()
    }
}
