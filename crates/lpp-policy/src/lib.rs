//! # lpp-policy
//!
//! Turns a raw rule log from `lpp-profiler` into a minimal, deduplicated
//! policy document.
//!
//! Two steps, both offline and single-threaded:
//!
//! 1. The [`Generalizer`] rewrites run-specific target paths (temp files,
//!    versioned artifacts, timestamped journals) into wildcard patterns, so
//!    repeated runs produce the same rules.
//! 2. The [`Consolidator`] groups the rules by codebase, drops duplicates,
//!    and renders a deterministic [`PolicyDocument`].
//!
//! ## Quick Example
//!
//! ```rust
//! use lpp_policy::{build_policy, Consolidator, Generalizer};
//!
//! let doc = build_policy(
//!     [
//!         r#"grant codeBase "X" { permission P "/tmp/abc123", "read"; };"#,
//!         r#"grant codeBase "X" { permission P "/tmp/def456", "read"; };"#,
//!     ],
//!     &Generalizer::default(),
//!     &Consolidator::new(),
//! );
//! assert_eq!(doc.clauses("X"), vec![r#"permission P "/tmp/-", "read";"#]);
//! ```

pub mod config;
pub mod consolidator;
pub mod error;
pub mod generalizer;
pub mod pattern;

pub use config::PolicyConfig;
pub use consolidator::{build_policy, read_rule_lines, Consolidator, PolicyDocument};
pub use error::PolicyError;
pub use generalizer::{check_wildcard, Generalizer};
pub use pattern::{default_patterns, Anchor, GeneralizationPattern};
