//! # lpp-grant
//!
//! Capability requests and the grant-rule grammar shared by the profiler
//! (which writes rules) and the policy tools (which read them back).
//!
//! A grant rule is one line of policy text:
//!
//! ```text
//! grant codeBase "file:/app/lib/core.jar" { permission FilePermission "/etc/hosts", "read"; };
//! ```
//!
//! ## Quick Example
//!
//! ```rust
//! use lpp_grant::{CapabilityRequest, GrantRule, Provenance};
//!
//! let request = CapabilityRequest::file("/etc/hosts", "read");
//! let rule = GrantRule::new(&Provenance::new("file:/app/lib/core.jar"), &request);
//! let line = rule.to_string();
//! assert_eq!(GrantRule::parse(&line).unwrap(), rule);
//! ```

pub mod error;
pub mod request;
pub mod rule;

pub use error::GrammarError;
pub use request::{CapabilityRequest, Provenance};
pub use rule::{escape, unescape, GrantRule};
