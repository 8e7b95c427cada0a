//! # lpp-profiler
//!
//! Observes every capability check a running program makes and records a
//! grant rule for each distinct (code origin, request) pair, once.
//!
//! The engine never denies anything. It is meant to run a program once
//! under observation and produce the raw material for a least-privilege
//! policy (see `lpp-policy` for the offline consolidation step).
//!
//! ## Quick Example
//!
//! ```rust,no_run
//! use lpp_grant::CapabilityRequest;
//! use lpp_profiler::{callstack, Frame, ProfilerConfig, ProfilingEngine};
//!
//! let engine = ProfilingEngine::start(ProfilerConfig::default());
//!
//! // The runtime marks attributable code as it is entered...
//! let _frame = callstack::enter(Frame::new("app::loader", "load").with_origin("file:/app/lib/loader.jar"));
//!
//! // ...and asks the engine about every resource access.
//! engine.check_permission(&CapabilityRequest::file("/etc/app.conf", "read"));
//! engine.close();
//! ```

pub mod cache;
pub mod callstack;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod formatter;
pub mod guard;
pub mod resolver;
pub mod rule_log;

pub use cache::DedupCache;
pub use callstack::{CallChain, Frame, FrameGuard};
pub use config::ProfilerConfig;
pub use context::{CapturedContext, CodeDomain, ExecutionContext};
pub use engine::ProfilingEngine;
pub use error::{ProfilerError, ResolutionError};
pub use formatter::RuleFormatter;
pub use guard::RecursionGuard;
pub use resolver::resolve;
pub use rule_log::RuleLog;
