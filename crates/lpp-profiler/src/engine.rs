// engine.rs: The profiling engine.
//
// The runtime calls `check_permission` (ambient context) or
// `check_permission_in` (explicit context) for every resource access. The
// engine never denies: it resolves which code origins are responsible,
// formats one grant rule per origin, and appends each rule it has not
// seen before to the rule log. Failures are logged and swallowed so the
// profiled program behaves exactly as it would unprofiled.
//
// Locking: the dedup cache and the rule log each sit behind their own
// mutex. Writing a rule can trigger a capability check on the same thread
// while the log mutex is held; the recursion guard turns that check away
// before it gets anywhere near a lock.

use std::fmt;
use std::io::Write;
use std::sync::{Mutex, PoisonError};

use lpp_grant::CapabilityRequest;

use crate::cache::DedupCache;
use crate::callstack::{self, Frame};
use crate::config::ProfilerConfig;
use crate::context::{CapturedContext, ExecutionContext};
use crate::formatter::RuleFormatter;
use crate::guard::{RecursionGuard, BUILD_RULES};
use crate::resolver;
use crate::rule_log::RuleLog;

/// Operation name of the engine's probe frame.
pub const CHECK_PERMISSION: &str = "check_permission";

type TraceSink = Box<dyn Write + Send>;

/// Observes capability checks and records each distinct grant rule once.
///
/// Share it between threads with `Arc<ProfilingEngine>`.
pub struct ProfilingEngine {
    identity: String,
    self_origin: Option<String>,
    guard: RecursionGuard,
    formatter: RuleFormatter,
    cache: DedupCache,
    log: Mutex<Option<RuleLog>>,
    trace: Mutex<Option<TraceSink>>,
}

impl ProfilingEngine {
    /// Start profiling with the rule log and console trace from `config`.
    ///
    /// Never fails: if the rule log cannot be opened the engine still
    /// observes and traces, it just doesn't persist.
    pub fn start(config: ProfilerConfig) -> Self {
        let opened = if config.append {
            RuleLog::append_to(&config.rule_log)
        } else {
            RuleLog::create(&config.rule_log)
        };
        let log = match opened {
            Ok(log) => {
                tracing::info!("profiling capability checks into {}", config.rule_log.display());
                Some(log)
            }
            Err(e) => {
                tracing::warn!("rule log unavailable, profiling without persistence: {}", e);
                None
            }
        };
        let trace = config
            .console_trace
            .then(|| Box::new(std::io::stdout()) as TraceSink);
        Self::assemble(&config, log, trace)
    }

    /// Start profiling into caller-supplied sinks. `config.rule_log` and
    /// `config.console_trace` are ignored.
    pub fn with_sinks(
        config: &ProfilerConfig,
        rules: Box<dyn Write + Send>,
        trace: Option<Box<dyn Write + Send>>,
    ) -> Self {
        Self::assemble(config, Some(RuleLog::from_writer(rules)), trace)
    }

    fn assemble(config: &ProfilerConfig, log: Option<RuleLog>, trace: Option<TraceSink>) -> Self {
        Self {
            identity: config.identity.clone(),
            self_origin: config.self_origin.clone(),
            guard: RecursionGuard::new(config.identity.clone()),
            formatter: RuleFormatter::new(config.self_origin.clone()),
            cache: DedupCache::new(),
            log: Mutex::new(log),
            trace: Mutex::new(trace),
        }
    }

    /// Observe a check made in the calling thread's ambient context.
    pub fn check_permission(&self, request: &CapabilityRequest) {
        if self.is_self_induced() {
            return;
        }
        let context = CapturedContext::current();
        self.build_rules(request, &context);
    }

    /// Observe a check made on behalf of an explicitly supplied context.
    pub fn check_permission_in(&self, request: &CapabilityRequest, context: &dyn ExecutionContext) {
        if self.is_self_induced() {
            return;
        }
        self.build_rules(request, context);
    }

    fn is_self_induced(&self) -> bool {
        let chain = callstack::probe(&self.identity, CHECK_PERMISSION);
        self.guard.is_self_induced(&chain)
    }

    fn build_rules(&self, request: &CapabilityRequest, context: &dyn ExecutionContext) {
        let _frame = callstack::enter(self.own_frame(BUILD_RULES));

        let provenances = match resolver::resolve(context) {
            Ok(provenances) => provenances,
            Err(e) => {
                tracing::warn!("skipping check for {}: {}", request, e);
                return;
            }
        };

        for provenance in &provenances {
            let Some(rule) = self.formatter.format(request, provenance) else {
                continue;
            };
            if self.cache.check_and_insert(&rule) {
                self.emit(&rule);
            }
        }
    }

    fn emit(&self, rule: &str) {
        tracing::debug!(rule, "new grant rule");

        {
            let mut log = self.log.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(writer) = log.as_mut() {
                if let Err(e) = writer.append(rule) {
                    tracing::warn!("rule log write failed, continuing without persistence: {}", e);
                    *log = None;
                }
            }
        }

        let mut trace = self.trace.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(out) = trace.as_mut() {
            let _ = writeln!(out, "{}", rule);
        }
    }

    fn own_frame(&self, operation: &str) -> Frame {
        let frame = Frame::new(self.identity.as_str(), operation);
        match &self.self_origin {
            Some(origin) => frame.with_origin(origin.as_str()),
            None => frame,
        }
    }

    /// Number of distinct rules recorded so far.
    pub fn emitted(&self) -> usize {
        self.cache.len()
    }

    /// Whether rules are still reaching the rule log.
    pub fn is_persisting(&self) -> bool {
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Flush the rule log and trace. Errors are logged.
    pub fn flush(&self) {
        let _frame = callstack::enter(self.own_frame(BUILD_RULES));
        if let Some(log) = self
            .log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_mut()
        {
            if let Err(e) = log.flush() {
                tracing::warn!("rule log flush failed: {}", e);
            }
        }
        if let Some(out) = self
            .trace
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_mut()
        {
            let _ = out.flush();
        }
    }

    /// Flush and close the rule log. Further checks are still observed but
    /// no longer persisted.
    pub fn close(&self) {
        self.flush();
        let closed = self
            .log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(log) = closed {
            tracing::info!(
                rules = log.lines_written(),
                "rule log closed"
            );
        }
    }
}

impl Drop for ProfilingEngine {
    fn drop(&mut self) {
        self.flush();
    }
}

impl fmt::Display for ProfilingEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ProfilingEngine({})", self.identity)
    }
}

impl fmt::Debug for ProfilingEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProfilingEngine")
            .field("identity", &self.identity)
            .field("self_origin", &self.self_origin)
            .field("emitted", &self.emitted())
            .finish()
    }
}
