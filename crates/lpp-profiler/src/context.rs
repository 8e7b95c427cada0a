// context.rs: Execution contexts supplied by the surrounding runtime.
//
// A context answers one question: which code units take part in the
// current call chain, and where was each loaded from. The runtime either
// lets the engine read the ambient shadow stack, or hands over a context
// it captured earlier (e.g. when work moves to a pool thread).

use crate::callstack;
use crate::error::ResolutionError;

/// A code unit participating in a call chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeDomain {
    /// Load location of the code. `None` for code with no origin, such as
    /// the platform itself.
    pub origin: Option<String>,
}

impl CodeDomain {
    pub fn located(origin: impl Into<String>) -> Self {
        Self {
            origin: Some(origin.into()),
        }
    }

    pub fn unlocated() -> Self {
        Self { origin: None }
    }
}

/// Source of the code domains for one capability check.
pub trait ExecutionContext {
    /// Domains in the call chain, innermost first.
    fn code_domains(&self) -> Result<Vec<CodeDomain>, ResolutionError>;
}

/// An owned list of code domains. Can be sent to another thread and
/// supplied there as an explicit context.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedContext {
    domains: Vec<CodeDomain>,
}

impl CapturedContext {
    pub fn new(domains: Vec<CodeDomain>) -> Self {
        Self { domains }
    }

    /// Capture the calling thread's shadow stack.
    pub fn current() -> Self {
        let domains = callstack::snapshot()
            .frames()
            .iter()
            .map(|frame| CodeDomain {
                origin: frame.origin.clone(),
            })
            .collect();
        Self { domains }
    }

    pub fn domains(&self) -> &[CodeDomain] {
        &self.domains
    }
}

impl ExecutionContext for CapturedContext {
    fn code_domains(&self) -> Result<Vec<CodeDomain>, ResolutionError> {
        Ok(self.domains.clone())
    }
}

impl<T: ExecutionContext + ?Sized> ExecutionContext for &T {
    fn code_domains(&self) -> Result<Vec<CodeDomain>, ResolutionError> {
        (**self).code_domains()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callstack::{enter, Frame};

    #[test]
    fn current_reads_shadow_stack_origins() {
        let _a = enter(Frame::new("app", "main").with_origin("file:/app.jar"));
        let _b = enter(Frame::new("runtime", "dispatch"));
        let _c = enter(Frame::new("plugin", "run").with_origin("file:/plugin.jar"));

        let ctx = CapturedContext::current();
        assert_eq!(
            ctx.domains(),
            &[
                CodeDomain::located("file:/plugin.jar"),
                CodeDomain::unlocated(),
                CodeDomain::located("file:/app.jar"),
            ]
        );
    }

    #[test]
    fn captured_context_moves_across_threads() {
        let ctx = {
            let _a = enter(Frame::new("app", "submit").with_origin("file:/app.jar"));
            CapturedContext::current()
        };
        let domains = std::thread::spawn(move || ctx.code_domains().unwrap())
            .join()
            .unwrap();
        assert_eq!(domains, vec![CodeDomain::located("file:/app.jar")]);
    }
}
