// guard.rs: Recursion guard.
//
// Writing a rule (or anything else the engine does) may itself trigger
// capability checks on the same thread. Those must not be observed, or the
// engine would recurse into its own writer. The engine marks its rule
// building with a frame; a chain containing that frame is self-induced.

use crate::callstack::CallChain;

/// Operation name of the engine's rule-building frame.
pub const BUILD_RULES: &str = "build_rules";

/// Detects capability checks triggered by the engine itself.
#[derive(Debug, Clone)]
pub struct RecursionGuard {
    identity: String,
}

impl RecursionGuard {
    pub fn new(identity: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
        }
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// True if some frame past the probe frame is the engine's own
    /// [`BUILD_RULES`] frame.
    ///
    /// Both the component and the operation must match: another component
    /// with a `build_rules` operation, or the engine in any other
    /// operation, is ordinary code and gets observed.
    pub fn is_self_induced(&self, chain: &CallChain) -> bool {
        chain
            .frames()
            .iter()
            .skip(1)
            .any(|frame| frame.component == self.identity && frame.operation == BUILD_RULES)
    }
}
