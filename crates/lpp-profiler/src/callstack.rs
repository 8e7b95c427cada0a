// callstack.rs: Per-thread shadow call stack.
//
// Instrumented code announces itself with `enter(frame)` at the boundaries
// it wants attributed (module entry points, plugin calls). The engine
// does the same around its own rule building. A probe is a snapshot of
// the current thread's frames, innermost first, with the probing frame
// itself at index 0.

use std::cell::RefCell;

/// One call stack participant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Code identity, e.g. a module path or type name.
    pub component: String,
    /// Operation being executed inside the component.
    pub operation: String,
    /// Where the component's code was loaded from, if known.
    pub origin: Option<String>,
}

impl Frame {
    pub fn new(component: impl Into<String>, operation: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            operation: operation.into(),
            origin: None,
        }
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }
}

/// A captured call chain, innermost frame first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallChain {
    frames: Vec<Frame>,
}

impl CallChain {
    pub fn new(frames: Vec<Frame>) -> Self {
        Self { frames }
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

thread_local! {
    // Outermost first; snapshots reverse it.
    static STACK: RefCell<Vec<Frame>> = const { RefCell::new(Vec::new()) };
}

/// Pops the frame pushed by [`enter`] when dropped.
#[derive(Debug)]
#[must_use = "the frame is popped as soon as the guard is dropped"]
pub struct FrameGuard {
    depth: usize,
}

impl Drop for FrameGuard {
    fn drop(&mut self) {
        STACK.with(|stack| stack.borrow_mut().truncate(self.depth));
    }
}

/// Push `frame` onto the current thread's stack until the guard drops.
pub fn enter(frame: Frame) -> FrameGuard {
    STACK.with(|stack| {
        let mut stack = stack.borrow_mut();
        let depth = stack.len();
        stack.push(frame);
        FrameGuard { depth }
    })
}

/// Current thread's frames, innermost first.
pub fn snapshot() -> CallChain {
    STACK.with(|stack| CallChain::new(stack.borrow().iter().rev().cloned().collect()))
}

/// Snapshot with a synthetic probe frame for the caller at index 0.
pub fn probe(component: &str, operation: &str) -> CallChain {
    let mut frames = vec![Frame::new(component, operation)];
    STACK.with(|stack| frames.extend(stack.borrow().iter().rev().cloned()));
    CallChain::new(frames)
}

/// Number of frames on the current thread's stack.
pub fn depth() -> usize {
    STACK.with(|stack| stack.borrow().len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_is_innermost_first() {
        let _outer = enter(Frame::new("app", "main"));
        let _inner = enter(Frame::new("app::io", "open"));
        let chain = snapshot();
        assert_eq!(chain.frames()[0].component, "app::io");
        assert_eq!(chain.frames()[1].component, "app");
    }

    #[test]
    fn guard_pops_on_drop() {
        let before = depth();
        {
            let _g = enter(Frame::new("a", "b"));
            assert_eq!(depth(), before + 1);
        }
        assert_eq!(depth(), before);
    }

    #[test]
    fn out_of_order_drop_truncates_to_entry_depth() {
        let before = depth();
        let outer = enter(Frame::new("a", "outer"));
        let inner = enter(Frame::new("a", "inner"));
        drop(outer);
        assert_eq!(depth(), before);
        drop(inner);
        assert_eq!(depth(), before);
    }

    #[test]
    fn probe_frame_is_at_index_zero() {
        let _g = enter(Frame::new("app", "run").with_origin("file:/app.jar"));
        let chain = probe("engine", "check_permission");
        assert_eq!(chain.len(), 2);
        assert_eq!(chain.frames()[0].operation, "check_permission");
        assert_eq!(chain.frames()[1].origin.as_deref(), Some("file:/app.jar"));
    }

    #[test]
    fn stacks_are_per_thread() {
        let _g = enter(Frame::new("main-thread", "work"));
        let other = std::thread::spawn(|| snapshot().len()).join().unwrap();
        assert_eq!(other, 0);
    }
}
