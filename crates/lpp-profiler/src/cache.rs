// cache.rs: Append-only set of rules already written.
//
// Caching never skips a check, only the write: every capability check is
// still observed, but a rule line reaches the log at most once per run.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

/// Concurrency-safe set of emitted rule lines. Never evicts.
#[derive(Debug, Default)]
pub struct DedupCache {
    seen: Mutex<HashSet<String>>,
}

impl DedupCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `rule`, returning true if it was not present.
    ///
    /// Check and insert happen under one lock acquisition, so of several
    /// threads racing on the same new rule exactly one gets `true`.
    pub fn check_and_insert(&self, rule: &str) -> bool {
        let mut seen = self.seen.lock().unwrap_or_else(PoisonError::into_inner);
        if seen.contains(rule) {
            return false;
        }
        seen.insert(rule.to_string())
    }

    pub fn contains(&self, rule: &str) -> bool {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(rule)
    }

    pub fn len(&self) -> usize {
        self.seen.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn second_insert_is_rejected() {
        let cache = DedupCache::new();
        assert!(cache.check_and_insert("rule-a"));
        assert!(!cache.check_and_insert("rule-a"));
        assert!(cache.check_and_insert("rule-b"));
        assert_eq!(cache.len(), 2);
        assert!(cache.contains("rule-a"));
    }

    #[test]
    fn racing_threads_insert_once() {
        let cache = Arc::new(DedupCache::new());
        let winners = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let winners = Arc::clone(&winners);
                std::thread::spawn(move || {
                    for i in 0..50 {
                        if cache.check_and_insert(&format!("rule-{}", i)) {
                            winners.fetch_add(1, Ordering::SeqCst);
                        }
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(winners.load(Ordering::SeqCst), 50);
        assert_eq!(cache.len(), 50);
    }
}
