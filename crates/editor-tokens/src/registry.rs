//! Buffer identities and per-buffer side tables.
//!
//! Consumers that keep derived data per buffer (render caches, highlight snapshots, ...) hold
//! it in a [`BufferRegistry`] keyed by [`BufferId`] and detach it explicitly when they stop
//! observing the buffer. The registry never owns or references the buffer itself.

use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_BUFFER_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a tokenized buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(transparent)]
pub struct BufferId(pub u64);

impl BufferId {
    /// Allocate a fresh id.
    pub fn next() -> Self {
        Self(NEXT_BUFFER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for BufferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "buffer-{}", self.0)
    }
}

/// A side table of `T` keyed by buffer id.
#[derive(Debug)]
pub struct BufferRegistry<T> {
    entries: HashMap<BufferId, T>,
}

impl<T> Default for BufferRegistry<T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<T> BufferRegistry<T> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach `value` to `id`, returning the value it replaces.
    pub fn attach(&mut self, id: BufferId, value: T) -> Option<T> {
        self.entries.insert(id, value)
    }

    /// Get the entry for `id`, creating it with `init` if missing.
    pub fn get_or_attach_with(&mut self, id: BufferId, init: impl FnOnce() -> T) -> &mut T {
        self.entries.entry(id).or_insert_with(init)
    }

    /// Borrow the entry for `id`.
    pub fn get(&self, id: BufferId) -> Option<&T> {
        self.entries.get(&id)
    }

    /// Mutably borrow the entry for `id`.
    pub fn get_mut(&mut self, id: BufferId) -> Option<&mut T> {
        self.entries.get_mut(&id)
    }

    /// Remove and return the entry for `id`. The value is dropped by the caller, which makes
    /// teardown deterministic.
    pub fn detach(&mut self, id: BufferId) -> Option<T> {
        self.entries.remove(&id)
    }

    /// Whether `id` has an entry.
    pub fn contains(&self, id: BufferId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Number of attached buffers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no buffers are attached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Detach every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_ids_are_unique() {
        let a = BufferId::next();
        let b = BufferId::next();
        assert_ne!(a, b);
    }

    #[test]
    fn test_attach_detach() {
        let mut registry = BufferRegistry::new();
        let id = BufferId(7);
        assert!(registry.attach(id, "first").is_none());
        assert_eq!(registry.attach(id, "second"), Some("first"));
        assert_eq!(registry.get(id), Some(&"second"));
        assert_eq!(registry.detach(id), Some("second"));
        assert!(!registry.contains(id));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_detach_drops_the_value() {
        let shared = Arc::new(());
        let mut registry = BufferRegistry::new();
        registry.attach(BufferId(1), shared.clone());
        assert_eq!(Arc::strong_count(&shared), 2);
        drop(registry.detach(BufferId(1)));
        assert_eq!(Arc::strong_count(&shared), 1);
    }

    #[test]
    fn test_get_or_attach_with() {
        let mut registry: BufferRegistry<Vec<u32>> = BufferRegistry::new();
        registry.get_or_attach_with(BufferId(3), Vec::new).push(1);
        registry.get_or_attach_with(BufferId(3), Vec::new).push(2);
        assert_eq!(registry.get(BufferId(3)), Some(&vec![1, 2]));
    }
}
