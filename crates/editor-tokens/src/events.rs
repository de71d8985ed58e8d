//! Change notifications emitted by a tokenized buffer.

use crate::point::Range;

/// Something observable happened to a tokenized buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenizeEvent {
    /// Rows in `range` were re-tokenized and their tokens may differ. Column components are
    /// always zero: consumers redraw whole rows.
    DidInvalidateRange(Range),
    /// The buffer became fully tokenized for the first time since the last grammar change.
    DidTokenize,
    /// The grammar was replaced.
    DidChangeGrammar {
        /// Root scope name of the new grammar.
        scope_name: String,
    },
}

/// Event callback function type
pub type TokenizeEventCallback = Box<dyn FnMut(&TokenizeEvent) + Send>;

/// Handle returned by [`EventEmitter::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Ordered list of subscribers.
#[derive(Default)]
pub struct EventEmitter {
    next_id: u64,
    callbacks: Vec<(SubscriptionId, TokenizeEventCallback)>,
}

impl EventEmitter {
    /// Create an emitter with no subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback` for every event.
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&TokenizeEvent) + Send + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.callbacks.push((id, Box::new(callback)));
        id
    }

    /// Remove a subscriber. Returns whether it was registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.callbacks.len();
        self.callbacks.retain(|(existing, _)| *existing != id);
        self.callbacks.len() != before
    }

    /// Drop every subscriber.
    pub fn clear(&mut self) {
        self.callbacks.clear();
    }

    /// Number of subscribers.
    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    /// Whether nobody is subscribed.
    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    /// Notify all callbacks, in subscription order.
    pub fn emit(&mut self, event: &TokenizeEvent) {
        for (_, callback) in &mut self.callbacks {
            callback(event);
        }
    }
}

impl std::fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventEmitter")
            .field("subscribers", &self.callbacks.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_emit_in_subscription_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut emitter = EventEmitter::new();
        for tag in ["first", "second"] {
            let log = log.clone();
            emitter.subscribe(move |_| log.lock().unwrap().push(tag));
        }
        emitter.emit(&TokenizeEvent::DidTokenize);
        assert_eq!(*log.lock().unwrap(), vec!["first", "second"]);
    }

    #[test]
    fn test_unsubscribe() {
        let count = Arc::new(Mutex::new(0));
        let mut emitter = EventEmitter::new();
        let counter = count.clone();
        let id = emitter.subscribe(move |_| *counter.lock().unwrap() += 1);

        emitter.emit(&TokenizeEvent::DidTokenize);
        assert!(emitter.unsubscribe(id));
        assert!(!emitter.unsubscribe(id));
        emitter.emit(&TokenizeEvent::DidTokenize);

        assert_eq!(*count.lock().unwrap(), 1);
        assert!(emitter.is_empty());
    }
}
