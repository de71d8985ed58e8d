//! Opaque end-of-line continuation state.
//!
//! A line-oriented lexer carries some state from the end of one line into the start of the
//! next (a rule stack, a "still inside a block comment" flag, ...). The engine never looks
//! inside it: it only stores it, hands it back to the grammar for the next row, and compares two
//! states for equality to detect fixed points.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Capability set of a continuation state: equality plus downcasting for its owner.
///
/// Implemented automatically for every `PartialEq + Debug + Send + Sync + 'static` type.
pub trait EndState: fmt::Debug + Send + Sync + 'static {
    /// Whether `other` denotes the same continuation as `self`.
    ///
    /// States of different concrete types are never equal.
    fn equals(&self, other: &dyn EndState) -> bool;

    /// Access the concrete state (used by the grammar that produced it).
    fn as_any(&self) -> &dyn Any;
}

impl<T> EndState for T
where
    T: PartialEq + fmt::Debug + Send + Sync + 'static,
{
    fn equals(&self, other: &dyn EndState) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|other| other == self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A shared handle to an [`EndState`].
///
/// Cloning is cheap; equality delegates to [`EndState::equals`].
#[derive(Clone)]
pub struct LineState(Arc<dyn EndState>);

impl LineState {
    /// Wrap a concrete state.
    pub fn new<S: EndState>(state: S) -> Self {
        Self(Arc::new(state))
    }

    /// Borrow the concrete state if it is a `T`.
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.0.as_any().downcast_ref::<T>()
    }
}

impl PartialEq for LineState {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.0.equals(other.0.as_ref())
    }
}

impl fmt::Debug for LineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("LineState").field(&self.0).finish()
    }
}
