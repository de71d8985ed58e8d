//! Error types.

use crate::point::Point;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Faults reported by a [`Grammar`](crate::Grammar) collaborator while tokenizing a line.
pub enum GrammarError {
    #[error("grammar fault: {0}")]
    /// The grammar could not tokenize the line.
    Fault(String),

    #[error("tokenizing exceeded iteration limit at column {column} (possible zero-width loop)")]
    /// The grammar gave up on a runaway zero-width match loop.
    IterationLimit {
        /// Column reached when the limit tripped.
        column: usize,
    },

    #[error("prior line state was produced by a different grammar")]
    /// The continuation state passed in could not be interpreted.
    ForeignState,
}

impl GrammarError {
    /// Shorthand for [`GrammarError::Fault`].
    pub fn fault(message: impl Into<String>) -> Self {
        Self::Fault(message.into())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Errors produced by [`EditableBuffer`](crate::EditableBuffer) implementations.
pub enum BufferError {
    #[error("position {0} is outside the buffer")]
    /// A point did not address an existing row.
    OutOfBounds(Point),
}
