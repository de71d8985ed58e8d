//! The per-line tag stream.
//!
//! A tokenized line is encoded as a flat sequence of [`Tag`]s: scope boundary events
//! interleaved with token lengths. Replaying the tags of a line against the scopes that were
//! open when the line began yields the scope stack for every token.

use std::fmt;

/// Identifier of a scope, allocated by the grammar that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(pub u32);

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One element of a line's tag stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    /// Consume this many characters as one token under the current scope stack.
    Token(usize),
    /// Push a scope.
    Open(ScopeId),
    /// Pop a scope (must match an open scope).
    Close(ScopeId),
}

impl Tag {
    /// Token length, if this is a token.
    pub fn token_len(self) -> Option<usize> {
        match self {
            Self::Token(len) => Some(len),
            _ => None,
        }
    }

    /// Whether this tag is a scope boundary event.
    pub fn is_boundary(self) -> bool {
        !matches!(self, Self::Token(_))
    }
}

/// Result of replaying a tag stream over a starting scope stack.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeReplay {
    /// Scopes still open after the last tag.
    pub scopes: Vec<ScopeId>,
    /// Close tags that matched nothing on the stack, in encounter order.
    pub unmatched: Vec<ScopeId>,
}

/// Replay `tags` starting from `starting_scopes` and return the scopes left open.
///
/// A close pops until it finds its matching open. A close that exhausts the stack without a
/// match is recorded in [`ScopeReplay::unmatched`]; popping stops there and the replay goes on
/// with the remaining tags.
pub fn scopes_from_tags(starting_scopes: &[ScopeId], tags: &[Tag]) -> ScopeReplay {
    let mut scopes = starting_scopes.to_vec();
    let mut unmatched = Vec::new();

    for tag in tags {
        match *tag {
            Tag::Token(_) => {}
            Tag::Open(id) => scopes.push(id),
            Tag::Close(id) => loop {
                if scopes.pop() == Some(id) {
                    break;
                }
                if scopes.is_empty() {
                    unmatched.push(id);
                    break;
                }
            },
        }
    }

    ScopeReplay { scopes, unmatched }
}

/// Sum of all token lengths in `tags`.
pub fn text_len(tags: &[Tag]) -> usize {
    tags.iter().filter_map(|tag| tag.token_len()).sum()
}
