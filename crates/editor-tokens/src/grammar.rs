//! The grammar collaborator interface.
//!
//! The engine treats pattern matching as an opaque function: given one line of text and the
//! continuation state left by the previous line, a [`Grammar`] returns the line's tags and the
//! state to carry into the next line.

use crate::error::GrammarError;
use crate::state::LineState;
use crate::tag::{ScopeId, Tag};
use std::fmt;

/// Output of [`Grammar::tokenize_line`].
#[derive(Debug, Clone, PartialEq)]
pub struct LineTokens {
    /// The line's tag stream.
    pub tags: Vec<Tag>,
    /// Continuation state at the end of the line.
    pub state: LineState,
}

/// A line-oriented tokenizer.
pub trait Grammar: fmt::Debug + Send + Sync {
    /// Root scope name (e.g. `source.js`).
    fn scope_name(&self) -> &str;

    /// Scope id of the root scope.
    fn root_scope_id(&self) -> ScopeId;

    /// Resolve a scope id to its dotted name.
    fn scope_name_for_id(&self, id: ScopeId) -> Option<&str>;

    /// Tokenize one line (without its terminator).
    ///
    /// `prior` is the state returned for the previous row, or `None` when starting fresh.
    fn tokenize_line(
        &self,
        text: &str,
        prior: Option<&LineState>,
        is_first_line: bool,
    ) -> Result<LineTokens, GrammarError>;

    /// A null grammar never tokenizes; buffers using it stay in placeholder mode.
    fn is_null(&self) -> bool {
        false
    }

    /// Bumped whenever the grammar's rules change (for example when an included grammar
    /// becomes available). Buffers re-tokenize when they observe a new value.
    fn generation(&self) -> u64 {
        0
    }
}

/// Plain-text grammar used when no real grammar is available.
#[derive(Debug, Clone)]
pub struct NullGrammar {
    scope_name: String,
}

impl NullGrammar {
    /// Scope id of the null grammar's only scope.
    pub const ROOT: ScopeId = ScopeId(1);

    /// Create a null grammar with the conventional `text.plain.null-grammar` scope.
    pub fn new() -> Self {
        Self {
            scope_name: "text.plain.null-grammar".to_string(),
        }
    }
}

impl Default for NullGrammar {
    fn default() -> Self {
        Self::new()
    }
}

impl Grammar for NullGrammar {
    fn scope_name(&self) -> &str {
        &self.scope_name
    }

    fn root_scope_id(&self) -> ScopeId {
        Self::ROOT
    }

    fn scope_name_for_id(&self, id: ScopeId) -> Option<&str> {
        (id == Self::ROOT).then_some(self.scope_name.as_str())
    }

    fn tokenize_line(
        &self,
        text: &str,
        _prior: Option<&LineState>,
        _is_first_line: bool,
    ) -> Result<LineTokens, GrammarError> {
        Ok(LineTokens {
            tags: placeholder_tags(Self::ROOT, text.chars().count()),
            state: LineState::new(()),
        })
    }

    fn is_null(&self) -> bool {
        true
    }
}

/// Tags for a line that is one root-scope token.
pub fn placeholder_tags(root: ScopeId, len: usize) -> Vec<Tag> {
    vec![Tag::Open(root), Tag::Token(len), Tag::Close(root)]
}
