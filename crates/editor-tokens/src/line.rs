//! Tokenized line values.

use crate::grammar::{Grammar, placeholder_tags};
use crate::line_ending::LineEnding;
use crate::state::LineState;
use crate::tag::{ScopeId, Tag};
use crate::token_iterator::TokenIterator;
use std::fmt;
use std::sync::Arc;

/// A token with its text and full scope stack (outermost first).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Token text.
    pub value: String,
    /// Scope names enclosing the token.
    pub scopes: Vec<String>,
}

/// The tokenization of a single row.
///
/// Lines are immutable: the engine replaces them wholesale when a row is re-tokenized.
#[derive(Clone)]
pub struct TokenizedLine {
    text: String,
    tags: Vec<Tag>,
    open_scopes: Vec<ScopeId>,
    end_state: Option<LineState>,
    line_ending: Option<LineEnding>,
    grammar: Arc<dyn Grammar>,
}

impl TokenizedLine {
    /// Assemble a tokenized line.
    ///
    /// `open_scopes` are the scopes already open when the row begins; `end_state` is the
    /// grammar's continuation state after the row (`None` for placeholders).
    pub fn new(
        text: impl Into<String>,
        tags: Vec<Tag>,
        open_scopes: Vec<ScopeId>,
        end_state: Option<LineState>,
        line_ending: Option<LineEnding>,
        grammar: Arc<dyn Grammar>,
    ) -> Self {
        Self {
            text: text.into(),
            tags,
            open_scopes,
            end_state,
            line_ending,
            grammar,
        }
    }

    /// A single root-scope token covering the whole row, with no inherited scopes and no end
    /// state.
    pub fn placeholder(
        text: impl Into<String>,
        line_ending: Option<LineEnding>,
        grammar: Arc<dyn Grammar>,
    ) -> Self {
        let text = text.into();
        let tags = placeholder_tags(grammar.root_scope_id(), text.chars().count());
        Self::new(text, tags, Vec::new(), None, line_ending, grammar)
    }

    /// Row text without its terminator.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The tag stream.
    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    /// Scopes open at the start of the row, outermost first.
    pub fn open_scopes(&self) -> &[ScopeId] {
        &self.open_scopes
    }

    /// Continuation state after this row.
    pub fn end_state(&self) -> Option<&LineState> {
        self.end_state.as_ref()
    }

    /// The row's terminator (`None` for the last row).
    pub fn line_ending(&self) -> Option<LineEnding> {
        self.line_ending
    }

    /// The grammar that produced the tags.
    pub fn grammar(&self) -> &Arc<dyn Grammar> {
        &self.grammar
    }

    /// Row length in characters.
    pub fn len_chars(&self) -> usize {
        self.text.chars().count()
    }

    /// A fresh cursor over this line's tokens.
    pub fn token_iterator(&self) -> TokenIterator<'_> {
        TokenIterator::new(self)
    }

    /// Expand the tag stream into tokens.
    pub fn tokens(&self) -> Vec<Token> {
        let mut iter = self.token_iterator();
        let mut tokens = Vec::new();
        while iter.next() {
            tokens.push(iter.token());
        }
        tokens
    }

    /// The token containing `column`, or the last token when `column` is past the end.
    pub fn token_at_column(&self, column: usize) -> Option<Token> {
        let mut iter = self.token_iterator();
        let mut last = None;
        while iter.next() {
            let token = iter.token();
            if iter.buffer_end() > column {
                return Some(token);
            }
            last = Some(token);
        }
        last
    }

    /// Start column of the token containing `column`.
    pub fn token_start_column_for_column(&self, column: usize) -> usize {
        let mut start = 0;
        for len in self.tags.iter().filter_map(|tag| tag.token_len()) {
            let next = start + len;
            if next > column {
                break;
            }
            start = next;
        }
        start
    }

    /// Whether this row reads as a comment line.
    ///
    /// True when a comment scope is inherited from a previous row, or when the first
    /// non-whitespace token is inside a comment scope.
    pub fn is_comment(&self) -> bool {
        let is_comment_scope = |id: &ScopeId| {
            self.grammar
                .scope_name_for_id(*id)
                .is_some_and(is_comment_scope_name)
        };
        if self.open_scopes.iter().any(is_comment_scope) {
            return true;
        }

        let mut iter = self.token_iterator();
        while iter.next() {
            if iter.text().trim().is_empty() {
                continue;
            }
            return iter.scope_ids().iter().any(is_comment_scope);
        }
        false
    }
}

fn is_comment_scope_name(name: &str) -> bool {
    name == "comment" || name.starts_with("comment.")
}

impl fmt::Debug for TokenizedLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenizedLine")
            .field("text", &self.text)
            .field("tags", &self.tags)
            .field("open_scopes", &self.open_scopes)
            .field("end_state", &self.end_state)
            .field("line_ending", &self.line_ending)
            .field("grammar", &self.grammar.scope_name())
            .finish()
    }
}

impl PartialEq for TokenizedLine {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
            && self.tags == other.tags
            && self.open_scopes == other.open_scopes
            && self.end_state == other.end_state
            && self.line_ending == other.line_ending
    }
}
