//! Token-by-token cursor over a single tokenized line.

use crate::line::{Token, TokenizedLine};
use crate::tag::{ScopeId, Tag};

/// Steps through a line's tokens while maintaining the scope stack.
///
/// Lifecycle: unstarted → positioned at a token → exhausted. Each [`next`](Self::next) call
/// reports the scopes opened ([`scope_starts`](Self::scope_starts)) and closed
/// ([`scope_ends`](Self::scope_ends)) since the previous token. The first step also reports
/// the scopes inherited from previous rows as starts.
#[derive(Debug, Clone)]
pub struct TokenIterator<'a> {
    line: &'a TokenizedLine,
    index: Option<usize>,
    scopes: Vec<ScopeId>,
    scope_starts: Vec<ScopeId>,
    scope_ends: Vec<ScopeId>,
    start_column: usize,
    end_column: usize,
    start_byte: usize,
    end_byte: usize,
}

impl<'a> TokenIterator<'a> {
    /// Create an unstarted iterator over `line`.
    pub fn new(line: &'a TokenizedLine) -> Self {
        let mut iter = Self {
            line,
            index: None,
            scopes: Vec::new(),
            scope_starts: Vec::new(),
            scope_ends: Vec::new(),
            start_column: 0,
            end_column: 0,
            start_byte: 0,
            end_byte: 0,
        };
        iter.reset(line);
        iter
    }

    /// Rewind onto `line`, seeding the scope stack from its open scopes.
    pub fn reset(&mut self, line: &'a TokenizedLine) -> &mut Self {
        self.line = line;
        self.index = None;
        self.scopes = line.open_scopes().to_vec();
        self.scope_starts = self.scopes.clone();
        self.scope_ends.clear();
        self.start_column = 0;
        self.end_column = 0;
        self.start_byte = 0;
        self.end_byte = 0;
        self
    }

    /// Advance to the next token. Returns `false` once the tag stream is exhausted.
    ///
    /// A close that matches a scope opened earlier in the same step cancels it: the scope
    /// never covered a token, so neither its start nor its end is reported.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> bool {
        let tags = self.line.tags();
        if self.index == Some(tags.len()) {
            return false;
        }

        let mut index = match self.index {
            Some(index) => {
                self.start_column = self.end_column;
                self.start_byte = self.end_byte;
                self.scope_starts.clear();
                self.scope_ends.clear();
                index + 1
            }
            None => 0,
        };

        while index < tags.len() {
            match tags[index] {
                Tag::Open(id) => {
                    self.scope_starts.push(id);
                    self.scopes.push(id);
                }
                Tag::Close(id) => {
                    if self.scope_starts.last() == Some(&id) {
                        self.scope_starts.pop();
                    } else {
                        self.scope_ends.push(id);
                    }
                    self.scopes.pop();
                }
                Tag::Token(len) => {
                    self.index = Some(index);
                    self.end_column = self.start_column + len;
                    self.end_byte = advance_chars(self.line.text(), self.start_byte, len);
                    return true;
                }
            }
            index += 1;
        }

        self.index = Some(tags.len());
        false
    }

    /// Full scope stack for the current token (ids, outermost first).
    pub fn scope_ids(&self) -> &[ScopeId] {
        &self.scopes
    }

    /// Full scope stack for the current token (names, outermost first).
    pub fn scopes(&self) -> Vec<&'a str> {
        self.names(&self.scopes)
    }

    /// Scopes opened in this step.
    pub fn scope_starts(&self) -> Vec<&'a str> {
        self.names(&self.scope_starts)
    }

    /// Scopes closed in this step (innermost first).
    pub fn scope_ends(&self) -> Vec<&'a str> {
        self.names(&self.scope_ends)
    }

    /// Ids of the scopes opened in this step.
    pub fn scope_start_ids(&self) -> &[ScopeId] {
        &self.scope_starts
    }

    /// Ids of the scopes closed in this step.
    pub fn scope_end_ids(&self) -> &[ScopeId] {
        &self.scope_ends
    }

    /// Text of the current token.
    pub fn text(&self) -> &'a str {
        let text = self.line.text();
        let end = self.end_byte.min(text.len());
        let start = self.start_byte.min(end);
        &text[start..end]
    }

    /// Start column of the current token.
    pub fn buffer_start(&self) -> usize {
        self.start_column
    }

    /// End column (exclusive) of the current token.
    pub fn buffer_end(&self) -> usize {
        self.end_column
    }

    /// The current token as an owned value.
    pub fn token(&self) -> Token {
        Token {
            value: self.text().to_string(),
            scopes: self.scopes().into_iter().map(str::to_string).collect(),
        }
    }

    fn names(&self, ids: &[ScopeId]) -> Vec<&'a str> {
        let grammar = self.line.grammar();
        ids.iter()
            .filter_map(|id| grammar.scope_name_for_id(*id))
            .collect()
    }
}

/// Byte offset reached after skipping `chars` characters from `from_byte`.
fn advance_chars(text: &str, from_byte: usize, chars: usize) -> usize {
    if from_byte >= text.len() {
        return text.len();
    }
    match text[from_byte..].char_indices().nth(chars) {
        Some((offset, _)) => from_byte + offset,
        None => text.len(),
    }
}
