//! The tokenization orchestrator.
//!
//! [`TokenizedBuffer`] owns the row cache and the invalid-row queue for one buffer. Edits are
//! reconciled synchronously within a bounded window ([`buffer_did_change`]); the rest of the
//! work is drained by cooperative ticks that the host runs from its idle queue
//! ([`run_pending_chunk`]).
//!
//! # Scheduling
//!
//! The engine never spawns threads or timers. Whenever work is queued and the buffer is
//! visible, a single "pending chunk" flag is raised; further requests while it is raised are
//! coalesced. The host polls [`has_pending_chunk`] and calls [`run_pending_chunk`], which
//! tokenizes at most `chunk_size` rows and raises the flag again if rows remain.
//!
//! ```rust
//! use editor_tokens::{NullGrammar, RopeBuffer, TokenizedBuffer, TokenizerConfig};
//! use std::sync::Arc;
//!
//! let buffer = RopeBuffer::from_text("hello\nworld");
//! let mut tokenized =
//!     TokenizedBuffer::new(buffer, Some(Arc::new(NullGrammar::new())), TokenizerConfig::default());
//! tokenized.set_visible(true);
//! while tokenized.run_pending_chunk() {}
//! assert!(tokenized.is_fully_tokenized());
//! ```
//!
//! [`buffer_did_change`]: TokenizedBuffer::buffer_did_change
//! [`run_pending_chunk`]: TokenizedBuffer::run_pending_chunk
//! [`has_pending_chunk`]: TokenizedBuffer::has_pending_chunk

use crate::buffer::{BufferChange, EditableBuffer, TextBuffer};
use crate::buffer_iterator::TokenizedBufferIterator;
use crate::class_names::ClassNameCache;
use crate::config::TokenizerConfig;
use crate::diagnostics::{DiagnosticHandler, TokenizeDiagnostic};
use crate::error::BufferError;
use crate::events::{EventEmitter, SubscriptionId, TokenizeEvent};
use crate::grammar::{Grammar, LineTokens, NullGrammar};
use crate::invalidation::InvalidRows;
use crate::line::{Token, TokenizedLine};
use crate::point::{Point, Range};
use crate::registry::BufferId;
use crate::selector::{ScopeDescriptor, selector_matches_any_scope, selector_matches_scope};
use crate::state::LineState;
use crate::tag::{ScopeId, Tag, scopes_from_tags};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace, warn};

type CachedLine = Option<Arc<TokenizedLine>>;

/// Incrementally maintained tokenization of a [`TextBuffer`].
pub struct TokenizedBuffer<B: TextBuffer> {
    id: BufferId,
    buffer: B,
    grammar: Arc<dyn Grammar>,
    grammar_generation: u64,
    root_scope_descriptor: ScopeDescriptor,
    chunk_size: usize,
    large_file_mode: bool,
    tokenized_lines: Vec<CachedLine>,
    invalid_rows: InvalidRows,
    fully_tokenized: bool,
    visible: bool,
    alive: bool,
    pending_chunk: bool,
    class_names: ClassNameCache,
    emitter: EventEmitter,
    diagnostic_handler: Option<DiagnosticHandler>,
}

impl<B: TextBuffer> TokenizedBuffer<B> {
    /// Create a tokenized view of `buffer`.
    ///
    /// A missing grammar means [`NullGrammar`]. The buffer starts invisible: nothing is
    /// tokenized until [`set_visible(true)`](Self::set_visible).
    pub fn new(buffer: B, grammar: Option<Arc<dyn Grammar>>, config: TokenizerConfig) -> Self {
        let grammar = grammar.unwrap_or_else(|| Arc::new(NullGrammar::new()));
        let large_file_mode = config.is_large_file(buffer.byte_len());
        let id = config.buffer_id.unwrap_or_else(BufferId::next);
        debug!(
            buffer = %id,
            grammar = grammar.scope_name(),
            large_file_mode,
            "creating tokenized buffer"
        );

        let mut tokenized = Self {
            id,
            buffer,
            grammar_generation: grammar.generation(),
            root_scope_descriptor: ScopeDescriptor::new([grammar.scope_name()]),
            grammar,
            chunk_size: config.effective_chunk_size(),
            large_file_mode,
            tokenized_lines: Vec::new(),
            invalid_rows: InvalidRows::new(),
            fully_tokenized: false,
            visible: false,
            alive: true,
            pending_chunk: false,
            class_names: ClassNameCache::new(),
            emitter: EventEmitter::new(),
            diagnostic_handler: None,
        };
        tokenized.retokenize_lines();
        tokenized
    }

    /// Identity of this tokenized buffer.
    pub fn id(&self) -> BufferId {
        self.id
    }

    /// The underlying buffer.
    pub fn buffer(&self) -> &B {
        &self.buffer
    }

    /// Mutable access to the underlying buffer.
    ///
    /// Every change made through this handle must be reported with
    /// [`buffer_did_change`](Self::buffer_did_change) before the next read or tick.
    pub fn buffer_mut(&mut self) -> &mut B {
        &mut self.buffer
    }

    /// The current grammar.
    pub fn grammar(&self) -> &Arc<dyn Grammar> {
        &self.grammar
    }

    /// Rows tokenized per tick.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Whether the buffer is handled in large-file (placeholder only) mode.
    pub fn is_large_file_mode(&self) -> bool {
        self.large_file_mode
    }

    /// Descriptor containing only the grammar's root scope.
    pub fn root_scope_descriptor(&self) -> &ScopeDescriptor {
        &self.root_scope_descriptor
    }

    // ---------------------------------------------------------------------
    // Lifecycle
    // ---------------------------------------------------------------------

    /// Tear down: drop the cache, the queue and all subscriptions. Idempotent.
    pub fn destroy(&mut self) {
        if !self.alive {
            return;
        }
        debug!(buffer = %self.id, "destroying tokenized buffer");
        self.alive = false;
        self.pending_chunk = false;
        self.tokenized_lines.clear();
        self.invalid_rows.clear();
        self.emitter.clear();
        self.diagnostic_handler = None;
    }

    /// Whether [`destroy`](Self::destroy) has not been called.
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    // ---------------------------------------------------------------------
    // Grammar
    // ---------------------------------------------------------------------

    /// Replace the grammar and re-tokenize from scratch. Passing the grammar already in use
    /// does nothing.
    pub fn set_grammar(&mut self, grammar: Arc<dyn Grammar>) {
        if Arc::ptr_eq(&self.grammar, &grammar) {
            return;
        }
        debug!(
            buffer = %self.id,
            from = self.grammar.scope_name(),
            to = grammar.scope_name(),
            "grammar changed"
        );
        self.grammar_generation = grammar.generation();
        self.root_scope_descriptor = ScopeDescriptor::new([grammar.scope_name()]);
        self.grammar = grammar;
        self.class_names.clear();
        self.retokenize_lines();

        let scope_name = self.grammar.scope_name().to_string();
        self.emitter
            .emit(&TokenizeEvent::DidChangeGrammar { scope_name });
    }

    /// The current grammar's rules changed: discard everything and start over.
    pub fn grammar_did_update(&mut self) {
        debug!(buffer = %self.id, grammar = self.grammar.scope_name(), "grammar updated");
        self.grammar_generation = self.grammar.generation();
        self.class_names.clear();
        self.retokenize_lines();
    }

    /// Compare the grammar's generation with the one last seen and re-tokenize if it moved.
    /// Returns whether an update was applied.
    pub fn check_grammar_update(&mut self) -> bool {
        if self.grammar.generation() == self.grammar_generation {
            return false;
        }
        self.grammar_did_update();
        true
    }

    /// Reset the cache and the queue. Real grammars restart at row 0; the null grammar and
    /// large-file mode are complete immediately.
    pub fn retokenize_lines(&mut self) {
        if !self.alive {
            return;
        }
        self.fully_tokenized = false;
        self.tokenized_lines = vec![None; self.buffer.line_count()];
        self.invalid_rows.clear();
        if self.is_degenerate() {
            self.mark_tokenization_complete();
        } else {
            self.invalidate_row(0);
        }
    }

    fn is_degenerate(&self) -> bool {
        self.large_file_mode || self.grammar.is_null()
    }

    // ---------------------------------------------------------------------
    // Scheduling
    // ---------------------------------------------------------------------

    /// Show or hide the buffer. Becoming visible schedules pending work.
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
        if self.visible && !self.is_degenerate() {
            self.tokenize_in_background();
        }
    }

    /// Whether the buffer is visible.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Whether a tick is waiting to be run by the host.
    pub fn has_pending_chunk(&self) -> bool {
        self.pending_chunk
    }

    /// Request a tick. Requests while one is pending, while hidden, or after destruction are
    /// ignored.
    pub fn tokenize_in_background(&mut self) {
        if !self.visible || self.pending_chunk || !self.alive {
            return;
        }
        trace!(buffer = %self.id, "scheduling chunk");
        self.pending_chunk = true;
    }

    /// Run the pending tick, if any. Returns whether a chunk was tokenized.
    ///
    /// The tick is dropped without work when either this object or its buffer has been
    /// destroyed in the meantime.
    pub fn run_pending_chunk(&mut self) -> bool {
        if !self.pending_chunk {
            return false;
        }
        self.pending_chunk = false;
        if !(self.alive && self.buffer.is_alive()) {
            return false;
        }
        if self.check_grammar_update() {
            self.pending_chunk = false;
        }
        self.tokenize_next_chunk();
        true
    }

    /// Tokenize up to `chunk_size` rows from the invalid-row queue.
    ///
    /// Each popped row starts a walk that stops at the end of the buffer, when the budget runs
    /// out, or when a row's new end state equals its cached one (everything after it is
    /// already consistent).
    #[tracing::instrument(level = "trace", skip(self), fields(buffer = %self.id))]
    pub fn tokenize_next_chunk(&mut self) {
        let mut rows_remaining = self.chunk_size;

        while rows_remaining > 0 {
            let Some(start_row) = self.invalid_rows.pop_first() else {
                break;
            };
            let last_row = self.buffer.last_row();
            if start_row > last_row {
                continue;
            }

            let mut row = start_row;
            let (end_row, filled_region) = loop {
                let previous_state = self.state_for_row(row).cloned();
                let prior = self.prior_state_for_row(row);
                let open_scopes = self.open_scopes_for_row(row);
                let (line, faulted) = self.build_tokenized_line_for_row(row, prior, open_scopes);
                let reached_fixed_point =
                    !faulted && line.end_state() == previous_state.as_ref();
                self.store_line(row, line);

                rows_remaining -= 1;
                if rows_remaining == 0 {
                    break (row, false);
                }
                if row == last_row || reached_fixed_point {
                    break (row, true);
                }
                row += 1;
            };

            self.invalid_rows.validate(end_row);
            if !filled_region {
                self.invalidate_row(end_row + 1);
            }

            trace!(start_row, end_row, filled_region, "tokenized rows");
            self.emitter.emit(&TokenizeEvent::DidInvalidateRange(Range::new(
                Point::row_start(start_row),
                Point::row_start(end_row + 1),
            )));
        }

        if self.invalid_rows.is_empty() {
            self.mark_tokenization_complete();
        } else {
            self.tokenize_in_background();
        }
    }

    fn mark_tokenization_complete(&mut self) {
        if !self.fully_tokenized {
            debug!(buffer = %self.id, "tokenization complete");
            self.emitter.emit(&TokenizeEvent::DidTokenize);
        }
        self.fully_tokenized = true;
    }

    /// Whether every row has been tokenized since the last reset.
    pub fn is_fully_tokenized(&self) -> bool {
        self.fully_tokenized
    }

    /// Smallest queued row.
    pub fn first_invalid_row(&self) -> Option<usize> {
        self.invalid_rows.first()
    }

    /// Every queued row, ascending.
    pub fn invalid_rows(&self) -> &[usize] {
        self.invalid_rows.as_slice()
    }

    fn invalidate_row(&mut self, row: usize) {
        self.invalid_rows.invalidate(row);
        self.tokenize_in_background();
    }

    // ---------------------------------------------------------------------
    // Edits
    // ---------------------------------------------------------------------

    /// Reconcile the cache and the queue with an edit that has already been applied to the
    /// buffer.
    ///
    /// Up to `chunk_size` rows of the replacement are re-tokenized immediately; the remainder
    /// is queued. When the edit changes the end state of its last row (an opened block
    /// comment, say), the row after it is queued as well.
    #[tracing::instrument(level = "debug", skip(self), fields(buffer = %self.id))]
    pub fn buffer_did_change(&mut self, change: &BufferChange) {
        let start = change.old_range.start.row;
        let end = change.old_range.end.row;
        let delta = change.row_delta();
        let new_end = change.new_range.end.row;
        let new_line_count = new_end - start + 1;

        self.invalid_rows.shift_for_edit(start, end, delta);
        let previous_end_state = self.state_for_row(end).cloned();

        let new_lines = if self.is_degenerate() {
            vec![None; new_line_count]
        } else {
            let prior = self.prior_state_for_row(start);
            let open_scopes = self.open_scopes_for_row(start);
            self.build_tokenized_lines_for_rows(start, new_end, prior, open_scopes)
        };

        if self.tokenized_lines.len() < start {
            self.tokenized_lines.resize(start, None);
        }
        let splice_end = (end + 1).min(self.tokenized_lines.len());
        self.tokenized_lines.splice(start..splice_end, new_lines);

        if !self.is_degenerate() {
            let changed = self
                .state_for_row(new_end)
                .is_some_and(|state| Some(state) != previous_end_state.as_ref());
            if changed {
                debug!(row = new_end + 1, "end state changed; invalidating following rows");
                self.invalidate_row(new_end + 1);
            }
        }
    }

    fn build_tokenized_lines_for_rows(
        &mut self,
        start_row: usize,
        end_row: usize,
        starting_state: Option<LineState>,
        starting_open_scopes: Vec<ScopeId>,
    ) -> Vec<CachedLine> {
        let mut state = starting_state;
        let mut open_scopes = starting_open_scopes;
        let stop_tokenizing_at = start_row.saturating_add(self.chunk_size);
        let mut first_skipped = None;
        let mut lines = Vec::with_capacity(end_row + 1 - start_row);

        for row in start_row..=end_row {
            if (state.is_some() || row == 0) && row < stop_tokenizing_at {
                let (line, _) =
                    self.build_tokenized_line_for_row(row, state.take(), open_scopes.clone());
                state = line.end_state().cloned();
                open_scopes = scopes_from_tags(&open_scopes, line.tags()).scopes;
                lines.push(Some(Arc::new(line)));
            } else {
                if row < stop_tokenizing_at && first_skipped.is_none() {
                    first_skipped = Some(row);
                }
                lines.push(None);
            }
        }

        if end_row >= stop_tokenizing_at {
            self.invalidate_row(stop_tokenizing_at);
        }
        // Rows skipped for lack of a prior state must stay covered by the queue.
        if let Some(row) = first_skipped
            && self.invalid_rows.first().is_none_or(|first| first > row)
        {
            self.invalidate_row(row);
        }

        lines
    }

    /// Tokenize one row. On a grammar fault the row falls back to a single token that keeps
    /// the inherited scopes and passes `prior` through; the returned flag is then `true`.
    fn build_tokenized_line_for_row(
        &mut self,
        row: usize,
        prior: Option<LineState>,
        open_scopes: Vec<ScopeId>,
    ) -> (TokenizedLine, bool) {
        let text = self.buffer.line_for_row(row).unwrap_or_default();
        let line_ending = self.buffer.line_ending_for_row(row);

        match self.grammar.tokenize_line(&text, prior.as_ref(), row == 0) {
            Ok(LineTokens { tags, state }) => {
                let unmatched = scopes_from_tags(&open_scopes, &tags).unmatched;
                for scope in unmatched {
                    self.report_unmatched_scope_end(row, scope);
                }
                let grammar = self.grammar.clone();
                let line =
                    TokenizedLine::new(text, tags, open_scopes, Some(state), line_ending, grammar);
                (line, false)
            }
            Err(error) => {
                warn!(buffer = %self.id, row, %error, "grammar failed; using fallback tokens");
                if let Some(handler) = self.diagnostic_handler.as_mut() {
                    handler(&TokenizeDiagnostic::GrammarFault {
                        buffer_id: self.id,
                        row,
                        error,
                    });
                }
                let len = text.chars().count();
                let grammar = self.grammar.clone();
                let tags = vec![Tag::Token(len)];
                let line = TokenizedLine::new(text, tags, open_scopes, prior, line_ending, grammar);
                (line, true)
            }
        }
    }

    fn report_unmatched_scope_end(&mut self, row: usize, scope: ScopeId) {
        let unmatched_scope = self.grammar.scope_name_for_id(scope).map(str::to_string);
        warn!(
            buffer = %self.id,
            row,
            grammar = self.grammar.scope_name(),
            scope = unmatched_scope.as_deref().unwrap_or("<unknown>"),
            "encountered an unmatched scope end tag"
        );
        if let Some(handler) = self.diagnostic_handler.as_mut() {
            handler(&TokenizeDiagnostic::UnmatchedScopeEnd {
                buffer_id: self.id,
                row,
                grammar_scope: self.grammar.scope_name().to_string(),
                unmatched_scope,
                path: self.buffer.path().map(|path| path.to_path_buf()),
                contents: self.buffer.text(),
            });
        }
    }

    fn store_line(&mut self, row: usize, line: TokenizedLine) {
        if self.tokenized_lines.len() <= row {
            self.tokenized_lines.resize(row + 1, None);
        }
        self.tokenized_lines[row] = Some(Arc::new(line));
    }

    // ---------------------------------------------------------------------
    // Row access
    // ---------------------------------------------------------------------

    /// The cached line for `row`, without placeholder synthesis.
    pub fn cached_line(&self, row: usize) -> Option<&Arc<TokenizedLine>> {
        self.tokenized_lines.get(row).and_then(Option::as_ref)
    }

    /// The tokenization of `row`: the cached line, or a root-scope placeholder when the row
    /// has not been tokenized yet. `None` beyond the last row.
    pub fn tokenized_line_for_row(&self, row: usize) -> Option<Arc<TokenizedLine>> {
        if row > self.buffer.last_row() {
            return None;
        }
        if let Some(line) = self.cached_line(row) {
            return Some(line.clone());
        }
        let text = self.buffer.line_for_row(row)?;
        let line_ending = self.buffer.line_ending_for_row(row);
        Some(Arc::new(TokenizedLine::placeholder(
            text,
            line_ending,
            self.grammar.clone(),
        )))
    }

    /// Lines for `start..=end`, skipping rows past the end of the buffer.
    pub fn tokenized_lines_for_rows(&self, start: usize, end: usize) -> Vec<Arc<TokenizedLine>> {
        (start..=end)
            .filter_map(|row| self.tokenized_line_for_row(row))
            .collect()
    }

    /// Cached end state of `row`.
    pub fn state_for_row(&self, row: usize) -> Option<&LineState> {
        self.cached_line(row).and_then(|line| line.end_state())
    }

    fn prior_state_for_row(&self, row: usize) -> Option<LineState> {
        row.checked_sub(1)
            .and_then(|previous| self.state_for_row(previous))
            .cloned()
    }

    /// Scopes open at the start of `row`, derived from the cached previous row.
    pub fn open_scopes_for_row(&self, row: usize) -> Vec<ScopeId> {
        row.checked_sub(1)
            .and_then(|previous| self.cached_line(previous))
            .map(|line| scopes_from_tags(line.open_scopes(), line.tags()).scopes)
            .unwrap_or_default()
    }

    /// Whether cached `row` reads as a comment line. Untokenized rows are not.
    pub fn is_row_commented(&self, row: usize) -> bool {
        self.cached_line(row).is_some_and(|line| line.is_comment())
    }

    // ---------------------------------------------------------------------
    // Position queries
    // ---------------------------------------------------------------------

    /// Scope names enclosing `position` (clipped into the buffer), outermost first.
    ///
    /// The token containing the column decides; past the last token the scopes closed at the
    /// end of the row are put back, so the end of a row still reports its trailing scopes.
    pub fn scope_descriptor_for_position(&self, position: impl Into<Point>) -> ScopeDescriptor {
        let Point { row, column } = self.buffer.clip_position(position.into());
        let Some(line) = self.tokenized_line_for_row(row) else {
            return self.root_scope_descriptor.clone();
        };

        let mut iter = line.token_iterator();
        while iter.next() {
            if iter.buffer_end() > column {
                return ScopeDescriptor::new(iter.scopes());
            }
        }

        let mut scopes = iter.scopes();
        scopes.extend(iter.scope_ends().into_iter().rev());
        ScopeDescriptor::new(scopes)
    }

    /// The token at `position`.
    pub fn token_for_position(&self, position: impl Into<Point>) -> Option<Token> {
        let position = position.into();
        self.tokenized_line_for_row(position.row)?
            .token_at_column(position.column)
    }

    /// Start of the token at `position`.
    pub fn token_start_position_for_position(&self, position: impl Into<Point>) -> Point {
        let position = position.into();
        match self.tokenized_line_for_row(position.row) {
            Some(line) => Point::new(
                position.row,
                line.token_start_column_for_column(position.column),
            ),
            None => position,
        }
    }

    /// The widest run of adjacent tokens on `position`'s row whose scopes match `selector`,
    /// or `None` when the token at `position` does not match.
    ///
    /// A token ending exactly at `position.column` counts as the token at `position`.
    pub fn buffer_range_for_scope_at_position(
        &self,
        selector: &str,
        position: impl Into<Point>,
    ) -> Option<Range> {
        let position = position.into();
        let line = self.tokenized_line_for_row(position.row)?;
        let grammar = self.grammar.as_ref();
        let matches = |scopes: &[ScopeId]| {
            scopes.iter().any(|id| {
                grammar
                    .scope_name_for_id(*id)
                    .is_some_and(|name| selector_matches_scope(selector, name))
            })
        };

        let tags = line.tags();
        let mut scopes = line.open_scopes().to_vec();
        let mut start_column = 0;
        let mut end_column = 0;
        let mut token_index = tags.len();
        for (index, tag) in tags.iter().enumerate() {
            match *tag {
                Tag::Open(id) => scopes.push(id),
                Tag::Close(_) => {
                    scopes.pop();
                }
                Tag::Token(len) => {
                    end_column = start_column + len;
                    if end_column >= position.column {
                        token_index = index;
                        break;
                    }
                    start_column = end_column;
                }
            }
        }

        if !matches(&scopes) {
            return None;
        }

        let mut start_scopes = scopes.clone();
        for tag in tags[..token_index].iter().rev() {
            match *tag {
                Tag::Open(_) => {
                    start_scopes.pop();
                }
                Tag::Close(id) => start_scopes.push(id),
                Tag::Token(len) => {
                    if !matches(&start_scopes) {
                        break;
                    }
                    start_column = start_column.saturating_sub(len);
                }
            }
        }

        let mut end_scopes = scopes;
        for tag in tags.iter().skip(token_index + 1) {
            match *tag {
                Tag::Open(id) => end_scopes.push(id),
                Tag::Close(_) => {
                    end_scopes.pop();
                }
                Tag::Token(len) => {
                    if !matches(&end_scopes) {
                        break;
                    }
                    end_column += len;
                }
            }
        }

        Some(Range::new(
            (position.row, start_column),
            (position.row, end_column),
        ))
    }

    /// Whether any cached token has a scope matching `selector`.
    pub fn has_token_for_selector(&self, selector: &str) -> bool {
        self.tokenized_lines.iter().flatten().any(|line| {
            line.tokens()
                .iter()
                .any(|token| selector_matches_any_scope(selector, &token.scopes))
        })
    }

    /// `syntax--`-prefixed class names for a scope id (`"syntax--a syntax--b"` for `a.b`).
    pub fn class_name_for_scope_id(&mut self, id: ScopeId) -> Option<&str> {
        self.class_names
            .class_name_for_scope_id(self.grammar.as_ref(), id)
    }

    /// A boundary cursor over the whole buffer. Call [`seek`](TokenizedBufferIterator::seek)
    /// before use.
    pub fn build_iterator(&self) -> TokenizedBufferIterator<'_, B> {
        TokenizedBufferIterator::new(self)
    }

    // ---------------------------------------------------------------------
    // Notifications
    // ---------------------------------------------------------------------

    /// Subscribe to every event.
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&TokenizeEvent) + Send + 'static,
    {
        self.emitter.subscribe(callback)
    }

    /// Remove a subscription. Returns whether it existed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.emitter.unsubscribe(id)
    }

    /// Called with the row range of every re-tokenized region.
    pub fn on_did_invalidate_range<F>(&mut self, mut callback: F) -> SubscriptionId
    where
        F: FnMut(Range) + Send + 'static,
    {
        self.emitter.subscribe(move |event| {
            if let TokenizeEvent::DidInvalidateRange(range) = event {
                callback(*range);
            }
        })
    }

    /// Called once each time the buffer becomes fully tokenized.
    pub fn on_did_tokenize<F>(&mut self, mut callback: F) -> SubscriptionId
    where
        F: FnMut() + Send + 'static,
    {
        self.emitter.subscribe(move |event| {
            if matches!(event, TokenizeEvent::DidTokenize) {
                callback();
            }
        })
    }

    /// Called with the new grammar's scope name whenever the grammar is replaced.
    pub fn on_did_change_grammar<F>(&mut self, mut callback: F) -> SubscriptionId
    where
        F: FnMut(&str) + Send + 'static,
    {
        self.emitter.subscribe(move |event| {
            if let TokenizeEvent::DidChangeGrammar { scope_name } = event {
                callback(scope_name);
            }
        })
    }

    /// Install the handler that receives [`TokenizeDiagnostic`]s, replacing any previous one.
    pub fn set_diagnostic_handler<F>(&mut self, handler: F)
    where
        F: FnMut(&TokenizeDiagnostic) + Send + 'static,
    {
        self.diagnostic_handler = Some(Box::new(handler));
    }
}

impl<B: EditableBuffer> TokenizedBuffer<B> {
    /// Replace `range` in the buffer with `text` and reconcile.
    pub fn edit(&mut self, range: Range, text: &str) -> Result<BufferChange, BufferError> {
        let change = self.buffer.set_text_in_range(range, text)?;
        self.buffer_did_change(&change);
        Ok(change)
    }
}

impl<B: TextBuffer> fmt::Debug for TokenizedBuffer<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenizedBuffer")
            .field("id", &self.id)
            .field("grammar", &self.grammar.scope_name())
            .field("rows", &self.tokenized_lines.len())
            .field("invalid_rows", &self.invalid_rows)
            .field("fully_tokenized", &self.fully_tokenized)
            .field("visible", &self.visible)
            .field("alive", &self.alive)
            .field("pending_chunk", &self.pending_chunk)
            .finish()
    }
}
