//! Cross-line scope boundary cursor.

use crate::buffer::TextBuffer;
use crate::line::TokenizedLine;
use crate::point::Point;
use crate::tag::{ScopeId, Tag};
use crate::tokenized_buffer::TokenizedBuffer;
use std::sync::Arc;

/// Walks scope boundaries across rows, for consumers rendering a span of the buffer.
///
/// The cursor reports, at each position where scopes change, the scopes closed there and the
/// scopes opened there; it never yields text. A close that immediately follows an open with no
/// token in between is reported at a separate stop from the open, so consumers always see
/// balanced boundaries in order.
///
/// The iterator borrows the [`TokenizedBuffer`], so it cannot outlive an edit or a tick.
#[derive(Debug)]
pub struct TokenizedBufferIterator<'a, B: TextBuffer> {
    buffer: &'a TokenizedBuffer<B>,
    line: Option<Arc<TokenizedLine>>,
    tag_index: usize,
    line_length: usize,
    position: Point,
    open_scope_ids: Vec<ScopeId>,
    close_scope_ids: Vec<ScopeId>,
}

impl<'a, B: TextBuffer> TokenizedBufferIterator<'a, B> {
    /// Create an unpositioned iterator.
    pub fn new(buffer: &'a TokenizedBuffer<B>) -> Self {
        Self {
            buffer,
            line: None,
            tag_index: 0,
            line_length: 0,
            position: Point::default(),
            open_scope_ids: Vec::new(),
            close_scope_ids: Vec::new(),
        }
    }

    /// Position the cursor at `position` and return the scopes enclosing it, outermost first.
    ///
    /// Boundaries sitting exactly at `position` are left pending in
    /// [`open_scope_ids`](Self::open_scope_ids) / [`close_scope_ids`](Self::close_scope_ids)
    /// and are not part of the returned stack. The cursor may stop before `position` when a
    /// boundary cannot be committed yet; [`position`](Self::position) tells where it is.
    pub fn seek(&mut self, position: impl Into<Point>) -> Vec<ScopeId> {
        let position = position.into();
        self.open_scope_ids.clear();
        self.close_scope_ids.clear();

        let Some(line) = self.buffer.tokenized_line_for_row(position.row) else {
            self.line = None;
            self.tag_index = 0;
            self.line_length = 0;
            self.position = Point::row_start(position.row);
            return Vec::new();
        };

        let mut containing = line.open_scopes().to_vec();
        let tags = line.tags();
        let mut column = 0;
        let mut stop = None;

        for (index, tag) in tags.iter().enumerate() {
            match *tag {
                Tag::Token(len) => {
                    if column >= position.column {
                        stop = Some(index);
                        break;
                    }
                    column += len;
                    self.commit_pending(&mut containing);
                }
                Tag::Close(id) => {
                    if !self.open_scope_ids.is_empty() {
                        if column >= position.column {
                            stop = Some(index);
                            break;
                        }
                        self.commit_pending(&mut containing);
                    }
                    self.close_scope_ids.push(id);
                }
                Tag::Open(id) => self.open_scope_ids.push(id),
            }
        }

        self.tag_index = stop.unwrap_or(tags.len());
        self.line_length = line.len_chars();
        self.position = Point::new(position.row, column.min(self.line_length));
        self.line = Some(line);
        containing
    }

    /// Advance to the next position with pending boundaries.
    ///
    /// Returns `false` once the last row has been passed.
    pub fn move_to_successor(&mut self) -> bool {
        self.open_scope_ids.clear();
        self.close_scope_ids.clear();

        loop {
            match self.tag_at(self.tag_index) {
                None => {
                    if self.is_at_tag_boundary() {
                        break;
                    }
                    if !self.move_to_next_line() {
                        return false;
                    }
                }
                Some(Tag::Token(len)) => {
                    if self.is_at_tag_boundary() {
                        break;
                    }
                    self.position.column = (self.position.column + len).min(self.line_length);
                    self.tag_index += 1;
                }
                Some(Tag::Close(id)) => {
                    if !self.open_scope_ids.is_empty() {
                        break;
                    }
                    self.close_scope_ids.push(id);
                    self.tag_index += 1;
                }
                Some(Tag::Open(id)) => {
                    self.open_scope_ids.push(id);
                    self.tag_index += 1;
                }
            }
        }
        true
    }

    /// Current position.
    pub fn position(&self) -> Point {
        self.position
    }

    /// Scopes opening at the current position.
    pub fn open_scope_ids(&self) -> &[ScopeId] {
        &self.open_scope_ids
    }

    /// Scopes closing at the current position, innermost first.
    pub fn close_scope_ids(&self) -> &[ScopeId] {
        &self.close_scope_ids
    }

    fn commit_pending(&mut self, containing: &mut Vec<ScopeId>) {
        for _ in self.close_scope_ids.drain(..) {
            containing.pop();
        }
        containing.append(&mut self.open_scope_ids);
    }

    fn is_at_tag_boundary(&self) -> bool {
        !self.open_scope_ids.is_empty() || !self.close_scope_ids.is_empty()
    }

    fn tag_at(&self, index: usize) -> Option<Tag> {
        self.line
            .as_ref()
            .and_then(|line| line.tags().get(index).copied())
    }

    fn move_to_next_line(&mut self) -> bool {
        self.position = Point::row_start(self.position.row + 1);
        match self.buffer.tokenized_line_for_row(self.position.row) {
            Some(line) => {
                self.line_length = line.len_chars();
                self.tag_index = 0;
                self.line = Some(line);
                true
            }
            None => false,
        }
    }
}
