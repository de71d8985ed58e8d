//! The buffer collaborator interface, plus a rope-backed implementation.

use crate::error::BufferError;
use crate::line_ending::LineEnding;
use crate::point::{Point, Range};
use ropey::Rope;
use std::path::{Path, PathBuf};

/// A row-granular description of one edit.
///
/// `old_range` is in pre-edit coordinates, `new_range` covers the replacement text in
/// post-edit coordinates. Both start at the same point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferChange {
    /// Replaced range, before the edit.
    pub old_range: Range,
    /// Inserted range, after the edit.
    pub new_range: Range,
}

impl BufferChange {
    /// Change in row count caused by the edit.
    pub fn row_delta(&self) -> isize {
        self.new_range.end.row as isize - self.old_range.end.row as isize
    }
}

/// Read access to the text being tokenized.
pub trait TextBuffer {
    /// Number of rows (at least 1).
    fn line_count(&self) -> usize;

    /// Index of the last row.
    fn last_row(&self) -> usize {
        self.line_count().saturating_sub(1)
    }

    /// Row text without its terminator.
    fn line_for_row(&self, row: usize) -> Option<String>;

    /// The row's terminator; `None` for the last row or rows out of range.
    fn line_ending_for_row(&self, row: usize) -> Option<LineEnding>;

    /// Row length in characters.
    fn line_length_for_row(&self, row: usize) -> Option<usize> {
        self.line_for_row(row).map(|line| line.chars().count())
    }

    /// Full buffer text.
    fn text(&self) -> String;

    /// Byte length of the buffer.
    fn byte_len(&self) -> usize {
        self.text().len()
    }

    /// File path, when the buffer is backed by one.
    fn path(&self) -> Option<&Path> {
        None
    }

    /// Whether the buffer is still usable. Tokenization ticks stop once this is false.
    fn is_alive(&self) -> bool {
        true
    }

    /// Whether `row` contains only whitespace.
    fn is_row_blank(&self, row: usize) -> bool {
        self.line_for_row(row)
            .is_none_or(|line| line.chars().all(char::is_whitespace))
    }

    /// Nearest non-blank row above `row`.
    fn previous_non_blank_row(&self, row: usize) -> Option<usize> {
        (0..row.min(self.line_count()))
            .rev()
            .find(|&r| !self.is_row_blank(r))
    }

    /// Nearest non-blank row below `row`.
    fn next_non_blank_row(&self, row: usize) -> Option<usize> {
        (row + 1..self.line_count()).find(|&r| !self.is_row_blank(r))
    }

    /// Clamp `point` into the buffer.
    fn clip_position(&self, point: Point) -> Point {
        let row = point.row.min(self.last_row());
        let len = self.line_length_for_row(row).unwrap_or(0);
        Point::new(row, point.column.min(len))
    }
}

/// A buffer that can apply edits and describe them.
pub trait EditableBuffer: TextBuffer {
    /// Replace `range` with `text`.
    fn set_text_in_range(&mut self, range: Range, text: &str) -> Result<BufferChange, BufferError>;
}

/// Rope-based text buffer.
///
/// Keeps line terminators as-is. Rows are split wherever `ropey` sees a line break; the
/// terminator is stripped from row text.
#[derive(Debug, Clone)]
pub struct RopeBuffer {
    rope: Rope,
    path: Option<PathBuf>,
    alive: bool,
}

impl RopeBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::from_text("")
    }

    /// Build a buffer from text.
    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
            path: None,
            alive: true,
        }
    }

    /// Attach a file path (used for diagnostics only).
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Mark the buffer destroyed.
    pub fn destroy(&mut self) {
        self.alive = false;
    }

    /// Insert `text` at `point`.
    pub fn insert(&mut self, point: Point, text: &str) -> Result<BufferChange, BufferError> {
        self.set_text_in_range(Range::empty(point), text)
    }

    /// Delete `range`.
    pub fn delete(&mut self, range: Range) -> Result<BufferChange, BufferError> {
        self.set_text_in_range(range, "")
    }

    /// Replace the entire contents.
    pub fn set_text(&mut self, text: &str) -> Result<BufferChange, BufferError> {
        let end = self.end_point();
        self.set_text_in_range(Range::new(Point::default(), end), text)
    }

    /// Point just past the last character.
    pub fn end_point(&self) -> Point {
        let row = self.last_row();
        Point::new(row, self.line_length_for_row(row).unwrap_or(0))
    }

    fn char_offset(&self, point: Point) -> Result<usize, BufferError> {
        if point.row >= self.rope.len_lines() {
            return Err(BufferError::OutOfBounds(point));
        }
        let line_start = self.rope.line_to_char(point.row);
        let len = self.line_length_for_row(point.row).unwrap_or(0);
        Ok(line_start + point.column.min(len))
    }

    fn point_for_char(&self, char_offset: usize) -> Point {
        let row = self.rope.char_to_line(char_offset);
        Point::new(row, char_offset - self.rope.line_to_char(row))
    }

    fn raw_line(&self, row: usize) -> Option<String> {
        if row >= self.rope.len_lines() {
            return None;
        }
        Some(self.rope.line(row).to_string())
    }
}

impl Default for RopeBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextBuffer for RopeBuffer {
    fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    fn line_for_row(&self, row: usize) -> Option<String> {
        let mut text = self.raw_line(row)?;
        if text.ends_with("\r\n") {
            text.truncate(text.len() - 2);
        } else if text.ends_with(is_line_break) {
            text.pop();
        }
        Some(text)
    }

    fn line_ending_for_row(&self, row: usize) -> Option<LineEnding> {
        self.raw_line(row)
            .and_then(|raw| LineEnding::detect_at_end(&raw))
    }

    fn text(&self) -> String {
        self.rope.to_string()
    }

    fn byte_len(&self) -> usize {
        self.rope.len_bytes()
    }

    fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn is_alive(&self) -> bool {
        self.alive
    }
}

impl EditableBuffer for RopeBuffer {
    fn set_text_in_range(&mut self, range: Range, text: &str) -> Result<BufferChange, BufferError> {
        let a = self.char_offset(range.start)?;
        let b = self.char_offset(range.end)?;
        let (start_char, end_char) = (a.min(b), a.max(b));
        let start = self.point_for_char(start_char);
        let old_end = self.point_for_char(end_char);

        if start_char < end_char {
            self.rope.remove(start_char..end_char);
        }
        self.rope.insert(start_char, text);
        let new_end = self.point_for_char(start_char + text.chars().count());

        Ok(BufferChange {
            old_range: Range::new(start, old_end),
            new_range: Range::new(start, new_end),
        })
    }
}

fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\u{0B}' | '\u{0C}' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_and_endings() {
        let buffer = RopeBuffer::from_text("one\r\ntwo\nthree");
        assert_eq!(buffer.line_count(), 3);
        assert_eq!(buffer.line_for_row(0).as_deref(), Some("one"));
        assert_eq!(buffer.line_ending_for_row(0), Some(LineEnding::Crlf));
        assert_eq!(buffer.line_ending_for_row(1), Some(LineEnding::Lf));
        assert_eq!(buffer.line_ending_for_row(2), None);
        assert_eq!(buffer.line_for_row(3), None);
    }

    #[test]
    fn test_trailing_newline_adds_empty_row() {
        let buffer = RopeBuffer::from_text("a\n");
        assert_eq!(buffer.line_count(), 2);
        assert_eq!(buffer.line_for_row(1).as_deref(), Some(""));
    }

    #[test]
    fn test_insert_reports_row_ranges() {
        let mut buffer = RopeBuffer::from_text("aaa\nbbb\nccc");
        let change = buffer.insert(Point::new(1, 1), "X\nY\nZ").unwrap();
        assert_eq!(change.old_range, Range::new((1, 1), (1, 1)));
        assert_eq!(change.new_range, Range::new((1, 1), (3, 1)));
        assert_eq!(change.row_delta(), 2);
        assert_eq!(buffer.text(), "aaa\nbX\nY\nZbb\nccc");
    }

    #[test]
    fn test_delete_across_rows() {
        let mut buffer = RopeBuffer::from_text("aaa\nbbb\nccc\nddd");
        let change = buffer.delete(Range::new((1, 0), (3, 0))).unwrap();
        assert_eq!(change.old_range, Range::new((1, 0), (3, 0)));
        assert_eq!(change.new_range, Range::empty((1, 0)));
        assert_eq!(change.row_delta(), -2);
        assert_eq!(buffer.text(), "aaa\nddd");
    }

    #[test]
    fn test_columns_are_clipped() {
        let mut buffer = RopeBuffer::from_text("ab\ncd");
        let change = buffer.insert(Point::new(0, 99), "!").unwrap();
        assert_eq!(change.new_range, Range::new((0, 2), (0, 3)));
        assert_eq!(buffer.text(), "ab!\ncd");
        assert!(buffer.insert(Point::new(7, 0), "x").is_err());
        assert_eq!(buffer.clip_position(Point::new(9, 9)), Point::new(1, 2));
    }

    #[test]
    fn test_non_blank_row_lookup() {
        let buffer = RopeBuffer::from_text("a\n  \n\nb");
        assert_eq!(buffer.previous_non_blank_row(3), Some(0));
        assert_eq!(buffer.next_non_blank_row(0), Some(3));
        assert_eq!(buffer.previous_non_blank_row(0), None);
        assert!(buffer.is_row_blank(1));
    }
}
