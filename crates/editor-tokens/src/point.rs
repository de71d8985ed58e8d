//! Buffer coordinates.
//!
//! Rows are zero-based logical lines. Columns are zero-based and counted in `char`s (Unicode
//! scalar values), the same unit used for token lengths in the tag stream.

use std::cmp::Ordering;
use std::fmt;

/// A logical position in a buffer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Point {
    /// Zero-based row.
    pub row: usize,
    /// Zero-based column in characters within the row.
    pub column: usize,
}

impl Point {
    /// Create a new point.
    pub const fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }

    /// The start of `row`.
    pub const fn row_start(row: usize) -> Self {
        Self { row, column: 0 }
    }
}

impl Ord for Point {
    fn cmp(&self, other: &Self) -> Ordering {
        self.row
            .cmp(&other.row)
            .then_with(|| self.column.cmp(&other.column))
    }
}

impl PartialOrd for Point {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl From<(usize, usize)> for Point {
    fn from((row, column): (usize, usize)) -> Self {
        Self::new(row, column)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.column)
    }
}

/// A half-open range between two points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Range {
    /// Inclusive start.
    pub start: Point,
    /// Exclusive end.
    pub end: Point,
}

impl Range {
    /// Create a range, normalizing so that `start <= end`.
    pub fn new(start: impl Into<Point>, end: impl Into<Point>) -> Self {
        let (start, end) = (start.into(), end.into());
        if start <= end {
            Self { start, end }
        } else {
            Self {
                start: end,
                end: start,
            }
        }
    }

    /// An empty range at `point`.
    pub fn empty(point: impl Into<Point>) -> Self {
        let point = point.into();
        Self {
            start: point,
            end: point,
        }
    }

    /// Whether the range covers no characters.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Number of rows the range touches (at least 1).
    pub fn row_count(&self) -> usize {
        self.end.row - self.start.row + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_ordering() {
        assert!(Point::new(0, 9) < Point::new(1, 0));
        assert!(Point::new(2, 3) > Point::new(2, 1));
        assert_eq!(Point::from((4, 2)), Point::new(4, 2));
    }

    #[test]
    fn test_range_normalizes() {
        let range = Range::new((3, 1), (1, 4));
        assert_eq!(range.start, Point::new(1, 4));
        assert_eq!(range.end, Point::new(3, 1));
        assert_eq!(range.row_count(), 3);
        assert!(Range::empty((2, 2)).is_empty());
    }
}
