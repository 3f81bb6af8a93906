//! Source location tracking for error reporting.
//!
//! Provides [`Span`] to track where syntax tree nodes begin and end.

use std::fmt;

/// The region of source covered by a syntax tree node.
///
/// Both ends are tracked so diagnostics can point either at the first token
/// of a node or at its closing token (for example the `}` of a method body).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    /// Line of the first token (1-indexed).
    pub line: u32,
    /// Column of the first token (1-indexed).
    pub col: u32,
    /// Line of the last token (1-indexed).
    pub end_line: u32,
    /// Column of the last token (1-indexed).
    pub end_col: u32,
}

impl Span {
    /// Create a span from its start and end positions.
    #[inline]
    pub fn new(line: u32, col: u32, end_line: u32, end_col: u32) -> Self {
        Self {
            line,
            col,
            end_line,
            end_col,
        }
    }

    /// Create a span that starts and ends on a single line.
    #[inline]
    pub fn line(line: u32) -> Self {
        Self::new(line, 1, line, 1)
    }

    /// Create a span covering whole lines `start..=end`.
    #[inline]
    pub fn lines(start: u32, end: u32) -> Self {
        Self::new(start, 1, end, 1)
    }

    /// Line of the first token.
    #[inline]
    pub fn start_line(&self) -> u32 {
        self.line
    }

    /// Line of the last token.
    #[inline]
    pub fn end_line(&self) -> u32 {
        self.end_line
    }

    /// Whether the span fits on one line.
    #[inline]
    pub fn is_single_line(&self) -> bool {
        self.line == self.end_line
    }

    /// Smallest span covering both `self` and `other`.
    pub fn merge(self, other: Span) -> Span {
        let (line, col) = (self.line, self.col).min((other.line, other.col));
        let end = (self.end_line, self.end_col).max((other.end_line, other.end_col));
        let (end_line, end_col) = end;
        Span {
            line,
            col,
            end_line,
            end_col,
        }
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}-{}:{}",
            self.line, self.col, self.end_line, self.end_col
        )
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}
