//! Defines a [`Span`] which is used to represent a region in the template
//! source code.

use std::cmp::{max, min};
use std::ops::{Index, Range};

use unicode_width::UnicodeWidthStr;

/// A byte range in the template source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub m: usize,
    pub n: usize,
}

/// A human readable location in the template source.
///
/// `line` and `column` are zero based, `column` is measured in display
/// width so that it lines up with terminal output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}

impl Span {
    pub fn combine(self, other: Self) -> Self {
        let m = min(self.m, other.m);
        let n = max(self.n, other.n);
        Self { m, n }
    }

    pub const fn is_empty(&self) -> bool {
        self.m == self.n
    }

    /// Returns the position of the start of this span in the given source.
    pub fn position(&self, source: &str) -> Position {
        let offset = min(self.m, source.len());
        let before = &source[..offset];
        let line = before.matches('\n').count();
        let start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
        let column = before[start..].width();
        Position {
            line,
            column,
            offset,
        }
    }
}

impl Index<Span> for str {
    type Output = str;

    fn index(&self, span: Span) -> &Self::Output {
        let Span { m, n } = span;
        &self[m..n]
    }
}

impl From<Range<usize>> for Span {
    fn from(r: Range<usize>) -> Self {
        Self {
            m: r.start,
            n: r.end,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_position_first_line() {
        let pos = Span::from(6..9).position("lorem ipsum");
        assert_eq!(
            pos,
            Position {
                line: 0,
                column: 6,
                offset: 6
            }
        );
    }

    #[test]
    fn span_position_after_newlines() {
        let source = "a\nbc\n  <% end %>";
        let pos = Span::from(7..9).position(source);
        assert_eq!(
            pos,
            Position {
                line: 2,
                column: 2,
                offset: 7
            }
        );
    }

    #[test]
    fn span_position_wide_chars() {
        let source = "привіт <%";
        let m = source.find("<%").unwrap();
        let pos = Span::from(m..m + 2).position(source);
        assert_eq!(pos.column, 7);
    }
}
