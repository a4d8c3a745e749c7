//! Source locations

use std::fmt;

/// Line/column pair as shown to users (1-based line, 0-based column)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Byte range in the source plus the position of its first character
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: u32,
    pub column: u32,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            line: 0,
            column: 0,
        }
    }

    pub fn with_position(mut self, position: Position) -> Self {
        self.line = position.line;
        self.column = position.column;
        self
    }

    /// Smallest span covering both; the position follows whichever starts first
    pub fn merge(self, other: Span) -> Span {
        let first = if other.start < self.start { other } else { self };
        Span {
            start: first.start,
            end: self.end.max(other.end),
            line: first.line,
            column: first.column,
        }
    }

    pub fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Maps byte offsets to line/column positions
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            source
                .char_indices()
                .filter(|(_, c)| *c == '\n')
                .map(|(i, _)| i + 1),
        );
        Self { line_starts }
    }

    /// Columns count characters, not bytes
    pub fn position(&self, source: &str, offset: usize) -> Position {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next.saturating_sub(1),
        };
        let line_start = self.line_starts.get(line).copied().unwrap_or(0);
        let column = source
            .get(line_start..offset)
            .map_or(0, |prefix| prefix.chars().count());
        Position::new(line as u32 + 1, column as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_index_positions() {
        let source = "let a;\n  let b;\nñx";
        let index = LineIndex::new(source);

        assert_eq!(index.position(source, 0), Position::new(1, 0));
        assert_eq!(index.position(source, 4), Position::new(1, 4));
        assert_eq!(index.position(source, 9), Position::new(2, 2));
        // 'ñ' is two bytes wide
        assert_eq!(index.position(source, 18), Position::new(3, 1));
    }

    #[test]
    fn test_merge_keeps_first_position() {
        let a = Span::new(4, 8).with_position(Position::new(1, 4));
        let b = Span::new(10, 12).with_position(Position::new(2, 0));

        let merged = b.merge(a);
        assert_eq!(merged.start, 4);
        assert_eq!(merged.end, 12);
        assert_eq!(merged.position(), Position::new(1, 4));
    }
}
