//! Source location tracking
//!
//! Positions are relative to the text of a single record; a record carries
//! the absolute line it started on so diagnostics can be mapped back to the
//! input file without re-reading it.
use serde::{Deserialize, Serialize};
use std::fmt;

/// A position in source text with line, column, and byte offset.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Position {
    /// Byte offset from start of input (0-based)
    pub offset: usize,
    /// Line number (1-based)
    pub line: u32,
    /// Column number (1-based)
    pub column: u32,
}

impl Position {
    pub fn new(offset: usize, line: u32, column: u32) -> Self {
        Self {
            offset,
            line,
            column,
        }
    }

    /// Create the starting position (offset 0, line 1, column 1)
    pub fn start() -> Self {
        Self {
            offset: 0,
            line: 1,
            column: 1,
        }
    }

    /// Advance position by one character
    pub fn advance(self, ch: char) -> Self {
        match ch {
            '\n' => Self {
                offset: self.offset + 1,
                line: self.line + 1,
                column: 1,
            },
            _ => Self {
                offset: self.offset + ch.len_utf8(),
                line: self.line,
                column: self.column + 1,
            },
        }
    }

    /// Advance position by a string
    pub fn advance_str(self, s: &str) -> Self {
        s.chars().fold(self, |pos, ch| pos.advance(ch))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A span of source text from start to end position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    /// Start position (inclusive)
    pub start: Position,
    /// End position (exclusive)
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        debug_assert!(
            start.offset <= end.offset,
            "Span start must not be after end"
        );
        Self { start, end }
    }

    pub fn start(&self) -> Position {
        self.start
    }

    pub fn end(&self) -> Position {
        self.end
    }

    /// Merge two spans into one covering both
    pub fn merge(self, other: Self) -> Self {
        let start = if self.start.offset < other.start.offset {
            self.start
        } else {
            other.start
        };
        let end = if self.end.offset > other.end.offset {
            self.end
        } else {
            other.end
        };
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.offset - self.start.offset
    }

    pub fn is_empty(&self) -> bool {
        self.start.offset == self.end.offset
    }

    /// Shift line numbers so a record-relative span becomes file-relative
    pub fn offset_lines(self, first_line: u32) -> Self {
        let shift = first_line.saturating_sub(1);
        Self {
            start: Position {
                line: self.start.line + shift,
                ..self.start
            },
            end: Position {
                line: self.end.line + shift,
                ..self.end
            },
        }
    }

    /// Get the source text for this span from the input
    pub fn slice<'a>(&self, input: &'a str) -> &'a str {
        input.get(self.start.offset..self.end.offset).unwrap_or("")
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start.line == self.end.line {
            write!(
                f,
                "{}:{}-{}",
                self.start.line, self.start.column, self.end.column
            )
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// Line index over a record's text for diagnostics
#[derive(Debug, Clone)]
pub struct SourceMap {
    /// The original source text
    pub source: String,
    /// Byte offsets of line starts
    line_starts: Vec<usize>,
    /// Absolute line number of the first line
    first_line: u32,
}

impl SourceMap {
    pub fn new(source: String, first_line: u32) -> Self {
        let mut line_starts = vec![0];
        for (offset, ch) in source.char_indices() {
            if ch == '\n' {
                line_starts.push(offset + 1);
            }
        }
        Self {
            source,
            line_starts,
            first_line: first_line.max(1),
        }
    }

    /// Get a line of text by record-relative line number (1-based)
    pub fn get_line(&self, line_num: u32) -> Option<&str> {
        if line_num == 0 {
            return None;
        }

        let line_idx = (line_num - 1) as usize;
        let start = *self.line_starts.get(line_idx)?;
        let end = match self.line_starts.get(line_idx + 1) {
            Some(next) => next - 1,
            None => self.source.len(),
        };

        self.source.get(start..end)
    }

    /// Render the record with the offending span underlined
    pub fn format_error(&self, span: &Span, message: &str) -> String {
        let mut result = String::new();
        let absolute_line = span.start.line + self.first_line - 1;

        result.push_str(&format!("Error: {}\n", message));
        result.push_str(&format!("  --> {}:{}\n", absolute_line, span.start.column));

        for (index, _) in self.line_starts.iter().enumerate() {
            let record_line = index as u32 + 1;
            let Some(line) = self.get_line(record_line) else {
                continue;
            };
            result.push_str(&format!(
                ">{:5}| {}\n",
                record_line + self.first_line - 1,
                line
            ));

            if record_line == span.start.line {
                let width = if span.start.line == span.end.line {
                    (span.end.column.saturating_sub(span.start.column)) as usize
                } else {
                    line.len().saturating_sub((span.start.column - 1) as usize)
                };
                result.push_str(&format!(
                    "{}| {}{} not expected here.\n",
                    " ".repeat(6),
                    " ".repeat((span.start.column - 1) as usize),
                    "^".repeat(width.max(1))
                ));
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_advance_over_newline() {
        let pos = Position::start().advance_str("1 0\n     -2");
        assert_eq!(pos.line, 2);
        assert_eq!(pos.column, 8);
        assert_eq!(pos.offset, 11);
    }

    #[test]
    fn test_offset_lines() {
        let span = Span::new(Position::new(4, 2, 3), Position::new(6, 2, 5));
        let shifted = span.offset_lines(10);
        assert_eq!(shifted.start.line, 11);
        assert_eq!(shifted.end.column, 5);
    }

    #[test]
    fn test_format_error_underlines_token() {
        let map = SourceMap::new("1 0 -1 : : 2".to_string(), 7);
        let span = Span::new(Position::new(9, 1, 10), Position::new(10, 1, 11));
        let rendered = map.format_error(&span, "Unexpected ':'");

        assert!(rendered.contains("--> 7:10"));
        assert!(rendered.contains(">    7| 1 0 -1 : : 2"));
        assert!(rendered.contains("^ not expected here."));
    }
}
