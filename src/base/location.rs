use std::fmt;
use std::sync::Arc;

use super::span::{LineIndex, TextSize};

/// Where a value node begins in its source.
///
/// Line and column are zero-based; [`Display`](fmt::Display) renders them
/// one-based as `source:line:column`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    line: u32,
    column: u32,
    offset: TextSize,
    source: Arc<str>,
}

impl Location {
    pub fn new(line: u32, column: u32, offset: TextSize, source: impl Into<Arc<str>>) -> Self {
        Self {
            line,
            column,
            offset,
            source: source.into(),
        }
    }

    /// Resolve a byte offset against the line index of `source`.
    pub fn resolve(index: &LineIndex, offset: TextSize, source: &Arc<str>) -> Self {
        let line_col = index.line_col(offset);
        Self {
            line: line_col.line,
            column: line_col.col,
            offset,
            source: Arc::clone(source),
        }
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn column(&self) -> u32 {
        self.column
    }

    pub fn offset(&self) -> TextSize {
        self.offset
    }

    /// Name of the parsed source, as passed to `parse`.
    pub fn source(&self) -> &str {
        &self.source
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.source, self.line + 1, self.column + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_and_display() {
        let index = LineIndex::new("let\n  x");
        let source: Arc<str> = Arc::from("main.calc");
        let location = Location::resolve(&index, TextSize::new(6), &source);
        assert_eq!(location.line(), 1);
        assert_eq!(location.column(), 2);
        assert_eq!(location.to_string(), "main.calc:2:3");
    }
}
