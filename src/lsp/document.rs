use tower_lsp::lsp_types;

use crate::core::{FilterDocument, Position, Range};

/// State for each open document
#[derive(Debug)]
pub struct DocumentState {
    pub document: FilterDocument,
    pub version: Option<i32>,
}

impl DocumentState {
    pub fn new(document: FilterDocument, version: Option<i32>) -> Self {
        Self { document, version }
    }

    /// Convert a char-based range to LSP's UTF-16 positions
    pub fn lsp_range(&self, range: Range) -> lsp_types::Range {
        lsp_types::Range::new(self.lsp_position(range.start), self.lsp_position(range.end))
    }

    pub fn lsp_position(&self, position: Position) -> lsp_types::Position {
        let character = match self.document.line(position.row) {
            Some(line) => char_to_utf16(line, position.column),
            None => position.column as u32,
        };
        lsp_types::Position::new(position.row as u32, character)
    }

    pub fn filter_range(&self, range: lsp_types::Range) -> Range {
        let start = self.filter_position(range.start);
        let end = self.filter_position(range.end);
        if end < start {
            Range::new(end, start)
        } else {
            Range::new(start, end)
        }
    }

    pub fn filter_position(&self, position: lsp_types::Position) -> Position {
        let row = position.line as usize;
        let column = match self.document.line(row) {
            Some(line) => utf16_to_char(line, position.character),
            None => position.character as usize,
        };
        Position::new(row, column)
    }
}

/// UTF-16 offset of char `column`, clamped to the line end
pub fn char_to_utf16(line: &str, column: usize) -> u32 {
    line.chars()
        .take(column)
        .map(|c| c.len_utf16() as u32)
        .sum()
}

/// Char column of UTF-16 offset `offset`. An offset inside a surrogate pair
/// resolves to the char containing it.
pub fn utf16_to_char(line: &str, offset: u32) -> usize {
    let mut units = 0u32;
    for (column, c) in line.chars().enumerate() {
        if units >= offset {
            return column;
        }
        units += c.len_utf16() as u32;
        if units > offset {
            return column;
        }
    }
    line.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocabulary::Vocabulary;

    #[test]
    fn test_utf16_conversion() {
        let line = "a😀b";
        assert_eq!(char_to_utf16(line, 0), 0);
        assert_eq!(char_to_utf16(line, 2), 3);
        assert_eq!(char_to_utf16(line, 10), 4);

        assert_eq!(utf16_to_char(line, 0), 0);
        assert_eq!(utf16_to_char(line, 1), 1);
        assert_eq!(utf16_to_char(line, 2), 1);
        assert_eq!(utf16_to_char(line, 3), 2);
        assert_eq!(utf16_to_char(line, 9), 3);
    }

    #[test]
    fn test_range_round_trip() {
        let document =
            FilterDocument::open("Show\nBaseType \"😀\"", &Vocabulary::new(), None).expect("open");
        let state = DocumentState::new(document, Some(1));

        let range = Range::on_row(1, 9, 12);
        let lsp_range = state.lsp_range(range);
        assert_eq!(lsp_range.end, lsp_types::Position::new(1, 13));
        assert_eq!(state.filter_range(lsp_range), range);
    }
}
