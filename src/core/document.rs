//! Document State
//!
//! The line buffer of one open filter and the elements processed from it.
//! Elements always correspond one to one with buffer lines.

use crate::core::diagnostics::ValidationMessage;
use crate::core::position::Range;
use crate::error::ParseError;
use crate::parser::{LineElement, Tokenizer};
use crate::validation::{Edit, update, validate_lines};
use crate::vocabulary::Vocabulary;

/// Split text the way an editor buffer does: `\n`, `\r\n` and a lone `\r`
/// each end a line, and a final line break opens an empty last line.
pub fn split_buffer_lines(text: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut rest = text;
    while let Some(index) = rest.find(['\r', '\n']) {
        lines.push(rest[..index].to_string());
        let width = if rest[index..].starts_with("\r\n") { 2 } else { 1 };
        rest = &rest[index + width..];
    }
    lines.push(rest.to_string());
    lines
}

#[derive(Debug, Clone)]
pub struct FilterDocument {
    lines: Vec<String>,
    elements: Vec<LineElement>,
    file: Option<String>,
}

impl FilterDocument {
    /// Split `text` into lines and run a full pass over them.
    pub fn open(
        text: &str,
        vocabulary: &Vocabulary,
        file: Option<String>,
    ) -> Result<Self, ParseError> {
        let lines = split_buffer_lines(text);
        let elements = validate_lines(&lines, vocabulary, file.as_deref())?;
        Ok(Self {
            lines,
            elements,
            file,
        })
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn line(&self, row: usize) -> Option<&str> {
        self.lines.get(row).map(String::as_str)
    }

    pub fn elements(&self) -> &[LineElement] {
        &self.elements
    }

    pub fn element(&self, row: usize) -> Option<&LineElement> {
        self.elements.get(row)
    }

    pub fn file(&self) -> Option<&str> {
        self.file.as_deref()
    }

    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    pub fn messages(&self) -> impl Iterator<Item = &ValidationMessage> {
        self.elements.iter().flat_map(|element| element.messages.iter())
    }

    /// Replace the whole buffer and run a full pass. On error the document
    /// is left as it was.
    pub fn replace_all(&mut self, text: &str, vocabulary: &Vocabulary) -> Result<(), ParseError> {
        let lines = split_buffer_lines(text);
        self.elements = validate_lines(&lines, vocabulary, self.file.as_deref())?;
        self.lines = lines;
        Ok(())
    }

    /// Full pass over the current buffer, e.g. after a vocabulary change.
    pub fn revalidate(&mut self, vocabulary: &Vocabulary) -> Result<(), ParseError> {
        self.elements = validate_lines(&self.lines, vocabulary, self.file.as_deref())?;
        Ok(())
    }

    /// Replace the text in `range` (char columns) and reprocess the touched
    /// lines. Positions past the end of a line or of the buffer are clamped.
    ///
    /// A failed incremental update is logged and replaced by a full pass, so
    /// the elements always match the buffer afterwards. If the new lines
    /// cannot be processed at all the document is left unchanged.
    pub fn edit(
        &mut self,
        range: Range,
        text: &str,
        vocabulary: &Vocabulary,
    ) -> Result<Edit, ParseError> {
        let last_row = self.lines.len().saturating_sub(1);
        let start_row = range.start.row.min(last_row);
        let end_row = range.end.row.clamp(start_row, last_row);

        let start_byte = byte_offset(&self.lines[start_row], range.start.column);
        let end_byte = if end_row == start_row {
            byte_offset(&self.lines[end_row], range.end.column).max(start_byte)
        } else {
            byte_offset(&self.lines[end_row], range.end.column)
        };

        let joined = format!(
            "{}{}{}",
            &self.lines[start_row][..start_byte],
            text,
            &self.lines[end_row][end_byte..]
        );
        let replacement = split_buffer_lines(&joined);
        // Only the replacement lines are new; everything else was processed before.
        for (offset, line) in replacement.iter().enumerate() {
            Tokenizer::new(line, start_row + offset)?;
        }

        let edit = Edit::new(start_row, end_row - start_row + 1, replacement.len());
        self.lines.splice(start_row..=end_row, replacement);

        let prior = std::mem::take(&mut self.elements);
        match update(prior, &self.lines, &[edit], vocabulary, self.file.as_deref()) {
            Ok(elements) => self.elements = elements,
            Err(e) => {
                log::warn!(
                    "Incremental update failed ({}); reprocessing all {} lines",
                    e,
                    self.lines.len()
                );
                self.revalidate(vocabulary)?;
            }
        }
        Ok(edit)
    }
}

/// Byte index of char `column` in `line`, clamped to the line end
fn byte_offset(line: &str, column: usize) -> usize {
    line.char_indices()
        .nth(column)
        .map_or(line.len(), |(index, _)| index)
}
