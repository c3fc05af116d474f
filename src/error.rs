//! Contract and consistency errors.
//!
//! Malformed filter text is never an error here: it becomes diagnostics on a
//! line element. These types are reserved for callers breaking the parser's
//! contract and for the reprocessor detecting its own inconsistency.

use thiserror::Error;

/// Misuse of the tokenizer or line processor
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The tokenizer only ever sees one line at a time.
    #[error("line {row} contains a line break; the tokenizer accepts a single line")]
    MultiLineInput { row: usize },

    /// `parse_comment` was called while the remaining text is not a comment.
    #[error("no comment to consume on line {row} at column {column}")]
    NoComment { row: usize, column: usize },
}

/// Failure of an incremental update
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReprocessError {
    /// The prior element array cannot belong to the buffer being edited.
    #[error(
        "element array is stale: {elements} elements cannot become {lines} lines with a net change of {delta}"
    )]
    StaleElements {
        elements: usize,
        lines: usize,
        delta: isize,
    },

    /// An edit overlaps a previous one, runs backwards, or reaches past the
    /// prior elements or the current buffer.
    #[error("edit #{index} (start {start}, old {old_extent}, new {new_extent}) is out of order or out of bounds")]
    InvalidEdit {
        index: usize,
        start: usize,
        old_extent: usize,
        new_extent: usize,
    },

    /// The spliced result does not match the buffer's line count.
    #[error("reprocessed {actual} elements for a buffer of {expected} lines")]
    LengthMismatch { expected: usize, actual: usize },

    #[error(transparent)]
    Parse(#[from] ParseError),
}
