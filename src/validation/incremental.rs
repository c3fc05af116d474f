//! Incremental Reprocessing
//!
//! Re-validates only the lines touched by buffer edits. Untouched elements
//! are moved into the new array with their rows shifted by the net line
//! delta of the edits before them.

use crate::core::position::ShiftRanges;
use crate::error::ReprocessError;
use crate::parser::{LineElement, process_line};
use crate::vocabulary::Vocabulary;

/// One buffer change, in line counts.
///
/// `start` is a row of the current buffer. `old_extent` lines starting there
/// were replaced by `new_extent` lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edit {
    pub start: usize,
    pub old_extent: usize,
    pub new_extent: usize,
}

impl Edit {
    pub fn new(start: usize, old_extent: usize, new_extent: usize) -> Self {
        Self {
            start,
            old_extent,
            new_extent,
        }
    }

    /// Build an edit from row deltas, as editors report them: a change
    /// confined to one line has deltas of 0 and covers one line.
    pub fn from_row_deltas(start: usize, old_rows: usize, new_rows: usize) -> Self {
        Self::new(start, old_rows + 1, new_rows + 1)
    }

    /// Net change in line count
    pub fn delta(&self) -> isize {
        self.new_extent as isize - self.old_extent as isize
    }
}

/// Apply `edits` to `prior`, the elements of the buffer before the edits.
///
/// Edits must be sorted by `start` and must not overlap. The result always
/// has exactly `buffer_lines.len()` elements.
pub fn update<S: AsRef<str>>(
    prior: Vec<LineElement>,
    buffer_lines: &[S],
    edits: &[Edit],
    vocabulary: &Vocabulary,
    file: Option<&str>,
) -> Result<Vec<LineElement>, ReprocessError> {
    let prior_len = prior.len();
    let net_delta: isize = edits.iter().map(Edit::delta).sum();
    if prior_len as isize + net_delta != buffer_lines.len() as isize {
        return Err(ReprocessError::StaleElements {
            elements: prior_len,
            lines: buffer_lines.len(),
            delta: net_delta,
        });
    }

    let mut result = Vec::with_capacity(buffer_lines.len());
    let mut prior = prior.into_iter();
    let mut old_cursor = 0usize;
    let mut shift = 0isize;
    let mut reprocessed = 0usize;

    for (index, edit) in edits.iter().enumerate() {
        let invalid = || ReprocessError::InvalidEdit {
            index,
            start: edit.start,
            old_extent: edit.old_extent,
            new_extent: edit.new_extent,
        };

        let old_start = usize::try_from(edit.start as isize - shift).map_err(|_| invalid())?;
        if old_start < old_cursor
            || old_start + edit.old_extent > prior_len
            || edit.start + edit.new_extent > buffer_lines.len()
        {
            return Err(invalid());
        }

        for mut element in prior.by_ref().take(old_start - old_cursor) {
            element.shift_rows(shift);
            result.push(element);
        }
        prior.by_ref().take(edit.old_extent).for_each(drop);

        for row in edit.start..edit.start + edit.new_extent {
            result.push(process_line(buffer_lines[row].as_ref(), row, vocabulary, file)?);
        }

        reprocessed += edit.new_extent;
        old_cursor = old_start + edit.old_extent;
        shift += edit.delta();
    }

    for mut element in prior {
        element.shift_rows(shift);
        result.push(element);
    }

    if result.len() != buffer_lines.len() {
        return Err(ReprocessError::LengthMismatch {
            expected: buffer_lines.len(),
            actual: result.len(),
        });
    }

    log::debug!(
        "reprocessed {} of {} lines for {} edit(s), net shift {}",
        reprocessed,
        result.len(),
        edits.len(),
        shift
    );
    Ok(result)
}
