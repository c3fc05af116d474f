//! Validation Engine
//!
//! Full-document passes over filter text, plus helpers for reading the
//! diagnostics back out of a processed document.

use crate::core::diagnostics::{Severity, ValidationMessage};
use crate::error::ParseError;
use crate::parser::{LineElement, process_lines};
use crate::vocabulary::Vocabulary;

/// Message counts of a processed document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationSummary {
    pub errors: usize,
    pub warnings: usize,
    pub info: usize,
    pub invalid_lines: usize,
}

impl ValidationSummary {
    pub fn is_valid(&self) -> bool {
        self.errors == 0
    }
}

/// Validate already-split lines, starting at row 0.
pub fn validate_lines<S: AsRef<str>>(
    lines: &[S],
    vocabulary: &Vocabulary,
    file: Option<&str>,
) -> Result<Vec<LineElement>, ParseError> {
    let elements = process_lines(lines.iter().map(AsRef::as_ref), 0, vocabulary, file)?;
    log::debug!(
        "validated {} lines{}",
        elements.len(),
        file.map(|f| format!(" of {}", f)).unwrap_or_default()
    );
    Ok(elements)
}

/// Validate a whole document. Lines are split like [`str::lines`]: a final
/// line break does not open another line.
pub fn validate_document(
    content: &str,
    vocabulary: &Vocabulary,
    file: Option<&str>,
) -> Result<Vec<LineElement>, ParseError> {
    let lines: Vec<&str> = content.lines().collect();
    validate_lines(&lines, vocabulary, file)
}

/// Every message of every element, in line order
pub fn messages(elements: &[LineElement]) -> impl Iterator<Item = &ValidationMessage> {
    elements.iter().flat_map(|element| element.messages.iter())
}

pub fn summarize(elements: &[LineElement]) -> ValidationSummary {
    let mut summary = ValidationSummary::default();
    for element in elements {
        if element.invalid {
            summary.invalid_lines += 1;
        }
        for message in element.messages.iter() {
            match message.severity {
                Severity::Error => summary.errors += 1,
                Severity::Warning => summary.warnings += 1,
                Severity::Info => summary.info += 1,
            }
        }
    }
    summary
}
