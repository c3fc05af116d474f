//! Validation Messages
//!
//! Structured diagnostics attached to each line element. These carry enough
//! data (excerpt, range, optional fix) to be rendered by a generic linter UI.

use serde::{Deserialize, Serialize};

use crate::core::position::{Range, ShiftRanges};

/// Severity of a validation message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }
}

/// A single suggested replacement of `current_text` by `replace_with` over
/// the message's range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Solution {
    pub current_text: String,
    pub replace_with: String,
}

/// A diagnostic produced while processing one line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationMessage {
    pub excerpt: String,
    pub description: Option<String>,
    pub severity: Severity,
    pub range: Range,
    pub file: Option<String>,
    pub solution: Option<Solution>,
}

impl ValidationMessage {
    pub fn new(severity: Severity, excerpt: impl Into<String>, range: Range) -> Self {
        Self {
            excerpt: excerpt.into(),
            description: None,
            severity,
            range,
            file: None,
            solution: None,
        }
    }

    pub fn error(excerpt: impl Into<String>, range: Range) -> Self {
        Self::new(Severity::Error, excerpt, range)
    }

    pub fn warning(excerpt: impl Into<String>, range: Range) -> Self {
        Self::new(Severity::Warning, excerpt, range)
    }

    pub fn info(excerpt: impl Into<String>, range: Range) -> Self {
        Self::new(Severity::Info, excerpt, range)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_solution(
        mut self,
        current_text: impl Into<String>,
        replace_with: impl Into<String>,
    ) -> Self {
        self.solution = Some(Solution {
            current_text: current_text.into(),
            replace_with: replace_with.into(),
        });
        self
    }

    pub fn with_file(mut self, file: Option<&str>) -> Self {
        self.file = file.map(str::to_string);
        self
    }
}

impl ShiftRanges for ValidationMessage {
    fn shift_rows(&mut self, delta: isize) {
        self.range.shift_rows(delta);
    }
}

/// The messages of one line element, bucketed by severity
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Messages {
    pub errors: Vec<ValidationMessage>,
    pub warnings: Vec<ValidationMessage>,
    pub info: Vec<ValidationMessage>,
}

impl Messages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: ValidationMessage) {
        match message.severity {
            Severity::Error => self.errors.push(message),
            Severity::Warning => self.warnings.push(message),
            Severity::Info => self.info.push(message),
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty() && self.info.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len() + self.warnings.len() + self.info.len()
    }

    /// All messages, errors first.
    pub fn iter(&self) -> impl Iterator<Item = &ValidationMessage> {
        self.errors
            .iter()
            .chain(self.warnings.iter())
            .chain(self.info.iter())
    }
}

impl ShiftRanges for Messages {
    fn shift_rows(&mut self, delta: isize) {
        self.errors.shift_rows(delta);
        self.warnings.shift_rows(delta);
        self.info.shift_rows(delta);
    }
}
