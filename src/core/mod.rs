//! Core Types
//!
//! Positions, diagnostics and per-document state shared by the parser, the
//! validation engine and the language server.

pub mod diagnostics;
pub mod document;
pub mod position;

pub use diagnostics::{Messages, Severity, Solution, ValidationMessage};
pub use document::FilterDocument;
pub use position::{Position, Range, ShiftRanges};
