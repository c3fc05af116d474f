//! Validation Engine
//!
//! Full-document passes and incremental reprocessing of edited lines.

pub mod engine;
pub mod incremental;

pub use engine::{ValidationSummary, messages, summarize, validate_document, validate_lines};
pub use incremental::{Edit, update};
