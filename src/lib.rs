//! Item Filter Language Server
//!
//! Line-oriented validation of item filter files, with incremental
//! reprocessing of edited lines.
//!
//! This library provides:
//! - A single-line tokenizer and line element processor
//! - Full-document and incremental validation
//! - Vocabulary loading with live reload
//! - LSP protocol implementation and a command-line checker

pub mod check;
pub mod config;
pub mod core;
pub mod error;
pub mod lsp;
pub mod parser;
pub mod validation;
pub mod vocabulary;

// Re-exports for the public API
pub use config::Config;
pub use crate::core::{FilterDocument, Severity, ValidationMessage};
pub use error::{ParseError, ReprocessError};
pub use parser::{LineElement, Tokenizer, process_line, process_lines};
pub use validation::{Edit, update, validate_document};
pub use vocabulary::Vocabulary;
