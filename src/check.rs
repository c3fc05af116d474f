//! Check Mode
//!
//! Validate one filter file from the command line and print its diagnostics.

use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;

use crate::core::ValidationMessage;
use crate::parser::LineElement;
use crate::validation::{messages, summarize, validate_document};
use crate::vocabulary::VocabularySource;
use crate::Config;

/// One diagnostic as `file:row:col: severity: excerpt`, 1-based
pub fn format_message(file: &str, message: &ValidationMessage) -> String {
    let mut line = format!(
        "{}:{}:{}: {}: {}",
        file,
        message.range.start.row + 1,
        message.range.start.column + 1,
        message.severity.as_str(),
        message.excerpt
    );
    if let Some(description) = &message.description {
        line.push_str(" (");
        line.push_str(description);
        line.push(')');
    }
    line
}

/// Write every diagnostic of `elements`; returns whether any was an error.
pub fn report(file: &str, elements: &[LineElement], out: &mut impl Write) -> Result<bool> {
    for message in messages(elements) {
        writeln!(out, "{}", format_message(file, message))?;
    }
    Ok(!summarize(elements).is_valid())
}

/// Check `path` with the configured vocabulary. Returns `true` when the
/// file has no errors.
pub async fn check_file(config: &Config, path: &Path) -> Result<bool> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read filter file: {}", path.display()))?;
    let vocabulary = VocabularySource::from_config(config).load().await;

    let file = path.display().to_string();
    let elements = validate_document(&content, &vocabulary, Some(&file))
        .with_context(|| format!("Failed to process {}", file))?;

    let summary = summarize(&elements);
    let has_errors = report(&file, &elements, &mut std::io::stdout().lock())?;
    log::info!(
        "{}: {} errors, {} warnings, {} info",
        file,
        summary.errors,
        summary.warnings,
        summary.info
    );
    Ok(!has_errors)
}
