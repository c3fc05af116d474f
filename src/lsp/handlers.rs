use std::collections::HashMap;
use std::sync::Arc;

use tower_lsp::jsonrpc::Result as LspResult;
use tower_lsp::lsp_types::*;

use crate::core::{FilterDocument, Severity, ValidationMessage};
use crate::lsp::backend::Backend;
use crate::lsp::document::DocumentState;
use crate::parser::{ElementKind, LineElement, RuleName, RuleType, RuleValue};
use crate::vocabulary::Vocabulary;

/// Source tag on every published diagnostic
pub const DIAGNOSTIC_SOURCE: &str = "filter-ls";

/// Trait for handling hover requests
#[tower_lsp::async_trait]
pub trait HandleHover {
    async fn handle_hover(&self, params: HoverParams) -> LspResult<Option<Hover>>;
}

/// Trait for handling document symbols
#[tower_lsp::async_trait]
pub trait HandleDocumentSymbol {
    async fn handle_document_symbol(
        &self,
        params: DocumentSymbolParams,
    ) -> LspResult<Option<DocumentSymbolResponse>>;
}

/// Trait for handling quick fixes
#[tower_lsp::async_trait]
pub trait HandleCodeAction {
    async fn handle_code_action(
        &self,
        params: CodeActionParams,
    ) -> LspResult<Option<CodeActionResponse>>;
}

/// Trait for keeping documents in sync with the client
#[tower_lsp::async_trait]
pub trait HandleTextSync {
    async fn open_document(&self, uri: Url, text: String, version: i32);
    async fn apply_changes(
        &self,
        uri: Url,
        changes: Vec<TextDocumentContentChangeEvent>,
        version: i32,
    );
    async fn close_document(&self, uri: Url);
}

/// Trait for handling diagnostics
#[tower_lsp::async_trait]
pub trait HandleDiagnostics {
    async fn publish_diagnostics(&self, uri: Url);
    async fn revalidate_documents(&self, vocabulary: Arc<Vocabulary>);
}

#[tower_lsp::async_trait]
impl HandleHover for Backend {
    async fn handle_hover(&self, params: HoverParams) -> LspResult<Option<Hover>> {
        let tdpp = params.text_document_position_params;
        let uri = tdpp.text_document.uri;

        let vocabulary = self.current_vocabulary().await;
        let docs = self.documents.lock().await;
        let doc_state = match docs.get(&uri) {
            Some(state) => state,
            None => return Ok(None),
        };

        let position = doc_state.filter_position(tdpp.position);
        let Some(element) = doc_state.document.element(position.row) else {
            return Ok(None);
        };

        Ok(hover_text(element, position.column, &vocabulary).map(|(text, range)| Hover {
            contents: HoverContents::Markup(MarkupContent {
                kind: MarkupKind::Markdown,
                value: text,
            }),
            range: Some(doc_state.lsp_range(range)),
        }))
    }
}

/// Markdown for the keyword or sound id under `column`, with the hovered range
pub fn hover_text(
    element: &LineElement,
    column: usize,
    vocabulary: &Vocabulary,
) -> Option<(String, crate::core::Range)> {
    let on = |range: &crate::core::Range| range.start.column <= column && column <= range.end.column;

    match &element.kind {
        ElementKind::Block(block) if on(&block.keyword) => {
            let verb = match block.block_type {
                crate::parser::BlockType::Show => "shown",
                crate::parser::BlockType::Hide => "hidden",
            };
            let text = format!(
                "**{}** block\n\nItems matching every filter rule below are {}.",
                block.block_type.keyword(),
                verb
            );
            Some((text, block.keyword))
        }
        ElementKind::Rule(rule) => {
            if on(&rule.keyword) {
                let kind = match rule.rule_type() {
                    RuleType::Filter => "filter",
                    RuleType::Action => "action",
                };
                let mut text = format!(
                    "**{}** ({} rule)\n\nAccepts: {}",
                    rule.name.keyword(),
                    kind,
                    rule.name.value_summary()
                );
                if let Some(note) = sound_note(&rule.value, vocabulary) {
                    text.push_str("\n\n");
                    text.push_str(&note);
                }
                return Some((text, rule.keyword));
            }

            match &rule.value {
                RuleValue::Sound(sound) if on(&sound.id.range) => {
                    sound_note(&rule.value, vocabulary).map(|note| (note, sound.id.range))
                }
                _ => None,
            }
        }
        _ => None,
    }
}

fn sound_note(value: &RuleValue, vocabulary: &Vocabulary) -> Option<String> {
    let RuleValue::Sound(sound) = value else {
        return None;
    };
    let key = sound.id.value.vocabulary_key();
    let state = if vocabulary.has_sound(&key) {
        "is available"
    } else {
        "is not in the loaded sound list"
    };
    Some(format!("Sound `{}` {}", key, state))
}

#[tower_lsp::async_trait]
impl HandleDocumentSymbol for Backend {
    async fn handle_document_symbol(
        &self,
        params: DocumentSymbolParams,
    ) -> LspResult<Option<DocumentSymbolResponse>> {
        let uri = params.text_document.uri;

        let docs = self.documents.lock().await;
        let doc_state = match docs.get(&uri) {
            Some(state) => state,
            None => return Ok(None),
        };

        Ok(Some(DocumentSymbolResponse::Nested(document_symbols(doc_state))))
    }
}

/// One symbol per block spanning up to the next block, rules as children.
/// Rules before the first block are top-level symbols.
pub fn document_symbols(doc_state: &DocumentState) -> Vec<DocumentSymbol> {
    let document = &doc_state.document;
    let elements = document.elements();
    let block_rows: Vec<usize> = elements
        .iter()
        .filter(|element| element.block().is_some())
        .map(LineElement::row)
        .collect();

    let mut symbols = Vec::new();
    let mut current: Option<DocumentSymbol> = None;

    for element in elements {
        if let Some(block) = element.block() {
            if let Some(done) = current.take() {
                symbols.push(done);
            }

            let row = element.row();
            let last_row = block_rows
                .iter()
                .find(|&&next| next > row)
                .map_or(elements.len().saturating_sub(1), |next| next - 1);
            let end_column = document.line(last_row).map_or(0, |line| line.chars().count());
            let range = crate::core::Range::new(
                element.range.start,
                crate::core::Position::new(last_row, end_column),
            );

            #[allow(deprecated)]
            let symbol = DocumentSymbol {
                name: block.block_type.keyword().to_string(),
                detail: block
                    .trailing_comment
                    .as_ref()
                    .map(|comment| comment.value.trim().to_string())
                    .filter(|detail| !detail.is_empty()),
                kind: SymbolKind::NAMESPACE,
                tags: None,
                deprecated: None,
                range: doc_state.lsp_range(range),
                selection_range: doc_state.lsp_range(block.keyword),
                children: Some(Vec::new()),
            };
            current = Some(symbol);
            continue;
        }

        let Some(rule) = element.rule() else {
            continue;
        };
        let symbol = rule_symbol(doc_state, element, rule.name, rule.rule_type(), rule.keyword);
        match current.as_mut().and_then(|block| block.children.as_mut()) {
            Some(children) => children.push(symbol),
            None => symbols.push(symbol),
        }
    }

    if let Some(done) = current {
        symbols.push(done);
    }
    symbols
}

fn rule_symbol(
    doc_state: &DocumentState,
    element: &LineElement,
    name: RuleName,
    rule_type: RuleType,
    keyword: crate::core::Range,
) -> DocumentSymbol {
    let detail = doc_state
        .document
        .line(element.row())
        .map(|line| {
            let rest: String = line.chars().skip(keyword.end.column).collect();
            rest.split('#').next().unwrap_or_default().trim().to_string()
        })
        .filter(|value| !value.is_empty());

    #[allow(deprecated)]
    DocumentSymbol {
        name: name.keyword().to_string(),
        detail,
        kind: match rule_type {
            RuleType::Filter => SymbolKind::PROPERTY,
            RuleType::Action => SymbolKind::EVENT,
        },
        tags: None,
        deprecated: None,
        range: doc_state.lsp_range(element.range),
        selection_range: doc_state.lsp_range(keyword),
        children: None,
    }
}

#[tower_lsp::async_trait]
impl HandleCodeAction for Backend {
    async fn handle_code_action(
        &self,
        params: CodeActionParams,
    ) -> LspResult<Option<CodeActionResponse>> {
        let uri = params.text_document.uri;

        let docs = self.documents.lock().await;
        let doc_state = match docs.get(&uri) {
            Some(state) => state,
            None => return Ok(None),
        };

        let requested = doc_state.filter_range(params.range);
        let actions = quick_fixes(&uri, doc_state, requested);
        Ok((!actions.is_empty()).then_some(actions))
    }
}

/// Quick fixes for every message with a solution that overlaps `requested`
pub fn quick_fixes(
    uri: &Url,
    doc_state: &DocumentState,
    requested: crate::core::Range,
) -> Vec<CodeActionOrCommand> {
    doc_state
        .document
        .messages()
        .filter(|message| overlaps(message.range, requested))
        .filter_map(|message| {
            let solution = message.solution.as_ref()?;
            let title = if solution.replace_with.is_empty() {
                format!("Remove \"{}\"", solution.current_text)
            } else {
                format!(
                    "Replace \"{}\" with \"{}\"",
                    solution.current_text, solution.replace_with
                )
            };
            let edit = TextEdit::new(
                doc_state.lsp_range(message.range),
                solution.replace_with.clone(),
            );

            Some(CodeActionOrCommand::CodeAction(CodeAction {
                title,
                kind: Some(CodeActionKind::QUICKFIX),
                diagnostics: Some(vec![lsp_diagnostic(doc_state, message)]),
                edit: Some(WorkspaceEdit {
                    changes: Some(HashMap::from([(uri.clone(), vec![edit])])),
                    ..Default::default()
                }),
                is_preferred: Some(true),
                ..Default::default()
            }))
        })
        .collect()
}

fn overlaps(a: crate::core::Range, b: crate::core::Range) -> bool {
    a.start <= b.end && b.start <= a.end
}

#[tower_lsp::async_trait]
impl HandleTextSync for Backend {
    async fn open_document(&self, uri: Url, text: String, version: i32) {
        let vocabulary = self.current_vocabulary().await;
        let file = Some(uri.to_string());

        let opened =
            tokio::task::spawn_blocking(move || FilterDocument::open(&text, &vocabulary, file))
                .await;

        let document = match opened {
            Ok(Ok(document)) => document,
            Ok(Err(e)) => {
                log::error!("Failed to process {}: {}", uri, e);
                return;
            }
            Err(e) => {
                log::error!("Validation task for {} failed: {}", uri, e);
                return;
            }
        };
        log::debug!("Opened {} ({} lines)", uri, document.lines().len());

        let mut docs = self.documents.lock().await;
        docs.insert(uri.clone(), DocumentState::new(document, Some(version)));
        drop(docs); // Release the lock before calling publish_diagnostics

        self.publish_diagnostics(uri).await;
    }

    async fn apply_changes(
        &self,
        uri: Url,
        changes: Vec<TextDocumentContentChangeEvent>,
        version: i32,
    ) {
        let vocabulary = self.current_vocabulary().await;

        let mut docs = self.documents.lock().await;
        let Some(doc_state) = docs.get_mut(&uri) else {
            log::warn!("Change for unknown document {}", uri);
            return;
        };

        for change in changes {
            let result = match change.range {
                Some(range) => {
                    let range = doc_state.filter_range(range);
                    doc_state
                        .document
                        .edit(range, &change.text, &vocabulary)
                        .map(|edit| log::debug!("Applied {:?} to {}", edit, uri))
                }
                None => doc_state.document.replace_all(&change.text, &vocabulary),
            };
            if let Err(e) = result {
                log::error!("Failed to process change to {}: {}", uri, e);
            }
        }
        doc_state.version = Some(version);
        drop(docs);

        self.publish_diagnostics(uri).await;
    }

    async fn close_document(&self, uri: Url) {
        self.documents.lock().await.remove(&uri);
        self.client.publish_diagnostics(uri, Vec::new(), None).await;
    }
}

#[tower_lsp::async_trait]
impl HandleDiagnostics for Backend {
    /// Publish diagnostics for a document
    async fn publish_diagnostics(&self, uri: Url) {
        let docs = self.documents.lock().await;
        let doc_state = match docs.get(&uri) {
            Some(state) => state,
            None => return,
        };

        let diagnostics: Vec<Diagnostic> = doc_state
            .document
            .messages()
            .map(|message| lsp_diagnostic(doc_state, message))
            .collect();
        let version = doc_state.version;
        drop(docs);

        self.client
            .publish_diagnostics(uri, diagnostics, version)
            .await;
    }

    /// Full pass over every open document with a new vocabulary
    async fn revalidate_documents(&self, vocabulary: Arc<Vocabulary>) {
        let uris: Vec<Url> = {
            let mut docs = self.documents.lock().await;
            for (uri, doc_state) in docs.iter_mut() {
                if let Err(e) = doc_state.document.revalidate(&vocabulary) {
                    log::error!("Failed to revalidate {}: {}", uri, e);
                }
            }
            docs.keys().cloned().collect()
        };

        self.client
            .log_message(
                MessageType::INFO,
                format!("Vocabulary reloaded, revalidated {} documents", uris.len()),
            )
            .await;
        for uri in uris {
            self.publish_diagnostics(uri).await;
        }
    }
}

/// Convert a validation message to an LSP diagnostic
pub fn lsp_diagnostic(doc_state: &DocumentState, message: &ValidationMessage) -> Diagnostic {
    let severity = match message.severity {
        Severity::Error => DiagnosticSeverity::ERROR,
        Severity::Warning => DiagnosticSeverity::WARNING,
        Severity::Info => DiagnosticSeverity::INFORMATION,
    };
    let text = match &message.description {
        Some(description) => format!("{}: {}", message.excerpt, description),
        None => message.excerpt.clone(),
    };

    Diagnostic {
        range: doc_state.lsp_range(message.range),
        severity: Some(severity),
        source: Some(DIAGNOSTIC_SOURCE.to_string()),
        message: text,
        data: message
            .solution
            .as_ref()
            .and_then(|solution| serde_json::to_value(solution).ok()),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Range, Solution};

    fn state(text: &str) -> DocumentState {
        let document = FilterDocument::open(text, &Vocabulary::new(), None).expect("open");
        DocumentState::new(document, Some(1))
    }

    #[test]
    fn test_lsp_diagnostic_carries_solution() {
        let doc_state = state("ItemLevel 101");
        let message = doc_state.document.messages().next().expect("message");
        let diagnostic = lsp_diagnostic(&doc_state, message);

        assert_eq!(diagnostic.severity, Some(DiagnosticSeverity::ERROR));
        assert_eq!(diagnostic.source.as_deref(), Some(DIAGNOSTIC_SOURCE));
        assert_eq!(
            diagnostic.range,
            tower_lsp::lsp_types::Range::new(Position::new(0, 10), Position::new(0, 13))
        );
        let solution: Solution =
            serde_json::from_value(diagnostic.data.expect("data")).expect("solution");
        assert_eq!(solution.replace_with, "100");
    }

    #[test]
    fn test_quick_fix_for_unknown_keyword() {
        let doc_state = state("Show\nsetfontsize 30");
        let uri = Url::parse("file:///tmp/a.filter").expect("uri");
        let actions = quick_fixes(&uri, &doc_state, Range::on_row(1, 0, 0));
        assert_eq!(actions.len(), 1);

        let CodeActionOrCommand::CodeAction(action) = &actions[0] else {
            panic!("Expected code action");
        };
        assert_eq!(action.kind, Some(CodeActionKind::QUICKFIX));
        let edits = &action.edit.as_ref().expect("edit").changes.as_ref().expect("changes")[&uri];
        assert_eq!(edits[0].new_text, "SetFontSize");

        assert!(quick_fixes(&uri, &doc_state, Range::on_row(0, 0, 4)).is_empty());
    }

    #[test]
    fn test_document_symbols_nest_rules_under_blocks() {
        let doc_state = state("# header\nShow # currency\n\tClass Currency\n\n\tSetFontSize 40\nHide\n\tItemLevel < 10\n");
        let symbols = document_symbols(&doc_state);
        assert_eq!(symbols.len(), 2);

        assert_eq!(symbols[0].name, "Show");
        assert_eq!(symbols[0].detail.as_deref(), Some("currency"));
        assert_eq!(symbols[0].range.start.line, 1);
        assert_eq!(symbols[0].range.end.line, 4);
        let children = symbols[0].children.as_ref().expect("children");
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].kind, SymbolKind::PROPERTY);
        assert_eq!(children[0].detail.as_deref(), Some("Currency"));
        assert_eq!(children[1].kind, SymbolKind::EVENT);

        assert_eq!(symbols[1].name, "Hide");
        assert_eq!(symbols[1].range.end.line, 7);
    }

    #[test]
    fn test_hover_on_keyword_and_sound() {
        let doc_state = state("PlayAlertSound 17");
        let vocabulary = Vocabulary::new();
        let element = &doc_state.document.elements()[0];
        // Out-of-range sound id leaves no sound value to describe.
        let (text, range) = hover_text(element, 3, &vocabulary).expect("hover");
        assert!(text.contains("**PlayAlertSound** (action rule)"));
        assert_eq!(range, Range::on_row(0, 0, 14));

        let doc_state = state("PlayAlertSound orb 200");
        let element = &doc_state.document.elements()[0];
        let (text, _) = hover_text(element, 16, &vocabulary).expect("hover");
        assert_eq!(text, "Sound `orb` is not in the loaded sound list");

        let doc_state = state("Quality 5");
        assert!(hover_text(&doc_state.document.elements()[0], 9, &vocabulary).is_none());
    }
}
