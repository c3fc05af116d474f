use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer};

use crate::lsp::document::DocumentState;
use crate::lsp::handlers::{
    HandleCodeAction, HandleDiagnostics, HandleDocumentSymbol, HandleHover, HandleTextSync,
};
use crate::vocabulary::{Vocabulary, VocabularyManager};
use crate::Config;

/// The main LSP backend that holds state and implements the Language Server Protocol
#[derive(Clone)]
pub struct Backend {
    pub client: Client,
    pub vocabulary: Arc<Mutex<VocabularyManager>>,
    pub documents: Arc<Mutex<HashMap<Url, DocumentState>>>,
    pub config: Config,
}

impl Backend {
    pub fn new(client: Client, config: Config, vocabulary: VocabularyManager) -> Self {
        Self {
            client,
            vocabulary: Arc::new(Mutex::new(vocabulary)),
            documents: Arc::new(Mutex::new(HashMap::new())),
            config,
        }
    }

    pub async fn current_vocabulary(&self) -> Arc<Vocabulary> {
        self.vocabulary.lock().await.current().await
    }

    /// Watch the vocabulary data and revalidate open documents on change
    async fn start_vocabulary_watch(&self) {
        let updates = match self.vocabulary.lock().await.watch().await {
            Ok(updates) => updates,
            Err(e) => {
                log::error!("Failed to watch vocabulary data: {:#}", e);
                self.client
                    .log_message(
                        MessageType::ERROR,
                        format!("Failed to watch vocabulary data: {}", e),
                    )
                    .await;
                return;
            }
        };

        if let Some(mut updates) = updates {
            let backend = self.clone();
            tokio::spawn(async move {
                while let Some(vocabulary) = updates.recv().await {
                    backend.revalidate_documents(vocabulary).await;
                }
            });
        }
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(
        &self,
        _: InitializeParams,
    ) -> tower_lsp::jsonrpc::Result<InitializeResult> {
        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                hover_provider: Some(HoverProviderCapability::Simple(true)),
                document_symbol_provider: Some(OneOf::Left(true)),
                code_action_provider: Some(CodeActionProviderCapability::Options(
                    CodeActionOptions {
                        code_action_kinds: Some(vec![CodeActionKind::QUICKFIX]),
                        ..Default::default()
                    },
                )),
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::INCREMENTAL,
                )),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: "filter-ls".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        self.start_vocabulary_watch().await;
        self.client
            .log_message(MessageType::INFO, "filter-language-server initialized")
            .await;
    }

    async fn shutdown(&self) -> tower_lsp::jsonrpc::Result<()> {
        Ok(())
    }

    async fn hover(&self, params: HoverParams) -> tower_lsp::jsonrpc::Result<Option<Hover>> {
        self.handle_hover(params).await
    }

    async fn document_symbol(
        &self,
        params: DocumentSymbolParams,
    ) -> tower_lsp::jsonrpc::Result<Option<DocumentSymbolResponse>> {
        self.handle_document_symbol(params).await
    }

    async fn code_action(
        &self,
        params: CodeActionParams,
    ) -> tower_lsp::jsonrpc::Result<Option<CodeActionResponse>> {
        self.handle_code_action(params).await
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let document = params.text_document;
        self.open_document(document.uri, document.text, document.version)
            .await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let document = params.text_document;
        self.apply_changes(document.uri, params.content_changes, document.version)
            .await;
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        self.close_document(params.text_document.uri).await;
    }
}
