use anyhow::Result;
use std::thread;
use std::time::Duration;
use tokio::io::{stdin, stdout};
use tower_lsp::{LspService, Server};

use crate::lsp::backend::Backend;
use crate::vocabulary::{VocabularyManager, VocabularySource};
use crate::Config;

/// Start the LSP server on stdio
pub async fn serve(config: Config) -> Result<()> {
    let mut vocabulary = VocabularyManager::new(VocabularySource::from_config(&config));
    vocabulary.initialize().await?;

    // Under the integration test, exit after a short delay so the test can read stdout to EOF.
    if std::env::var("FILTER_LS_TEST_EXIT").as_deref() == Ok("1") {
        thread::spawn(|| {
            thread::sleep(Duration::from_secs(1));
            std::process::exit(0);
        });
    }

    log::info!("Starting filter language server");
    let (service, socket) =
        LspService::build(move |client| Backend::new(client, config, vocabulary)).finish();

    Server::new(stdin(), stdout(), socket).serve(service).await;

    Ok(())
}
