use anyhow::Result;
use filter_language_server::{Config, check, lsp::server::serve};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_args_and_env()?;

    // Logs go to stderr; stdout carries the LSP transport.
    env_logger::Builder::new()
        .parse_filters(&config.log_level)
        .parse_default_env()
        .init();

    if let Some(path) = config.check_file.clone() {
        if !check::check_file(&config, &path).await? {
            std::process::exit(1);
        }
        return Ok(());
    }

    serve(config).await
}
