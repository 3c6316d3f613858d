//! services/client/src/bin/pdf_chat.rs

use client_lib::{
    adapters::{HttpDocumentService, HttpPdfRenderer},
    config::Config,
    error::ClientError,
    terminal::{LoggingObserver, Terminal},
};
use pdf_chat_core::Workspace;
use std::sync::Arc;
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ClientError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Config::from_env()?;
    // Logs go to stderr so they never interleave with the transcript on stdout.
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
    info!("Configuration loaded. Using backend at {}", config.api_base_url);

    // --- 2. Initialize Service Adapters ---
    let http = reqwest::Client::builder()
        .timeout(config.request_timeout)
        .build()?;
    let service = Arc::new(HttpDocumentService::new(http.clone(), config.api_base_url.clone()));
    let renderer = Arc::new(HttpPdfRenderer::new(http));

    // --- 3. Build the Workspace ---
    let workspace = Workspace::new(service, renderer, Some(Arc::new(LoggingObserver)))
        .with_upload_limit(config.upload_max_bytes);

    // --- 4. Run the Terminal ---
    let input = BufReader::new(tokio::io::stdin());
    Terminal::new(workspace, std::io::stdout()).run(input).await?;
    info!("Goodbye.");
    Ok(())
}
