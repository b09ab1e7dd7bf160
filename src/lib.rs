pub mod api;
pub mod assistant;
pub mod config;
pub mod extraction;
pub mod fields;
pub mod prompt;
pub mod report;
pub mod session;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::assistant::GeminiClient;
use crate::session::SessionStore;

/// Initialize logging, load configuration, and serve the API until Ctrl-C.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let cfg = config::Config::from_env()?;
    let assistant = Arc::new(GeminiClient::from_config(&cfg));
    let sessions = SessionStore::from_config(&cfg);

    let mut server = api::start_server(cfg.bind_addr, sessions, assistant).await?;
    tracing::info!(addr = %server.addr, model = %cfg.model, "ready");

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutting down");
    server.shutdown();

    Ok(())
}
