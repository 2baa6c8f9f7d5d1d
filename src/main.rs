use std::sync::Arc;

use boardbot::board::TrelloClient;
use boardbot::config::Config;
use boardbot::dedup::FileStore;
use boardbot::dispatch::Dispatcher;
use boardbot::server::app_router;
use boardbot::slack::SlackClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = Config::from_env().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    });

    eprintln!("🤖 boardbot v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Webhook: http://0.0.0.0:{}/slack/events", config.port);
    eprintln!("   Processed-event log: {}", config.processed_path);

    let board = Arc::new(TrelloClient::new(
        config.trello.clone(),
        config.lists.clone(),
    ));
    let store = Arc::new(FileStore::new(&config.processed_path));
    let notifier = Arc::new(SlackClient::new(config.slack.clone()));

    let dispatcher = Arc::new(Dispatcher::new(board, store, notifier));
    let app = app_router(dispatcher);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    tracing::info!(port = config.port, "Webhook server started");
    axum::serve(listener, app).await?;

    Ok(())
}
