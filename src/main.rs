use std::sync::Arc;

use fbi_api::{
    app::{self, AppState},
    config::Config,
    db::{self, PgStore},
    services::{email::EmailService, notifier::{ConsoleNotifier, Notifier}, FbiService},
};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Loads .env first, so RUST_LOG may come from there.
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let pool = db::create_pool(&config.database_url, config.db_max_connections).await?;
    db::run_migrations(&pool).await?;
    info!("Database connected and migrations applied");

    let notifier: Arc<dyn Notifier> = match EmailService::new(&config) {
        Some(email) => {
            info!("SMTP email service configured");
            Arc::new(email)
        }
        None => {
            info!("SMTP not configured or NODE_ENV=development, reset codes will be logged to the console");
            Arc::new(ConsoleNotifier)
        }
    };

    let store = Arc::new(PgStore::new(pool.clone()));
    let state = AppState {
        service: FbiService::new(store, notifier),
        db: Some(pool.clone()),
    };
    let app = app::router(state);

    let addr = format!("{}:{}", config.host, config.port);
    info!("FBI API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    info!("Database pool closed");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    info!("Shutdown signal received");
}
