use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use recommendations::{
    api::{create_router, AppState},
    config::Config,
    db::{create_pool, MemoryRecommendationStore, PgRecommendationStore, RecommendationStore},
};

#[derive(Parser, Debug)]
#[command(name = "recommendations")]
#[command(about = "Recommendation REST API service")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Drop and recreate the recommendations table
    DbCreate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "recommendations=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::DbCreate => db_create(config).await,
    }
}

async fn open_store(config: &Config) -> anyhow::Result<Arc<dyn RecommendationStore>> {
    if config.uses_memory_store() {
        tracing::warn!("Using in-memory store; data is lost on exit");
        return Ok(Arc::new(MemoryRecommendationStore::new()));
    }

    let pool = create_pool(&config.database_url, config.database_max_connections)
        .await
        .context("Failed to connect to database")?;
    let store = PgRecommendationStore::new(pool);
    store
        .migrate()
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database schema ready");
    Ok(Arc::new(store))
}

async fn serve(config: Config) -> anyhow::Result<()> {
    let store = open_store(&config).await?;
    tracing::info!(store = store.name(), "Recommendation store opened");

    let app = create_router(AppState::new(store));

    let listener = tokio::net::TcpListener::bind(config.bind_address())
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_address()))?;
    tracing::info!(address = %config.bind_address(), "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn db_create(config: Config) -> anyhow::Result<()> {
    if config.uses_memory_store() {
        tracing::info!("In-memory store needs no schema");
        return Ok(());
    }

    let pool = create_pool(&config.database_url, config.database_max_connections)
        .await
        .context("Failed to connect to database")?;
    PgRecommendationStore::new(pool)
        .recreate_schema()
        .await
        .context("Failed to recreate schema")?;
    tracing::info!("Recommendations table recreated");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
