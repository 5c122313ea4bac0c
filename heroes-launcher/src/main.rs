mod cli;

use axum::Router;
use backend::AppState;
use backend::config::Settings;
use backend::dbs::{HeroStore, SqliteHeroStore, read_seed};
use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv_override().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = cli::Cli::parse();
    let settings = cli.apply(Settings::from_env()?);

    let store = Arc::new(SqliteHeroStore::new(settings.database_path.clone()));
    let seed = read_seed(&cli.seed).await?;
    store.reload(&seed).await?;

    let state = AppState::from_settings(settings, store);
    let router = backend::init(Router::new(), state);

    let addr = format!("{}:{}", cli.host, cli.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, router).await?;
    Ok(())
}
