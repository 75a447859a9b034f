//! Binary entry: environment, logging, database bootstrap, serve.

use persons_service::{
    app, apply_migrations, ensure_database_exists, AppState, PersonStore, ServiceConfig,
};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("persons_service=info".parse()?),
        )
        .init();

    let config = ServiceConfig::from_env();
    ensure_database_exists(&config.database_url).await?;
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await?;
    apply_migrations(&pool).await?;

    let state = AppState::new(PersonStore::new(pool));
    let listener = TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app(state)).await?;
    Ok(())
}
