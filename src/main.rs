use employee_survey::config::Config;
use employee_survey::db::{MemoryStore, PgSurveyStore, SurveyStore};
use employee_survey::state::AppState;
use employee_survey::web;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let store: Arc<dyn SurveyStore> = match &config.database_url {
        Some(database_url) => {
            tracing::info!("Connecting to database...");
            let store = PgSurveyStore::connect(database_url, config.max_connections)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to connect to database: {}", e);
                    e
                })?;
            tracing::info!("Database connection established");

            tracing::info!("Running database migrations...");
            store.migrate().await.map_err(|e| {
                tracing::error!("Failed to run database migrations: {}", e);
                e
            })?;
            tracing::info!("Database migrations completed");
            Arc::new(store)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, survey responses are kept in memory only");
            Arc::new(MemoryStore::new())
        }
    };

    let shared = Arc::new(AppState::new(store));
    let app = web::app(shared);

    tracing::info!("Listening on {}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
