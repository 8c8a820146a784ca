use anyhow::Context;
use gamenight::{
    build_router,
    evening::{EveningRepository, InMemoryEveningRepository, PostgresEveningRepository},
    stats::{InMemoryUserStatRepository, PostgresUserStatRepository, UserStatRepository},
    AppConfig, AppState, StatsService,
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gamenight=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting game night statistics server");

    let config = AppConfig::from_env().context("Failed to load configuration")?;

    let evening_repository: Arc<dyn EveningRepository + Send + Sync>;
    let user_stat_repository: Arc<dyn UserStatRepository>;
    match &config.database_url {
        Some(database_url) => {
            let pool = PgPoolOptions::new()
                .max_connections(config.database_max_connections)
                .connect(database_url)
                .await
                .context("Failed to connect to database")?;
            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .context("Failed to run migrations")?;
            info!("Using PostgreSQL stores");

            evening_repository = Arc::new(PostgresEveningRepository::new(pool.clone()));
            user_stat_repository = Arc::new(PostgresUserStatRepository::new(pool));
        }
        None => {
            info!("DATABASE_URL not set, using in-memory stores");
            evening_repository = Arc::new(InMemoryEveningRepository::new());
            user_stat_repository = Arc::new(InMemoryUserStatRepository::new());
        }
    }

    let stats_service = Arc::new(StatsService::new(
        evening_repository.clone(),
        user_stat_repository,
    ));
    let app = build_router(AppState::new(evening_repository, stats_service));

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    info!(bind_addr = %config.bind_addr, "Server listening");
    axum::serve(listener, app).await?;

    Ok(())
}
