use crate::error::DbError;
use configuration::DatabaseSettings;
use dotenvy::dotenv;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use std::env;
use std::time::Duration;

/// Establishes a connection pool to the PostgreSQL database.
///
/// Every operation checks a connection out of this pool for its own use, so
/// concurrent client connections never share a database session. Connections
/// are pinged before being handed out; a dead one is discarded and replaced
/// on demand, and if the server cannot be reached the acquiring operation
/// fails on its own without affecting the others.
pub async fn connect(settings: &DatabaseSettings) -> Result<PgPool, DbError> {
    let options = PgConnectOptions::new()
        .host(&settings.host)
        .port(settings.port)
        .username(&settings.user)
        .password(&settings.password)
        .database(&settings.database);

    let pool = pool_options(settings.max_connections, settings.acquire_timeout_secs)
        .connect_with(options)
        .await?;

    tracing::info!(
        host = %settings.host,
        database = %settings.database,
        max_connections = settings.max_connections,
        "Database pool established."
    );

    Ok(pool)
}

/// Establishes a pool from the `DATABASE_URL` environment variable (or `.env` file).
///
/// Used by tooling and the integration tests, which point at a scratch database.
pub async fn connect_from_env() -> Result<PgPool, DbError> {
    dotenv().ok();

    let database_url = env::var("DATABASE_URL")
        .map_err(|_e| DbError::ConnectionConfigError("DATABASE_URL must be set.".to_string()))?;

    let pool = pool_options(5, 5).connect(&database_url).await?;

    Ok(pool)
}

fn pool_options(max_connections: u32, acquire_timeout_secs: u64) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(acquire_timeout_secs))
        .test_before_acquire(true)
}
