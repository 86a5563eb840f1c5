pub mod submissions;

use std::str::FromStr;
use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;

use crate::config::Config;

/// Open the pool against `config.database_name`, ping it and apply migrations.
/// Any failure here is a startup failure.
pub async fn connect(config: &Config) -> Result<PgPool, String> {
    let options = PgConnectOptions::from_str(&config.database_url)
        .map_err(|e| format!("Invalid DATABASE_URL: {e}"))?
        .database(&config.database_name);

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(10))
        .connect_with(options)
        .await
        .map_err(|e| format!("Failed to connect to database: {e}"))?;

    ping(&pool)
        .await
        .map_err(|e| format!("Database did not answer ping: {e}"))?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| format!("Failed to run migrations: {e}"))?;

    tracing::info!(database = %config.database_name, "Connected to database");

    Ok(pool)
}

pub async fn ping(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
