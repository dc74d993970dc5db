use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::config::AppConfig;
use crate::error::AppError;

/// Build a connection pool from configuration.
///
/// A missing `DATABASE_URL` is a whole-command fatal: the jobs cannot run
/// without their source data, so this returns an error rather than a
/// degraded pool.
pub async fn connect(config: &AppConfig) -> Result<PgPool, AppError> {
    let url = config
        .database_url
        .as_deref()
        .ok_or_else(|| AppError::Config("DATABASE_URL is not set".to_string()))?;

    let pool = PgPoolOptions::new()
        .max_connections(config.db_pool_max_connections)
        .min_connections(config.db_pool_min_connections)
        .acquire_timeout(Duration::from_secs(config.db_pool_acquire_timeout_seconds))
        .connect(url)
        .await?;

    Ok(pool)
}
